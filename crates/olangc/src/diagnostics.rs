//! Diagnostic reporting utilities for the Olang compiler.
//!
//! Lightweight, rustc-style error reporting to stderr. Code generation
//! propagates structured [`Diagnostic`] values through
//! [`DiagnosticResult`]; the driver decides when and how to render them.
//! A process-wide suppression guard keeps test output clean.

use std::sync::atomic::{AtomicBool, Ordering};

/// Result type threaded through all lowering functions.
pub type DiagnosticResult<T> = Result<T, Box<Diagnostic>>;

/// Structured diagnostic container for propagating compiler errors.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary error message describing the issue
    pub message: String,
    /// Optional file path where the error occurred
    pub file: Option<String>,
    /// Optional additional context or suggestion
    pub note: Option<String>,
    /// Optional byte offset into source text for span-aware highlighting
    pub span_start: Option<usize>,
}

impl Diagnostic {
    /// Creates a boxed diagnostic with only an error message.
    pub fn error(msg: impl Into<String>) -> Box<Self> {
        Box::new(Diagnostic {
            message: msg.into(),
            file: None,
            note: None,
            span_start: None,
        })
    }

    /// Creates a boxed diagnostic carrying a byte offset into the source.
    pub fn error_at(msg: impl Into<String>, span_start: usize) -> Box<Self> {
        Box::new(Diagnostic {
            message: msg.into(),
            file: None,
            note: None,
            span_start: Some(span_start),
        })
    }
}

/// Prints a compact diagnostic message to stderr.
pub fn report_error(file: Option<&str>, message: &str, note: Option<&str>) {
    if !DIAGNOSTICS_ENABLED.load(Ordering::SeqCst) {
        return;
    }
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    eprintln!("{}error{}: {}", red, reset, message);
    if let Some(path) = file {
        eprintln!("  --> {}", path);
    }
    if let Some(note) = note {
        let blue = "\x1b[34m";
        eprintln!("{}note{}: {}", blue, reset, note);
    }
}

/// Prints a span-aware diagnostic with a caret marker at the error column.
pub fn report_error_span(
    file: Option<&str>,
    source: &str,
    span_start: usize,
    message: &str,
    note: Option<&str>,
) {
    if !DIAGNOSTICS_ENABLED.load(Ordering::SeqCst) {
        return;
    }
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    // Convert byte offset to line and column coordinates
    let mut byte_idx = 0usize;
    let mut line_no = source.lines().count().max(1);
    let mut col = 0usize;
    for (lineno, line) in source.lines().enumerate() {
        let line_len = line.len() + 1; // account for the newline
        if span_start >= byte_idx && span_start < byte_idx + line_len {
            line_no = lineno + 1;
            col = span_start - byte_idx;
            break;
        }
        byte_idx += line_len;
    }

    eprintln!("{}error{}: {}", red, reset, message);
    match file {
        Some(path) => eprintln!("  --> {}:{}:{}", path, line_no, col + 1),
        None => eprintln!("  --> <input>:{}:{}", line_no, col + 1),
    }

    if let Some(line) = source.lines().nth(line_no.saturating_sub(1)) {
        eprintln!("{:4} | {}", line_no, line);
        eprintln!("     | {}^", " ".repeat(col));
    }

    if let Some(note) = note {
        let blue = "\x1b[34m";
        eprintln!("{}note{}: {}", blue, reset, note);
    }
}

/// Emits a diagnostic using span-aware formatting when both a span and the
/// source text are available.
pub fn emit_diagnostic(d: &Diagnostic, source: Option<&str>) {
    if let (Some(span), Some(src)) = (d.span_start, source) {
        report_error_span(d.file.as_deref(), src, span, &d.message, d.note.as_deref());
    } else {
        report_error(d.file.as_deref(), &d.message, d.note.as_deref());
    }
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Temporarily suppresses diagnostic output, for tests that exercise error
/// paths. The returned guard restores the previous state when dropped.
pub fn suppress() -> SuppressGuard {
    let prev = DIAGNOSTICS_ENABLED.swap(false, Ordering::SeqCst);
    SuppressGuard { prev }
}

/// RAII guard that restores diagnostic output state on drop.
pub struct SuppressGuard {
    prev: bool,
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        DIAGNOSTICS_ENABLED.store(self.prev, Ordering::SeqCst);
    }
}
