//! Include preprocessor.
//!
//! Resolves `include "path";` directives into a single source text before
//! parsing. Paths resolve relative to the including file's directory, and a
//! set of canonical paths already spliced suppresses cycles and duplicate
//! inclusion: a repeat substitutes empty text. A file that cannot be opened
//! produces a diagnostic and also substitutes empty text; only the root
//! file is required to exist.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::diagnostics;

const DIRECTIVE: &str = "include \"";

/// Expand the translation unit rooted at `root` into one source text.
pub fn preprocess(root: &Path) -> Result<String> {
    let canonical = std::fs::canonicalize(root)
        .with_context(|| format!("cannot open file {}", root.display()))?;
    let text = std::fs::read_to_string(&canonical)
        .with_context(|| format!("cannot read file {}", root.display()))?;

    let mut seen = HashSet::new();
    seen.insert(canonical.clone());
    let dir = canonical
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(expand_includes(&text, &dir, &mut seen))
}

/// Splice the processed contents of `path` in place of a directive. Repeat
/// inclusions and unreadable files both become empty text; the latter is
/// reported.
fn include_file(path: &Path, seen: &mut HashSet<PathBuf>) -> String {
    let canonical = match std::fs::canonicalize(path) {
        Ok(c) => c,
        Err(_) => {
            diagnostics::report_error(
                Some(&path.display().to_string()),
                &format!("cannot open include file {}", path.display()),
                Some("substituting empty text"),
            );
            return String::new();
        }
    };
    if !seen.insert(canonical.clone()) {
        return String::new();
    }
    let text = match std::fs::read_to_string(&canonical) {
        Ok(t) => t,
        Err(_) => {
            diagnostics::report_error(
                Some(&path.display().to_string()),
                &format!("cannot read include file {}", path.display()),
                Some("substituting empty text"),
            );
            return String::new();
        }
    };
    let dir = canonical
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    expand_includes(&text, &dir, seen)
}

/// Scan forward for `include "` directives, splicing each resolved file in
/// place of the directive up to and including its terminating `;`. A
/// directive with no terminator passes through unchanged, with scanning
/// resuming past the closing quote.
fn expand_includes(text: &str, dir: &Path, seen: &mut HashSet<PathBuf>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0usize;

    while let Some(found) = text[pos..].find(DIRECTIVE) {
        let start = pos + found;
        out.push_str(&text[pos..start]);

        let path_start = start + DIRECTIVE.len();
        let Some(quote) = text[path_start..].find('"') else {
            // No closing quote: pass the rest through untouched.
            out.push_str(&text[start..]);
            return out;
        };
        let path_end = path_start + quote;
        let rel = &text[path_start..path_end];
        let after_quote = path_end + 1;

        // The terminator must follow the quote, ignoring whitespace.
        let tail = &text[after_quote..];
        let ws = tail.len() - tail.trim_start().len();
        if tail.trim_start().starts_with(';') {
            let after_semi = after_quote + ws + 1;
            out.push_str(&include_file(&dir.join(rel), seen));
            pos = after_semi;
        } else {
            // Malformed directive: keep the text and continue scanning.
            out.push_str(&text[start..after_quote]);
            pos = after_quote;
        }
    }

    out.push_str(&text[pos..]);
    out
}
