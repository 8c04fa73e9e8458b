//! Olang AOT compiler library.
//!
//! The compiler lowers a parsed Olang program to an LLVM module and from
//! there to a relocatable object file (or textual IR). The pipeline is
//! strictly forward: source text → AST → IR module → object bytes; the
//! only back-edges are symbol-table lookups inside a single function's
//! generator.

pub mod builder;
pub mod codegen;
pub mod diagnostics;
pub mod preprocess;

use std::path::PathBuf;

/// Compilation options for the Olang compiler.
///
/// Separates compiler configuration from CLI parsing: the compiler accepts
/// explicit options rather than re-reading arguments.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Path to the root source file to compile
    pub src_file: String,

    /// Output path; defaults to the source path with `.o` (or `.ll` when
    /// `emit_llvm` is set)
    pub out_path: Option<PathBuf>,

    /// Emit textual LLVM IR instead of an object file
    pub emit_llvm: bool,

    /// Additionally print the IR to standard error
    pub print_ir: bool,

    /// Target triple for cross-compilation; defaults to the host
    pub target_triple: Option<String>,
}

impl CompileOptions {
    pub fn new(src_file: impl Into<String>) -> Self {
        Self {
            src_file: src_file.into(),
            out_path: None,
            emit_llvm: false,
            print_ir: false,
            target_triple: None,
        }
    }
}

/// Compile a source file with the given options.
///
/// This is the primary API for invoking the compiler programmatically.
/// Returns the path of the emitted output file on success.
pub fn compile(options: &CompileOptions) -> anyhow::Result<PathBuf> {
    builder::compile_with_options(options)
}
