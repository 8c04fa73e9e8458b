//! Main entry point for the Olang AOT compiler.
//!
//! Resolves `include` directives, parses the merged source, generates LLVM
//! IR, and writes a relocatable object file for the host (or a requested)
//! target triple. Exit code is 0 on success and 1 on any error: file read,
//! parse, verification, or backend failure.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// Olang ahead-of-time compiler
#[derive(Parser)]
#[command(name = "olangc", version, about = "Olang AOT compiler")]
struct Cli {
    /// Root source file
    file: PathBuf,

    /// Output file; defaults to the source path with `.o` (or `.ll` with
    /// --emit-llvm)
    #[arg(short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Emit textual LLVM IR instead of an object file
    #[arg(long)]
    emit_llvm: bool,

    /// Additionally print the IR to standard error
    #[arg(long)]
    print_ir: bool,

    /// Target triple; defaults to the host
    #[arg(long, value_name = "TRIPLE")]
    target: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut options = olangc::CompileOptions::new(cli.file.to_string_lossy().to_string());
    options.out_path = cli.output;
    options.emit_llvm = cli.emit_llvm;
    options.print_ir = cli.print_ir;
    options.target_triple = cli.target;

    olangc::compile(&options)?;
    Ok(())
}
