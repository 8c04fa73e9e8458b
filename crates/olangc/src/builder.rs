//! The compilation driver: source text to object file.
//!
//! Pipeline: preprocess includes, parse, run the three codegen sweeps,
//! optionally print the IR, verify the module, then either write textual
//! IR or drive the LLVM backend to a relocatable object file. All failures
//! abort the translation unit; no partial object files are written.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use inkwell::context::Context;
use inkwell::targets::{
    CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine, TargetTriple,
};
use inkwell::OptimizationLevel;

use crate::codegen::CodeGen;
use crate::diagnostics;
use crate::preprocess;
use crate::CompileOptions;

/// Run the full pipeline. Returns the path of the emitted output.
pub fn compile_with_options(options: &CompileOptions) -> Result<PathBuf> {
    let src_path = Path::new(&options.src_file);
    let source = preprocess::preprocess(src_path)?;

    let program = olang_parser::parse_program(&source).map_err(|e| {
        diagnostics::report_error_span(
            Some(&options.src_file),
            &source,
            e.span.start,
            &e.message,
            None,
        );
        anyhow!("parse error: {}", e.message)
    })?;

    let module_name = src_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("olang");

    let context = Context::create();
    let codegen = CodeGen::new(&context, module_name);
    codegen.compile_program(&program).map_err(|d| {
        diagnostics::emit_diagnostic(&d, Some(&source));
        anyhow!("{}", d.message)
    })?;

    // Target triple: caller-supplied or the host default.
    let triple = match &options.target_triple {
        Some(t) => TargetTriple::create(t),
        None => TargetMachine::get_default_triple(),
    };
    codegen.module.set_triple(&triple);

    if options.print_ir {
        eprintln!("{}", codegen.module.print_to_string().to_string());
    }

    codegen
        .module
        .verify()
        .map_err(|e| anyhow!("module verification failed:\n{}", e.to_string()))?;

    let out_path = options
        .out_path
        .clone()
        .unwrap_or_else(|| default_out_path(src_path, options.emit_llvm));

    if options.emit_llvm {
        codegen
            .module
            .print_to_file(&out_path)
            .map_err(|e| anyhow!("failed to write IR to {}: {}", out_path.display(), e))?;
        return Ok(out_path);
    }

    emit_object_file(&codegen, &triple, &out_path)?;
    Ok(out_path)
}

/// Drive the LLVM backend: native registries, a generic target machine
/// with PIC relocation, the module's data layout, and the object writer.
fn emit_object_file(codegen: &CodeGen<'_>, triple: &TargetTriple, out_path: &Path) -> Result<()> {
    Target::initialize_native(&InitializationConfig::default())
        .map_err(|e| anyhow!("failed to initialize native target: {}", e))?;

    let target = Target::from_triple(triple).map_err(|e| anyhow!("{}", e))?;
    let target_machine = target
        .create_target_machine(
            triple,
            "generic",
            "",
            OptimizationLevel::Default,
            RelocMode::PIC,
            CodeModel::Default,
        )
        .ok_or_else(|| {
            anyhow!(
                "failed to create target machine for {}",
                triple.as_str().to_string_lossy()
            )
        })?;

    codegen
        .module
        .set_data_layout(&target_machine.get_target_data().get_data_layout());

    target_machine
        .write_to_file(&codegen.module, FileType::Object, out_path)
        .map_err(|e| anyhow!("failed to emit object file {}: {}", out_path.display(), e))?;
    Ok(())
}

/// Default output path: the source path with `.o` (or `.ll` when emitting
/// textual IR).
fn default_out_path(src: &Path, emit_llvm: bool) -> PathBuf {
    src.with_extension(if emit_llvm { "ll" } else { "o" })
}
