//! Shared helpers for the olangc test suite.

use anyhow::Result;

use inkwell::context::Context;
use olangc::codegen::CodeGen;

/// Compile Olang source to verified LLVM IR text.
///
/// Diagnostic output is suppressed while the helper runs so error-path
/// tests stay quiet.
#[allow(dead_code)]
pub fn gen_ir_for_source(src: &str) -> Result<String> {
    let _diag_guard = olangc::diagnostics::suppress();

    let program = olang_parser::parse_program(src).map_err(|e| anyhow::anyhow!("{}", e))?;

    let context = Context::create();
    let codegen = CodeGen::new(&context, "test_module");
    codegen
        .compile_program(&program)
        .map_err(|d| anyhow::anyhow!("{}", d.message))?;
    codegen
        .module
        .verify()
        .map_err(|e| anyhow::anyhow!("module verification failed: {}", e.to_string()))?;

    Ok(codegen.module.print_to_string().to_string())
}

/// Compile Olang source without running the verifier; returns the IR text
/// and whether verification would have passed.
#[allow(dead_code)]
pub fn gen_ir_unverified(src: &str) -> Result<(String, bool)> {
    let _diag_guard = olangc::diagnostics::suppress();

    let program = olang_parser::parse_program(src).map_err(|e| anyhow::anyhow!("{}", e))?;

    let context = Context::create();
    let codegen = CodeGen::new(&context, "test_module");
    codegen
        .compile_program(&program)
        .map_err(|d| anyhow::anyhow!("{}", d.message))?;
    let verified = codegen.module.verify().is_ok();

    Ok((codegen.module.print_to_string().to_string(), verified))
}

/// Run code generation and return the failure diagnostic's message.
#[allow(dead_code)]
pub fn codegen_error_for_source(src: &str) -> String {
    let _diag_guard = olangc::diagnostics::suppress();

    let program = olang_parser::parse_program(src).expect("source should parse");
    let context = Context::create();
    let codegen = CodeGen::new(&context, "test_module");
    match codegen.compile_program(&program) {
        Ok(()) => panic!("expected code generation to fail"),
        Err(d) => d.message,
    }
}
