//! IR-level tests for the code generator.
//!
//! Each test compiles a small program, runs the LLVM verifier, and checks
//! for the structural features the lowering is expected to produce.

mod common;

use common::{codegen_error_for_source, gen_ir_for_source, gen_ir_unverified};

#[test]
fn arithmetic_function_lowers_to_typed_add() {
    let ir = gen_ir_for_source("export fn add(a: i32, b: i32) -> i32 { return a + b; }")
        .expect("codegen failed");
    assert!(ir.contains("define i32 @add"), "ir:\n{}", ir);
    assert!(ir.contains("add i32"), "ir:\n{}", ir);
}

#[test]
fn parameters_are_spilled_to_entry_allocas() {
    let ir = gen_ir_for_source("export fn id(a: i32) -> i32 { return a; }")
        .expect("codegen failed");
    assert!(ir.contains("alloca i32"), "ir:\n{}", ir);
    assert!(ir.contains("store i32"), "ir:\n{}", ir);
}

#[test]
fn export_flag_controls_linkage() {
    let ir = gen_ir_for_source(
        "fn helper() -> i32 { return 1; } export fn entry() -> i32 { return helper(); }",
    )
    .expect("codegen failed");
    assert!(ir.contains("define internal i32 @helper"), "ir:\n{}", ir);
    assert!(ir.contains("define i32 @entry"), "ir:\n{}", ir);
}

#[test]
fn if_else_creates_three_way_control_flow() {
    let ir = gen_ir_for_source(
        "export fn max(a: i32, b: i32) -> i32 { if a > b { return a; } else { return b; } }",
    )
    .expect("codegen failed");
    assert!(ir.contains("icmp sgt i32"), "ir:\n{}", ir);
    assert!(ir.contains("if.then"), "ir:\n{}", ir);
    assert!(ir.contains("if.else"), "ir:\n{}", ir);
    // Both arms return, so no merge block survives.
    assert!(!ir.contains("if.merge"), "ir:\n{}", ir);
}

#[test]
fn if_without_else_branches_to_merge() {
    let ir = gen_ir_for_source(
        "export fn f(a: i32) -> i32 { if a > 0 { a = a - 1; } return a; }",
    )
    .expect("codegen failed");
    assert!(ir.contains("if.merge"), "ir:\n{}", ir);
}

#[test]
fn while_loop_stitches_cond_body_end() {
    let src = "export fn sum_to(n: i32) -> i32 {\
        let s: i32 = 0;\
        let i: i32 = 0;\
        while i <= n { s = s + i; i = i + 1; }\
        return s; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("while.cond"), "ir:\n{}", ir);
    assert!(ir.contains("while.body"), "ir:\n{}", ir);
    assert!(ir.contains("while.end"), "ir:\n{}", ir);
    assert!(ir.contains("icmp sle i32"), "ir:\n{}", ir);
}

#[test]
fn while_body_ending_in_return_still_verifies() {
    // The end block keeps its predecessor from the condition; straight-line
    // code after the loop lands there.
    let src = "export fn f(n: i32) -> i32 { while n > 0 { return n; } return 0; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("while.end"), "ir:\n{}", ir);
}

#[test]
fn struct_decl_materializes_named_type() {
    let src = "struct P { x: i32; y: i32; } export fn mk() -> i32 {\
        let p: P = 0; p.x = 3; p.y = 4; return p.x + p.y; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("%P = type { i32, i32 }"), "ir:\n{}", ir);
    assert!(ir.contains("getelementptr"), "ir:\n{}", ir);
    // Aggregate lets are zero-initialized, ignoring the initializer.
    assert!(ir.contains("zeroinitializer"), "ir:\n{}", ir);
}

#[test]
fn struct_fields_resolve_by_declared_name() {
    // Field names outside the {x, y, z} convention must still resolve.
    let src = "struct Pair { first: i32; second: i32; } export fn f() -> i32 {\
        let p: Pair = 0; p.second = 9; return p.second; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("%Pair = type { i32, i32 }"), "ir:\n{}", ir);
}

#[test]
fn unknown_field_is_a_codegen_error() {
    let src = "struct P { x: i32; } export fn f() -> i32 { let p: P = 0; return p.w; }";
    let message = codegen_error_for_source(src);
    assert!(message.contains("no field `w`"), "message: {}", message);
}

#[test]
fn by_value_struct_param_uses_extract_value() {
    let src = "struct P { x: i32; y: i32; } export fn get_x(p: P) -> i32 { return p.x; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("extractvalue %P"), "ir:\n{}", ir);
}

#[test]
fn array_accesses_compose_gep_and_load() {
    let src = "export fn arr() -> i32 { let a: array[3] i32 = 0;\
        a[0] = 10; a[1] = 20; a[2] = 30; return a[0] + a[1] + a[2]; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("[3 x i32]"), "ir:\n{}", ir);
    assert!(ir.contains("arrayidx"), "ir:\n{}", ir);
}

#[test]
fn zero_length_arrays_are_accepted() {
    let ir = gen_ir_for_source("export fn f() -> i32 { let a: array[0] i32 = 0; return 0; }")
        .expect("codegen failed");
    assert!(ir.contains("[0 x i32]"), "ir:\n{}", ir);
}

#[test]
fn member_of_array_element_composes_geps() {
    let src = "struct P { x: i32; y: i32; } export fn f() -> i32 {\
        let ps: array[2] P = 0; ps[1].y = 5; return ps[1].y; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("[2 x %P]"), "ir:\n{}", ir);
}

#[test]
fn extern_call_declares_and_calls_symbol() {
    let src = "extern fn puts(s: *i8) -> i32;\
        export fn greet() -> i32 { return puts(\"hi\"); }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("declare i32 @puts"), "ir:\n{}", ir);
    assert!(ir.contains("call i32 @puts"), "ir:\n{}", ir);
    // The literal is a private constant with a trailing NUL.
    assert!(ir.contains("private"), "ir:\n{}", ir);
    assert!(ir.contains("hi\\00"), "ir:\n{}", ir);
}

#[test]
fn identical_string_literals_share_one_global() {
    let src = "extern fn puts(s: *i8) -> i32;\
        export fn f() -> i32 { puts(\"hi\"); puts(\"hi\"); return 0; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert_eq!(ir.matches("c\"hi\\00\"").count(), 1, "ir:\n{}", ir);
}

#[test]
fn empty_void_function_gets_ret_void() {
    let ir = gen_ir_for_source("export fn f() {}").expect("codegen failed");
    assert!(ir.contains("ret void"), "ir:\n{}", ir);
}

#[test]
fn empty_non_void_function_gets_zero_return() {
    let ir = gen_ir_for_source("export fn f() -> i32 {}").expect("codegen failed");
    assert!(ir.contains("ret i32 0"), "ir:\n{}", ir);
    let ir = gen_ir_for_source("export fn g() -> f64 {}").expect("codegen failed");
    assert!(ir.contains("ret double"), "ir:\n{}", ir);
}

#[test]
fn aggregate_return_without_return_stmt_fails_verification() {
    // No default return is synthesized for aggregates; the block is left
    // unterminated and the verifier reports it.
    let (_, verified) =
        gen_ir_unverified("struct P { x: i32; } export fn f() -> P {}").expect("codegen failed");
    assert!(!verified);
}

#[test]
fn float_arithmetic_uses_float_variants() {
    let src = "export fn f(a: f64, b: f64) -> f64 { return a * b / 2.0; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("fmul double"), "ir:\n{}", ir);
    assert!(ir.contains("fdiv double"), "ir:\n{}", ir);
}

#[test]
fn division_and_remainder_are_signed() {
    let src = "export fn f(a: i32, b: i32) -> i32 { return a / b + a % b; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("sdiv i32"), "ir:\n{}", ir);
    assert!(ir.contains("srem i32"), "ir:\n{}", ir);
}

#[test]
fn logical_operators_lower_to_bitwise_ops() {
    let src = "export fn f(a: i1, b: i1) -> i1 { return a && b || a; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("and i1"), "ir:\n{}", ir);
    assert!(ir.contains("or i1"), "ir:\n{}", ir);
}

#[test]
fn dereference_loads_the_declared_pointee_type() {
    let src = "export fn f(p: *i64) -> i64 { return *p; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("load i64"), "ir:\n{}", ir);
}

#[test]
fn address_of_yields_the_alloca_pointer() {
    let src = "extern fn touch(p: *i32);\
        export fn f() -> i32 { let x: i32 = 1; touch(&x); return x; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("call void @touch(ptr"), "ir:\n{}", ir);
}

#[test]
fn assignment_value_is_the_rhs() {
    // Chained assignment only works because each assignment yields its RHS.
    let src = "export fn f() -> i32 { let a: i32 = 0; let b: i32 = 0;\
        a = b = 7; return a + b; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("store i32 7"), "ir:\n{}", ir);
}

#[test]
fn unknown_identifier_is_a_codegen_error() {
    let message = codegen_error_for_source("export fn f() -> i32 { return nope; }");
    assert!(message.contains("unknown identifier"), "message: {}", message);
}

#[test]
fn unknown_callee_is_a_codegen_error() {
    let message = codegen_error_for_source("export fn f() -> i32 { return missing(); }");
    assert!(message.contains("unknown function"), "message: {}", message);
}

#[test]
fn void_call_in_value_position_is_a_codegen_error() {
    let src = "extern fn log_it();\
        export fn f() -> i32 { let x: i32 = log_it(); return x; }";
    let message = codegen_error_for_source(src);
    assert!(message.contains("void value"), "message: {}", message);
}

#[test]
fn unsupported_assignment_target_is_a_codegen_error() {
    let message =
        codegen_error_for_source("export fn f(a: i32) -> i32 { (a + 1) = 2; return a; }");
    assert!(
        message.contains("unsupported assignment target") || message.contains("cannot assign"),
        "message: {}",
        message
    );
}

#[test]
fn inner_scopes_shadow_and_expire() {
    // The let inside the if body must not leak into the tail of the
    // function; the tail `x` refers to the outer binding.
    let src = "export fn f(c: i1) -> i32 { let x: i32 = 1;\
        if c { let x: i32 = 2; x = x + 1; } return x; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("define i32 @f"), "ir:\n{}", ir);
}

#[test]
fn calls_resolve_functions_declared_later_in_the_extern_sweep() {
    // Extern declarations are swept before function bodies, so source
    // order between them does not matter.
    let src = "export fn f() -> i32 { return get(); } extern fn get() -> i32;";
    let ir = gen_ir_for_source(src).expect("codegen failed");
    assert!(ir.contains("call i32 @get"), "ir:\n{}", ir);
}

#[test]
fn ir_round_trips_through_the_llvm_parser() {
    let src = "struct P { x: i32; y: i32; } extern fn puts(s: *i8) -> i32;\
        export fn mk() -> i32 { let p: P = 0; p.x = 3; return p.x; }";
    let ir = gen_ir_for_source(src).expect("codegen failed");

    let context = inkwell::context::Context::create();
    let buffer = inkwell::memory_buffer::MemoryBuffer::create_from_memory_range_copy(
        ir.as_bytes(),
        "roundtrip",
    );
    let reparsed = context
        .create_module_from_ir(buffer)
        .expect("emitted IR should re-parse");
    assert!(reparsed.get_function("mk").is_some());
    assert!(reparsed.get_function("puts").is_some());
    assert_eq!(
        reparsed.get_struct_type("P").map(|t| t.count_fields()),
        Some(2)
    );
}
