//! Top-level codegen module
//!
//! This module provides the `CodeGen` structure which holds the LLVM
//! `Context`, `Module`, `Builder`, caches for frequently used LLVM types,
//! and the per-module struct and function tables. Lowering is organized
//! across submodules:
//! - `emit` : the three declaration sweeps and per-function generation
//! - `stmt` : statement lowering
//! - `expr` : expression lowering and declared-type synthesis
//!
//! Per-function state is a [`ScopeStack`] of name bindings threaded through
//! the lowering functions. A binding is either an addressable stack slot
//! (entry-block alloca) or a raw SSA value (by-value struct parameters),
//! never both; lookup searches frames inside-out.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, StructType};
use inkwell::values::{BasicValueEnum, FunctionValue, PointerValue};

use olang_ast::{Field, Type};

use crate::diagnostics::{Diagnostic, DiagnosticResult};

pub mod emit;
pub mod expr;
pub mod stmt;

/// A name binding in the current function.
#[derive(Debug, Clone)]
pub enum Binding<'ctx> {
    /// Addressable local backed by an entry-block alloca.
    Local { ptr: PointerValue<'ctx>, ty: Type },
    /// By-value SSA binding with no stack slot of its own.
    Value { value: BasicValueEnum<'ctx>, ty: Type },
}

impl<'ctx> Binding<'ctx> {
    pub fn ty(&self) -> &Type {
        match self {
            Binding::Local { ty, .. } => ty,
            Binding::Value { ty, .. } => ty,
        }
    }
}

/// Stack of per-scope name environments. Pushed on function entry and on
/// entering an `if`/`while` body, popped on exit; the `scoped` closure
/// idiom keeps push/pop balanced across early returns.
#[derive(Default)]
pub struct ScopeStack<'ctx> {
    frames: Vec<HashMap<String, Binding<'ctx>>>,
}

impl<'ctx> ScopeStack<'ctx> {
    pub fn new() -> Self {
        ScopeStack { frames: Vec::new() }
    }

    /// Run `f` inside a fresh scope frame.
    pub fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.frames.push(HashMap::new());
        let out = f(self);
        self.frames.pop();
        out
    }

    /// Bind `name` in the innermost frame.
    pub fn insert(&mut self, name: impl Into<String>, binding: Binding<'ctx>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), binding);
        }
    }

    /// Inside-out lookup.
    pub fn lookup(&self, name: &str) -> Option<&Binding<'ctx>> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Main code generation context holding LLVM state and per-module tables.
pub struct CodeGen<'ctx> {
    /// LLVM context
    pub context: &'ctx Context,
    /// LLVM module being generated
    pub module: Module<'ctx>,
    /// LLVM IR builder
    pub builder: Builder<'ctx>,
    /// Next unique string literal ID
    pub next_str_id: Cell<u32>,
    /// Cached string literal pointers
    pub string_literals: RefCell<HashMap<String, PointerValue<'ctx>>>,
    /// Cached LLVM type: i1
    pub bool_t: inkwell::types::IntType<'ctx>,
    /// Cached LLVM type: i8
    pub i8_t: inkwell::types::IntType<'ctx>,
    /// Cached LLVM type: i16
    pub i16_t: inkwell::types::IntType<'ctx>,
    /// Cached LLVM type: i32
    pub i32_t: inkwell::types::IntType<'ctx>,
    /// Cached LLVM type: i64
    pub i64_t: inkwell::types::IntType<'ctx>,
    /// Cached LLVM type: half
    pub f16_t: inkwell::types::FloatType<'ctx>,
    /// Cached LLVM type: float
    pub f32_t: inkwell::types::FloatType<'ctx>,
    /// Cached LLVM type: double
    pub f64_t: inkwell::types::FloatType<'ctx>,
    /// Cached LLVM type: opaque pointer
    pub ptr_t: inkwell::types::PointerType<'ctx>,
    /// Struct name -> LLVM struct type
    pub struct_types: RefCell<HashMap<String, StructType<'ctx>>>,
    /// Struct name -> declared fields, in declaration order
    pub struct_fields: RefCell<HashMap<String, Vec<Field>>>,
    /// Function name -> (parameter types, return type)
    pub fn_sigs: RefCell<HashMap<String, (Vec<Type>, Type)>>,
}

impl<'ctx> CodeGen<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();
        CodeGen {
            context,
            module,
            builder,
            next_str_id: Cell::new(0),
            string_literals: RefCell::new(HashMap::new()),
            bool_t: context.bool_type(),
            i8_t: context.i8_type(),
            i16_t: context.i16_type(),
            i32_t: context.i32_type(),
            i64_t: context.i64_type(),
            f16_t: context.f16_type(),
            f32_t: context.f32_type(),
            f64_t: context.f64_type(),
            ptr_t: context.i8_type().ptr_type(inkwell::AddressSpace::default()),
            struct_types: RefCell::new(HashMap::new()),
            struct_fields: RefCell::new(HashMap::new()),
            fn_sigs: RefCell::new(HashMap::new()),
        }
    }

    /// Map an Olang type to its LLVM ABI type. Struct references resolve
    /// against the module's struct table; `Void` has no value type.
    pub fn llvm_type(&self, ty: &Type) -> DiagnosticResult<BasicTypeEnum<'ctx>> {
        match ty {
            Type::I1 => Ok(self.bool_t.into()),
            Type::I8 => Ok(self.i8_t.into()),
            Type::I16 => Ok(self.i16_t.into()),
            Type::I32 => Ok(self.i32_t.into()),
            Type::I64 => Ok(self.i64_t.into()),
            Type::F16 => Ok(self.f16_t.into()),
            Type::F32 => Ok(self.f32_t.into()),
            Type::F64 => Ok(self.f64_t.into()),
            Type::Pointer(_) => Ok(self.ptr_t.into()),
            Type::Array(len, elem) => {
                let elem_ty = self.llvm_type(elem)?;
                Ok(elem_ty.array_type(*len).into())
            }
            Type::Struct(name) => self
                .struct_types
                .borrow()
                .get(name)
                .copied()
                .map(Into::into)
                .ok_or_else(|| Diagnostic::error(format!("unknown struct type `{}`", name))),
            Type::Void => Err(Diagnostic::error("void is not a value type")),
        }
    }

    /// Build an LLVM function type from Olang parameter and return types.
    pub fn fn_type(&self, params: &[Type], ret: &Type) -> DiagnosticResult<FunctionType<'ctx>> {
        let mut param_types: Vec<BasicMetadataTypeEnum<'ctx>> = Vec::with_capacity(params.len());
        for p in params {
            param_types.push(self.llvm_type(p)?.into());
        }
        match ret {
            Type::Void => Ok(self.context.void_type().fn_type(&param_types, false)),
            _ => Ok(self.llvm_type(ret)?.fn_type(&param_types, false)),
        }
    }

    /// Zero value for any value type (used for aggregate zero-initializers).
    pub fn const_zero(&self, ty: BasicTypeEnum<'ctx>) -> BasicValueEnum<'ctx> {
        match ty {
            BasicTypeEnum::IntType(t) => t.const_zero().into(),
            BasicTypeEnum::FloatType(t) => t.const_zero().into(),
            BasicTypeEnum::PointerType(t) => t.const_null().into(),
            BasicTypeEnum::ArrayType(t) => t.const_zero().into(),
            BasicTypeEnum::StructType(t) => t.const_zero().into(),
            BasicTypeEnum::VectorType(t) => t.const_zero().into(),
        }
    }

    /// Zero constant of a scalar return type; `None` for aggregates, which
    /// have no synthesized default return.
    pub fn default_return_value(&self, ty: &Type) -> Option<BasicValueEnum<'ctx>> {
        let llvm = self.llvm_type(ty).ok()?;
        match llvm {
            BasicTypeEnum::IntType(t) => Some(t.const_zero().into()),
            BasicTypeEnum::FloatType(t) => Some(t.const_zero().into()),
            _ => None,
        }
    }

    /// Create an alloca at the beginning of the function's entry block,
    /// regardless of where the corresponding `let` appears. Keeping every
    /// alloca in the entry block keeps mem2reg effective.
    pub(crate) fn create_entry_alloca(
        &self,
        function: FunctionValue<'ctx>,
        name: &str,
        ty: BasicTypeEnum<'ctx>,
    ) -> DiagnosticResult<PointerValue<'ctx>> {
        let entry = function
            .get_first_basic_block()
            .ok_or_else(|| Diagnostic::error("function has no entry block"))?;
        let tmp = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(first) => tmp.position_before(&first),
            None => tmp.position_at_end(entry),
        }
        tmp.build_alloca(ty, name)
            .map_err(|_| Diagnostic::error(format!("failed to allocate stack slot for `{}`", name)))
    }

    /// Index and declared type of `member` on struct `name`.
    pub(crate) fn field_index(&self, name: &str, member: &str) -> DiagnosticResult<(u32, Type)> {
        let fields = self.struct_fields.borrow();
        let fields = fields
            .get(name)
            .ok_or_else(|| Diagnostic::error(format!("unknown struct type `{}`", name)))?;
        fields
            .iter()
            .position(|f| f.name == member)
            .map(|i| (i as u32, fields[i].ty.clone()))
            .ok_or_else(|| {
                Diagnostic::error(format!("no field `{}` on struct `{}`", member, name))
            })
    }
}
