//! Declaration lowering: the three module sweeps and per-function IR
//! generation.
//!
//! The sweeps run in a fixed order over the program's declarations:
//! structs, then extern prototypes, then function bodies. Struct types must
//! exist before any signature or body references them, and externs must be
//! declared before the function sweep so calls resolve by name.

use inkwell::module::Linkage;
use inkwell::values::FunctionValue;

use olang_ast::{Decl, ExternDecl, FunctionDecl, Program, StructDecl, Type};

use crate::codegen::{Binding, CodeGen, ScopeStack};
use crate::diagnostics::{Diagnostic, DiagnosticResult};

impl<'ctx> CodeGen<'ctx> {
    /// Lower a whole program into the module.
    pub fn compile_program(&self, program: &Program) -> DiagnosticResult<()> {
        for decl in &program.decls {
            if let Decl::Struct(s) = decl {
                self.declare_struct(s)?;
            }
        }
        for decl in &program.decls {
            if let Decl::Extern(e) = decl {
                self.declare_extern(e)?;
            }
        }
        for decl in &program.decls {
            if let Decl::Function(f) = decl {
                self.gen_function(f)?;
            }
        }
        Ok(())
    }

    /// Materialize a named LLVM struct type and register its field table.
    fn declare_struct(&self, decl: &StructDecl) -> DiagnosticResult<()> {
        let mut field_types = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            field_types.push(self.llvm_type(&field.ty)?);
        }
        let struct_type = self.context.opaque_struct_type(&decl.name);
        struct_type.set_body(&field_types, false);

        self.struct_types
            .borrow_mut()
            .insert(decl.name.clone(), struct_type);
        self.struct_fields
            .borrow_mut()
            .insert(decl.name.clone(), decl.fields.clone());
        Ok(())
    }

    /// Declare an external function symbol with no body.
    fn declare_extern(&self, decl: &ExternDecl) -> DiagnosticResult<FunctionValue<'ctx>> {
        let param_types: Vec<Type> = decl.params.iter().map(|p| p.ty.clone()).collect();
        let fn_type = self.fn_type(&param_types, &decl.return_type)?;
        let function = self
            .module
            .add_function(&decl.name, fn_type, Some(Linkage::External));
        self.fn_sigs
            .borrow_mut()
            .insert(decl.name.clone(), (param_types, decl.return_type.clone()));
        Ok(function)
    }

    /// Generate a function definition: entry block, parameter spills, body
    /// statements, and a synthesized default return when the body falls
    /// through without terminating.
    pub fn gen_function(&self, decl: &FunctionDecl) -> DiagnosticResult<FunctionValue<'ctx>> {
        let param_types: Vec<Type> = decl.params.iter().map(|p| p.ty.clone()).collect();
        let fn_type = self.fn_type(&param_types, &decl.return_type)?;
        let linkage = if decl.is_export {
            Linkage::External
        } else {
            Linkage::Internal
        };
        let function = self.module.add_function(&decl.name, fn_type, Some(linkage));
        // Registered before the body so recursive calls type-check.
        self.fn_sigs
            .borrow_mut()
            .insert(decl.name.clone(), (param_types, decl.return_type.clone()));

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        let mut scopes = ScopeStack::new();
        let entry_depth = scopes.depth();
        scopes.scoped(|scopes| -> DiagnosticResult<()> {
            for (i, param) in decl.params.iter().enumerate() {
                let arg = function.get_nth_param(i as u32).ok_or_else(|| {
                    Diagnostic::error(format!("missing argument for parameter `{}`", param.name))
                })?;
                if matches!(param.ty, Type::Struct(_)) {
                    // By-value struct parameters stay as SSA values; member
                    // access extracts fields directly.
                    scopes.insert(
                        param.name.clone(),
                        Binding::Value {
                            value: arg,
                            ty: param.ty.clone(),
                        },
                    );
                } else {
                    let slot =
                        self.create_entry_alloca(function, &param.name, self.llvm_type(&param.ty)?)?;
                    self.builder
                        .build_store(slot, arg)
                        .map_err(|_| Diagnostic::error("failed to spill parameter"))?;
                    scopes.insert(
                        param.name.clone(),
                        Binding::Local {
                            ptr: slot,
                            ty: param.ty.clone(),
                        },
                    );
                }
            }

            for stmt in &decl.body {
                self.gen_stmt(stmt, function, scopes)?;
            }
            Ok(())
        })?;
        debug_assert_eq!(scopes.depth(), entry_depth);

        // Synthesize the default return if the last block fell through.
        let block = self
            .builder
            .get_insert_block()
            .ok_or_else(|| Diagnostic::error("builder has no insertion block"))?;
        if block.get_terminator().is_none() {
            match &decl.return_type {
                Type::Void => {
                    self.builder
                        .build_return(None)
                        .map_err(|_| Diagnostic::error("failed to build implicit return"))?;
                }
                ty => {
                    // Zero default for scalar returns. Aggregate returns are
                    // left unterminated for the verifier to flag.
                    if let Some(zero) = self.default_return_value(ty) {
                        self.builder
                            .build_return(Some(&zero))
                            .map_err(|_| Diagnostic::error("failed to build implicit return"))?;
                    }
                }
            }
        }

        Ok(function)
    }
}
