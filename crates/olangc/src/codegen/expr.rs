//! Expression lowering.
//!
//! Binary and unary operators dispatch on the operand's runtime type
//! (integer vs floating). Aggregate accesses compute addresses with GEPs
//! and never load whole aggregates. Assignment matches the shape of its
//! left-hand side instead of evaluating it.
//!
//! `&&` and `||` lower to bitwise and/or of `i1` operands: both sides are
//! always evaluated.
//!
//! Declared types are threaded through lowering by [`CodeGen::expr_type`],
//! which synthesizes an expression's Olang type from literals, the scope
//! stack, struct field tables, and recorded function signatures. This is
//! what gives `*p` its true pointee type and member accesses their field
//! types.

use inkwell::module::Linkage;
use inkwell::values::{
    BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, IntValue, PointerValue,
};
use inkwell::{FloatPredicate, IntPredicate};

use olang_ast::{
    AssignExpr, BinaryExpr, BinaryOp, CallExpr, Expr, Ident, IndexExpr, MemberExpr, Type,
    UnaryExpr, UnaryOp,
};

use crate::codegen::{Binding, CodeGen, ScopeStack};
use crate::diagnostics::{Diagnostic, DiagnosticResult};

impl<'ctx> CodeGen<'ctx> {
    /// Lower an expression. Calls to void functions produce no value.
    pub(crate) fn gen_expr(
        &self,
        expr: &Expr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<Option<BasicValueEnum<'ctx>>> {
        match expr {
            // Integer literals default to 32-bit signed.
            Expr::Int(lit) => Ok(Some(self.i32_t.const_int(lit.value as u64, true).into())),
            Expr::Float(lit) => Ok(Some(self.f64_t.const_float(lit.value).into())),
            Expr::Bool(lit) => Ok(Some(self.bool_t.const_int(lit.value as u64, false).into())),
            Expr::Str(lit) => self.gen_string_literal(&lit.value).map(Some),
            Expr::Ident(ident) => self.gen_ident(ident, scopes).map(Some),
            Expr::Binary(bin) => self.gen_binary_expr(bin, function, scopes).map(Some),
            Expr::Unary(unary) => self.gen_unary_expr(unary, function, scopes).map(Some),
            Expr::Assign(assign) => self.gen_assign_expr(assign, function, scopes).map(Some),
            Expr::Call(call) => self.gen_call_expr(call, function, scopes),
            Expr::Member(member) => self.gen_member_expr(member, function, scopes).map(Some),
            Expr::Index(index) => self.gen_index_expr(index, function, scopes).map(Some),
        }
    }

    /// Lower an expression in a position that requires a value.
    pub(crate) fn gen_expr_value(
        &self,
        expr: &Expr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        self.gen_expr(expr, function, scopes)?.ok_or_else(|| {
            Diagnostic::error_at(
                "void value used where a value is required",
                expr.span().start,
            )
        })
    }

    /// Strings lower to a private unnamed constant array; the expression
    /// value is a pointer to its first byte. Identical literals share one
    /// global.
    fn gen_string_literal(&self, value: &str) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        if let Some(ptr) = self.string_literals.borrow().get(value) {
            return Ok((*ptr).into());
        }

        let const_array = self.context.const_string(value.as_bytes(), true);
        let id = self.next_str_id.get();
        self.next_str_id.set(id.wrapping_add(1));
        let name = format!("str.{}", id);

        let global = self
            .module
            .add_global(const_array.get_type(), None, &name);
        global.set_initializer(&const_array);
        global.set_linkage(Linkage::Private);
        global.set_constant(true);

        // A constant GEP keeps the pointer usable from any function.
        let zero = self.i32_t.const_zero();
        let ptr = unsafe {
            global
                .as_pointer_value()
                .const_gep(&[zero, zero])
        };

        self.string_literals
            .borrow_mut()
            .insert(value.to_string(), ptr);
        Ok(ptr.into())
    }

    /// Load from the innermost binding of this name. Allocas load their
    /// allocated type; SSA bindings are used directly.
    fn gen_ident(
        &self,
        ident: &Ident,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        match scopes.lookup(&ident.name) {
            Some(Binding::Local { ptr, ty }) => {
                let llvm_ty = self.llvm_type(ty)?;
                self.builder
                    .build_load(*ptr, &ident.name)
                    .map_err(|_| Diagnostic::error_at("failed to load variable", ident.span.start))
            }
            Some(Binding::Value { value, .. }) => Ok(*value),
            None => Err(Diagnostic::error_at(
                format!("unknown identifier `{}`", ident.name),
                ident.span.start,
            )),
        }
    }

    /// Typed binary dispatch: the LHS operand's runtime type selects the
    /// integer or floating variant.
    fn gen_binary_expr(
        &self,
        bin: &BinaryExpr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        let lhs = self.gen_expr_value(&bin.lhs, function, scopes)?;
        let rhs = self.gen_expr_value(&bin.rhs, function, scopes)?;

        match (lhs, rhs) {
            (BasicValueEnum::IntValue(l), BasicValueEnum::IntValue(r)) => {
                self.gen_int_binary(bin, l, r)
            }
            (BasicValueEnum::FloatValue(l), BasicValueEnum::FloatValue(r)) => {
                self.gen_float_binary(bin, l, r)
            }
            _ => Err(Diagnostic::error_at(
                "binary operands must both be integer or both be floating point",
                bin.span.start,
            )),
        }
    }

    fn gen_int_binary(
        &self,
        bin: &BinaryExpr,
        l: IntValue<'ctx>,
        r: IntValue<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        let b = &self.builder;
        let result = match bin.op {
            BinaryOp::Add => b.build_int_add(l, r, "addtmp"),
            BinaryOp::Sub => b.build_int_sub(l, r, "subtmp"),
            BinaryOp::Mul => b.build_int_mul(l, r, "multmp"),
            BinaryOp::Div => b.build_int_signed_div(l, r, "divtmp"),
            BinaryOp::Mod => b.build_int_signed_rem(l, r, "modtmp"),
            BinaryOp::Eq => b.build_int_compare(IntPredicate::EQ, l, r, "eqtmp"),
            BinaryOp::Ne => b.build_int_compare(IntPredicate::NE, l, r, "netmp"),
            BinaryOp::Lt => b.build_int_compare(IntPredicate::SLT, l, r, "lttmp"),
            BinaryOp::Gt => b.build_int_compare(IntPredicate::SGT, l, r, "gttmp"),
            BinaryOp::Le => b.build_int_compare(IntPredicate::SLE, l, r, "letmp"),
            BinaryOp::Ge => b.build_int_compare(IntPredicate::SGE, l, r, "getmp"),
            // No short-circuit: both operands were already evaluated.
            BinaryOp::And => b.build_and(l, r, "andtmp"),
            BinaryOp::Or => b.build_or(l, r, "ortmp"),
        };
        result
            .map(Into::into)
            .map_err(|_| Diagnostic::error_at("failed to build integer operation", bin.span.start))
    }

    fn gen_float_binary(
        &self,
        bin: &BinaryExpr,
        l: FloatValue<'ctx>,
        r: FloatValue<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        let b = &self.builder;
        let result: Result<BasicValueEnum<'ctx>, _> = match bin.op {
            BinaryOp::Add => b.build_float_add(l, r, "addtmp").map(Into::into),
            BinaryOp::Sub => b.build_float_sub(l, r, "subtmp").map(Into::into),
            BinaryOp::Mul => b.build_float_mul(l, r, "multmp").map(Into::into),
            BinaryOp::Div => b.build_float_div(l, r, "divtmp").map(Into::into),
            BinaryOp::Mod => b.build_float_rem(l, r, "modtmp").map(Into::into),
            BinaryOp::Eq => b
                .build_float_compare(FloatPredicate::OEQ, l, r, "eqtmp")
                .map(Into::into),
            BinaryOp::Ne => b
                .build_float_compare(FloatPredicate::ONE, l, r, "netmp")
                .map(Into::into),
            BinaryOp::Lt => b
                .build_float_compare(FloatPredicate::OLT, l, r, "lttmp")
                .map(Into::into),
            BinaryOp::Gt => b
                .build_float_compare(FloatPredicate::OGT, l, r, "gttmp")
                .map(Into::into),
            BinaryOp::Le => b
                .build_float_compare(FloatPredicate::OLE, l, r, "letmp")
                .map(Into::into),
            BinaryOp::Ge => b
                .build_float_compare(FloatPredicate::OGE, l, r, "getmp")
                .map(Into::into),
            BinaryOp::And | BinaryOp::Or => {
                return Err(Diagnostic::error_at(
                    "logical operators require boolean operands",
                    bin.span.start,
                ))
            }
        };
        result.map_err(|_| {
            Diagnostic::error_at("failed to build floating operation", bin.span.start)
        })
    }

    fn gen_unary_expr(
        &self,
        unary: &UnaryExpr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        // Address-of never evaluates its operand; it needs the location.
        if unary.op == UnaryOp::Addr {
            let Expr::Ident(ident) = &*unary.operand else {
                return Err(Diagnostic::error_at(
                    "can only take the address of a variable",
                    unary.span.start,
                ));
            };
            return match scopes.lookup(&ident.name) {
                Some(Binding::Local { ptr, .. }) => Ok((*ptr).into()),
                Some(Binding::Value { .. }) => Err(Diagnostic::error_at(
                    format!("`{}` has no address; it is a by-value parameter", ident.name),
                    ident.span.start,
                )),
                None => Err(Diagnostic::error_at(
                    format!("unknown identifier `{}`", ident.name),
                    ident.span.start,
                )),
            };
        }

        let operand = self.gen_expr_value(&unary.operand, function, scopes)?;
        match unary.op {
            UnaryOp::Not => match operand {
                BasicValueEnum::IntValue(v) => self
                    .builder
                    .build_not(v, "nottmp")
                    .map(Into::into)
                    .map_err(|_| Diagnostic::error_at("failed to build not", unary.span.start)),
                _ => Err(Diagnostic::error_at(
                    "`!` requires an integer operand",
                    unary.span.start,
                )),
            },
            UnaryOp::Neg => match operand {
                BasicValueEnum::IntValue(v) => self
                    .builder
                    .build_int_neg(v, "negtmp")
                    .map(Into::into)
                    .map_err(|_| Diagnostic::error_at("failed to build negation", unary.span.start)),
                BasicValueEnum::FloatValue(v) => self
                    .builder
                    .build_float_neg(v, "negtmp")
                    .map(Into::into)
                    .map_err(|_| Diagnostic::error_at("failed to build negation", unary.span.start)),
                _ => Err(Diagnostic::error_at(
                    "`-` requires a numeric operand",
                    unary.span.start,
                )),
            },
            UnaryOp::Deref => {
                // The pointee type comes from the operand's declared type.
                let pointee = match self.expr_type(&unary.operand, scopes) {
                    Some(Type::Pointer(elem)) => *elem,
                    Some(_) => {
                        return Err(Diagnostic::error_at(
                            "cannot dereference a non-pointer value",
                            unary.span.start,
                        ))
                    }
                    None => {
                        return Err(Diagnostic::error_at(
                            "cannot determine the pointee type of this dereference",
                            unary.span.start,
                        ))
                    }
                };
                let BasicValueEnum::PointerValue(ptr) = operand else {
                    return Err(Diagnostic::error_at(
                        "dereference requires a pointer operand",
                        unary.span.start,
                    ));
                };
                let llvm_ty = self.llvm_type(&pointee)?;
                self.builder
                    .build_load(ptr, "dereftmp")
                    .map_err(|_| Diagnostic::error_at("failed to build load", unary.span.start))
            }
            UnaryOp::Addr => unreachable!("handled above"),
        }
    }

    /// The LHS is matched structurally: identifier, array element, struct
    /// member, or a member of an array element. The assignment's value is
    /// the RHS.
    fn gen_assign_expr(
        &self,
        assign: &AssignExpr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        let rhs = self.gen_expr_value(&assign.rhs, function, scopes)?;

        let target = match &*assign.lhs {
            Expr::Ident(ident) => match scopes.lookup(&ident.name) {
                Some(Binding::Local { ptr, .. }) => *ptr,
                Some(Binding::Value { .. }) => {
                    return Err(Diagnostic::error_at(
                        format!("cannot assign to by-value parameter `{}`", ident.name),
                        ident.span.start,
                    ))
                }
                None => {
                    return Err(Diagnostic::error_at(
                        format!("unknown identifier `{}`", ident.name),
                        ident.span.start,
                    ))
                }
            },
            Expr::Index(index) => self.array_element_ptr(index, function, scopes)?.0,
            Expr::Member(member) => self.member_ptr(member, function, scopes)?.0,
            _ => {
                return Err(Diagnostic::error_at(
                    "unsupported assignment target",
                    assign.lhs.span().start,
                ))
            }
        };

        self.builder
            .build_store(target, rhs)
            .map_err(|_| Diagnostic::error_at("failed to build store", assign.span.start))?;
        Ok(rhs)
    }

    /// Resolve the function by name, evaluate arguments left-to-right, and
    /// emit the call. Void callees produce an unnamed result.
    fn gen_call_expr(
        &self,
        call: &CallExpr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<Option<BasicValueEnum<'ctx>>> {
        let callee = self.module.get_function(&call.callee).ok_or_else(|| {
            Diagnostic::error_at(format!("unknown function `{}`", call.callee), call.span.start)
        })?;

        let mut args: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.gen_expr_value(arg, function, scopes)?.into());
        }

        let returns_void = callee.get_type().get_return_type().is_none();
        let name = if returns_void { "" } else { "calltmp" };
        let site = self
            .builder
            .build_call(callee, &args, name)
            .map_err(|_| Diagnostic::error_at("failed to build call", call.span.start))?;

        match site.try_as_basic_value().left() {
            Some(value) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    /// Member load. A by-value struct binding extracts the field from the
    /// SSA value; addressable objects go through a GEP and load.
    fn gen_member_expr(
        &self,
        member: &MemberExpr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        if let Expr::Ident(ident) = &*member.object {
            if let Some(Binding::Value { value, ty }) = scopes.lookup(&ident.name) {
                let Type::Struct(struct_name) = ty else {
                    return Err(Diagnostic::error_at(
                        format!("`{}` is not a struct", ident.name),
                        ident.span.start,
                    ));
                };
                let (index, _) = self.field_index(struct_name, &member.member)?;
                let BasicValueEnum::StructValue(agg) = *value else {
                    return Err(Diagnostic::error_at(
                        format!("`{}` is not a struct value", ident.name),
                        ident.span.start,
                    ));
                };
                return self
                    .builder
                    .build_extract_value(agg, index, &member.member)
                    .map_err(|_| {
                        Diagnostic::error_at("failed to extract field", member.span.start)
                    });
            }
        }

        let (field_ptr, field_ty) = self.member_ptr(member, function, scopes)?;
        let llvm_ty = self.llvm_type(&field_ty)?;
        self.builder
            .build_load(field_ptr, &member.member)
            .map_err(|_| Diagnostic::error_at("failed to load field", member.span.start))
    }

    /// Array element load over an identifier-bound array.
    fn gen_index_expr(
        &self,
        index: &IndexExpr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<BasicValueEnum<'ctx>> {
        let (elem_ptr, elem_ty) = self.array_element_ptr(index, function, scopes)?;
        let llvm_ty = self.llvm_type(&elem_ty)?;
        self.builder
            .build_load(elem_ptr, "arrayload")
            .map_err(|_| Diagnostic::error_at("failed to load array element", index.span.start))
    }

    /// GEP `[0, index]` into an identifier-bound array local. Returns the
    /// element pointer and the element's declared type.
    fn array_element_ptr(
        &self,
        index: &IndexExpr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<(PointerValue<'ctx>, Type)> {
        let Expr::Ident(ident) = &*index.array else {
            return Err(Diagnostic::error_at(
                "array access requires an identifier-bound array",
                index.span.start,
            ));
        };
        let (array_ptr, array_ty) = match scopes.lookup(&ident.name) {
            Some(Binding::Local { ptr, ty }) => (*ptr, ty.clone()),
            Some(Binding::Value { .. }) => {
                return Err(Diagnostic::error_at(
                    format!("`{}` is not an addressable array", ident.name),
                    ident.span.start,
                ))
            }
            None => {
                return Err(Diagnostic::error_at(
                    format!("unknown identifier `{}`", ident.name),
                    ident.span.start,
                ))
            }
        };
        let Type::Array(_, elem_ty) = &array_ty else {
            return Err(Diagnostic::error_at(
                format!("`{}` is not an array", ident.name),
                ident.span.start,
            ));
        };

        let index_value = self.gen_expr_value(&index.index, function, scopes)?;
        let BasicValueEnum::IntValue(index_value) = index_value else {
            return Err(Diagnostic::error_at(
                "array index must be an integer",
                index.index.span().start,
            ));
        };

        let array_llvm = self.llvm_type(&array_ty)?;
        let zero = self.i32_t.const_zero();
        let elem_ptr = unsafe {
            self.builder
                .build_gep(array_ptr, &[zero, index_value], "arrayidx")
        }
        .map_err(|_| Diagnostic::error_at("failed to address array element", index.span.start))?;

        Ok((elem_ptr, (**elem_ty).clone()))
    }

    /// GEP to `object.member` for addressable objects: an identifier-bound
    /// struct local, or a struct-typed element of an identifier-bound
    /// array. Returns the field pointer and the field's declared type.
    fn member_ptr(
        &self,
        member: &MemberExpr,
        function: FunctionValue<'ctx>,
        scopes: &ScopeStack<'ctx>,
    ) -> DiagnosticResult<(PointerValue<'ctx>, Type)> {
        match &*member.object {
            Expr::Ident(ident) => {
                let (object_ptr, object_ty) = match scopes.lookup(&ident.name) {
                    Some(Binding::Local { ptr, ty }) => (*ptr, ty.clone()),
                    Some(Binding::Value { .. }) => {
                        return Err(Diagnostic::error_at(
                            format!("`{}` is not addressable", ident.name),
                            ident.span.start,
                        ))
                    }
                    None => {
                        return Err(Diagnostic::error_at(
                            format!("unknown identifier `{}`", ident.name),
                            ident.span.start,
                        ))
                    }
                };
                let Type::Struct(struct_name) = &object_ty else {
                    return Err(Diagnostic::error_at(
                        format!("`{}` is not a struct", ident.name),
                        ident.span.start,
                    ));
                };
                self.struct_field_ptr(struct_name, object_ptr, &member.member, member.span.start)
            }
            Expr::Index(index) => {
                let (elem_ptr, elem_ty) = self.array_element_ptr(index, function, scopes)?;
                let Type::Struct(struct_name) = &elem_ty else {
                    return Err(Diagnostic::error_at(
                        "member access requires a struct element",
                        member.span.start,
                    ));
                };
                self.struct_field_ptr(struct_name, elem_ptr, &member.member, member.span.start)
            }
            _ => Err(Diagnostic::error_at(
                "unsupported member access target",
                member.span.start,
            )),
        }
    }

    fn struct_field_ptr(
        &self,
        struct_name: &str,
        object_ptr: PointerValue<'ctx>,
        member: &str,
        span_start: usize,
    ) -> DiagnosticResult<(PointerValue<'ctx>, Type)> {
        let (index, field_ty) = self.field_index(struct_name, member)?;
        let struct_type = self
            .struct_types
            .borrow()
            .get(struct_name)
            .copied()
            .ok_or_else(|| Diagnostic::error(format!("unknown struct type `{}`", struct_name)))?;
        let field_ptr = self
            .builder
            .build_struct_gep(object_ptr, index, member)
            .map_err(|_| Diagnostic::error_at("failed to address struct field", span_start))?;
        Ok((field_ptr, field_ty))
    }

    /// Synthesize an expression's declared Olang type. `None` when the
    /// type cannot be determined (unknown names, non-struct member bases).
    pub(crate) fn expr_type(&self, expr: &Expr, scopes: &ScopeStack<'ctx>) -> Option<Type> {
        match expr {
            Expr::Int(_) => Some(Type::I32),
            Expr::Float(_) => Some(Type::F64),
            Expr::Str(_) => Some(Type::Pointer(Box::new(Type::I8))),
            Expr::Bool(_) => Some(Type::I1),
            Expr::Ident(ident) => scopes.lookup(&ident.name).map(|b| b.ty().clone()),
            Expr::Binary(bin) => {
                if bin.op.is_comparison() || matches!(bin.op, BinaryOp::And | BinaryOp::Or) {
                    Some(Type::I1)
                } else {
                    self.expr_type(&bin.lhs, scopes)
                }
            }
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Not | UnaryOp::Neg => self.expr_type(&unary.operand, scopes),
                UnaryOp::Deref => match self.expr_type(&unary.operand, scopes)? {
                    Type::Pointer(elem) => Some(*elem),
                    _ => None,
                },
                UnaryOp::Addr => Some(Type::Pointer(Box::new(
                    self.expr_type(&unary.operand, scopes)?,
                ))),
            },
            Expr::Assign(assign) => self.expr_type(&assign.rhs, scopes),
            Expr::Call(call) => self
                .fn_sigs
                .borrow()
                .get(&call.callee)
                .map(|(_, ret)| ret.clone()),
            Expr::Member(member) => {
                let Type::Struct(struct_name) = self.expr_type(&member.object, scopes)? else {
                    return None;
                };
                self.field_index(&struct_name, &member.member)
                    .ok()
                    .map(|(_, ty)| ty)
            }
            Expr::Index(index) => match self.expr_type(&index.array, scopes)? {
                Type::Array(_, elem) => Some(*elem),
                _ => None,
            },
        }
    }
}
