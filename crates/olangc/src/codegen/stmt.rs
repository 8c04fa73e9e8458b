//! Statement lowering.
//!
//! Control flow stitches basic blocks with terminator-aware branching:
//! after lowering an arm or a loop body, a branch is added only when the
//! current insertion block has not already been terminated by inner control
//! flow (a nested `return`).

use inkwell::values::FunctionValue;

use olang_ast::{IfStmt, LetStmt, ReturnStmt, Stmt, WhileStmt};

use crate::codegen::{Binding, CodeGen, ScopeStack};
use crate::diagnostics::{Diagnostic, DiagnosticResult};

impl<'ctx> CodeGen<'ctx> {
    pub(crate) fn gen_stmt(
        &self,
        stmt: &Stmt,
        function: FunctionValue<'ctx>,
        scopes: &mut ScopeStack<'ctx>,
    ) -> DiagnosticResult<()> {
        match stmt {
            Stmt::Let(let_stmt) => self.gen_let_stmt(let_stmt, function, scopes),
            Stmt::Return(ret) => self.gen_return_stmt(ret, function, scopes),
            Stmt::Expr(expr_stmt) => {
                // Evaluate and discard.
                self.gen_expr(&expr_stmt.expr, function, scopes)?;
                Ok(())
            }
            Stmt::If(if_stmt) => self.gen_if_stmt(if_stmt, function, scopes),
            Stmt::While(while_stmt) => self.gen_while_stmt(while_stmt, function, scopes),
        }
    }

    /// `let name: T = expr;` — storage is always an entry-block alloca.
    /// Aggregates are zero-initialized and the initializer expression is
    /// ignored; scalars store the evaluated initializer.
    fn gen_let_stmt(
        &self,
        let_stmt: &LetStmt,
        function: FunctionValue<'ctx>,
        scopes: &mut ScopeStack<'ctx>,
    ) -> DiagnosticResult<()> {
        let llvm_ty = self.llvm_type(&let_stmt.ty)?;
        let slot = self.create_entry_alloca(function, &let_stmt.name, llvm_ty)?;

        if let_stmt.ty.is_aggregate() {
            let zero = self.const_zero(llvm_ty);
            self.builder
                .build_store(slot, zero)
                .map_err(|_| Diagnostic::error("failed to store zero-initializer"))?;
        } else {
            let value = self.gen_expr_value(&let_stmt.init, function, scopes)?;
            self.builder
                .build_store(slot, value)
                .map_err(|_| Diagnostic::error("failed to store initializer"))?;
        }

        scopes.insert(
            let_stmt.name.clone(),
            Binding::Local {
                ptr: slot,
                ty: let_stmt.ty.clone(),
            },
        );
        Ok(())
    }

    fn gen_return_stmt(
        &self,
        ret: &ReturnStmt,
        function: FunctionValue<'ctx>,
        scopes: &mut ScopeStack<'ctx>,
    ) -> DiagnosticResult<()> {
        match &ret.expr {
            Some(expr) => {
                let value = self.gen_expr_value(expr, function, scopes)?;
                self.builder
                    .build_return(Some(&value))
                    .map_err(|_| Diagnostic::error("failed to build return"))?;
            }
            None => {
                self.builder
                    .build_return(None)
                    .map_err(|_| Diagnostic::error("failed to build return"))?;
            }
        }
        Ok(())
    }

    /// `if cond { … } else { … }` — the merge block is kept only when at
    /// least one arm branches to it.
    fn gen_if_stmt(
        &self,
        if_stmt: &IfStmt,
        function: FunctionValue<'ctx>,
        scopes: &mut ScopeStack<'ctx>,
    ) -> DiagnosticResult<()> {
        let cond = self.gen_expr_value(&if_stmt.cond, function, scopes)?;
        let inkwell::values::BasicValueEnum::IntValue(cond) = cond else {
            return Err(Diagnostic::error_at(
                "if condition must be a boolean value",
                if_stmt.cond.span().start,
            ));
        };

        let then_bb = self.context.append_basic_block(function, "if.then");
        let else_bb = self.context.append_basic_block(function, "if.else");
        let merge_bb = self.context.append_basic_block(function, "if.merge");

        self.builder
            .build_conditional_branch(cond, then_bb, else_bb)
            .map_err(|_| Diagnostic::error("failed to build conditional branch"))?;

        // Then arm, in a fresh scope.
        self.builder.position_at_end(then_bb);
        scopes.scoped(|scopes| -> DiagnosticResult<()> {
            for stmt in &if_stmt.then_body {
                self.gen_stmt(stmt, function, scopes)?;
            }
            Ok(())
        })?;
        if self.current_block_unterminated() {
            self.builder
                .build_unconditional_branch(merge_bb)
                .map_err(|_| Diagnostic::error("failed to branch to merge block"))?;
        }

        // Else arm; an absent else is an empty block falling through.
        self.builder.position_at_end(else_bb);
        scopes.scoped(|scopes| -> DiagnosticResult<()> {
            for stmt in &if_stmt.else_body {
                self.gen_stmt(stmt, function, scopes)?;
            }
            Ok(())
        })?;
        if self.current_block_unterminated() {
            self.builder
                .build_unconditional_branch(merge_bb)
                .map_err(|_| Diagnostic::error("failed to branch to merge block"))?;
        }

        // Keep the merge block only if some arm reaches it.
        if merge_bb.get_first_use().is_some() {
            self.builder.position_at_end(merge_bb);
        } else {
            merge_bb.remove_from_function().ok();
        }
        Ok(())
    }

    /// `while cond { … }` — insertion ends at the `end` block whether or
    /// not the body can fall through.
    fn gen_while_stmt(
        &self,
        while_stmt: &WhileStmt,
        function: FunctionValue<'ctx>,
        scopes: &mut ScopeStack<'ctx>,
    ) -> DiagnosticResult<()> {
        let cond_bb = self.context.append_basic_block(function, "while.cond");
        let body_bb = self.context.append_basic_block(function, "while.body");
        let end_bb = self.context.append_basic_block(function, "while.end");

        self.builder
            .build_unconditional_branch(cond_bb)
            .map_err(|_| Diagnostic::error("failed to branch to loop condition"))?;

        self.builder.position_at_end(cond_bb);
        let cond = self.gen_expr_value(&while_stmt.cond, function, scopes)?;
        let inkwell::values::BasicValueEnum::IntValue(cond) = cond else {
            return Err(Diagnostic::error_at(
                "while condition must be a boolean value",
                while_stmt.cond.span().start,
            ));
        };
        self.builder
            .build_conditional_branch(cond, body_bb, end_bb)
            .map_err(|_| Diagnostic::error("failed to build conditional branch"))?;

        self.builder.position_at_end(body_bb);
        scopes.scoped(|scopes| -> DiagnosticResult<()> {
            for stmt in &while_stmt.body {
                self.gen_stmt(stmt, function, scopes)?;
            }
            Ok(())
        })?;
        if self.current_block_unterminated() {
            self.builder
                .build_unconditional_branch(cond_bb)
                .map_err(|_| Diagnostic::error("failed to branch back to loop condition"))?;
        }

        self.builder.position_at_end(end_bb);
        Ok(())
    }

    fn current_block_unterminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .map(|b| b.get_terminator().is_none())
            .unwrap_or(false)
    }
}
