//! Statement parsers.

use olang_ast::*;

use crate::{ParseError, Parser, TokenKind};

impl Parser {
    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LeftBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.eat(&TokenKind::RightBrace) {
            if self.at_eof() {
                return Err(self.error_here("unterminated block".to_string()));
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            TokenKind::Let => self.parse_let_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            _ => {
                let expr = self.parse_expr()?;
                let start = expr.span().start;
                self.expect(TokenKind::Semicolon, "`;`")?;
                let span = start..self.previous_end(start);
                Ok(Stmt::Expr(ExprStmt { expr, span }))
            }
        }
    }

    /// `let name: t = expr;`
    fn parse_let_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span.start; // `let`
        let (name, _) = self.expect_ident("variable name")?;
        self.expect(TokenKind::Colon, "`:`")?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Eq, "`=`")?;
        let init = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        let span = start..self.previous_end(start);
        Ok(Stmt::Let(LetStmt {
            ty,
            name,
            init,
            span,
        }))
    }

    /// `return expr?;`
    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span.start; // `return`
        let expr = if self.eat(&TokenKind::Semicolon) {
            None
        } else {
            let e = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "`;`")?;
            Some(e)
        };
        let span = start..self.previous_end(start);
        Ok(Stmt::Return(ReturnStmt { expr, span }))
    }

    /// `if expr { … } [else { … }]`
    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span.start; // `if`
        let cond = self.parse_expr()?;
        let then_body = self.parse_block()?;
        let else_body = if self.eat(&TokenKind::Else) {
            self.parse_block()?
        } else {
            Vec::new()
        };
        let span = start..self.previous_end(start);
        Ok(Stmt::If(IfStmt {
            cond,
            then_body,
            else_body,
            span,
        }))
    }

    /// `while expr { … }`
    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span.start; // `while`
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        let span = start..self.previous_end(start);
        Ok(Stmt::While(WhileStmt { cond, body, span }))
    }
}
