//! Expression parsers with operator precedence.
//!
//! Precedence, low to high: assignment (right-associative), `||`, `&&`,
//! equality, relational, additive, multiplicative, unary, postfix. Runs of
//! the same level fold into left-leaning trees: `a + b + c` becomes
//! `((a + b) + c)`.

use olang_ast::*;

use crate::{ParseError, Parser, TokenKind};

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// `lhs = rhs` — the only right-associative level.
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_logical_or()?;
        if self.eat(&TokenKind::Eq) {
            let rhs = self.parse_assignment()?;
            let span = lhs.span().start..rhs.span().end;
            return Ok(Expr::Assign(AssignExpr {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            }));
        }
        Ok(lhs)
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_logical_and()?;
        while self.eat(&TokenKind::OrOr) {
            let rhs = self.parse_logical_and()?;
            lhs = fold_binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let rhs = self.parse_equality()?;
            lhs = fold_binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_relational()?;
            lhs = fold_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::Le,
                TokenKind::GtEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = fold_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = fold_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = fold_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// `! - * &` prefix operators, nesting right.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Ampersand => Some(UnaryOp::Addr),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.advance().span.start;
            let operand = self.parse_unary()?;
            let span = start..operand.span().end;
            return Ok(Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
                span,
            }));
        }
        self.parse_postfix()
    }

    /// Call, member access, and array indexing, applied left to right.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut node = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LeftParen => {
                    // Callees are plain names; anything else is a parse error.
                    let Expr::Ident(ident) = node else {
                        return Err(
                            self.error_here("only named functions can be called".to_string())
                        );
                    };
                    self.advance();
                    let mut args = Vec::new();
                    if !self.eat(&TokenKind::RightParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if self.eat(&TokenKind::Comma) {
                                continue;
                            }
                            self.expect(TokenKind::RightParen, "`)`")?;
                            break;
                        }
                    }
                    let span = ident.span.start..self.previous_end(ident.span.start);
                    node = Expr::Call(CallExpr {
                        callee: ident.name,
                        args,
                        span,
                    });
                }
                TokenKind::Dot => {
                    self.advance();
                    let (member, member_span) = self.expect_ident("member name")?;
                    let span = node.span().start..member_span.end;
                    node = Expr::Member(MemberExpr {
                        object: Box::new(node),
                        member,
                        span,
                    });
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RightBracket, "`]`")?;
                    let span = node.span().start..self.previous_end(node.span().start);
                    node = Expr::Index(IndexExpr {
                        array: Box::new(node),
                        index: Box::new(index),
                        span,
                    });
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Int(value) => {
                let tok = self.advance();
                Ok(Expr::Int(IntLit {
                    value,
                    span: tok.span,
                }))
            }
            TokenKind::Float(value) => {
                let tok = self.advance();
                Ok(Expr::Float(FloatLit {
                    value,
                    span: tok.span,
                }))
            }
            TokenKind::Str(value) => {
                let tok = self.advance();
                Ok(Expr::Str(StrLit {
                    value,
                    span: tok.span,
                }))
            }
            TokenKind::True => {
                let tok = self.advance();
                Ok(Expr::Bool(BoolLit {
                    value: true,
                    span: tok.span,
                }))
            }
            TokenKind::False => {
                let tok = self.advance();
                Ok(Expr::Bool(BoolLit {
                    value: false,
                    span: tok.span,
                }))
            }
            TokenKind::Ident(name) => {
                let tok = self.advance();
                Ok(Expr::Ident(Ident {
                    name,
                    span: tok.span,
                }))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(self.error_here(format!(
                "expected expression, found `{}`",
                self.peek().text
            ))),
        }
    }
}

fn fold_binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = lhs.span().start..rhs.span().end;
    Expr::Binary(BinaryExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{filter_whitespace_and_comments, tokenize};

    fn parse(src: &str) -> Expr {
        Parser::new(filter_whitespace_and_comments(tokenize(src)))
            .parse_expr()
            .expect("parse failed")
    }

    #[test]
    fn additive_chains_fold_left() {
        // a + b + c => ((a + b) + c)
        let Expr::Binary(outer) = parse("a + b + c") else {
            panic!("expected binary");
        };
        assert_eq!(outer.op, BinaryOp::Add);
        let Expr::Binary(inner) = *outer.lhs else {
            panic!("expected nested binary on the left");
        };
        assert_eq!(inner.op, BinaryOp::Add);
        assert!(matches!(*outer.rhs, Expr::Ident(_)));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let Expr::Binary(outer) = parse("a + b * c") else {
            panic!("expected binary");
        };
        assert_eq!(outer.op, BinaryOp::Add);
        let Expr::Binary(rhs) = *outer.rhs else {
            panic!("expected binary rhs");
        };
        assert_eq!(rhs.op, BinaryOp::Mul);
    }

    #[test]
    fn assignment_is_right_associative() {
        let Expr::Assign(outer) = parse("a = b = c") else {
            panic!("expected assignment");
        };
        assert!(matches!(*outer.lhs, Expr::Ident(_)));
        assert!(matches!(*outer.rhs, Expr::Assign(_)));
    }

    #[test]
    fn comparison_binds_tighter_than_logic() {
        let Expr::Binary(outer) = parse("a < b && c > d") else {
            panic!("expected binary");
        };
        assert_eq!(outer.op, BinaryOp::And);
        let Expr::Binary(lhs) = *outer.lhs else {
            panic!("expected comparison lhs");
        };
        assert_eq!(lhs.op, BinaryOp::Lt);
    }

    #[test]
    fn unary_operators_nest() {
        let Expr::Unary(outer) = parse("-*p") else {
            panic!("expected unary");
        };
        assert_eq!(outer.op, UnaryOp::Neg);
        let Expr::Unary(inner) = *outer.operand else {
            panic!("expected nested unary");
        };
        assert_eq!(inner.op, UnaryOp::Deref);
    }

    #[test]
    fn postfix_chains_compose() {
        // points[i].x
        let Expr::Member(member) = parse("points[i].x") else {
            panic!("expected member access");
        };
        assert_eq!(member.member, "x");
        assert!(matches!(*member.object, Expr::Index(_)));
    }

    #[test]
    fn call_arguments_in_order() {
        let Expr::Call(call) = parse("f(1, x, 2 + 3)") else {
            panic!("expected call");
        };
        assert_eq!(call.callee, "f");
        assert_eq!(call.args.len(), 3);
        assert!(matches!(call.args[0], Expr::Int(_)));
        assert!(matches!(call.args[2], Expr::Binary(_)));
    }

    #[test]
    fn parenthesized_expression_overrides_precedence() {
        let Expr::Binary(outer) = parse("(a + b) * c") else {
            panic!("expected binary");
        };
        assert_eq!(outer.op, BinaryOp::Mul);
        assert!(matches!(*outer.lhs, Expr::Binary(_)));
    }
}
