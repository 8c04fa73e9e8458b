//! Olang Parser
//!
//! This crate implements the front end for the Olang language: a
//! hand-written tokenizer ([`tokenizer`]) and a recursive-descent parser
//! that folds the token stream into an `olang_ast::Program`.
//!
//! Binary operator chains are folded into left-leaning trees; only
//! assignment associates to the right. `include` directives surviving in
//! the token stream are skipped — the preprocessor has already consumed
//! them upstream.

use std::fmt;

use olang_ast::*;

pub mod tokenizer;

mod expr;
mod stmt;
mod types;

pub use tokenizer::{filter_whitespace_and_comments, tokenize, Token, TokenKind};

/// A parse failure with the byte span of the offending token.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse a source string into an Olang AST `Program`.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = filter_whitespace_and_comments(tokenize(source));
    Parser::new(tokens).parse_program()
}

/// Token-cursor parser. One token of lookahead is enough for the whole
/// grammar.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub(crate) fn peek(&self) -> &Token {
        // tokenize() always appends Eof, so the last token is a safe floor.
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream has Eof"))
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Consume the next token if it matches `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.peek_kind() == &kind {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("expected {}, found `{}`", what, self.describe_peek())))
        }
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let tok = self.advance();
                Ok((name, tok.span))
            }
            _ => Err(self.error_here(format!(
                "expected {}, found `{}`",
                what,
                self.describe_peek()
            ))),
        }
    }

    pub(crate) fn error_here(&self, message: String) -> ParseError {
        ParseError {
            message,
            span: self.peek().span.clone(),
        }
    }

    fn describe_peek(&self) -> String {
        let tok = self.peek();
        if tok.text.is_empty() {
            "end of input".to_string()
        } else {
            tok.text.clone()
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut decls = Vec::new();
        while !self.at_eof() {
            match self.peek_kind() {
                // Includes are resolved by the preprocessor; tolerate any
                // that survive (unterminated directives pass through).
                TokenKind::Include => {
                    self.skip_include()?;
                }
                TokenKind::Struct => decls.push(Decl::Struct(self.parse_struct_decl()?)),
                TokenKind::Export | TokenKind::Fn => {
                    decls.push(Decl::Function(self.parse_function_decl()?))
                }
                TokenKind::Extern => decls.push(Decl::Extern(self.parse_extern_decl()?)),
                _ => {
                    return Err(self.error_here(format!(
                        "expected declaration, found `{}`",
                        self.describe_peek()
                    )))
                }
            }
        }
        Ok(Program { decls })
    }

    fn skip_include(&mut self) -> Result<(), ParseError> {
        self.advance(); // `include`
        match self.peek_kind() {
            TokenKind::Str(_) => {
                self.advance();
                self.eat(&TokenKind::Semicolon);
                Ok(())
            }
            _ => Err(self.error_here("expected path string after `include`".to_string())),
        }
    }

    /// `struct Name { field: type; … }`
    fn parse_struct_decl(&mut self) -> Result<StructDecl, ParseError> {
        let start = self.advance().span.start; // `struct`
        let (name, _) = self.expect_ident("struct name")?;
        self.expect(TokenKind::LeftBrace, "`{`")?;

        let mut fields = Vec::new();
        while !self.eat(&TokenKind::RightBrace) {
            if self.at_eof() {
                return Err(self.error_here("unterminated struct declaration".to_string()));
            }
            let (field_name, _) = self.expect_ident("field name")?;
            self.expect(TokenKind::Colon, "`:`")?;
            let ty = self.parse_type()?;
            self.expect(TokenKind::Semicolon, "`;`")?;
            fields.push(Field { ty, name: field_name });
        }

        let end = self.previous_end(start);
        Ok(StructDecl {
            name,
            fields,
            span: start..end,
        })
    }

    /// `[export] fn name(p: t, …) [-> t] { stmts }`
    fn parse_function_decl(&mut self) -> Result<FunctionDecl, ParseError> {
        let start = self.peek().span.start;
        let is_export = self.eat(&TokenKind::Export);
        self.expect(TokenKind::Fn, "`fn`")?;
        let (name, _) = self.expect_ident("function name")?;
        let params = self.parse_params()?;
        let return_type = if self.eat(&TokenKind::Arrow) {
            self.parse_type()?
        } else {
            Type::Void
        };
        let body = self.parse_block()?;
        let end = self.previous_end(start);
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
            is_export,
            span: start..end,
        })
    }

    /// `extern fn name(p: t, …) [-> t];`
    fn parse_extern_decl(&mut self) -> Result<ExternDecl, ParseError> {
        let start = self.advance().span.start; // `extern`
        self.expect(TokenKind::Fn, "`fn`")?;
        let (name, _) = self.expect_ident("function name")?;
        let params = self.parse_params()?;
        let return_type = if self.eat(&TokenKind::Arrow) {
            self.parse_type()?
        } else {
            Type::Void
        };
        self.expect(TokenKind::Semicolon, "`;`")?;
        let end = self.previous_end(start);
        Ok(ExternDecl {
            name,
            params,
            return_type,
            span: start..end,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(TokenKind::LeftParen, "`(`")?;
        let mut params = Vec::new();
        if self.eat(&TokenKind::RightParen) {
            return Ok(params);
        }
        loop {
            let (name, _) = self.expect_ident("parameter name")?;
            self.expect(TokenKind::Colon, "`:`")?;
            let ty = self.parse_type()?;
            params.push(Param { ty, name });
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RightParen, "`)`")?;
            break;
        }
        Ok(params)
    }

    /// End offset of the most recently consumed token.
    pub(crate) fn previous_end(&self, fallback: usize) -> usize {
        if self.pos == 0 {
            fallback
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }
}
