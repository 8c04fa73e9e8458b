//! Type-specifier parsing.
//!
//! Basic types are matched by name; `*T` nests left-to-right in source
//! order, and `array[N] T` takes its length from the literal integer in
//! the grammar.

use olang_ast::Type;

use crate::{ParseError, Parser, TokenKind};

impl Parser {
    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Star => {
                self.advance();
                let elem = self.parse_type()?;
                Ok(Type::Pointer(Box::new(elem)))
            }
            TokenKind::Array => {
                self.advance();
                self.expect(TokenKind::LeftBracket, "`[`")?;
                let len = match self.peek_kind().clone() {
                    TokenKind::Int(n) if n >= 0 => {
                        self.advance();
                        n as u32
                    }
                    TokenKind::Int(_) => {
                        return Err(
                            self.error_here("array length must be non-negative".to_string())
                        )
                    }
                    _ => return Err(self.error_here("expected array length".to_string())),
                };
                self.expect(TokenKind::RightBracket, "`]`")?;
                let elem = self.parse_type()?;
                Ok(Type::Array(len, Box::new(elem)))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(match name.as_str() {
                    "i1" => Type::I1,
                    "i8" => Type::I8,
                    "i16" => Type::I16,
                    "i32" => Type::I32,
                    "i64" => Type::I64,
                    "f16" => Type::F16,
                    "f32" => Type::F32,
                    "f64" => Type::F64,
                    _ => Type::Struct(name),
                })
            }
            _ => Err(self.error_here(format!(
                "expected type, found `{}`",
                self.peek().text
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{filter_whitespace_and_comments, tokenize};

    fn parse(src: &str) -> Result<Type, ParseError> {
        Parser::new(filter_whitespace_and_comments(tokenize(src))).parse_type()
    }

    #[test]
    fn basic_types_by_name() {
        assert_eq!(parse("i1").unwrap(), Type::I1);
        assert_eq!(parse("i64").unwrap(), Type::I64);
        assert_eq!(parse("f16").unwrap(), Type::F16);
    }

    #[test]
    fn pointers_nest_left_to_right() {
        assert_eq!(
            parse("**i32").unwrap(),
            Type::Pointer(Box::new(Type::Pointer(Box::new(Type::I32))))
        );
    }

    #[test]
    fn array_length_from_literal() {
        assert_eq!(
            parse("array[3] i32").unwrap(),
            Type::Array(3, Box::new(Type::I32))
        );
        // Zero-length arrays are accepted.
        assert_eq!(
            parse("array[0] i8").unwrap(),
            Type::Array(0, Box::new(Type::I8))
        );
    }

    #[test]
    fn array_of_structs() {
        assert_eq!(
            parse("array[2] P").unwrap(),
            Type::Array(2, Box::new(Type::Struct("P".to_string())))
        );
    }

    #[test]
    fn unknown_name_is_a_struct_reference() {
        assert_eq!(parse("Point").unwrap(), Type::Struct("Point".to_string()));
    }
}
