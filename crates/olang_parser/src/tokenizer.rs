//! Tokenizer for Olang source code
//!
//! Produces a flat token stream over the source text. Whitespace and
//! comments are tokenized like everything else so tooling can reconstruct
//! the input; the parser filters them out with
//! [`filter_whitespace_and_comments`].

use std::ops::Range;

/// Represents a token in the Olang language
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token kind
    pub kind: TokenKind,
    /// The source span (byte range)
    pub span: Range<usize>,
    /// The actual text of the token
    pub text: String,
}

/// Token kinds in the Olang language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Struct,
    Fn,
    Extern,
    Export,
    Include,
    Let,
    Return,
    If,
    Else,
    While,
    Array,
    True,
    False,

    // Identifiers
    Ident(String),

    // Literals
    Int(i64),
    Float(f64),
    Str(String),

    // Operators
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Percent,   // %
    Eq,        // =
    EqEq,      // ==
    NotEq,     // !=
    Lt,        // <
    Gt,        // >
    LtEq,      // <=
    GtEq,      // >=
    AndAnd,    // &&
    OrOr,      // ||
    Not,       // !
    Ampersand, // &
    Arrow,     // ->

    // Punctuation
    Semicolon,    // ;
    Colon,        // :
    Comma,        // ,
    Dot,          // .
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }

    // Comments and whitespace (usually filtered out)
    LineComment(String),
    BlockComment(String),
    Whitespace,

    // Other
    Unknown,
    Eof,
}

/// Tokenize a source string into a vector of tokens
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        let pos = start;

        match ch {
            // Whitespace
            ' ' | '\t' | '\r' | '\n' => {
                let mut end = pos + ch.len_utf8();
                while let Some((next_pos, next_ch)) = chars.peek().copied() {
                    if matches!(next_ch, ' ' | '\t' | '\r' | '\n') {
                        chars.next();
                        end = next_pos + next_ch.len_utf8();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Whitespace,
                    span: pos..end,
                    text: source[pos..end].to_string(),
                });
            }

            // Line comment
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                chars.next(); // consume second '/'
                let mut end = pos + 2;
                let mut comment = String::new();
                for (next_pos, next_ch) in chars.by_ref() {
                    end = next_pos + next_ch.len_utf8();
                    if next_ch == '\n' {
                        break;
                    }
                    comment.push(next_ch);
                }
                tokens.push(Token {
                    kind: TokenKind::LineComment(comment),
                    span: pos..end,
                    text: source[pos..end].to_string(),
                });
            }

            // Block comment
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next(); // consume '*'
                let mut end = pos + 2;
                let mut comment = String::new();
                let mut prev = '/';
                for (next_pos, next_ch) in chars.by_ref() {
                    end = next_pos + next_ch.len_utf8();
                    if prev == '*' && next_ch == '/' {
                        comment.pop();
                        break;
                    }
                    comment.push(next_ch);
                    prev = next_ch;
                }
                tokens.push(Token {
                    kind: TokenKind::BlockComment(comment),
                    span: pos..end,
                    text: source[pos..end].to_string(),
                });
            }

            // String literals
            '"' => {
                let mut end = pos + 1;
                let mut value = String::new();
                let mut escaped = false;

                for (next_pos, next_ch) in chars.by_ref() {
                    end = next_pos + next_ch.len_utf8();
                    if escaped {
                        value.push(match next_ch {
                            'n' => '\n',
                            't' => '\t',
                            '0' => '\0',
                            other => other,
                        });
                        escaped = false;
                    } else if next_ch == '\\' {
                        escaped = true;
                    } else if next_ch == '"' {
                        break;
                    } else {
                        value.push(next_ch);
                    }
                }

                tokens.push(Token {
                    kind: TokenKind::Str(value),
                    span: pos..end,
                    text: source[pos..end].to_string(),
                });
            }

            // Numbers
            '0'..='9' => {
                let mut end = pos + ch.len_utf8();
                let mut num_str = String::from(ch);
                let mut has_dot = false;

                while let Some((next_pos, next_ch)) = chars.peek().copied() {
                    match next_ch {
                        '0'..='9' => {
                            chars.next();
                            end = next_pos + next_ch.len_utf8();
                            num_str.push(next_ch);
                        }
                        '.' if !has_dot => {
                            chars.next();
                            end = next_pos + 1;
                            num_str.push('.');
                            has_dot = true;
                        }
                        _ => break,
                    }
                }

                let kind = if has_dot {
                    TokenKind::Float(num_str.parse::<f64>().unwrap_or(0.0))
                } else {
                    TokenKind::Int(num_str.parse::<i64>().unwrap_or(0))
                };
                tokens.push(Token {
                    kind,
                    span: pos..end,
                    text: num_str,
                });
            }

            '+' => {
                tokens.push(Token {
                    kind: TokenKind::Plus,
                    span: pos..pos + 1,
                    text: "+".to_string(),
                });
            }

            '-' => {
                if matches!(chars.peek(), Some((_, '>'))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::Arrow,
                        span: pos..pos + 2,
                        text: "->".to_string(),
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Minus,
                        span: pos..pos + 1,
                        text: "-".to_string(),
                    });
                }
            }

            '*' => {
                tokens.push(Token {
                    kind: TokenKind::Star,
                    span: pos..pos + 1,
                    text: "*".to_string(),
                });
            }

            '/' => {
                tokens.push(Token {
                    kind: TokenKind::Slash,
                    span: pos..pos + 1,
                    text: "/".to_string(),
                });
            }

            '%' => {
                tokens.push(Token {
                    kind: TokenKind::Percent,
                    span: pos..pos + 1,
                    text: "%".to_string(),
                });
            }

            '=' => {
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::EqEq,
                        span: pos..pos + 2,
                        text: "==".to_string(),
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Eq,
                        span: pos..pos + 1,
                        text: "=".to_string(),
                    });
                }
            }

            '!' => {
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::NotEq,
                        span: pos..pos + 2,
                        text: "!=".to_string(),
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Not,
                        span: pos..pos + 1,
                        text: "!".to_string(),
                    });
                }
            }

            '<' => {
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::LtEq,
                        span: pos..pos + 2,
                        text: "<=".to_string(),
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Lt,
                        span: pos..pos + 1,
                        text: "<".to_string(),
                    });
                }
            }

            '>' => {
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::GtEq,
                        span: pos..pos + 2,
                        text: ">=".to_string(),
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Gt,
                        span: pos..pos + 1,
                        text: ">".to_string(),
                    });
                }
            }

            '&' => {
                if matches!(chars.peek(), Some((_, '&'))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::AndAnd,
                        span: pos..pos + 2,
                        text: "&&".to_string(),
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Ampersand,
                        span: pos..pos + 1,
                        text: "&".to_string(),
                    });
                }
            }

            '|' => {
                if matches!(chars.peek(), Some((_, '|'))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::OrOr,
                        span: pos..pos + 2,
                        text: "||".to_string(),
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Unknown,
                        span: pos..pos + 1,
                        text: "|".to_string(),
                    });
                }
            }

            ';' => {
                tokens.push(Token {
                    kind: TokenKind::Semicolon,
                    span: pos..pos + 1,
                    text: ";".to_string(),
                });
            }

            ':' => {
                tokens.push(Token {
                    kind: TokenKind::Colon,
                    span: pos..pos + 1,
                    text: ":".to_string(),
                });
            }

            ',' => {
                tokens.push(Token {
                    kind: TokenKind::Comma,
                    span: pos..pos + 1,
                    text: ",".to_string(),
                });
            }

            '.' => {
                tokens.push(Token {
                    kind: TokenKind::Dot,
                    span: pos..pos + 1,
                    text: ".".to_string(),
                });
            }

            '(' => {
                tokens.push(Token {
                    kind: TokenKind::LeftParen,
                    span: pos..pos + 1,
                    text: "(".to_string(),
                });
            }

            ')' => {
                tokens.push(Token {
                    kind: TokenKind::RightParen,
                    span: pos..pos + 1,
                    text: ")".to_string(),
                });
            }

            '[' => {
                tokens.push(Token {
                    kind: TokenKind::LeftBracket,
                    span: pos..pos + 1,
                    text: "[".to_string(),
                });
            }

            ']' => {
                tokens.push(Token {
                    kind: TokenKind::RightBracket,
                    span: pos..pos + 1,
                    text: "]".to_string(),
                });
            }

            '{' => {
                tokens.push(Token {
                    kind: TokenKind::LeftBrace,
                    span: pos..pos + 1,
                    text: "{".to_string(),
                });
            }

            '}' => {
                tokens.push(Token {
                    kind: TokenKind::RightBrace,
                    span: pos..pos + 1,
                    text: "}".to_string(),
                });
            }

            // Identifiers and keywords
            c if c.is_alphabetic() || c == '_' => {
                let mut end = pos + c.len_utf8();
                let mut ident = String::from(c);

                while let Some((next_pos, next_ch)) = chars.peek().copied() {
                    if next_ch.is_alphanumeric() || next_ch == '_' {
                        chars.next();
                        end = next_pos + next_ch.len_utf8();
                        ident.push(next_ch);
                    } else {
                        break;
                    }
                }

                let kind = match ident.as_str() {
                    "struct" => TokenKind::Struct,
                    "fn" => TokenKind::Fn,
                    "extern" => TokenKind::Extern,
                    "export" => TokenKind::Export,
                    "include" => TokenKind::Include,
                    "let" => TokenKind::Let,
                    "return" => TokenKind::Return,
                    "if" => TokenKind::If,
                    "else" => TokenKind::Else,
                    "while" => TokenKind::While,
                    "array" => TokenKind::Array,
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    _ => TokenKind::Ident(ident.clone()),
                };

                tokens.push(Token {
                    kind,
                    span: pos..end,
                    text: ident,
                });
            }

            _ => {
                tokens.push(Token {
                    kind: TokenKind::Unknown,
                    span: pos..pos + ch.len_utf8(),
                    text: ch.to_string(),
                });
            }
        }
    }

    // Add EOF token
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: source.len()..source.len(),
        text: String::new(),
    });

    tokens
}

/// Filter out whitespace and comments from a token stream
pub fn filter_whitespace_and_comments(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|t| {
            !matches!(
                t.kind,
                TokenKind::Whitespace | TokenKind::LineComment(_) | TokenKind::BlockComment(_)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        filter_whitespace_and_comments(tokenize(src))
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_function_header() {
        let ks = kinds("export fn add(a: i32) -> i32 {}");
        assert_eq!(ks[0], TokenKind::Export);
        assert_eq!(ks[1], TokenKind::Fn);
        assert_eq!(ks[2], TokenKind::Ident("add".to_string()));
        assert!(ks.contains(&TokenKind::Arrow));
    }

    #[test]
    fn distinguishes_int_and_float_literals() {
        assert_eq!(kinds("42")[0], TokenKind::Int(42));
        assert_eq!(kinds("3.5")[0], TokenKind::Float(3.5));
    }

    #[test]
    fn resolves_string_escapes() {
        let ks = kinds(r#""hi\n""#);
        assert_eq!(ks[0], TokenKind::Str("hi\n".to_string()));
    }

    #[test]
    fn two_char_operators_win_over_one_char() {
        let ks = kinds("a <= b && c != d");
        assert!(ks.contains(&TokenKind::LtEq));
        assert!(ks.contains(&TokenKind::AndAnd));
        assert!(ks.contains(&TokenKind::NotEq));
        assert!(!ks.contains(&TokenKind::Lt));
    }

    #[test]
    fn comments_are_filtered() {
        let ks = kinds("let // trailing\n/* block */ x");
        assert_eq!(ks[0], TokenKind::Let);
        assert_eq!(ks[1], TokenKind::Ident("x".to_string()));
    }

    #[test]
    fn spans_are_byte_ranges() {
        let toks = tokenize("ab cd");
        assert_eq!(toks[0].span, 0..2);
        assert_eq!(toks[2].span, 3..5);
    }
}
