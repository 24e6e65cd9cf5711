use std::iter::Peekable;
use std::str::Chars;

use super::token::{Token, TokenKind};
use crate::error::ParseError;

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl Lexer<'_> {
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, out: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
    }

    fn string(&mut self, line: usize, column: usize) -> Result<String, ParseError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => value.push(other),
                    None => break,
                },
                Some('\n') | None => break,
                Some(c) => value.push(c),
            }
        }
        Err(ParseError::at("Unterminated string literal", line, column))
    }
}

/// Split schema source into tokens
///
/// Newlines are kept as tokens because fields end at the end of their line.
///
/// # Errors
///
/// Returns a [`ParseError`] for unterminated strings and characters outside
/// the grammar.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        chars: source.chars().peekable(),
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();

    while let Some(&c) = lexer.chars.peek() {
        let (line, column) = (lexer.line, lexer.column);
        let kind = match c {
            '\n' => {
                lexer.bump();
                TokenKind::Newline
            }
            c if c.is_whitespace() => {
                lexer.bump();
                continue;
            }
            '/' => {
                lexer.bump();
                if lexer.chars.peek() != Some(&'/') {
                    return Err(ParseError::at("Unexpected character '/'", line, column));
                }
                let mut text = String::from("/");
                lexer.take_while(&mut text, |c| c != '\n');
                TokenKind::Comment(text.trim_end().to_string())
            }
            '"' => {
                lexer.bump();
                TokenKind::Str(lexer.string(line, column)?)
            }
            '@' => {
                lexer.bump();
                if lexer.chars.peek() == Some(&'@') {
                    lexer.bump();
                    TokenKind::AtAt
                } else {
                    TokenKind::At
                }
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut text = String::new();
                if c == '-' {
                    text.push(c);
                    lexer.bump();
                }
                lexer.take_while(&mut text, |c| c.is_ascii_digit() || c == '.');
                if text == "-" {
                    return Err(ParseError::at("Unexpected character '-'", line, column));
                }
                TokenKind::Number(text)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut text = String::new();
                lexer.take_while(&mut text, |c| c.is_alphanumeric() || c == '_');
                TokenKind::Ident(text)
            }
            _ => {
                lexer.bump();
                match c {
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    '=' => TokenKind::Equals,
                    '?' => TokenKind::Question,
                    '.' => TokenKind::Dot,
                    other => {
                        return Err(ParseError::at(
                            format!("Unexpected character '{other}'"),
                            line,
                            column,
                        ))
                    }
                }
            }
        };
        tokens.push(Token { kind, line, column });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line: lexer.line,
        column: lexer.column,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_field_line() {
        assert_eq!(
            kinds("id Int @id @default(autoincrement())"),
            vec![
                TokenKind::Ident("id".into()),
                TokenKind::Ident("Int".into()),
                TokenKind::At,
                TokenKind::Ident("id".into()),
                TokenKind::At,
                TokenKind::Ident("default".into()),
                TokenKind::LParen,
                TokenKind::Ident("autoincrement".into()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_block_attribute_and_comment() {
        assert_eq!(
            kinds("@@map(\"users\") /// doc\n"),
            vec![
                TokenKind::AtAt,
                TokenKind::Ident("map".into()),
                TokenKind::LParen,
                TokenKind::Str("users".into()),
                TokenKind::RParen,
                TokenKind::Comment("/// doc".into()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\c""#),
            vec![TokenKind::Str("a\"b\\c".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("model A {\n  id Int\n}").unwrap();
        let id = &tokens[4];
        assert_eq!(id.kind, TokenKind::Ident("id".into()));
        assert_eq!((id.line, id.column), (2, 3));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("-1 2.5"),
            vec![
                TokenKind::Number("-1".into()),
                TokenKind::Number("2.5".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("url = \"postgres://").unwrap_err();
        assert_eq!(err.position.map(|p| (p.line, p.column)), Some((1, 7)));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("model A { id Int # }").unwrap_err();
        assert!(err.message.contains('#'));
    }
}
