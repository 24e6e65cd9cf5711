use std::fmt;

/// Lexical token kinds of the schema description language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Ident(String),
    /// Double-quoted string, escapes resolved
    Str(String),
    /// Numeric literal as written
    Number(String),
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `=`
    Equals,
    /// `@`
    At,
    /// `@@`
    AtAt,
    /// `?`
    Question,
    /// `.`
    Dot,
    /// `//` or `///` comment, slashes included
    Comment(String),
    /// End of line
    Newline,
    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "'{name}'"),
            Self::Str(value) => write!(f, "string \"{value}\""),
            Self::Number(value) => write!(f, "number {value}"),
            Self::LBrace => f.write_str("'{'"),
            Self::RBrace => f.write_str("'}'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::LBracket => f.write_str("'['"),
            Self::RBracket => f.write_str("']'"),
            Self::Comma => f.write_str("','"),
            Self::Colon => f.write_str("':'"),
            Self::Equals => f.write_str("'='"),
            Self::At => f.write_str("'@'"),
            Self::AtAt => f.write_str("'@@'"),
            Self::Question => f.write_str("'?'"),
            Self::Dot => f.write_str("'.'"),
            Self::Comment(_) => f.write_str("comment"),
            Self::Newline => f.write_str("end of line"),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

/// Token with its 1-based source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind and payload
    pub kind: TokenKind,
    /// Line
    pub line: usize,
    /// Column
    pub column: usize,
}
