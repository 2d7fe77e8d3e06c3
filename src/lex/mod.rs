//! Tokens and source locations for `.bt` schema files.
//!
//! Lexing never fails outright: every problem is recorded as a [`LexError`]
//! and the token stream always ends with a single [`TokenKind::Eof`].

mod lexer;

use std::fmt;

use thiserror::Error;

pub use lexer::lex;

/// A zero-based position. `col` counts UTF-16 code units, which is what
/// language clients expect by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: u32,
    pub col: u32,
}

impl Point {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Row {}, Col {})", self.row + 1, self.col + 1)
    }
}

/// Span of a token in the source, in bytes and in row/column points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start: Point,
    pub end: Point,
}

impl Location {
    /// Whether the span starts and ends on the same line
    pub fn is_single_line(&self) -> bool {
        self.start.row == self.end.row
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `prod`
    Product,
    /// `sum`
    Sum,
    /// `sumstr`
    SumStr,
    Id,
    /// A double-quoted string; the token value excludes the quotes
    Literal,
    LBrace,
    RBrace,
    /// `[]`
    List,
    /// `,`
    Separator,
    /// `?`
    Optional,
    Eof,
}

impl TokenKind {
    /// Keyword lookup for an identifier-shaped word
    pub fn keyword(word: &str) -> Option<Self> {
        match word {
            "prod" => Some(TokenKind::Product),
            "sum" => Some(TokenKind::Sum),
            "sumstr" => Some(TokenKind::SumStr),
            _ => None,
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Product | TokenKind::Sum | TokenKind::SumStr
        )
    }

    /// Human-readable name used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Product => "'prod'",
            TokenKind::Sum => "'sum'",
            TokenKind::SumStr => "'sumstr'",
            TokenKind::Id => "identifier",
            TokenKind::Literal => "string literal",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::List => "'[]'",
            TokenKind::Separator => "','",
            TokenKind::Optional => "'?'",
            TokenKind::Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Identifier text or literal contents; empty for punctuation and keywords
    pub value: String,
    pub loc: Location,
    /// Set on placeholder tokens the parser inserts while recovering
    pub missing: bool,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, loc: Location) -> Self {
        Self {
            kind,
            value: value.into(),
            loc,
            missing: false,
        }
    }

    /// Placeholder for a token the parser expected but did not find
    pub fn missing(kind: TokenKind, loc: Location) -> Self {
        Self {
            kind,
            value: String::new(),
            loc,
            missing: true,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} \"{}\"", self.kind, self.value)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("Unexpected char {0:?}")]
    UnexpectedChar(char),

    #[error("Unexpected EOF, expected '\"'")]
    UnterminatedLiteral,

    #[error("Unexpected EOF, expected ']'")]
    UnclosedListAtEof,

    #[error("Unexpected char {0:?}, expected ']'")]
    UnclosedList(char),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {}", .loc.start)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub loc: Location,
}
