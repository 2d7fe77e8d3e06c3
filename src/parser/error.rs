use thiserror::Error;

use crate::lex::{Location, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected {} at {}, got {actual}", join_kinds(.expected), .actual.loc.start)]
    UnexpectedToken {
        expected: Vec<TokenKind>,
        actual: Token,
    },
}

impl ParseError {
    pub fn location(&self) -> Location {
        match self {
            ParseError::UnexpectedToken { actual, .. } => actual.loc,
        }
    }

    /// Message without the position, for editors that already show where it is
    pub fn short_message(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, actual } => {
                format!("Expected {}, got {}", join_kinds(expected), actual)
            }
        }
    }
}

fn join_kinds(kinds: &[TokenKind]) -> String {
    kinds
        .iter()
        .map(TokenKind::describe)
        .collect::<Vec<_>>()
        .join(" or ")
}
