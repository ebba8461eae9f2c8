//! Crate-level error type
//!
//! Both front-end stages fail with their own error; [`Error`] wraps either so
//! [`crate::parse_source`] can report one type.

use crate::parser::ast::SourceLocation;
use crate::parser::lexer::LexError;
use crate::parser::parse::SyntaxError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl Error {
    /// Where in the source the failure was detected
    pub fn location(&self) -> SourceLocation {
        match self {
            Error::Lex(err) => err.location,
            Error::Syntax(err) => err.location,
        }
    }
}
