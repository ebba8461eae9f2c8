//! # Introduction
//!
//! Metro is a small statically typed language. This crate is its front end:
//! it turns source text into a token sequence and then into an abstract
//! syntax tree, reporting the first lexical or syntax error it meets.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → AST
//! ```
//!
//! 1. [`parser::lexer`] scans the source into [`parser::token::Token`]s that
//!    borrow their text from the input.
//! 2. [`parser::parse`] owns the token sequence and builds a
//!    [`parser::ast::Program`] by recursive descent.
//! 3. [`error`] unifies the two failure types.
//!
//! ```
//! let program = metro::parse_source("fn main() { let x = 1 + 2 * 3; }").unwrap();
//! assert_eq!(program.to_string(), "(fn main () (scope (let x _ (+ 1 (* 2 3)))))");
//! ```
//!
//! Logging goes through the [`log`] facade: the lexer reports token counts at
//! `debug`, the parser traces its descent at `trace`.

pub mod error;
pub mod parser;

pub use error::Error;
pub use parser::ast::{AstKind, AstNode, Program, SourceLocation};
pub use parser::lexer::{LexError, Lexer};
pub use parser::parse::{ParseOptions, Parser, SyntaxError};
pub use parser::token::{Token, TokenKind};

/// Lex and parse `source` in one step.
pub fn parse_source(source: &str) -> Result<Program<'_>, Error> {
    let program = Parser::from_source(source)?.parse()?;
    Ok(program)
}
