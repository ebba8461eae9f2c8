//! Metro source code parser
//!
//! This module transforms Metro source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions
//! - [`token`]: Token type shared by both stages
//!
//! # Language Surface
//!
//! - Items: `fn` definitions, `struct` definitions, and plain statements
//! - Statements: `let`, `if`/`else`, `while`, `loop`, `return`, `break`, `continue`, scopes
//! - Expressions: assignment (with compound forms), logical, bitwise, comparison,
//!   shift, arithmetic, prefix operators, casts, subscripts, member access, calls
//! - Types: builtin or named, with type arguments, pointers and array dimensions
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one method per precedence level.
//! No external parser generator dependencies.

pub mod ast;
pub mod constants;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
pub mod token;
