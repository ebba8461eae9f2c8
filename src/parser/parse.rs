//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, cursor helpers, lookahead, token splicing and the
//! main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: top-level items and type names
//! - `statements`: statements and scopes
//! - `expressions`: the precedence cascade from `expr` down to `factor`
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! The cursor is an index into an owned `Vec<Token>`, so splicing a token into
//! the stream never invalidates it; only the cached end index is recomputed.

use crate::parser::ast::*;
use crate::parser::constants::DEFAULT_MAX_NESTING_DEPTH;
use crate::parser::lexer::{LexError, Lexer};
use crate::parser::token::{Token, TokenKind};
use log::trace;
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "syntax error at line {}, column {}: expected {}, found {}",
    .location.line,
    .location.column,
    .expected,
    .found_text
)]
pub struct SyntaxError {
    /// Description of what the grammar required here
    pub expected: String,
    pub found: TokenKind,
    /// Display form of the offending token
    pub found_text: String,
    pub location: SourceLocation,
    /// Location of the last token the parser accepted before failing
    pub last_accepted: Option<SourceLocation>,
}

impl SyntaxError {
    pub fn new(
        expected: impl Into<String>,
        found: &Token<'_>,
        last_accepted: Option<SourceLocation>,
    ) -> Self {
        SyntaxError {
            expected: expected.into(),
            found: found.kind,
            found_text: found.to_string(),
            location: found.location,
            last_accepted,
        }
    }
}

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest nesting of expressions, statements and type arguments accepted
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// One element of a lookahead sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPattern<'p> {
    Kind(TokenKind),
    Text(&'p str),
    Exact(TokenKind, &'p str),
}

impl TokenPattern<'_> {
    pub fn matches(&self, token: &Token<'_>) -> bool {
        match *self {
            TokenPattern::Kind(kind) => token.kind == kind,
            TokenPattern::Text(text) => token.text() == text,
            TokenPattern::Exact(kind, text) => token.kind == kind && token.text() == text,
        }
    }
}

impl From<TokenKind> for TokenPattern<'_> {
    fn from(kind: TokenKind) -> Self {
        TokenPattern::Kind(kind)
    }
}

impl<'p> From<&'p str> for TokenPattern<'p> {
    fn from(text: &'p str) -> Self {
        TokenPattern::Text(text)
    }
}

impl<'p> From<(TokenKind, &'p str)> for TokenPattern<'p> {
    fn from((kind, text): (TokenKind, &'p str)) -> Self {
        TokenPattern::Exact(kind, text)
    }
}

/// `lookahead!(parser, "(", TokenKind::Identifier, ...)`
///
/// Checks the upcoming tokens against the patterns without consuming any.
macro_rules! lookahead {
    ($parser:expr, $($pattern:expr),+ $(,)?) => {
        $parser.match_seq(&[$($crate::parser::parse::TokenPattern::from($pattern)),+])
    };
}

pub(crate) use lookahead;

/// Recursive descent parser for Metro
pub struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    cur: usize,
    end: usize,
    ate: Option<usize>,
    depth: usize,
    options: ParseOptions,
}

impl<'src> Parser<'src> {
    /// Take ownership of a token sequence.
    ///
    /// The first `End` token terminates the stream and anything after it is
    /// dropped. An `End` token is appended if the sequence has none.
    pub fn new(tokens: Vec<Token<'src>>) -> Self {
        Self::with_options(tokens, ParseOptions::default())
    }

    pub fn with_options(mut tokens: Vec<Token<'src>>, options: ParseOptions) -> Self {
        match tokens.iter().position(Token::is_end) {
            Some(i) => {
                if i + 1 < tokens.len() {
                    trace!("dropping {} tokens after end of input", tokens.len() - i - 1);
                }
                tokens.truncate(i + 1);
            }
            None => {
                let loc = tokens.last().map(|t| t.location).unwrap_or_default();
                tokens.push(Token::end(loc));
            }
        }

        let end = tokens.len() - 1;
        Self {
            tokens,
            cur: 0,
            end,
            ate: None,
            depth: 0,
            options,
        }
    }

    /// Lex `source` and build a parser over the result.
    pub fn from_source(source: &'src str) -> Result<Self, LexError> {
        let tokens = Lexer::new(source).lex()?;
        Ok(Self::new(tokens))
    }

    /// Parse the entire token sequence into a [`Program`].
    pub fn parse(mut self) -> Result<Program<'src>, SyntaxError> {
        let mut program = Program::new();

        while self.check() {
            program.items.push(self.top()?);
        }

        Ok(program)
    }

    // ===== Helper methods =====

    /// Whether any input remains before the end-of-stream token
    pub fn check(&self) -> bool {
        self.cur < self.end
    }

    pub fn current(&self) -> &Token<'src> {
        &self.tokens[self.cur]
    }

    /// Index of the current token
    pub fn position(&self) -> usize {
        self.cur
    }

    /// The most recently consumed token
    pub fn last_accepted(&self) -> Option<&Token<'src>> {
        self.ate.map(|i| &self.tokens[i])
    }

    /// Consume and return the current token. The end-of-stream token is
    /// returned but never consumed.
    pub(crate) fn next(&mut self) -> Token<'src> {
        let token = self.tokens[self.cur].clone();
        if self.check() {
            self.ate = Some(self.cur);
            self.cur += 1;
        }
        token
    }

    pub fn match_text(&self, text: &str) -> bool {
        self.check() && self.current().text() == text
    }

    pub fn match_kind(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Check the upcoming tokens against `patterns` without consuming them.
    ///
    /// Works on a copy of the cursor, so the parser state is the same on
    /// every exit path. Never matches the end-of-stream token.
    pub fn match_seq(&self, patterns: &[TokenPattern<'_>]) -> bool {
        let mut cursor = self.cur;

        for pattern in patterns {
            if cursor >= self.end || !pattern.matches(&self.tokens[cursor]) {
                return false;
            }
            cursor += 1;
        }

        true
    }

    pub fn eat(&mut self, text: &str) -> bool {
        self.eat_token(text).is_some()
    }

    /// Like [`Parser::eat`], returning the consumed token
    pub fn eat_token(&mut self, text: &str) -> Option<Token<'src>> {
        if self.match_text(text) {
            Some(self.next())
        } else {
            None
        }
    }

    /// Require the current token to be `text`.
    ///
    /// With `keep_position` the token is only verified, not consumed.
    pub fn expect(&mut self, text: &str, keep_position: bool) -> Result<Token<'src>, SyntaxError> {
        if !self.match_text(text) {
            return Err(self.error(format!("'{}'", text)));
        }

        if keep_position {
            Ok(self.current().clone())
        } else {
            Ok(self.next())
        }
    }

    pub fn expect_identifier(&mut self) -> Result<Token<'src>, SyntaxError> {
        if self.match_kind(TokenKind::Identifier) {
            Ok(self.next())
        } else {
            Err(self.error("identifier"))
        }
    }

    /// Splice `token` into the stream at the cursor. The inserted token
    /// becomes the current one.
    pub fn insert_token(&mut self, token: Token<'src>) {
        self.tokens.insert(self.cur, token);
        self.end = self.tokens.len() - 1;
    }

    /// Break the current token after its first `at` bytes, leaving the
    /// cursor on the head. Used to close nested type arguments in `>>`.
    pub(crate) fn split_current(&mut self, at: usize) {
        let (head, tail) = self.current().split_at(at);
        trace!(
            "splitting {:?} into {:?} and {:?}",
            self.current().text(),
            head.text(),
            tail.text()
        );

        self.tokens[self.cur] = tail;
        self.insert_token(head);
    }

    /// Run `f` one nesting level deeper, failing once the configured depth
    /// is exceeded.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(format!(
                "at most {} levels of nesting",
                self.options.max_depth
            )));
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn error(&self, expected: impl Into<String>) -> SyntaxError {
        SyntaxError::new(expected, self.current(), self.last_accepted().map(|t| t.location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(source: &str) -> Parser<'_> {
        Parser::from_source(source).unwrap()
    }

    fn texts<'a>(parser: &'a Parser<'_>) -> Vec<&'a str> {
        parser.tokens.iter().map(|t| t.text()).collect()
    }

    #[test]
    fn test_parse_simple_function() {
        let program = parser("fn main() -> int { return 0; }").parse().unwrap();

        assert_eq!(program.items.len(), 1);
        match &program.items[0] {
            AstNode::Function {
                name,
                params,
                result_type,
                body,
                ..
            } => {
                assert_eq!(name.text(), "main");
                assert_eq!(params.len(), 0);
                assert_eq!(result_type.as_ref().unwrap().name.text(), "int");
                assert_eq!(body.to_string(), "(scope (return 0))");
            }
            _ => panic!("Expected function definition"),
        }
    }

    #[test]
    fn test_failed_lookahead_keeps_cursor() {
        let mut p = parser("a + b;");
        p.next();

        assert!(!lookahead!(p, "+", TokenKind::Identifier, "("));
        assert!(!lookahead!(p, "-"));
        assert_eq!(p.position(), 1);
        assert_eq!(p.current().text(), "+");

        assert!(lookahead!(p, "+", TokenKind::Identifier, (TokenKind::Punctuator, ";")));
        assert_eq!(p.position(), 1);
    }

    #[test]
    fn test_lookahead_never_matches_end() {
        let p = parser("x");
        assert!(lookahead!(p, TokenKind::Identifier));
        assert!(!lookahead!(p, TokenKind::Identifier, TokenKind::End));
    }

    #[test]
    fn test_eat_and_expect() {
        let mut p = parser("( x )");

        assert!(!p.eat(")"));
        assert!(p.eat("("));
        assert_eq!(p.last_accepted().unwrap().text(), "(");

        let kept = p.expect_identifier().unwrap();
        assert_eq!(kept.text(), "x");

        let peeked = p.expect(")", true).unwrap();
        assert_eq!(peeked.text(), ")");
        assert_eq!(p.current().text(), ")");
        p.expect(")", false).unwrap();
        assert!(!p.check());

        let err = p.expect(";", false).unwrap_err();
        assert_eq!(err.expected, "';'");
        assert_eq!(err.found, TokenKind::End);
        assert_eq!(err.last_accepted, Some(SourceLocation::new(4, 1, 5)));
    }

    #[test]
    fn test_end_is_never_consumed() {
        let mut p = parser("");
        let token = p.next();
        assert!(token.is_end());
        assert_eq!(p.position(), 0);
        assert!(p.last_accepted().is_none());
    }

    #[test]
    fn test_missing_end_is_appended() {
        let tokens = Lexer::new("a b").lex().unwrap();
        let without_end = tokens[..2].to_vec();

        let p = Parser::new(without_end);
        assert_eq!(p.tokens.len(), 3);
        assert!(p.tokens[2].is_end());
        assert_eq!(p.end, 2);
    }

    #[test]
    fn test_first_end_terminates_stream() {
        let mut tokens = Lexer::new("x;").lex().unwrap();
        tokens.extend(Lexer::new("y;").lex().unwrap());
        assert_eq!(tokens.iter().filter(|t| t.is_end()).count(), 2);

        let p = Parser::new(tokens);
        assert_eq!(texts(&p), vec!["x", ";", ""]);
        assert_eq!(p.end, 2);
        assert_eq!(p.parse().unwrap().to_string(), "x");
    }

    #[test]
    fn test_inserted_token_is_next() {
        let mut p = parser("a b c");
        p.next();

        let loc = p.current().location;
        p.insert_token(Token::synthesized(TokenKind::Punctuator, ";", loc));

        assert_eq!(p.end, 4);
        assert_eq!(p.current().text(), ";");
        assert_eq!(texts(&p), vec!["a", ";", "b", "c", ""]);

        assert!(p.eat(";"));
        assert_eq!(p.next().text(), "b");
        assert_eq!(p.next().text(), "c");
        assert!(!p.check());
    }

    #[test]
    fn test_split_current() {
        let mut p = parser("x >>= y");
        p.next();
        p.split_current(1);

        assert_eq!(texts(&p), vec!["x", ">", ">=", "y", ""]);
        assert_eq!(p.current().text(), ">");
        assert_eq!(p.tokens[2].location.column, 4);
    }

    #[test]
    fn test_nesting_limit() {
        let tokens = Lexer::new("((((1))))").lex().unwrap();
        let mut p = Parser::with_options(tokens, ParseOptions { max_depth: 3 });

        let err = p.expr().unwrap_err();
        assert_eq!(err.expected, "at most 3 levels of nesting");
        assert_eq!(p.depth, 0);
    }

    #[test]
    fn test_error_display() {
        let err = parser("let = 1;").parse().unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error at line 1, column 5: expected identifier, found '='"
        );
    }
}
