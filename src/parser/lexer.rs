//! Lexer (tokenizer) for Metro source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Tokens are zero-copy views into the source: the `'src` lifetime on
//! [`Lexer`] and [`Token`] ties every token to the buffer it was cut from.
//!
//! The lexer works on bytes. Everything outside string and char literals must
//! be ASCII; any other character is reported as
//! [`LexErrorKind::InvalidCharacter`].

use super::ast::SourceLocation;
use super::constants::{ESCAPES, KEYWORDS, PUNCTUATORS};
use super::token::{Token, TokenKind};
use log::debug;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;
use thiserror::Error;

/// What went wrong while lexing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unterminated literal")]
    UnterminatedLiteral,

    #[error("invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("integer literal out of range")]
    NumberOutOfRange,
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lex error at line {}, column {}: {}", .location.line, .location.column, .kind)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: SourceLocation,
}

fn keyword_set() -> &'static FxHashSet<&'static str> {
    static KEYWORD_SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    KEYWORD_SET.get_or_init(|| KEYWORDS.iter().copied().collect())
}

/// Returns `true` if `word` is a reserved word.
pub fn is_keyword(word: &str) -> bool {
    keyword_set().contains(word)
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Lexer for Metro source code
pub struct Lexer<'src> {
    source: &'src str,
    position: usize,
    length: usize,
    line: usize,
    column: usize,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer over `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
            length: source.len(),
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input.
    ///
    /// The returned vector always ends with exactly one [`TokenKind::End`].
    pub fn lex(&mut self) -> Result<Vec<Token<'src>>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.pass_space()?;

            if !self.check() {
                tokens.push(Token::end(self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        debug!("lexed {} tokens from {} bytes", tokens.len(), self.length);
        Ok(tokens)
    }

    /// Get next token. The cursor is on a non-space character.
    fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        let loc = self.current_location();

        match self.peek() {
            Some(b) if b.is_ascii_digit() => self.number_literal(loc),
            Some(b) if is_ident_start(b) => Ok(self.identifier_or_keyword(loc)),
            Some(b'"') => self.quoted_literal(b'"', TokenKind::String, loc),
            Some(b'\'') => self.char_literal(loc),
            _ => self.punctuator(loc),
        }
    }

    /// Longest-match operator scan
    fn punctuator(&mut self, loc: SourceLocation) -> Result<Token<'src>, LexError> {
        let start = self.position;

        for punct in PUNCTUATORS {
            if self.eat_str(punct) {
                return Ok(Token::new(TokenKind::Punctuator, self.since(start), loc));
            }
        }

        Err(LexError {
            kind: LexErrorKind::InvalidCharacter(self.char_at(self.position)),
            location: loc,
        })
    }

    /// Parse numeric literal: decimal, `0x` hex, or `digits.digits` float
    fn number_literal(&mut self, loc: SourceLocation) -> Result<Token<'src>, LexError> {
        let out_of_range = LexError {
            kind: LexErrorKind::NumberOutOfRange,
            location: loc,
        };

        if self.match_str("0x") || self.match_str("0X") {
            let digits = self.count_while(2, |b| b.is_ascii_hexdigit());
            if digits == 0 {
                // Blame the character after the prefix; "0x" is ASCII
                let kind = match self.peek_at(2) {
                    Some(_) => LexErrorKind::InvalidCharacter(self.char_at(self.position + 2)),
                    None => LexErrorKind::UnterminatedLiteral,
                };
                return Err(LexError {
                    kind,
                    location: SourceLocation::new(loc.offset + 2, loc.line, loc.column + 2),
                });
            }

            let text = self.trim(2 + digits);
            i64::from_str_radix(&text[2..], 16).map_err(|_| out_of_range)?;
            self.skip(text.len());
            return Ok(Token::new(TokenKind::Int, text, loc));
        }

        let mut len = self.count_while(0, |b| b.is_ascii_digit());
        let mut kind = TokenKind::Int;

        // A '.' only continues the number when a digit follows it
        if self.peek_at(len) == Some(b'.')
            && self.peek_at(len + 1).is_some_and(|b| b.is_ascii_digit())
        {
            len += 1;
            len += self.count_while(len, |b| b.is_ascii_digit());
            kind = TokenKind::Float;
        }

        let text = self.trim(len);
        if kind == TokenKind::Int {
            text.parse::<i64>().map_err(|_| out_of_range)?;
        }

        self.skip(len);
        Ok(Token::new(kind, text, loc))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, loc: SourceLocation) -> Token<'src> {
        let len = self.count_while(0, is_ident_continue);
        let text = self.trim(len);
        self.skip(len);

        let kind = if is_keyword(text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        Token::new(kind, text, loc)
    }

    /// Parse a string literal. The token text keeps both quotes.
    fn quoted_literal(
        &mut self,
        quote: u8,
        kind: TokenKind,
        loc: SourceLocation,
    ) -> Result<Token<'src>, LexError> {
        let start = self.position;
        self.eat(quote);

        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedLiteral,
                        location: loc,
                    });
                }
                Some(b'\\') => self.escape(loc)?,
                Some(b) if b == quote => {
                    self.bump();
                    return Ok(Token::new(kind, self.since(start), loc));
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Parse character literal: exactly one (possibly escaped) character
    fn char_literal(&mut self, loc: SourceLocation) -> Result<Token<'src>, LexError> {
        let start = self.position;
        self.eat(b'\'');

        match self.peek() {
            None | Some(b'\n') => {
                return Err(LexError {
                    kind: LexErrorKind::UnterminatedLiteral,
                    location: loc,
                });
            }
            Some(b'\'') => {
                return Err(LexError {
                    kind: LexErrorKind::InvalidCharacter('\''),
                    location: self.current_location(),
                });
            }
            Some(b'\\') => self.escape(loc)?,
            Some(_) => {
                let ch = self.char_at(self.position);
                self.skip(ch.len_utf8());
            }
        }

        if !self.eat(b'\'') {
            return Err(LexError {
                kind: LexErrorKind::UnterminatedLiteral,
                location: loc,
            });
        }

        Ok(Token::new(TokenKind::Char, self.since(start), loc))
    }

    /// Consume a backslash escape, validating it against [`ESCAPES`]
    fn escape(&mut self, literal_loc: SourceLocation) -> Result<(), LexError> {
        let loc = self.current_location();
        self.eat(b'\\');

        match self.peek() {
            None | Some(b'\n') => Err(LexError {
                kind: LexErrorKind::UnterminatedLiteral,
                location: literal_loc,
            }),
            Some(b) if ESCAPES.contains(&b) => {
                self.bump();
                Ok(())
            }
            Some(_) => Err(LexError {
                kind: LexErrorKind::InvalidEscape(self.char_at(self.position)),
                location: loc,
            }),
        }
    }

    /// Skip a maximal run of whitespace and comments
    fn pass_space(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.bump();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    // Single-line comment
                    while let Some(b) = self.bump() {
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Skip multi-line comment (/* ... */). Comments do not nest.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.eat_str("/*");

        while self.check() {
            if self.eat_str("*/") {
                return Ok(());
            }
            self.bump();
        }

        Err(LexError {
            kind: LexErrorKind::UnterminatedComment,
            location: start_loc,
        })
    }

    // ===== Cursor primitives =====

    /// Check if there is input left
    fn check(&self) -> bool {
        self.position < self.length
    }

    /// Peek at current byte without consuming
    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.source.as_bytes().get(self.position + n).copied()
    }

    /// Whether the input at the cursor starts with `s`. Never consumes.
    fn match_str(&self, s: &str) -> bool {
        self.source.as_bytes()[self.position..].starts_with(s.as_bytes())
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump();
            return true;
        }

        false
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.match_str(s) {
            self.skip(s.len());
            return true;
        }

        false
    }

    /// Zero-copy view of the next `len` bytes. `len` must end on a char
    /// boundary; callers only pass lengths of ASCII runs.
    fn trim(&self, len: usize) -> &'src str {
        &self.source[self.position..self.position + len]
    }

    fn since(&self, start: usize) -> &'src str {
        &self.source[start..self.position]
    }

    /// Count bytes matching `pred`, starting `from` bytes past the cursor
    fn count_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        let mut n = 0;
        while self.peek_at(from + n).is_some_and(&pred) {
            n += 1;
        }
        n
    }

    fn char_at(&self, position: usize) -> char {
        self.source
            .get(position..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or('\0')
    }

    /// Advance one byte, keeping line and column current
    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;

        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if byte & 0xC0 != 0x80 {
            // UTF-8 continuation bytes do not start a new column
            self.column += 1;
        }

        Some(byte)
    }

    fn skip(&mut self, len: usize) {
        for _ in 0..len {
            self.bump();
        }
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.position, self.line, self.column)
    }
}

/// Decode the escapes in the body of a literal the lexer already accepted.
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token<'_>> {
        Lexer::new(source).lex().unwrap()
    }

    fn texts<'a>(tokens: &'a [Token<'_>]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.text()).collect()
    }

    fn lex_error(source: &str) -> LexError {
        Lexer::new(source).lex().unwrap_err()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = lex("fn main() -> int { return 0; }");

        assert_eq!(
            texts(&tokens),
            vec!["fn", "main", "(", ")", "->", "int", "{", "return", "0", ";", "}", ""]
        );
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[4].kind, TokenKind::Punctuator);
        assert_eq!(tokens[8].kind, TokenKind::Int);
        assert_eq!(tokens[11].kind, TokenKind::End);
    }

    #[test]
    fn test_longest_match_operators() {
        let tokens = lex("<<= << <= < >>= >> >= > -> - -= && & ||");

        assert_eq!(
            texts(&tokens),
            vec![
                "<<=", "<<", "<=", "<", ">>=", ">>", ">=", ">", "->", "-", "-=", "&&", "&", "||",
                ""
            ]
        );
    }

    #[test]
    fn test_adjacent_operators_split_greedily() {
        let tokens = lex("a<<-b");
        assert_eq!(texts(&tokens), vec!["a", "<<", "-", "b", ""]);
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("42 3.25 0xFF 7.x");

        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[1].kind, TokenKind::Float);
        assert_eq!(tokens[1].text(), "3.25");
        assert_eq!(tokens[2].kind, TokenKind::Int);
        assert_eq!(tokens[2].text(), "0xFF");
        // `7.x` is a member access on an integer, not a float
        assert_eq!(texts(&tokens[3..]), vec!["7", ".", "x", ""]);
    }

    #[test]
    fn test_hex_prefix_without_digits() {
        let err = lex_error("let n = 0xg;");
        assert_eq!(err.kind, LexErrorKind::InvalidCharacter('g'));
        assert_eq!(err.location, SourceLocation::new(10, 1, 11));
        assert_eq!(
            err.to_string(),
            "lex error at line 1, column 11: invalid character 'g'"
        );

        let err = lex_error("0X");
        assert_eq!(err.kind, LexErrorKind::UnterminatedLiteral);
        assert_eq!(err.location.column, 3);
    }

    #[test]
    fn test_number_out_of_range() {
        let err = lex_error("99999999999999999999");
        assert_eq!(err.kind, LexErrorKind::NumberOutOfRange);
    }

    #[test]
    fn test_comments() {
        let tokens = lex("let x; // comment\nlet y; /* block\ncomment */ let z;");

        assert_eq!(
            texts(&tokens),
            vec!["let", "x", ";", "let", "y", ";", "let", "z", ";", ""]
        );
        assert_eq!(tokens[6].location.line, 3);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = lex_error("x /* never closed");
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(err.location.column, 3);
    }

    #[test]
    fn test_string_literal() {
        let tokens = lex(r#"print("hello\nworld")"#);

        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text(), r#""hello\nworld""#);
        assert_eq!(unescape("hello\\nworld"), "hello\nworld");
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex_error("\"abc");
        assert_eq!(err.kind, LexErrorKind::UnterminatedLiteral);
        assert_eq!(err.location, SourceLocation::new(0, 1, 1));

        let err = lex_error("\"abc\ndef\"");
        assert_eq!(err.kind, LexErrorKind::UnterminatedLiteral);
    }

    #[test]
    fn test_invalid_escape() {
        let err = lex_error(r#"let s = "a\qb";"#);
        assert_eq!(err.kind, LexErrorKind::InvalidEscape('q'));
        assert_eq!(err.location.column, 11);
    }

    #[test]
    fn test_char_literals() {
        let tokens = lex(r"'a' '\n' 'é'");
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Char));
        assert_eq!(tokens[2].text(), "'é'");

        assert_eq!(lex_error("''").kind, LexErrorKind::InvalidCharacter('\''));
        assert_eq!(lex_error("'ab'").kind, LexErrorKind::UnterminatedLiteral);
    }

    #[test]
    fn test_invalid_character() {
        let err = lex_error("let x = 1 @ 2;");
        assert_eq!(err.kind, LexErrorKind::InvalidCharacter('@'));
        assert_eq!(err.location, SourceLocation::new(10, 1, 11));
    }

    #[test]
    fn test_positions_count_characters() {
        let tokens = lex("\"ü\" x");
        assert_eq!(tokens[1].location.column, 5);
        assert_eq!(tokens[1].location.offset, 5);
    }

    #[test]
    fn test_whitespace_only() {
        let tokens = lex(" \t\r\n  ");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_end());
    }

    #[test]
    fn test_error_display() {
        let err = lex_error("#");
        assert_eq!(
            err.to_string(),
            "lex error at line 1, column 1: invalid character '#'"
        );
    }
}
