//! Token definitions shared by the lexer and the parser
//!
//! A [`Token`] is a view into the source buffer: lexed tokens borrow their text
//! from the `'src` string, while tokens synthesized by the parser (for example
//! the halves of a split `>>`) may own theirs.

use super::ast::SourceLocation;
use std::borrow::Cow;
use std::fmt;

/// Token categories produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Int,
    Float,
    Char,
    String,
    Identifier,
    Keyword,
    Punctuator,
    /// Terminates every token sequence. Never consumed as ordinary input.
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Int => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Char => "char literal",
            TokenKind::String => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Punctuator => "punctuator",
            TokenKind::End => "end of input",
        };
        f.write_str(name)
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,

    /// Exact source text, literal quotes included.
    pub text: Cow<'src, str>,

    pub location: SourceLocation,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, location: SourceLocation) -> Self {
        Token {
            kind,
            text: Cow::Borrowed(text),
            location,
        }
    }

    /// Build a token that owns its text. Used for tokens the parser splices
    /// into the stream rather than reads from the source.
    pub fn synthesized(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Token {
            kind,
            text: Cow::Owned(text.into()),
            location,
        }
    }

    pub fn end(location: SourceLocation) -> Self {
        Token::new(TokenKind::End, "", location)
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::End
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Split the token after its first `at` bytes.
    ///
    /// Both halves keep the kind of the split token. A borrowed view stays
    /// borrowed, so splitting never allocates for lexed tokens.
    pub fn split_at(&self, at: usize) -> (Token<'src>, Token<'src>) {
        let (head, tail) = match self.text {
            Cow::Borrowed(s) => (Cow::Borrowed(&s[..at]), Cow::Borrowed(&s[at..])),
            Cow::Owned(ref s) => {
                (Cow::Owned(s[..at].to_string()), Cow::Owned(s[at..].to_string()))
            }
        };

        let tail_location = SourceLocation {
            offset: self.location.offset + at,
            line: self.location.line,
            column: self.location.column + head.chars().count(),
        };

        (
            Token {
                kind: self.kind,
                text: head,
                location: self.location,
            },
            Token {
                kind: self.kind,
                text: tail,
                location: tail_location,
            },
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::End => write!(f, "end of input"),
            TokenKind::Punctuator | TokenKind::Keyword => write!(f, "'{}'", self.text),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            kind => write!(f, "{} {}", kind, self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_views_and_positions() {
        let source = ">>=";
        let token = Token::new(TokenKind::Punctuator, source, SourceLocation::new(10, 2, 5));

        let (head, tail) = token.split_at(1);
        assert_eq!(head.text(), ">");
        assert_eq!(tail.text(), ">=");
        assert!(matches!(head.text, Cow::Borrowed(_)));
        assert_eq!(tail.location, SourceLocation::new(11, 2, 6));
    }

    #[test]
    fn test_display() {
        let loc = SourceLocation::new(0, 1, 1);
        assert_eq!(Token::end(loc).to_string(), "end of input");
        assert_eq!(Token::new(TokenKind::Punctuator, "+", loc).to_string(), "'+'");
        assert_eq!(
            Token::new(TokenKind::Identifier, "x", loc).to_string(),
            "identifier 'x'"
        );
    }
}
