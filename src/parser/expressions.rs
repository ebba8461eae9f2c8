//! Expression parsing implementation
//!
//! This module handles parsing of Metro expressions with one method per
//! precedence level. Each level parses its operands with the next, tighter
//! level and only consumes its own operators:
//!
//! ```text
//! expr       ::= assign
//! assign     ::= log_and_or [ ("=" | "+=" | ...) assign ]
//! log_and_or ::= bit_calc   (("&&" | "||") bit_calc)*
//! bit_calc   ::= compare    (("&" | "^" | "|") compare)*
//! compare    ::= shift      (("==" | "!=" | "<" | "<=" | ">" | ">=") shift)*
//! shift      ::= add        (("<<" | ">>") add)*
//! add        ::= mul        (("+" | "-") mul)*
//! mul        ::= unary      (("*" | "/" | "%") unary)*
//! unary      ::= "(" type ")" unary | [prefix_op] index_ref
//! index_ref  ::= factor ("[" expr "]" | "." identifier)*
//! factor     ::= literal | identifier | call | "(" expr ")"
//! ```
//!
//! Binary levels fold left, so equal-precedence operators group left to
//! right. Assignment recurses into itself and groups right to left.
//!
//! All parsing methods are implemented on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::constants::TYPE_KEYWORDS;
use crate::parser::lexer::unescape;
use crate::parser::parse::{lookahead, Parser, SyntaxError};
use crate::parser::token::{Token, TokenKind};

type ParseFn<'src> = fn(&mut Parser<'src>) -> Result<AstNode<'src>, SyntaxError>;

const LOGIC_OPS: &[(&str, AstKind)] = &[("&&", AstKind::LogAnd), ("||", AstKind::LogOr)];

const BIT_OPS: &[(&str, AstKind)] = &[
    ("&", AstKind::BitAnd),
    ("^", AstKind::BitXor),
    ("|", AstKind::BitOr),
];

const COMPARE_OPS: &[(&str, AstKind)] = &[
    ("==", AstKind::Equal),
    ("!=", AstKind::NotEqual),
    ("<", AstKind::Lt),
    ("<=", AstKind::LtEq),
    (">", AstKind::Gt),
    (">=", AstKind::GtEq),
];

const SHIFT_OPS: &[(&str, AstKind)] = &[("<<", AstKind::LShift), (">>", AstKind::RShift)];

const ADD_OPS: &[(&str, AstKind)] = &[("+", AstKind::Add), ("-", AstKind::Sub)];

const MUL_OPS: &[(&str, AstKind)] = &[
    ("*", AstKind::Mul),
    ("/", AstKind::Div),
    ("%", AstKind::Mod),
];

const UNARY_OPS: &[(&str, AstKind)] = &[
    ("-", AstKind::Negate),
    ("!", AstKind::Not),
    ("~", AstKind::BitNot),
    ("&", AstKind::Ref),
    ("*", AstKind::Deref),
];

/// `None` is plain assignment; otherwise the operator the compound form
/// desugars to.
const ASSIGN_OPS: &[(&str, Option<AstKind>)] = &[
    ("=", None),
    ("+=", Some(AstKind::Add)),
    ("-=", Some(AstKind::Sub)),
    ("*=", Some(AstKind::Mul)),
    ("/=", Some(AstKind::Div)),
    ("%=", Some(AstKind::Mod)),
    ("<<=", Some(AstKind::LShift)),
    (">>=", Some(AstKind::RShift)),
    ("&=", Some(AstKind::BitAnd)),
    ("|=", Some(AstKind::BitOr)),
    ("^=", Some(AstKind::BitXor)),
];

impl<'src> Parser<'src> {
    /// Parse expression (top-level entry point)
    pub fn expr(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        self.assign()
    }

    /// Parse assignment (right-associative). Compound forms are desugared:
    /// `a += b` becomes `a = a + b`.
    pub fn assign(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        self.nested(|p| {
            let lhs = p.log_and_or()?;

            for &(text, kind) in ASSIGN_OPS {
                if let Some(op) = p.eat_token(text) {
                    let rhs = p.assign()?;
                    return Ok(match kind {
                        Some(kind) => AstNode::compound_assign(kind, op, lhs, rhs),
                        None => AstNode::binary(AstKind::Assign, op, lhs, rhs),
                    });
                }
            }

            Ok(lhs)
        })
    }

    pub fn log_and_or(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        self.binary_left(LOGIC_OPS, Self::bit_calc)
    }

    pub fn bit_calc(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        self.binary_left(BIT_OPS, Self::compare)
    }

    pub fn compare(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        self.binary_left(COMPARE_OPS, Self::shift)
    }

    pub fn shift(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        self.binary_left(SHIFT_OPS, Self::add)
    }

    pub fn add(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        self.binary_left(ADD_OPS, Self::mul)
    }

    pub fn mul(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        self.binary_left(MUL_OPS, Self::unary)
    }

    /// Left-associative loop shared by every binary level
    fn binary_left(
        &mut self,
        ops: &[(&str, AstKind)],
        operand: ParseFn<'src>,
    ) -> Result<AstNode<'src>, SyntaxError> {
        let mut lhs = operand(self)?;

        'fold: loop {
            for &(text, kind) in ops {
                if let Some(op) = self.eat_token(text) {
                    let rhs = operand(self)?;
                    lhs = AstNode::binary(kind, op, lhs, rhs);
                    continue 'fold;
                }
            }

            return Ok(lhs);
        }
    }

    /// Parse a cast or a single optional prefix operator
    pub fn unary(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        if self.at_cast() {
            return self.cast();
        }

        for &(text, kind) in UNARY_OPS {
            if let Some(op) = self.eat_token(text) {
                let operand = self.index_ref()?;
                return Ok(AstNode::Unary {
                    kind,
                    op,
                    operand: Box::new(operand),
                });
            }
        }

        self.index_ref()
    }

    /// `(` followed by a builtin type or `const` can only open a cast
    fn at_cast(&self) -> bool {
        lookahead!(self, "(", (TokenKind::Keyword, "const"))
            || TYPE_KEYWORDS
                .iter()
                .any(|kw| lookahead!(self, "(", (TokenKind::Keyword, *kw)))
    }

    /// Parse cast: (type) unary
    fn cast(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        let op = self.expect("(", false)?;
        let target = self.expect_type_name()?;
        self.expect(")", false)?;
        let operand = self.nested(Self::unary)?;

        Ok(AstNode::Cast {
            op,
            target,
            operand: Box::new(operand),
        })
    }

    /// Parse subscripts and member accesses trailing a factor
    pub fn index_ref(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        let mut node = self.factor()?;

        loop {
            if let Some(op) = self.eat_token("[") {
                let index = self.expr()?;
                self.expect("]", false)?;
                node = AstNode::Index {
                    op,
                    base: Box::new(node),
                    index: Box::new(index),
                };
            } else if let Some(op) = self.eat_token(".") {
                let field = self.expect_identifier()?;
                node = AstNode::Member {
                    op,
                    base: Box::new(node),
                    field,
                };
            } else {
                break;
            }
        }

        Ok(node)
    }

    /// Parse primary (literals, variables, calls, parenthesized expressions)
    pub fn factor(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::Int | TokenKind::Float | TokenKind::Char | TokenKind::String => {
                self.next();
                let literal = self.literal_value(&token)?;
                Ok(AstNode::Value { token, literal })
            }
            TokenKind::Keyword if matches!(token.text(), "true" | "false") => {
                self.next();
                let literal = Literal::Bool(token.text() == "true");
                Ok(AstNode::Value { token, literal })
            }
            TokenKind::Identifier if lookahead!(self, TokenKind::Identifier, "(") => self.call(),
            TokenKind::Identifier => {
                self.next();
                Ok(AstNode::Variable(token))
            }
            TokenKind::Punctuator if token.text() == "(" => {
                self.next();
                let expr = self.expr()?;
                self.expect(")", false)?;
                Ok(expr)
            }
            _ => Err(self.error("expression")),
        }
    }

    /// Parse call: name(expr, expr, ...)
    fn call(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        let callee = self.expect_identifier()?;
        self.expect("(", false)?;

        let mut args = Vec::new();
        if !self.eat(")") {
            loop {
                args.push(self.expr()?);

                if self.eat(")") {
                    break;
                }
                self.expect(",", false)?;
            }
        }

        Ok(AstNode::Call { callee, args })
    }

    /// Decode the value of a literal token
    pub(crate) fn literal_value(&self, token: &Token<'src>) -> Result<Literal, SyntaxError> {
        let text = token.text();

        let value = match token.kind {
            TokenKind::Int => {
                let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    Some(hex) => i64::from_str_radix(hex, 16),
                    None => text.parse(),
                };
                parsed.ok().map(Literal::Int)
            }
            TokenKind::Float => text.parse().ok().map(Literal::Float),
            TokenKind::Char => unescape(strip_quotes(text)).chars().next().map(Literal::Char),
            TokenKind::String => Some(Literal::String(unescape(strip_quotes(text)))),
            _ => None,
        };

        value.ok_or_else(|| {
            SyntaxError::new(
                format!("valid {}", token.kind),
                token,
                self.last_accepted().map(|t| t.location),
            )
        })
    }
}

fn strip_quotes(text: &str) -> &str {
    text.get(1..text.len().saturating_sub(1)).unwrap_or("")
}
