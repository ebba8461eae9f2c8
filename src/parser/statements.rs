//! Statement parsing implementation
//!
//! This module handles parsing of all Metro statement types:
//!
//! - Variable declarations: `let x: int = 42;`
//! - Control flow: `if`/`else if`/`else`, `while`, `loop`
//! - Jump statements: `return`, `break`, `continue`
//! - Scopes: `{ ... }`
//! - Expression statements: calls, assignments
//!
//! # Grammar
//!
//! ```text
//! statement ::= scope | var_decl | if_stmt | while_stmt | loop_stmt
//!             | return_stmt | "break" ";" | "continue" ";" | expr ";"
//! scope     ::= "{" statement* "}"
//! var_decl  ::= "let" identifier [":" type] ["=" expr] ";"
//! if_stmt   ::= "if" expr scope ["else" (if_stmt | scope)]
//! ```
//!
//! Bodies of `if`, `while` and `loop` must be scopes.
//!
//! All parsing methods are implemented on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{lookahead, Parser, SyntaxError};
use crate::parser::token::Token;
use log::trace;

impl<'src> Parser<'src> {
    /// Parse a statement
    pub fn stmt(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        trace!("stmt: next token = {}", self.current());
        self.nested(Self::statement)
    }

    fn statement(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        if self.match_text("{") {
            return self.scope();
        }

        // Check for keywords first
        if let Some(token) = self.eat_token("let") {
            return self.var_decl(token);
        }

        if let Some(token) = self.eat_token("if") {
            return self.if_stmt(token);
        }

        if let Some(token) = self.eat_token("while") {
            let condition = self.expr()?;
            let body = self.block()?;
            return Ok(AstNode::While {
                token,
                condition: Box::new(condition),
                body: Box::new(body),
            });
        }

        if let Some(token) = self.eat_token("loop") {
            let body = self.block()?;
            return Ok(AstNode::Loop {
                token,
                body: Box::new(body),
            });
        }

        if let Some(token) = self.eat_token("return") {
            let value = if self.match_text(";") {
                None
            } else {
                Some(Box::new(self.expr()?))
            };
            self.expect(";", false)?;
            return Ok(AstNode::Return { token, value });
        }

        if let Some(token) = self.eat_token("break") {
            self.expect(";", false)?;
            return Ok(AstNode::Break(token));
        }

        if let Some(token) = self.eat_token("continue") {
            self.expect(";", false)?;
            return Ok(AstNode::Continue(token));
        }

        // Otherwise, it's an expression statement
        let expr = self.expr()?;
        self.expect(";", false)?;
        Ok(expr)
    }

    /// Parse a braced scope, consuming both braces
    pub fn scope(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        let token = self.expect("{", false)?;

        let mut statements = Vec::new();
        while self.check() && !self.match_text("}") {
            statements.push(self.stmt()?);
        }

        self.expect("}", false)?;
        Ok(AstNode::Scope { token, statements })
    }

    /// Scope required by a construct: report a missing `{` before anything
    /// else is consumed.
    pub(crate) fn block(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        self.expect("{", true)?;
        self.scope()
    }

    /// Parse variable declaration: let name [: type] [= init];
    fn var_decl(&mut self, token: Token<'src>) -> Result<AstNode<'src>, SyntaxError> {
        let name = self.expect_identifier()?;

        let type_name = if self.eat(":") {
            Some(self.expect_type_name()?)
        } else {
            None
        };

        let init = if self.eat("=") {
            Some(Box::new(self.expr()?))
        } else {
            None
        };

        self.expect(";", false)?;

        Ok(AstNode::VarDecl {
            token,
            name,
            type_name,
            init,
        })
    }

    /// Parse if statement. An `else if` ladder is read iteratively and
    /// folded into nested `If` nodes, so it costs one nesting level however
    /// many arms it has.
    fn if_stmt(&mut self, token: Token<'src>) -> Result<AstNode<'src>, SyntaxError> {
        let (condition, then_branch) = self.if_arm()?;

        let mut ladder = Vec::new();
        while lookahead!(self, "else", "if") {
            self.eat("else");
            let token = self.expect("if", false)?;
            let (condition, then_branch) = self.if_arm()?;
            ladder.push((token, condition, then_branch));
        }

        let mut else_branch = if self.eat("else") {
            Some(Box::new(self.block()?))
        } else {
            None
        };

        if !ladder.is_empty() {
            trace!("if ladder with {} else-if arms", ladder.len());
        }

        // Innermost arm first
        for (token, condition, then_branch) in ladder.into_iter().rev() {
            else_branch = Some(Box::new(AstNode::If {
                token,
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            }));
        }

        Ok(AstNode::If {
            token,
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn if_arm(&mut self) -> Result<(AstNode<'src>, AstNode<'src>), SyntaxError> {
        let condition = self.expr()?;
        let then_branch = self.block()?;
        Ok((condition, then_branch))
    }
}
