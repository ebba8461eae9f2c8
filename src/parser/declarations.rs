//! Declaration parsing implementation
//!
//! This module handles parsing of top-level items in Metro programs:
//!
//! - Function definitions: `fn name(a: int, b: int) -> int { ... }`
//! - Struct definitions: `struct Name { x: int, y: float }`
//! - Type names: base types, type arguments, pointers, arrays
//!
//! Anything else at the top level is parsed as a statement.
//!
//! # Grammar
//!
//! ```text
//! top          ::= function_def | struct_def | statement
//! function_def ::= "fn" identifier "(" [param ("," param)*] ")" ["->" type] scope
//! struct_def   ::= "struct" identifier "{" [field ("," field)* [","]] "}"
//! param, field ::= identifier ":" type
//! type         ::= ["const"] base ["<" type ("," type)* ">"] "*"* ("[" [int] "]")*
//! ```
//!
//! All parsing methods are implemented on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::constants::TYPE_KEYWORDS;
use crate::parser::parse::{Parser, SyntaxError};
use crate::parser::token::{Token, TokenKind};
use log::trace;

impl<'src> Parser<'src> {
    /// Parse a top-level item
    pub fn top(&mut self) -> Result<AstNode<'src>, SyntaxError> {
        trace!("top: next token = {}", self.current());

        if let Some(token) = self.eat_token("fn") {
            return self.function_definition(token);
        }

        if let Some(token) = self.eat_token("struct") {
            return self.struct_definition(token);
        }

        self.stmt()
    }

    /// Parse function definition: fn name(params) [-> type] { body }
    fn function_definition(&mut self, token: Token<'src>) -> Result<AstNode<'src>, SyntaxError> {
        let name = self.expect_identifier()?;
        self.expect("(", false)?;

        let mut params = Vec::new();
        if !self.eat(")") {
            loop {
                let name = self.expect_identifier()?;
                self.expect(":", false)?;
                let param_type = self.expect_type_name()?;
                params.push(Param { name, param_type });

                if self.eat(")") {
                    break;
                }
                self.expect(",", false)?;
            }
        }

        let result_type = if self.eat("->") {
            Some(self.expect_type_name()?)
        } else {
            None
        };

        let body = self.block()?;

        Ok(AstNode::Function {
            token,
            name,
            params,
            result_type,
            body: Box::new(body),
        })
    }

    /// Parse struct definition: struct Name { fields }
    fn struct_definition(&mut self, token: Token<'src>) -> Result<AstNode<'src>, SyntaxError> {
        let name = self.expect_identifier()?;
        self.expect("{", false)?;

        let mut fields = Vec::new();
        while !self.eat("}") {
            let name = self.expect_identifier()?;
            self.expect(":", false)?;
            let field_type = self.expect_type_name()?;
            fields.push(Field { name, field_type });

            // Trailing comma is optional
            if !self.eat(",") {
                self.expect("}", false)?;
                break;
            }
        }

        Ok(AstNode::Struct {
            token,
            name,
            fields,
        })
    }

    /// Parse a type annotation
    pub fn expect_type_name(&mut self) -> Result<TypeName<'src>, SyntaxError> {
        self.nested(Self::type_name)
    }

    fn type_name(&mut self) -> Result<TypeName<'src>, SyntaxError> {
        let is_const = self.eat("const");

        if !self.at_type_base() {
            return Err(self.error("type name"));
        }

        let mut type_name = TypeName::new(self.next());
        type_name.is_const = is_const;

        if self.eat("<") {
            loop {
                type_name.args.push(self.expect_type_name()?);
                if !self.eat(",") {
                    break;
                }
            }
            self.expect_closing_angle()?;
        }

        while self.eat("*") {
            type_name.pointer_depth += 1;
        }

        while self.eat("[") {
            if self.eat("]") {
                // Unsized array []
                type_name.array_dims.push(None);
                continue;
            }

            if !self.match_kind(TokenKind::Int) {
                return Err(self.error("array size"));
            }

            let size = self.next();
            let dim = match self.literal_value(&size)? {
                Literal::Int(n) => u64::try_from(n).ok(),
                _ => None,
            };
            type_name.array_dims.push(dim);
            self.expect("]", false)?;
        }

        Ok(type_name)
    }

    fn at_type_base(&self) -> bool {
        let token = self.current();
        match token.kind {
            TokenKind::Identifier => true,
            TokenKind::Keyword => TYPE_KEYWORDS.contains(&token.text()),
            _ => false,
        }
    }

    /// Expect the `>` closing a type argument list. A compound token that
    /// starts with `>` (`>>`, `>=`, `>>=`) is split so the rest of it stays
    /// in the stream.
    fn expect_closing_angle(&mut self) -> Result<(), SyntaxError> {
        let compound = {
            let token = self.current();
            token.kind == TokenKind::Punctuator
                && token.text().len() > 1
                && token.text().starts_with('>')
        };

        if compound {
            self.split_current(1);
        }

        self.expect(">", false)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program<'_> {
        Parser::from_source(source).unwrap().parse().unwrap()
    }

    fn type_name(source: &str) -> String {
        let mut parser = Parser::from_source(source).unwrap();
        let parsed = parser.expect_type_name().unwrap();
        assert!(!parser.check(), "trailing input after {}", source);
        parsed.to_string()
    }

    #[test]
    fn test_parse_function() {
        let program = parse("fn add(a: int, b: int) -> int { return a + b; }");

        assert_eq!(program.items.len(), 1);
        match &program.items[0] {
            AstNode::Function { name, params, .. } => {
                assert_eq!(name.text(), "add");
                assert_eq!(params.len(), 2);
                assert_eq!(params[1].name.text(), "b");
                assert_eq!(params[1].param_type.to_string(), "int");
            }
            _ => panic!("Expected function definition"),
        }
        assert_eq!(
            program.to_string(),
            "(fn add ((a int) (b int)) int (scope (return (+ a b))))"
        );
    }

    #[test]
    fn test_parse_struct() {
        let program = parse("struct Point { x: int, y: float, }");

        match &program.items[0] {
            AstNode::Struct { name, fields, .. } => {
                assert_eq!(name.text(), "Point");
                assert_eq!(fields.len(), 2);
            }
            _ => panic!("Expected struct definition"),
        }

        assert_eq!(
            parse("struct Empty {}").to_string(),
            "(struct Empty)"
        );
        assert_eq!(
            parse("struct P { x: int }").to_string(),
            "(struct P (x int))"
        );
    }

    #[test]
    fn test_top_level_statements() {
        let program = parse("let x = 1;\nfn main() { }\nx += 2;");

        let kinds: Vec<AstKind> = program.items.iter().map(AstNode::kind).collect();
        assert_eq!(kinds, vec![AstKind::VarDecl, AstKind::Function, AstKind::Assign]);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_name("int"), "int");
        assert_eq!(type_name("const char*"), "const char*");
        assert_eq!(type_name("Point**[4][]"), "Point**[4][]");
        assert_eq!(type_name("Map<string, Vec<int>>"), "Map<string, Vec<int>>");
        assert_eq!(type_name("A<B<C<int>>>"), "A<B<C<int>>>");
    }

    #[test]
    fn test_closing_angle_split_keeps_rest() {
        let program = parse("let v: Vec<Vec<int>>= make();");
        assert_eq!(program.to_string(), "(let v Vec<Vec<int>> (call make))");
    }

    #[test]
    fn test_type_name_errors() {
        let mut parser = Parser::from_source("42").unwrap();
        let err = parser.expect_type_name().unwrap_err();
        assert_eq!(err.expected, "type name");

        let mut parser = Parser::from_source("int[n]").unwrap();
        let err = parser.expect_type_name().unwrap_err();
        assert_eq!(err.expected, "array size");

        let mut parser = Parser::from_source("Vec<int").unwrap();
        let err = parser.expect_type_name().unwrap_err();
        assert_eq!(err.expected, "'>'");
        assert_eq!(err.found, TokenKind::End);
    }

    #[test]
    fn test_missing_function_body() {
        let err = Parser::from_source("fn f() -> int;")
            .unwrap()
            .parse()
            .unwrap_err();
        assert_eq!(err.expected, "'{'");
        assert_eq!(err.found_text, "';'");
    }
}
