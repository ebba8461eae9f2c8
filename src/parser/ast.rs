// AST (Abstract Syntax Tree) definitions for the Metro front end

use super::token::Token;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub offset: usize, // byte offset into the source buffer
    pub line: usize,
    pub column: usize, // 1-based, counted in characters
}

impl SourceLocation {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

/// Node tag. For unary and binary expressions it names the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstKind {
    // Leaves and postfix forms
    Value,
    Variable,
    Call,
    Index,
    Member,
    Cast,

    // Unary
    Negate,
    Not,
    BitNot,
    Ref,
    Deref,

    // Binary
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    LShift,
    RShift,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Equal,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    LogAnd,
    LogOr,
    Assign,

    // Statements
    VarDecl,
    If,
    While,
    Loop,
    Return,
    Break,
    Continue,
    Scope,

    // Top-level items
    Function,
    Struct,

    TypeName,
    Program,
}

impl AstKind {
    /// Source spelling of an operator kind.
    pub fn symbol(self) -> Option<&'static str> {
        let s = match self {
            AstKind::Negate | AstKind::Sub => "-",
            AstKind::Not => "!",
            AstKind::BitNot => "~",
            AstKind::Ref | AstKind::BitAnd => "&",
            AstKind::Deref | AstKind::Mul => "*",
            AstKind::Div => "/",
            AstKind::Mod => "%",
            AstKind::Add => "+",
            AstKind::LShift => "<<",
            AstKind::RShift => ">>",
            AstKind::Lt => "<",
            AstKind::LtEq => "<=",
            AstKind::Gt => ">",
            AstKind::GtEq => ">=",
            AstKind::Equal => "==",
            AstKind::NotEqual => "!=",
            AstKind::BitXor => "^",
            AstKind::BitOr => "|",
            AstKind::LogAnd => "&&",
            AstKind::LogOr => "||",
            AstKind::Assign => "=",
            _ => return None,
        };
        Some(s)
    }

    pub fn is_unary(self) -> bool {
        matches!(
            self,
            AstKind::Negate | AstKind::Not | AstKind::BitNot | AstKind::Ref | AstKind::Deref
        )
    }

    pub fn is_binary(self) -> bool {
        self.symbol().is_some() && !self.is_unary()
    }
}

/// Decoded literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    Bool(bool),
}

/// Type annotation: `[const] Name[<T, ...>] *... [N]...`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName<'src> {
    pub name: Token<'src>,
    pub args: Vec<TypeName<'src>>,
    pub is_const: bool,
    pub pointer_depth: usize,           // 0 = not pointer, 1 = *, 2 = **, etc.
    pub array_dims: Vec<Option<u64>>, // None for an unsized `[]`
}

impl<'src> TypeName<'src> {
    pub fn new(name: Token<'src>) -> Self {
        TypeName {
            name,
            args: Vec::new(),
            is_const: false,
            pointer_depth: 0,
            array_dims: Vec::new(),
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param<'src> {
    pub name: Token<'src>,
    pub param_type: TypeName<'src>,
}

/// Struct field
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'src> {
    pub name: Token<'src>,
    pub field_type: TypeName<'src>,
}

/// AST nodes representing statements and expressions.
///
/// Every node exclusively owns its children. Compound assignments never
/// appear: `a += b` is stored as `Expr { kind: Assign, lhs: a, rhs: a + b }`.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode<'src> {
    // Expressions
    Value {
        token: Token<'src>,
        literal: Literal,
    },
    Variable(Token<'src>),
    Call {
        callee: Token<'src>,
        args: Vec<AstNode<'src>>,
    },
    Index {
        op: Token<'src>,
        base: Box<AstNode<'src>>,
        index: Box<AstNode<'src>>,
    },
    Member {
        op: Token<'src>,
        base: Box<AstNode<'src>>,
        field: Token<'src>,
    },
    Unary {
        kind: AstKind,
        op: Token<'src>,
        operand: Box<AstNode<'src>>,
    },
    Cast {
        op: Token<'src>,
        target: TypeName<'src>,
        operand: Box<AstNode<'src>>,
    },
    /// Binary operation or assignment
    Expr {
        kind: AstKind,
        op: Token<'src>,
        lhs: Box<AstNode<'src>>,
        rhs: Box<AstNode<'src>>,
    },

    // Statements
    VarDecl {
        token: Token<'src>,
        name: Token<'src>,
        type_name: Option<TypeName<'src>>,
        init: Option<Box<AstNode<'src>>>,
    },
    If {
        token: Token<'src>,
        condition: Box<AstNode<'src>>,
        then_branch: Box<AstNode<'src>>,
        else_branch: Option<Box<AstNode<'src>>>, // Scope or a chained If
    },
    While {
        token: Token<'src>,
        condition: Box<AstNode<'src>>,
        body: Box<AstNode<'src>>,
    },
    Loop {
        token: Token<'src>,
        body: Box<AstNode<'src>>,
    },
    Return {
        token: Token<'src>,
        value: Option<Box<AstNode<'src>>>,
    },
    Break(Token<'src>),
    Continue(Token<'src>),
    Scope {
        token: Token<'src>,
        statements: Vec<AstNode<'src>>,
    },

    // Top-level declarations
    Function {
        token: Token<'src>,
        name: Token<'src>,
        params: Vec<Param<'src>>,
        result_type: Option<TypeName<'src>>,
        body: Box<AstNode<'src>>,
    },
    Struct {
        token: Token<'src>,
        name: Token<'src>,
        fields: Vec<Field<'src>>,
    },
}

impl<'src> AstNode<'src> {
    pub fn binary(kind: AstKind, op: Token<'src>, lhs: AstNode<'src>, rhs: AstNode<'src>) -> Self {
        AstNode::Expr {
            kind,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Build `lhs = lhs <kind> rhs`. The operator token of the compound form
    /// is kept on both nodes.
    pub fn compound_assign(
        kind: AstKind,
        op: Token<'src>,
        lhs: AstNode<'src>,
        rhs: AstNode<'src>,
    ) -> Self {
        let value = AstNode::binary(kind, op.clone(), lhs.clone(), rhs);
        AstNode::binary(AstKind::Assign, op, lhs, value)
    }

    pub fn kind(&self) -> AstKind {
        match self {
            AstNode::Value { .. } => AstKind::Value,
            AstNode::Variable(_) => AstKind::Variable,
            AstNode::Call { .. } => AstKind::Call,
            AstNode::Index { .. } => AstKind::Index,
            AstNode::Member { .. } => AstKind::Member,
            AstNode::Unary { kind, .. } => *kind,
            AstNode::Cast { .. } => AstKind::Cast,
            AstNode::Expr { kind, .. } => *kind,
            AstNode::VarDecl { .. } => AstKind::VarDecl,
            AstNode::If { .. } => AstKind::If,
            AstNode::While { .. } => AstKind::While,
            AstNode::Loop { .. } => AstKind::Loop,
            AstNode::Return { .. } => AstKind::Return,
            AstNode::Break(_) => AstKind::Break,
            AstNode::Continue(_) => AstKind::Continue,
            AstNode::Scope { .. } => AstKind::Scope,
            AstNode::Function { .. } => AstKind::Function,
            AstNode::Struct { .. } => AstKind::Struct,
        }
    }

    /// Get the source location of this node's leading token
    pub fn location(&self) -> SourceLocation {
        match self {
            AstNode::Value { token, .. } => token.location,
            AstNode::Variable(token) => token.location,
            AstNode::Call { callee, .. } => callee.location,
            AstNode::Index { base, .. } => base.location(),
            AstNode::Member { base, .. } => base.location(),
            AstNode::Unary { op, .. } => op.location,
            AstNode::Cast { op, .. } => op.location,
            AstNode::Expr { lhs, .. } => lhs.location(),
            AstNode::VarDecl { token, .. }
            | AstNode::If { token, .. }
            | AstNode::While { token, .. }
            | AstNode::Loop { token, .. }
            | AstNode::Return { token, .. }
            | AstNode::Break(token)
            | AstNode::Continue(token)
            | AstNode::Scope { token, .. }
            | AstNode::Function { token, .. }
            | AstNode::Struct { token, .. } => token.location,
        }
    }

    /// Left and right operands of a binary expression or assignment
    pub fn operands(&self) -> Option<(&AstNode<'src>, &AstNode<'src>)> {
        match self {
            AstNode::Expr { lhs, rhs, .. } => Some((lhs, rhs)),
            _ => None,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program<'src> {
    pub items: Vec<AstNode<'src>>, // Functions, structs and top-level statements
}

impl Program<'_> {
    pub fn new() -> Self {
        Program::default()
    }
}

// ===== S-expression printing =====
//
// Locations are never printed, so two trees with the same shape print the same.

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for item in items {
        write!(f, " {}", item)?;
    }
    Ok(())
}

impl fmt::Display for TypeName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        write!(f, "{}", self.name.text)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        for _ in 0..self.pointer_depth {
            write!(f, "*")?;
        }
        for dim in &self.array_dims {
            match dim {
                Some(n) => write!(f, "[{}]", n)?,
                None => write!(f, "[]")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Param<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.name.text, self.param_type)
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.name.text, self.field_type)
    }
}

impl fmt::Display for AstNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Value { token, .. } => write!(f, "{}", token.text),
            AstNode::Variable(name) => write!(f, "{}", name.text),
            AstNode::Call { callee, args } => {
                write!(f, "(call {}", callee.text)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            AstNode::Index { base, index, .. } => write!(f, "(index {} {})", base, index),
            AstNode::Member { base, field, .. } => write!(f, "(. {} {})", base, field.text),
            AstNode::Unary { kind, operand, .. } => {
                write!(f, "({} {})", kind.symbol().unwrap_or("?"), operand)
            }
            AstNode::Cast {
                target, operand, ..
            } => write!(f, "(cast {} {})", target, operand),
            AstNode::Expr { kind, lhs, rhs, .. } => {
                write!(f, "({} {} {})", kind.symbol().unwrap_or("?"), lhs, rhs)
            }
            AstNode::VarDecl {
                name,
                type_name,
                init,
                ..
            } => {
                write!(f, "(let {}", name.text)?;
                match type_name {
                    Some(t) => write!(f, " {}", t)?,
                    None => write!(f, " _")?,
                }
                if let Some(init) = init {
                    write!(f, " {}", init)?;
                }
                write!(f, ")")
            }
            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                write!(f, "(if {} {}", condition, then_branch)?;
                if let Some(else_branch) = else_branch {
                    write!(f, " {}", else_branch)?;
                }
                write!(f, ")")
            }
            AstNode::While {
                condition, body, ..
            } => write!(f, "(while {} {})", condition, body),
            AstNode::Loop { body, .. } => write!(f, "(loop {})", body),
            AstNode::Return { value, .. } => match value {
                Some(value) => write!(f, "(return {})", value),
                None => write!(f, "(return)"),
            },
            AstNode::Break(_) => write!(f, "(break)"),
            AstNode::Continue(_) => write!(f, "(continue)"),
            AstNode::Scope { statements, .. } => {
                write!(f, "(scope")?;
                write_list(f, statements)?;
                write!(f, ")")
            }
            AstNode::Function {
                name,
                params,
                result_type,
                body,
                ..
            } => {
                write!(f, "(fn {} (", name.text)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ")")?;
                if let Some(result) = result_type {
                    write!(f, " {}", result)?;
                }
                write!(f, " {})", body)
            }
            AstNode::Struct { name, fields, .. } => {
                write!(f, "(struct {}", name.text)?;
                write_list(f, fields)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Program<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::TokenKind;

    fn ident(name: &str) -> AstNode<'_> {
        AstNode::Variable(Token::new(TokenKind::Identifier, name, SourceLocation::default()))
    }

    #[test]
    fn test_compound_assign_shape() {
        let op = Token::new(TokenKind::Punctuator, "+=", SourceLocation::default());
        let node = AstNode::compound_assign(AstKind::Add, op, ident("a"), ident("b"));

        assert_eq!(node.kind(), AstKind::Assign);
        let (lhs, rhs) = node.operands().unwrap();
        assert_eq!(lhs.kind(), AstKind::Variable);
        assert_eq!(rhs.kind(), AstKind::Add);
        assert_eq!(node.to_string(), "(= a (+ a b))");
    }

    #[test]
    fn test_operator_classes() {
        assert!(AstKind::Negate.is_unary());
        assert!(!AstKind::Negate.is_binary());
        assert!(AstKind::Sub.is_binary());
        assert!(AstKind::Assign.is_binary());
        assert!(!AstKind::Scope.is_binary());
        assert_eq!(AstKind::LogOr.symbol(), Some("||"));
    }

    #[test]
    fn test_type_name_display() {
        let loc = SourceLocation::default();
        let mut inner = TypeName::new(Token::new(TokenKind::Keyword, "int", loc));
        inner.pointer_depth = 1;
        let mut outer = TypeName::new(Token::new(TokenKind::Identifier, "Vec", loc));
        outer.args.push(inner);
        outer.is_const = true;
        outer.array_dims = vec![Some(3), None];

        assert_eq!(outer.to_string(), "const Vec<int*>[3][]");
    }
}
