//! Abstract Syntax Tree (AST) types
//!
//! Every node carries an optional [`Span`]. Nodes produced by the grammar
//! always have one; nodes assembled by hand (the shell does this for
//! `_` bindings) may not.

use std::fmt;
use std::path::PathBuf;

use super::registry::Category;
use crate::util::span::Span;

/// Arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub const ALL: [BinOp; 5] = [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div, BinOp::Pow];

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CmpOp {
    pub const ALL: [CmpOp; 6] = [
        CmpOp::Eq,
        CmpOp::Ne,
        CmpOp::Lt,
        CmpOp::Gt,
        CmpOp::Le,
        CmpOp::Ge,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for BinOp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for CmpOp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `name(arg, ...)`
    Call { callee: String, args: Vec<Expr> },
    /// `(lhs op rhs)`
    Binary {
        lhs: Box<Expr>,
        op: BinOp,
        rhs: Box<Expr>,
    },
    /// `(lhs cmp rhs)`
    Compare {
        lhs: Box<Expr>,
        op: CmpOp,
        rhs: Box<Expr>,
    },
    Variable(String),
    Literal(Literal),
}

impl Expr {
    pub fn new(
        kind: ExprKind,
        span: Span,
    ) -> Self {
        Self {
            kind,
            span: Some(span),
        }
    }

    /// Build an expression with no source location
    pub fn synthetic(kind: ExprKind) -> Self {
        Self { kind, span: None }
    }

    pub fn category(&self) -> Category {
        match &self.kind {
            ExprKind::Call { .. } => Category::Call,
            ExprKind::Binary { .. } => Category::BinaryOp,
            ExprKind::Compare { .. } => Category::CompareOp,
            ExprKind::Variable(_) => Category::Variable,
            ExprKind::Literal(Literal::Int(_)) => Category::IntLiteral,
            ExprKind::Literal(Literal::Float(_)) => Category::FloatLiteral,
            ExprKind::Literal(Literal::Char(_)) => Category::CharLiteral,
            ExprKind::Literal(Literal::Str(_)) => Category::StringLiteral,
        }
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `declare name is value`
    Declaration { name: String, value: Expr },
    /// A bare expression evaluated for its effect
    Expression(Expr),
    While { cond: Expr, body: Vec<Stmt> },
    /// `elseif` chains are nested `If`s in `else_body`
    If {
        cond: Expr,
        body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
}

impl Stmt {
    pub fn new(
        kind: StmtKind,
        span: Span,
    ) -> Self {
        Self {
            kind,
            span: Some(span),
        }
    }

    pub fn synthetic(kind: StmtKind) -> Self {
        Self { kind, span: None }
    }

    pub fn category(&self) -> Category {
        match &self.kind {
            StmtKind::Declaration { .. } => Category::Declaration,
            StmtKind::Expression(_) => Category::ExpressionStatement,
            StmtKind::While { .. } => Category::While,
            StmtKind::If { .. } => Category::If,
        }
    }
}

/// Program (root node)
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub instructions: Vec<Stmt>,
    /// File the program was read from, if any
    pub path: Option<PathBuf>,
    pub span: Option<Span>,
}

impl Program {
    pub fn synthetic(instructions: Vec<Stmt>) -> Self {
        Self {
            instructions,
            path: None,
            span: None,
        }
    }
}

/// Any node a grammar rule can produce
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program(Program),
    Stmt(Stmt),
    Expr(Expr),
}

impl Node {
    pub fn category(&self) -> Category {
        match self {
            Node::Program(_) => Category::Program,
            Node::Stmt(stmt) => stmt.category(),
            Node::Expr(expr) => expr.category(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Node::Program(program) => program.span,
            Node::Stmt(stmt) => stmt.span,
            Node::Expr(expr) => expr.span,
        }
    }

    pub fn into_program(self) -> Option<Program> {
        match self {
            Node::Program(program) => Some(program),
            _ => None,
        }
    }

    pub fn into_stmt(self) -> Option<Stmt> {
        match self {
            Node::Stmt(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn into_expr(self) -> Option<Expr> {
        match self {
            Node::Expr(expr) => Some(expr),
            _ => None,
        }
    }
}

impl From<Expr> for Node {
    fn from(expr: Expr) -> Self {
        Node::Expr(expr)
    }
}

impl From<Stmt> for Node {
    fn from(stmt: Stmt) -> Self {
        Node::Stmt(stmt)
    }
}

impl From<Program> for Node {
    fn from(program: Program) -> Self {
        Node::Program(program)
    }
}
