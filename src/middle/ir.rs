//! Intermediate Representation
//!
//! A tree mirroring the AST with the syntax stripped away. Every node may
//! carry the source line it came from; [`Ir::fill_lines`] completes the
//! metadata before code generation.

use crate::frontend::parser::ast::{BinOp, CmpOp, Literal};

/// Compile-time constant
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
}

impl From<&Literal> for ConstValue {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Int(n) => ConstValue::Int(*n),
            Literal::Float(f) => ConstValue::Float(*f),
            Literal::Char(c) => ConstValue::Char(*c),
            Literal::Str(s) => ConstValue::String(s.clone()),
        }
    }
}

/// IR node
#[derive(Debug, Clone, PartialEq)]
pub struct Ir {
    pub kind: IrKind,
    /// Source line (1-indexed)
    pub line: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrKind {
    /// Top-level statement list
    Module(Vec<Ir>),
    /// Bind `name` in the innermost scope
    Assign { name: String, value: Box<Ir> },
    /// Evaluate and throw away the result
    Discard(Box<Ir>),
    /// Re-evaluates `test` before every iteration
    Loop { test: Box<Ir>, body: Vec<Ir> },
    Branch {
        test: Box<Ir>,
        body: Vec<Ir>,
        orelse: Vec<Ir>,
    },
    /// Call resolved by name at run time
    Call { callee: String, args: Vec<Ir> },
    Binary {
        lhs: Box<Ir>,
        op: BinOp,
        rhs: Box<Ir>,
    },
    Compare {
        lhs: Box<Ir>,
        op: CmpOp,
        rhs: Box<Ir>,
    },
    /// Dynamic name lookup
    Name(String),
    Const(ConstValue),
}

impl Ir {
    pub fn new(kind: IrKind) -> Self {
        Self { kind, line: None }
    }

    pub fn with_line(
        mut self,
        line: usize,
    ) -> Self {
        self.line = Some(line);
        self
    }

    /// Give every node without a line the line of its nearest ancestor
    pub fn fill_lines(
        &mut self,
        inherited: usize,
    ) {
        let line = *self.line.get_or_insert(inherited);
        match &mut self.kind {
            IrKind::Module(items) => {
                for item in items {
                    item.fill_lines(line);
                }
            }
            IrKind::Assign { value, .. } => value.fill_lines(line),
            IrKind::Discard(value) => value.fill_lines(line),
            IrKind::Loop { test, body } => {
                test.fill_lines(line);
                for item in body {
                    item.fill_lines(line);
                }
            }
            IrKind::Branch { test, body, orelse } => {
                test.fill_lines(line);
                for item in body.iter_mut().chain(orelse.iter_mut()) {
                    item.fill_lines(line);
                }
            }
            IrKind::Call { args, .. } => {
                for arg in args {
                    arg.fill_lines(line);
                }
            }
            IrKind::Binary { lhs, rhs, .. } | IrKind::Compare { lhs, rhs, .. } => {
                lhs.fill_lines(line);
                rhs.fill_lines(line);
            }
            IrKind::Name(_) | IrKind::Const(_) => {}
        }
    }
}
