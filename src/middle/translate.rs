//! AST → IR translation
//!
//! [`Translator`] is a registry from concrete [`Category`] to lowering
//! function. Lookup is exact: abstract categories never resolve, so every
//! node shape needs its own entry (one function may serve several).

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::ir::{ConstValue, Ir, IrKind};
use super::CompileError;
use crate::frontend::parser::ast::{Expr, ExprKind, Program, Stmt, StmtKind};
use crate::frontend::parser::Category;
use crate::util::span::Span;

/// Borrowed view of any AST node
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

impl NodeRef<'_> {
    pub fn category(&self) -> Category {
        match self {
            NodeRef::Program(_) => Category::Program,
            NodeRef::Stmt(stmt) => stmt.category(),
            NodeRef::Expr(expr) => expr.category(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            NodeRef::Program(program) => program.span,
            NodeRef::Stmt(stmt) => stmt.span,
            NodeRef::Expr(expr) => expr.span,
        }
    }
}

/// Lowering function for one or more categories
pub type Lowering = fn(&Translator, NodeRef<'_>) -> Result<Ir, CompileError>;

static STANDARD: Lazy<Translator> = Lazy::new(|| {
    let mut translator = Translator::new();
    translator
        .register(&[Category::Program], lower_program)
        .register(&[Category::Declaration], lower_declaration)
        .register(&[Category::ExpressionStatement], lower_expression_statement)
        .register(&[Category::While], lower_while)
        .register(&[Category::If], lower_if)
        .register(&[Category::Call], lower_call)
        .register(&[Category::BinaryOp, Category::CompareOp], lower_operation)
        .register(&[Category::Variable], lower_variable)
        .register(
            &[
                Category::IntLiteral,
                Category::FloatLiteral,
                Category::CharLiteral,
                Category::StringLiteral,
            ],
            lower_literal,
        );
    translator
});

/// Lowering registry
#[derive(Debug, Clone, Default)]
pub struct Translator {
    lowerings: HashMap<Category, Lowering>,
}

impl Translator {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowerings for every Sluice node
    pub fn standard() -> &'static Translator {
        &STANDARD
    }

    pub fn register(
        &mut self,
        categories: &[Category],
        lowering: Lowering,
    ) -> &mut Self {
        for &category in categories {
            self.lowerings.insert(category, lowering);
        }
        self
    }

    pub fn supports(
        &self,
        category: Category,
    ) -> bool {
        self.lowerings.contains_key(&category)
    }

    /// Lower one node, stamping its start line on the result
    pub fn translate(
        &self,
        node: NodeRef<'_>,
    ) -> Result<Ir, CompileError> {
        let category = node.category();
        let lowering = self
            .lowerings
            .get(&category)
            .ok_or(CompileError::MissingLowering(category))?;

        let mut ir = lowering(self, node)?;
        if let Some(span) = node.span() {
            ir.line = Some(span.start.line);
        }
        Ok(ir)
    }

    pub fn translate_program(
        &self,
        program: &Program,
    ) -> Result<Ir, CompileError> {
        self.translate(NodeRef::Program(program))
    }

    pub fn translate_stmt(
        &self,
        stmt: &Stmt,
    ) -> Result<Ir, CompileError> {
        self.translate(NodeRef::Stmt(stmt))
    }

    pub fn translate_expr(
        &self,
        expr: &Expr,
    ) -> Result<Ir, CompileError> {
        self.translate(NodeRef::Expr(expr))
    }

    pub fn translate_block(
        &self,
        stmts: &[Stmt],
    ) -> Result<Vec<Ir>, CompileError> {
        stmts.iter().map(|s| self.translate_stmt(s)).collect()
    }
}

fn unexpected(
    expected: &'static str,
    node: NodeRef<'_>,
) -> CompileError {
    CompileError::UnexpectedNode {
        expected,
        found: node.category(),
    }
}

// ---- lowerings ----

fn lower_program(
    t: &Translator,
    node: NodeRef<'_>,
) -> Result<Ir, CompileError> {
    let NodeRef::Program(program) = node else {
        return Err(unexpected("a program", node));
    };
    Ok(Ir::new(IrKind::Module(t.translate_block(&program.instructions)?)))
}

fn lower_declaration(
    t: &Translator,
    node: NodeRef<'_>,
) -> Result<Ir, CompileError> {
    match node {
        NodeRef::Stmt(Stmt {
            kind: StmtKind::Declaration { name, value },
            ..
        }) => Ok(Ir::new(IrKind::Assign {
            name: name.clone(),
            value: Box::new(t.translate_expr(value)?),
        })),
        _ => Err(unexpected("a declaration", node)),
    }
}

fn lower_expression_statement(
    t: &Translator,
    node: NodeRef<'_>,
) -> Result<Ir, CompileError> {
    match node {
        NodeRef::Stmt(Stmt {
            kind: StmtKind::Expression(expr),
            ..
        }) => Ok(Ir::new(IrKind::Discard(Box::new(t.translate_expr(expr)?)))),
        _ => Err(unexpected("an expression statement", node)),
    }
}

fn lower_while(
    t: &Translator,
    node: NodeRef<'_>,
) -> Result<Ir, CompileError> {
    match node {
        NodeRef::Stmt(Stmt {
            kind: StmtKind::While { cond, body },
            ..
        }) => Ok(Ir::new(IrKind::Loop {
            test: Box::new(t.translate_expr(cond)?),
            body: t.translate_block(body)?,
        })),
        _ => Err(unexpected("a while loop", node)),
    }
}

fn lower_if(
    t: &Translator,
    node: NodeRef<'_>,
) -> Result<Ir, CompileError> {
    match node {
        NodeRef::Stmt(Stmt {
            kind: StmtKind::If {
                cond,
                body,
                else_body,
            },
            ..
        }) => Ok(Ir::new(IrKind::Branch {
            test: Box::new(t.translate_expr(cond)?),
            body: t.translate_block(body)?,
            orelse: t.translate_block(else_body)?,
        })),
        _ => Err(unexpected("an if statement", node)),
    }
}

fn lower_call(
    t: &Translator,
    node: NodeRef<'_>,
) -> Result<Ir, CompileError> {
    match node {
        NodeRef::Expr(Expr {
            kind: ExprKind::Call { callee, args },
            ..
        }) => {
            let args = args
                .iter()
                .map(|arg| t.translate_expr(arg))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Ir::new(IrKind::Call {
                callee: callee.clone(),
                args,
            }))
        }
        _ => Err(unexpected("a call", node)),
    }
}

fn lower_operation(
    t: &Translator,
    node: NodeRef<'_>,
) -> Result<Ir, CompileError> {
    let NodeRef::Expr(expr) = node else {
        return Err(unexpected("an operation", node));
    };
    let kind = match &expr.kind {
        ExprKind::Binary { lhs, op, rhs } => IrKind::Binary {
            lhs: Box::new(t.translate_expr(lhs)?),
            op: *op,
            rhs: Box::new(t.translate_expr(rhs)?),
        },
        ExprKind::Compare { lhs, op, rhs } => IrKind::Compare {
            lhs: Box::new(t.translate_expr(lhs)?),
            op: *op,
            rhs: Box::new(t.translate_expr(rhs)?),
        },
        _ => return Err(unexpected("an operation", node)),
    };
    Ok(Ir::new(kind))
}

fn lower_variable(
    _: &Translator,
    node: NodeRef<'_>,
) -> Result<Ir, CompileError> {
    match node {
        NodeRef::Expr(Expr {
            kind: ExprKind::Variable(name),
            ..
        }) => Ok(Ir::new(IrKind::Name(name.clone()))),
        _ => Err(unexpected("a variable", node)),
    }
}

fn lower_literal(
    _: &Translator,
    node: NodeRef<'_>,
) -> Result<Ir, CompileError> {
    match node {
        NodeRef::Expr(Expr {
            kind: ExprKind::Literal(literal),
            ..
        }) => Ok(Ir::new(IrKind::Const(ConstValue::from(literal)))),
        _ => Err(unexpected("a literal", node)),
    }
}
