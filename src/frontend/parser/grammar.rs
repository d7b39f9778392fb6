//! Sluice grammar
//!
//! ```text
//! program     = NL* "open sluice" NL statement* ["close sluice" NL*]
//! statement   = declaration | expr-stmt | while | if
//! declaration = "declare" IDENT "is" expression NL
//! expr-stmt   = expression NL
//! while       = "while" expression NL statement* "done" NL
//! if          = "if" expression NL statement* if-tail
//! if-tail     = "end" NL
//!             | "else" NL statement* "end" NL
//!             | "elseif" expression NL statement* if-tail
//! expression  = call | binary | compare | variable | literal
//! call        = IDENT "(" [expression ("," expression)*] ")"
//! binary      = "(" expression BINOP expression ")"
//! compare     = "(" expression CMPOP expression ")"
//! ```

use once_cell::sync::Lazy;

use super::ast::{Expr, ExprKind, Literal, Node, Program, Stmt, StmtKind};
use super::ast::{BinOp, CmpOp};
use super::registry::{Category, RuleRegistry};
use super::state::{ParseErrorKind, ParseResult, Parser};
use crate::frontend::lexer::literals;
use crate::frontend::lexer::TokenKind;
use crate::util::span::Span;

static STANDARD_RULES: Lazy<RuleRegistry> = Lazy::new(build_rules);

/// The Sluice grammar, built once
pub fn standard_rules() -> &'static RuleRegistry {
    &STANDARD_RULES
}

/// Build a fresh registry holding the Sluice grammar
pub fn build_rules() -> RuleRegistry {
    let mut rules = RuleRegistry::new();
    rules
        .register(Category::Program, 1, "program", program)
        .register(Category::Declaration, 1, "declaration", declaration)
        .register(Category::ExpressionStatement, 1, "expression-statement", expression_statement)
        .register(Category::While, 2, "while", while_loop)
        .register(Category::If, 2, "if", if_statement)
        .register(Category::Call, 1, "call", call)
        .register(Category::BinaryOp, 2, "binary-op", binary_op)
        .register(Category::CompareOp, 2, "compare-op", compare_op)
        .register(Category::Variable, 2, "variable", variable)
        .register(Category::IntLiteral, 1, "int-literal", int_literal)
        .register(Category::FloatLiteral, 1, "float-literal", float_literal)
        .register(Category::CharLiteral, 1, "char-literal", char_literal)
        .register(Category::StringLiteral, 1, "string-literal", string_literal);
    rules
}

/// Span from `start` to the last consumed token
fn span_from(
    p: &Parser<'_>,
    start: Span,
) -> Span {
    Span::between(start, p.previous_span())
}

// ---- statements ----

fn program(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.skip(TokenKind::Newline);
    let start = p.expect(TokenKind::ProgramStart)?.span;
    p.line_break()?;

    let mut instructions = Vec::new();
    while !p.at_end() && !p.at(TokenKind::ProgramEnd) {
        instructions.push(p.statement()?);
    }

    if p.at(TokenKind::ProgramEnd) {
        p.expect(TokenKind::ProgramEnd)?;
        p.skip(TokenKind::Newline);
    }

    if instructions.is_empty() {
        return Err(p.error_at(ParseErrorKind::EmptyProgram, start.start));
    }

    Ok(Node::Program(Program {
        instructions,
        path: p.path().map(|path| path.to_path_buf()),
        span: Some(span_from(p, start)),
    }))
}

fn declaration(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.expect(TokenKind::Declare)?.span;
    let name = p.expect(TokenKind::Identifier)?.text;
    p.expect(TokenKind::Is)?;
    let value = p.expression()?;
    let span = span_from(p, start);
    p.line_break()?;
    Ok(Stmt::new(StmtKind::Declaration { name, value }, span).into())
}

fn expression_statement(p: &mut Parser<'_>) -> ParseResult<Node> {
    let expr = p.expression()?;
    let span = expr.span.unwrap_or_else(|| p.previous_span());
    p.line_break()?;
    Ok(Stmt::new(StmtKind::Expression(expr), span).into())
}

fn while_loop(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.expect(TokenKind::While)?.span;
    let cond = p.expression()?;
    p.line_break()?;
    let body = p.statements()?;
    p.expect(TokenKind::Done)?;
    let span = span_from(p, start);
    p.line_break()?;
    Ok(Stmt::new(StmtKind::While { cond, body }, span).into())
}

fn if_statement(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.expect(TokenKind::If)?.span;
    if_tail(p, start).map(Node::Stmt)
}

/// Everything after the `if`/`elseif` keyword, up to and including `end`
fn if_tail(
    p: &mut Parser<'_>,
    start: Span,
) -> ParseResult<Stmt> {
    let cond = p.expression()?;
    p.line_break()?;
    let body = p.statements()?;

    let (else_body, end) = match p.peek_kind() {
        Some(TokenKind::ElseIf) => {
            let nested_start = p.expect(TokenKind::ElseIf)?.span;
            let nested = if_tail(p, nested_start)?;
            let end = nested.span.unwrap_or(nested_start);
            (vec![nested], end)
        }
        Some(TokenKind::Else) => {
            p.expect(TokenKind::Else)?;
            p.line_break()?;
            let else_body = p.statements()?;
            let end = p.expect(TokenKind::End)?.span;
            p.line_break()?;
            (else_body, end)
        }
        _ => {
            let end = p.expect(TokenKind::End)?.span;
            p.line_break()?;
            (Vec::new(), end)
        }
    };

    let span = Span::between(start, end);
    Ok(Stmt::new(StmtKind::If { cond, body, else_body }, span))
}

// ---- expressions ----

fn call(p: &mut Parser<'_>) -> ParseResult<Node> {
    let name = p.expect(TokenKind::Identifier)?;
    p.expect(TokenKind::LParen)?;
    let args = p.expression_list(TokenKind::Comma)?;
    p.expect(TokenKind::RParen)?;
    let span = span_from(p, name.span);
    Ok(Expr::new(
        ExprKind::Call {
            callee: name.text,
            args,
        },
        span,
    )
    .into())
}

fn binary_op(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.expect(TokenKind::LParen)?.span;
    let lhs = p.expression()?;
    let op_token = p.expect(TokenKind::BinOp)?;
    let rhs = p.expression()?;
    p.expect(TokenKind::RParen)?;

    let op = BinOp::from_symbol(&op_token.text).ok_or_else(|| {
        p.error_at(
            ParseErrorKind::Mismatch {
                expected: TokenKind::BinOp,
                found: op_token.kind,
                text: op_token.text.clone(),
            },
            op_token.span.start,
        )
    })?;

    let span = span_from(p, start);
    Ok(Expr::new(
        ExprKind::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        },
        span,
    )
    .into())
}

fn compare_op(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.expect(TokenKind::LParen)?.span;
    let lhs = p.expression()?;
    let op_token = p.expect(TokenKind::CmpOp)?;
    let rhs = p.expression()?;
    p.expect(TokenKind::RParen)?;

    let op = CmpOp::from_symbol(&op_token.text).ok_or_else(|| {
        p.error_at(
            ParseErrorKind::Mismatch {
                expected: TokenKind::CmpOp,
                found: op_token.kind,
                text: op_token.text.clone(),
            },
            op_token.span.start,
        )
    })?;

    let span = span_from(p, start);
    Ok(Expr::new(
        ExprKind::Compare {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        },
        span,
    )
    .into())
}

fn variable(p: &mut Parser<'_>) -> ParseResult<Node> {
    let token = p.expect(TokenKind::Identifier)?;
    Ok(Expr::new(ExprKind::Variable(token.text), token.span).into())
}

// ---- literals ----

fn literal_with<T>(
    p: &mut Parser<'_>,
    kind: TokenKind,
    decode: fn(&str) -> Result<T, literals::LiteralError>,
    wrap: fn(T) -> Literal,
) -> ParseResult<Node> {
    let token = p.expect(kind)?;
    let value = decode(&token.text)
        .map_err(|e| p.error_at(ParseErrorKind::Literal(e), token.span.start))?;
    Ok(Expr::new(ExprKind::Literal(wrap(value)), token.span).into())
}

fn int_literal(p: &mut Parser<'_>) -> ParseResult<Node> {
    literal_with(p, TokenKind::IntLiteral, literals::int_value, Literal::Int)
}

fn float_literal(p: &mut Parser<'_>) -> ParseResult<Node> {
    literal_with(p, TokenKind::FloatLiteral, literals::float_value, Literal::Float)
}

fn char_literal(p: &mut Parser<'_>) -> ParseResult<Node> {
    literal_with(p, TokenKind::CharLiteral, literals::char_value, Literal::Char)
}

fn string_literal(p: &mut Parser<'_>) -> ParseResult<Node> {
    literal_with(p, TokenKind::StringLiteral, literals::string_value, Literal::Str)
}
