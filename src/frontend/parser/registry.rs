//! Grammar rule registry
//!
//! Rules are registered against a [`Category`] with an integer priority.
//! Asking for an abstract category (such as [`Category::Expression`]) yields
//! the rules of every concrete category below it, lowest priority first.

use std::fmt;

use super::ast::Node;
use super::state::{ParseResult, Parser};

/// Syntactic category a rule produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    // Abstract
    Statement,
    Expression,
    Literal,

    // Concrete
    Program,
    Declaration,
    ExpressionStatement,
    While,
    If,
    Call,
    BinaryOp,
    CompareOp,
    Variable,
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
}

impl Category {
    /// Direct sub-categories of an abstract category
    pub fn variants(self) -> &'static [Category] {
        match self {
            Category::Statement => &[
                Category::Declaration,
                Category::ExpressionStatement,
                Category::While,
                Category::If,
            ],
            Category::Expression => &[
                Category::Call,
                Category::BinaryOp,
                Category::CompareOp,
                Category::Variable,
                Category::Literal,
            ],
            Category::Literal => &[
                Category::IntLiteral,
                Category::FloatLiteral,
                Category::CharLiteral,
                Category::StringLiteral,
            ],
            _ => &[],
        }
    }

    pub fn is_abstract(self) -> bool {
        !self.variants().is_empty()
    }

    /// This category and everything reachable through [`Category::variants`]
    pub fn descendants(self) -> Vec<Category> {
        let mut found = vec![self];
        let mut index = 0;
        while index < found.len() {
            for &sub in found[index].variants() {
                if !found.contains(&sub) {
                    found.push(sub);
                }
            }
            index += 1;
        }
        found
    }
}

impl fmt::Display for Category {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Grammar rule function
pub type Rule = fn(&mut Parser<'_>) -> ParseResult<Node>;

/// A registered rule
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub category: Category,
    /// Lower runs first
    pub priority: i32,
    pub name: &'static str,
    pub rule: Rule,
    sequence: usize,
}

impl RuleEntry {
    /// Registration order, used to break priority ties
    pub fn sequence(&self) -> usize {
        self.sequence
    }
}

/// Rule registry
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    entries: Vec<RuleEntry>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` as a way to produce `category`
    pub fn register(
        &mut self,
        category: Category,
        priority: i32,
        name: &'static str,
        rule: Rule,
    ) -> &mut Self {
        let sequence = self.entries.len();
        self.entries.push(RuleEntry {
            category,
            priority,
            name,
            rule,
            sequence,
        });
        self
    }

    /// Rules able to produce `category`, in trial order
    pub fn candidates(
        &self,
        category: Category,
    ) -> Vec<&RuleEntry> {
        let reachable = category.descendants();
        let mut candidates: Vec<&RuleEntry> = self
            .entries
            .iter()
            .filter(|entry| reachable.contains(&entry.category))
            .collect();
        candidates.sort_by_key(|entry| (entry.priority, entry.sequence));
        candidates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.iter()
    }
}
