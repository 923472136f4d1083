//! Boolean condition trees used by `WHERE` and `ON` clauses.

use super::{
    common::{CompareOp, Conjunction},
    expr::Expr,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    Not(Box<Condition>),
    InList {
        expr: Expr,
        values: Vec<Expr>,
        negated: bool,
    },
    IsNull {
        expr: Expr,
        negated: bool,
    },
    Between {
        expr: Expr,
        low: Expr,
        high: Expr,
        negated: bool,
    },
    Raw {
        sql: String,
        params: Vec<Value>,
    },
    /// A parenthesized sub-group.
    Group(ConditionGroup),
}

/// An ordered list of conditions, each attached with its conjunction.
/// The conjunction of the first item is never rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionGroup {
    pub items: Vec<(Conjunction, Condition)>,
}

impl ConditionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, conjunction: Conjunction, condition: Condition) {
        self.items.push((conjunction, condition));
    }

    pub fn and(&mut self, condition: Condition) {
        self.push(Conjunction::And, condition);
    }

    pub fn or(&mut self, condition: Condition) {
        self.push(Conjunction::Or, condition);
    }
}
