//! The fluent builder surface.
//!
//! Compilers emit against [`StatementBuilder`] rather than a concrete type, so
//! a statement can be rendered, recorded, or forwarded elsewhere.

use crate::{
    ast::{
        common::{AggregateFn, AggregateTarget, CompareOp, JoinKind, OrderDir, SelectColumn},
        condition::{Condition, ConditionGroup},
    },
    ident, value,
};
use serde_json::Value;

pub mod insert;
pub mod statement;

pub trait StatementBuilder {
    fn select(&mut self, columns: &[SelectColumn]);

    fn select_raw(&mut self, sql: &str);

    fn aggregate(&mut self, function: AggregateFn, target: AggregateTarget, alias: &str);

    /// Appends a parenthesized group joined to the existing `WHERE` with `AND`.
    fn where_group(&mut self, build: &mut dyn FnMut(&mut dyn ConditionBuilder));

    /// Appends a parenthesized group joined to the existing `WHERE` with `OR`.
    fn or_where_group(&mut self, build: &mut dyn FnMut(&mut dyn ConditionBuilder));

    fn join(
        &mut self,
        kind: JoinKind,
        table: &str,
        alias: &str,
        build: &mut dyn FnMut(&mut dyn JoinConditionBuilder),
    );

    fn order_by(&mut self, column: &str, direction: OrderDir);

    fn order_by_raw(&mut self, sql: &str);

    fn group_by(&mut self, column: &str);

    fn group_by_raw(&mut self, sql: &str);

    fn limit(&mut self, limit: u64);

    fn offset(&mut self, offset: u64);

    /// Human-readable SQL for logging.
    fn sql(&self) -> String;
}

/// Conditions inside a `WHERE` group. Successive calls are joined with `AND`.
pub trait ConditionBuilder {
    fn where_clause(&mut self, column: &str, op: CompareOp, value: Value);

    fn where_not(&mut self, column: &str, value: Value);

    fn where_in(&mut self, column: &str, values: Vec<Value>);

    fn where_not_in(&mut self, column: &str, values: Vec<Value>);

    fn where_null(&mut self, column: &str);

    fn where_not_null(&mut self, column: &str);

    fn where_between(&mut self, column: &str, low: Value, high: Value);

    fn where_not_between(&mut self, column: &str, low: Value, high: Value);

    fn where_raw(&mut self, sql: &str, params: Vec<Value>);
}

pub trait JoinConditionBuilder {
    fn on(&mut self, left: &str, op: CompareOp, right: &str);

    fn or_on(&mut self, left: &str, op: CompareOp, right: &str);
}

impl ConditionBuilder for ConditionGroup {
    fn where_clause(&mut self, column: &str, op: CompareOp, val: Value) {
        self.and(Condition::Compare {
            left: ident(column),
            op,
            right: value(val),
        });
    }

    fn where_not(&mut self, column: &str, val: Value) {
        self.and(Condition::Not(Box::new(Condition::Compare {
            left: ident(column),
            op: CompareOp::Eq,
            right: value(val),
        })));
    }

    fn where_in(&mut self, column: &str, values: Vec<Value>) {
        self.and(Condition::InList {
            expr: ident(column),
            values: values.into_iter().map(value).collect(),
            negated: false,
        });
    }

    fn where_not_in(&mut self, column: &str, values: Vec<Value>) {
        self.and(Condition::InList {
            expr: ident(column),
            values: values.into_iter().map(value).collect(),
            negated: true,
        });
    }

    fn where_null(&mut self, column: &str) {
        self.and(Condition::IsNull {
            expr: ident(column),
            negated: false,
        });
    }

    fn where_not_null(&mut self, column: &str) {
        self.and(Condition::IsNull {
            expr: ident(column),
            negated: true,
        });
    }

    fn where_between(&mut self, column: &str, low: Value, high: Value) {
        self.and(Condition::Between {
            expr: ident(column),
            low: value(low),
            high: value(high),
            negated: false,
        });
    }

    fn where_not_between(&mut self, column: &str, low: Value, high: Value) {
        self.and(Condition::Between {
            expr: ident(column),
            low: value(low),
            high: value(high),
            negated: true,
        });
    }

    fn where_raw(&mut self, sql: &str, params: Vec<Value>) {
        self.and(Condition::Raw {
            sql: sql.to_string(),
            params,
        });
    }
}

impl JoinConditionBuilder for ConditionGroup {
    fn on(&mut self, left: &str, op: CompareOp, right: &str) {
        self.and(Condition::Compare {
            left: ident(left),
            op,
            right: ident(right),
        });
    }

    fn or_on(&mut self, left: &str, op: CompareOp, right: &str) {
        self.or(Condition::Compare {
            left: ident(left),
            op,
            right: ident(right),
        });
    }
}
