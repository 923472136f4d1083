//! AST-backed [`StatementBuilder`] for `SELECT`, `UPDATE` and `DELETE`.

use super::{ConditionBuilder, JoinConditionBuilder, StatementBuilder};
use crate::{
    ast::{
        common::{
            AggregateFn, AggregateTarget, Conjunction, JoinKind, OrderDir, SelectColumn, TableRef,
        },
        condition::{Condition, ConditionGroup},
        expr::{Expr, FunctionCall, Ident},
        query::{Assignment, FromClause, JoinClause, OrderByExpr, Query, QueryKind},
    },
    dialect::DialectKind,
    ident,
    render::{Render, Renderer},
    value,
};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Statement {
    ast: Query,
    dialect: DialectKind,
}

impl Statement {
    pub fn from_table(table: TableRef, alias: &str, dialect: DialectKind) -> Self {
        Self::with_kind(QueryKind::Select, table, alias, dialect)
    }

    /// An `UPDATE` whose assignment columns are given qualified, e.g. `t.name`.
    pub fn update(
        table: TableRef,
        alias: &str,
        assignments: Vec<(String, Value)>,
        dialect: DialectKind,
    ) -> Self {
        let assignments = assignments
            .into_iter()
            .map(|(column, val)| Assignment {
                column: Ident::parse(&column),
                value: value(val),
            })
            .collect();
        Self::with_kind(QueryKind::Update { assignments }, table, alias, dialect)
    }

    /// A `DELETE` of the rows bound to `alias`.
    pub fn delete(table: TableRef, alias: &str, dialect: DialectKind) -> Self {
        let kind = QueryKind::Delete {
            target: alias.to_string(),
        };
        Self::with_kind(kind, table, alias, dialect)
    }

    fn with_kind(kind: QueryKind, table: TableRef, alias: &str, dialect: DialectKind) -> Self {
        Self {
            ast: Query {
                kind,
                from: Some(FromClause {
                    table,
                    alias: Some(alias.to_string()),
                }),
                ..Default::default()
            },
            dialect,
        }
    }

    pub fn ast(&self) -> &Query {
        &self.ast
    }

    pub fn dialect(&self) -> DialectKind {
        self.dialect
    }

    /// Finalizes and returns the constructed `Query` AST.
    pub fn build(self) -> Query {
        self.ast
    }

    /// Renders the statement to SQL text plus its bind parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut renderer = Renderer::new(self.dialect.dialect());
        self.ast.render(&mut renderer);
        renderer.finish()
    }

    fn push_where_group(
        &mut self,
        conjunction: Conjunction,
        build: &mut dyn FnMut(&mut dyn ConditionBuilder),
    ) {
        let mut group = ConditionGroup::new();
        build(&mut group);
        if !group.is_empty() {
            self.ast
                .where_clause
                .push(conjunction, Condition::Group(group));
        }
    }
}

impl StatementBuilder for Statement {
    fn select(&mut self, columns: &[SelectColumn]) {
        self.ast.columns.extend(columns.iter().map(|c| {
            let expr = ident(&c.column);
            match &c.alias {
                Some(alias) => expr.alias(alias),
                None => expr,
            }
        }));
    }

    fn select_raw(&mut self, sql: &str) {
        self.ast.columns.push(Expr::raw(sql));
    }

    fn aggregate(&mut self, function: AggregateFn, target: AggregateTarget, alias: &str) {
        let (args, wildcard) = match target {
            AggregateTarget::All => (Vec::new(), true),
            AggregateTarget::Column(column) => (vec![ident(&column)], false),
            AggregateTarget::Raw(sql) => (vec![Expr::raw(&sql)], false),
        };
        let call = Expr::FunctionCall(FunctionCall {
            name: function.sql_name().to_string(),
            args,
            wildcard,
        });
        self.ast.columns.push(call.alias(alias));
    }

    fn where_group(&mut self, build: &mut dyn FnMut(&mut dyn ConditionBuilder)) {
        self.push_where_group(Conjunction::And, build);
    }

    fn or_where_group(&mut self, build: &mut dyn FnMut(&mut dyn ConditionBuilder)) {
        self.push_where_group(Conjunction::Or, build);
    }

    fn join(
        &mut self,
        kind: JoinKind,
        table: &str,
        alias: &str,
        build: &mut dyn FnMut(&mut dyn JoinConditionBuilder),
    ) {
        let mut on = ConditionGroup::new();
        build(&mut on);
        self.ast.joins.push(JoinClause {
            kind,
            table: TableRef::new(table),
            alias: Some(alias.to_string()),
            on,
        });
    }

    fn order_by(&mut self, column: &str, direction: OrderDir) {
        self.ast.order_by.push(OrderByExpr {
            expr: ident(column),
            direction: Some(direction),
        });
    }

    fn order_by_raw(&mut self, sql: &str) {
        self.ast.order_by.push(OrderByExpr {
            expr: Expr::raw(sql),
            direction: None,
        });
    }

    fn group_by(&mut self, column: &str) {
        self.ast.group_by.push(ident(column));
    }

    fn group_by_raw(&mut self, sql: &str) {
        self.ast.group_by.push(Expr::raw(sql));
    }

    fn limit(&mut self, limit: u64) {
        self.ast.limit = Some(limit);
    }

    fn offset(&mut self, offset: u64) {
        self.ast.offset = Some(offset);
    }

    fn sql(&self) -> String {
        self.to_sql().0
    }
}
