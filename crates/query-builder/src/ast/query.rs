use super::{
    common::{JoinKind, OrderDir, TableRef},
    condition::ConditionGroup,
    expr::{Expr, Ident},
};

/// What a [`Query`] does with the rows its `FROM`/`JOIN`/`WHERE` clauses select.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryKind {
    #[default]
    Select,
    Update {
        assignments: Vec<Assignment>,
    },
    /// Deletes rows of the given alias (multi-table form when joins are present).
    Delete {
        target: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub kind: QueryKind,
    pub columns: Vec<Expr>,
    pub from: Option<FromClause>,
    pub joins: Vec<JoinClause>,
    pub where_clause: ConditionGroup,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub table: TableRef,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: TableRef,
    pub alias: Option<String>,
    pub on: ConditionGroup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: Option<OrderDir>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Ident,
    pub value: Expr,
}
