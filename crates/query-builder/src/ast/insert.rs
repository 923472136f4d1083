use super::{common::TableRef, expr::Expr};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Expr>>,
    pub on_conflict: Option<OnConflict>,
}

/// Upsert behaviour: on a key collision, overwrite `update_columns` with the
/// incoming row. How this is spelled is up to the dialect.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OnConflict {
    pub key_columns: Vec<String>,
    pub update_columns: Vec<String>,
}
