//! Provides a fluent builder for constructing `Insert` ASTs.

use crate::{
    ast::{
        common::TableRef,
        expr::Expr,
        insert::{Insert, OnConflict},
    },
    dialect::Dialect,
    render::{Render, Renderer},
};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    ast: Insert,
}

impl InsertBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: Insert {
                table,
                ..Default::default()
            },
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.ast.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Adds a row of values to the insert statement.
    /// This can be called multiple times for a batch insert.
    pub fn values(mut self, values: Vec<Expr>) -> Self {
        self.ast.values.push(values);
        self
    }

    /// Adds a row of bound parameter values.
    pub fn row(self, values: Vec<Value>) -> Self {
        self.values(values.into_iter().map(Expr::Value).collect())
    }

    /// Turns the insert into an upsert keyed on `key_columns`.
    pub fn on_conflict(mut self, key_columns: &[&str], update_columns: &[&str]) -> Self {
        self.ast.on_conflict = Some(OnConflict {
            key_columns: key_columns.iter().map(|s| s.to_string()).collect(),
            update_columns: update_columns.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> Insert {
        self.ast
    }

    pub fn render(&self, dialect: &dyn Dialect) -> (String, Vec<Value>) {
        let mut renderer = Renderer::new(dialect);
        self.ast.render(&mut renderer);
        renderer.finish()
    }
}
