//! Defines the core rendering trait and context for converting AST to SQL.

use crate::{ast::common::TableRef, dialect::Dialect};
use serde_json::Value;

pub mod condition;
pub mod expr;
pub mod insert;
pub mod query;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the parameters, and provides
/// access to the dialect for syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub fn add_param(&mut self, value: Value) {
        self.params.push(value);
        let placeholder = self.dialect.get_placeholder(self.params.len() - 1);
        self.sql.push_str(&placeholder);
    }

    /// Appends a raw fragment, binding each `?` marker to the next parameter
    /// so placeholders stay numbered across the whole statement.
    pub fn push_raw(&mut self, sql: &str, params: &[Value]) {
        let mut params = params.iter();
        for ch in sql.chars() {
            if ch == '?' {
                if let Some(param) = params.next() {
                    self.add_param(param.clone());
                    continue;
                }
            }
            self.sql.push(ch);
        }
    }

    pub fn push_quoted(&mut self, ident: &str) {
        let quoted = self.dialect.quote_identifier(ident);
        self.sql.push_str(&quoted);
    }

    pub fn push_table(&mut self, table: &TableRef, alias: Option<&str>) {
        if let Some(schema) = &table.schema {
            self.push_quoted(schema);
            self.sql.push('.');
        }
        self.push_quoted(&table.name);
        if let Some(alias) = alias {
            self.sql.push_str(" AS ");
            self.push_quoted(alias);
        }
    }

    pub fn push_list<T: Render>(&mut self, items: &[T]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            item.render(self);
        }
    }
}
