//! Fluent SQL statement building.
//!
//! The [`StatementBuilder`] family of traits is the surface a compiler emits
//! against. [`Statement`] and [`InsertBuilder`] are the AST-backed
//! implementations, rendered to SQL plus bind parameters through a [`Dialect`].

use crate::ast::expr::{Expr, Ident};
use serde_json::Value;

pub mod ast;
pub mod build;
pub mod dialect;
pub mod render;

pub use build::{
    ConditionBuilder, JoinConditionBuilder, StatementBuilder, insert::InsertBuilder,
    statement::Statement,
};
pub use dialect::{Dialect, DialectError, DialectKind, MySql, Postgres};

/// Builds an identifier expression from a possibly qualified column such as `t.id`.
pub fn ident(name: &str) -> Expr {
    Expr::Identifier(Ident::parse(name))
}

pub fn value(val: Value) -> Expr {
    Expr::Value(val)
}
