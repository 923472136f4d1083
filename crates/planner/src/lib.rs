//! Compiles declarative query specifications into statement-builder calls.
//!
//! A [`QueryCompiler`] resolves the logical fields of a [`SchemaModel`],
//! infers the joins a [`QuerySpec`] needs, validates every clause, and only
//! then emits the clauses against a [`StatementBuilder`].
//!
//! [`SchemaModel`]: model::SchemaModel
//! [`QuerySpec`]: model::QuerySpec
//! [`StatementBuilder`]: query_builder::StatementBuilder

pub mod compiler;
pub mod error;
pub mod filters;
pub mod group;
pub mod inference;
pub mod joins;
pub mod order;
pub mod pagination;
pub mod repository;
pub mod resolver;
pub mod select;
pub mod settings;


pub use compiler::{CompiledQuery, QueryCompiler};
pub use error::{ErrorCode, QueryError};
pub use repository::{Repository, driver::{Driver, DriverError, Row}};
pub use resolver::{FieldResolver, ResolvedField};
pub use settings::Settings;
