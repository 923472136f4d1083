//! Plain-data inputs of the query compiler: the per-entity [`SchemaModel`]
//! and the per-call [`QuerySpec`], both loaded from JSON.

pub mod error;
pub mod schema;
pub mod spec;

pub use error::ModelError;
pub use schema::{ConditionList, FieldDecl, FieldSpec, FlagRef, JoinDecl, OnItem, SchemaModel};
pub use spec::QuerySpec;
