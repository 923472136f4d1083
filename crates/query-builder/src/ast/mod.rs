pub mod common;
pub mod condition;
pub mod expr;
pub mod insert;
pub mod query;
