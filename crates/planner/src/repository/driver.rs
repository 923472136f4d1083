use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// One fetched row, column name -> value.
pub type Row = Map<String, Value>;

/// Failures reported by a database driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// A unique or primary key was violated.
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// The database seam used by [`Repository`](super::Repository).
///
/// Statements arrive rendered for the configured dialect, with their bind
/// parameters in placeholder order.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Physical column names of `table`, which may be database-qualified.
    async fn columns(&self, table: &str) -> Result<Vec<String>, DriverError>;

    async fn fetch(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, DriverError>;

    /// Runs a statement and returns the number of affected rows.
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64, DriverError>;
}
