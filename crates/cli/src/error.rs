use model::ModelError;
use planner::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to load input document: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to compile the query specification: {0}")]
    Query(#[from] QueryError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid dialect provided: {0}")]
    InvalidDialect(String),
}
