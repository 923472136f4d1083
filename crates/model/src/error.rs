use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Malformed schema model: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("Malformed query specification: {0}")]
    Spec(#[source] serde_json::Error),

    #[error("Schema model '{0}' must declare a table")]
    MissingTable(String),
}
