use crate::error::QueryError;
use query_builder::DialectKind;
use serde::Deserialize;

pub const DIALECT_VAR: &str = "SPECQL_DIALECT";
pub const DATABASE_VAR: &str = "SPECQL_DATABASE";

/// Per-deployment knobs shared by the compiler facade and the repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub dialect: DialectKind,
    /// Qualifies the root table as `<database>.<table>`.
    pub database: Option<String>,
    /// Columns filled with the current UNIX time when an inserted item omits them.
    pub date_fields: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dialect: DialectKind::default(),
            database: None,
            date_fields: vec!["date_created".to_string(), "date_modified".to_string()],
        }
    }
}

impl Settings {
    pub fn from_json(input: &str) -> Result<Self, QueryError> {
        serde_json::from_str(input)
            .map_err(|e| QueryError::InvalidKnex(format!("Invalid settings: {e}")))
    }

    /// Defaults overlaid with `SPECQL_DIALECT` and `SPECQL_DATABASE`.
    pub fn from_env() -> Result<Self, QueryError> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, QueryError> {
        if let Some(dialect) = lookup(DIALECT_VAR).filter(|v| !v.trim().is_empty()) {
            self.dialect = dialect.trim().parse()?;
        }
        if let Some(database) = lookup(DATABASE_VAR).filter(|v| !v.trim().is_empty()) {
            self.database = Some(database.trim().to_string());
        }
        Ok(self)
    }

    pub fn is_date_field(&self, column: &str) -> bool {
        self.date_fields.iter().any(|f| f == column)
    }
}
