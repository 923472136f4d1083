//! Defines the `Dialect` trait for database-specific SQL syntax.

use crate::ast::insert::OnConflict;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - PostgreSQL uses double quotes: `"my_column"`
    /// - MySQL uses backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    /// - MySQL uses `?`
    fn get_placeholder(&self, index: usize) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> String;

    /// Renders the upsert tail of an `INSERT`, including its leading space.
    fn upsert_clause(&self, on_conflict: &OnConflict) -> String;

    /// Whether `UPDATE ... SET` targets may carry a table qualifier.
    fn qualified_assignments(&self) -> bool;

    /// Whether `UPDATE`/`DELETE` accept inline `JOIN` clauses
    /// (`DELETE t FROM a AS t LEFT JOIN ...`) rather than `FROM`/`USING` lists.
    fn joins_in_mutations(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident)
    }

    fn get_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc.
        format!("${}", index + 1)
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }

    fn upsert_clause(&self, on_conflict: &OnConflict) -> String {
        let keys = on_conflict
            .key_columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        let updates = on_conflict
            .update_columns
            .iter()
            .filter(|c| !on_conflict.key_columns.contains(c))
            .map(|c| {
                let quoted = self.quote_identifier(c);
                format!("{quoted} = EXCLUDED.{quoted}")
            })
            .collect::<Vec<_>>();

        if updates.is_empty() {
            format!(" ON CONFLICT ({keys}) DO NOTHING")
        } else {
            format!(" ON CONFLICT ({keys}) DO UPDATE SET {}", updates.join(", "))
        }
    }

    fn qualified_assignments(&self) -> bool {
        false
    }

    fn joins_in_mutations(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#"`{}`"#, ident)
    }

    fn get_placeholder(&self, _index: usize) -> String {
        // MySQL uses ?
        "?".into()
    }

    fn name(&self) -> String {
        "MySQL".into()
    }

    fn upsert_clause(&self, on_conflict: &OnConflict) -> String {
        let updates = on_conflict
            .update_columns
            .iter()
            .map(|c| {
                let quoted = self.quote_identifier(c);
                if on_conflict.key_columns.contains(c) {
                    // keeps LAST_INSERT_ID() pointing at the touched row
                    format!("{quoted} = LAST_INSERT_ID({quoted})")
                } else {
                    format!("{quoted} = VALUES({quoted})")
                }
            })
            .collect::<Vec<_>>();

        if updates.is_empty() {
            return String::new();
        }
        format!(" ON DUPLICATE KEY UPDATE {}", updates.join(", "))
    }

    fn qualified_assignments(&self) -> bool {
        true
    }

    fn joins_in_mutations(&self) -> bool {
        true
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported SQL dialect: '{0}'")]
pub struct DialectError(pub String);

/// Serializable selector for the dialects this crate ships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
}

static MYSQL: MySql = MySql;
static POSTGRES: Postgres = Postgres;

impl DialectKind {
    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            DialectKind::MySql => &MYSQL,
            DialectKind::Postgres => &POSTGRES,
        }
    }
}

impl FromStr for DialectKind {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            other => Err(DialectError(other.to_string())),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectKind::MySql => write!(f, "mysql"),
            DialectKind::Postgres => write!(f, "postgres"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert() -> OnConflict {
        OnConflict {
            key_columns: vec!["id".into()],
            update_columns: vec!["id".into(), "name".into(), "date_modified".into()],
        }
    }

    #[test]
    fn test_parse_dialect_kind() {
        assert_eq!("MySQL".parse::<DialectKind>(), Ok(DialectKind::MySql));
        assert_eq!("pg".parse::<DialectKind>(), Ok(DialectKind::Postgres));
        assert_eq!(
            "oracle".parse::<DialectKind>(),
            Err(DialectError("oracle".into()))
        );
    }

    #[test]
    fn test_mysql_upsert_clause() {
        assert_eq!(
            MySql.upsert_clause(&upsert()),
            " ON DUPLICATE KEY UPDATE `id` = LAST_INSERT_ID(`id`), `name` = VALUES(`name`), `date_modified` = VALUES(`date_modified`)"
        );
    }

    #[test]
    fn test_postgres_upsert_clause() {
        assert_eq!(
            Postgres.upsert_clause(&upsert()),
            r#" ON CONFLICT ("id") DO UPDATE SET "name" = EXCLUDED."name", "date_modified" = EXCLUDED."date_modified""#
        );
    }
}
