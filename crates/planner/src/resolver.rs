//! Logical field -> qualified column or flag expression.

use crate::error::QueryError;
use model::{
    FieldDecl, SchemaModel,
    schema::{FlagRef, ROOT_ALIAS},
};

/// A logical field resolved against the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub name: String,
    /// `alias.column`, or `(alias.column & mask)` for flags.
    pub column: String,
    /// Output alias when selected.
    pub alias: String,
    /// Bitmask when the field is a flag.
    pub mask: Option<i64>,
}

impl ResolvedField {
    pub fn is_flag(&self) -> bool {
        self.mask.is_some()
    }
}

/// Stateless resolver over one schema; cheap to create per compile pass.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    schema: &'a SchemaModel,
}

impl<'a> FieldResolver<'a> {
    pub fn new(schema: &'a SchemaModel) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a SchemaModel {
        self.schema
    }

    pub fn exists(&self, name: &str) -> bool {
        self.schema.has_field(name)
    }

    pub fn is_flag(&self, name: &str) -> bool {
        self.schema.is_flag(name)
    }

    pub fn unknown_field(&self, name: &str) -> QueryError {
        QueryError::InvalidFields(format!(
            "Unknown field '{name}', check {}.fields",
            self.schema.name
        ))
    }

    pub fn resolve(&self, name: &str) -> Result<ResolvedField, QueryError> {
        let decl = self
            .schema
            .field(name)
            .ok_or_else(|| self.unknown_field(name))?;

        if let Some(flag) = self.schema.flag(name) {
            return self.resolve_flag(name, flag);
        }

        Ok(ResolvedField {
            name: name.to_string(),
            column: self.qualified_column(name, decl),
            alias: decl.alias(name).to_string(),
            mask: None,
        })
    }

    /// Resolves a flag by name without requiring the flag itself to be
    /// declared as a field; only its carrier must be.
    pub fn resolve_flag_by_name(&self, name: &str) -> Result<ResolvedField, QueryError> {
        let flag = self
            .schema
            .flag(name)
            .ok_or_else(|| self.unknown_field(name))?;
        self.resolve_flag(name, flag)
    }

    fn resolve_flag(&self, name: &str, flag: FlagRef<'_>) -> Result<ResolvedField, QueryError> {
        let carrier = self
            .schema
            .field(flag.carrier)
            .ok_or_else(|| self.unknown_field(flag.carrier))?;

        if flag.mask <= 0 {
            return Err(QueryError::InvalidFlags(format!(
                "Flag '{name}' must have a positive bitmask, got {}, check {}.flags.{}",
                flag.mask, self.schema.name, flag.carrier
            )));
        }

        Ok(ResolvedField {
            name: name.to_string(),
            column: format!(
                "({} & {})",
                self.qualified_column(flag.carrier, carrier),
                flag.mask
            ),
            alias: name.to_string(),
            mask: Some(flag.mask),
        })
    }

    /// Falls back to the root alias when the declared join or its alias is missing.
    fn table_alias(&self, decl: &'a FieldDecl) -> &'a str {
        decl.table()
            .and_then(|key| self.schema.join(key))
            .and_then(|join| join.alias())
            .unwrap_or(ROOT_ALIAS)
    }

    fn qualified_column(&self, name: &str, decl: &'a FieldDecl) -> String {
        format!("{}.{}", self.table_alias(decl), decl.column(name))
    }
}
