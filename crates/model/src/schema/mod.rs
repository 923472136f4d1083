use crate::error::ModelError;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

pub mod field;
pub mod join;

pub use field::{FieldDecl, FieldSpec};
pub use join::{ConditionList, JoinDecl, OnItem};

/// Root table alias every compiled statement uses.
pub const ROOT_ALIAS: &str = "t";

/// Field, flag and join declarations of one entity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchemaModel {
    #[serde(default)]
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDecl>,
    /// Carrier field -> flag name -> bitmask.
    #[serde(default)]
    pub flags: IndexMap<String, IndexMap<String, i64>>,
    #[serde(default)]
    pub joins: IndexMap<String, JoinDecl>,
}

/// A flag field located in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagRef<'a> {
    pub carrier: &'a str,
    pub mask: i64,
}

impl SchemaModel {
    pub fn from_json(input: &str) -> Result<Self, ModelError> {
        let model: SchemaModel = serde_json::from_str(input).map_err(ModelError::Schema)?;
        model.normalized()
    }

    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        let model: SchemaModel = serde_json::from_value(value).map_err(ModelError::Schema)?;
        model.normalized()
    }

    fn normalized(mut self) -> Result<Self, ModelError> {
        if self.table.trim().is_empty() {
            return Err(ModelError::MissingTable(self.name));
        }
        if self.name.is_empty() {
            self.name = self.table.clone();
        }
        Ok(self)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Joins, filters, order and group are only compiled for models with fields.
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Looks `name` up across every carrier's flags.
    pub fn flag(&self, name: &str) -> Option<FlagRef<'_>> {
        self.flags.iter().find_map(|(carrier, flags)| {
            flags.get(name).map(|mask| FlagRef {
                carrier,
                mask: *mask,
            })
        })
    }

    pub fn is_flag(&self, name: &str) -> bool {
        self.flag(name).is_some()
    }

    /// All flag names, in declaration order.
    pub fn flag_names(&self) -> impl Iterator<Item = &str> {
        self.flags
            .values()
            .flat_map(|flags| flags.keys().map(String::as_str))
    }

    /// Join key a field lives behind, if it is declared on a joined table.
    pub fn join_key_of(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(FieldDecl::table)
    }

    pub fn join(&self, key: &str) -> Option<&JoinDecl> {
        self.joins.get(key)
    }
}
