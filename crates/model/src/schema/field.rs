use serde::{Deserialize, Serialize};

/// How a logical field maps onto a physical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDecl {
    /// Column named like the field, on the root table.
    Enabled(bool),
    /// Explicit column name on the root table.
    Column(String),
    Spec(FieldSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Join key of the table holding the column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Default filter type applied when a filter does not name one.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
}

impl FieldDecl {
    /// Physical column for the logical field `name`.
    pub fn column<'a>(&'a self, name: &'a str) -> &'a str {
        match self {
            FieldDecl::Enabled(_) => name,
            FieldDecl::Column(column) => column,
            FieldDecl::Spec(spec) => spec
                .field
                .as_deref()
                .filter(|f| !f.is_empty())
                .unwrap_or(name),
        }
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            FieldDecl::Spec(spec) => spec.table.as_deref().filter(|t| !t.is_empty()),
            _ => None,
        }
    }

    /// Output alias used when the field is selected.
    pub fn alias<'a>(&'a self, name: &'a str) -> &'a str {
        match self {
            FieldDecl::Spec(FieldSpec {
                alias: Some(alias), ..
            }) if !alias.is_empty() => alias,
            _ => name,
        }
    }

    pub fn filter_type(&self) -> Option<&str> {
        match self {
            FieldDecl::Spec(spec) => spec.filter_type.as_deref().filter(|t| !t.is_empty()),
            _ => None,
        }
    }
}
