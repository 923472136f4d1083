//! Shapes of the individual specification members.
//!
//! Each enum keeps an `Invalid` catch-all instead of failing deserialization,
//! so a malformed member is rejected later by the compiler that owns it, with
//! that compiler's error kind.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldsParam {
    Toggle(bool),
    Names(Vec<String>),
    Invalid(Value),
}

/// An aggregate directive (`count`, `min`, `max`, `sum`, `avg`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum AggregateParam {
    /// `true` aggregates over `*`; `false` skips the directive.
    All(bool),
    Field(String),
    Spec {
        field: Option<String>,
        alias: Option<String>,
    },
    Invalid(Value),
}

impl From<Value> for AggregateParam {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(all) => AggregateParam::All(all),
            Value::String(field) => AggregateParam::Field(field),
            Value::Object(map) => {
                let text = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                };
                AggregateParam::Spec {
                    field: text("field"),
                    alias: text("alias"),
                }
            }
            other => AggregateParam::Invalid(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OrderParam {
    /// A bare field, ordered ascending.
    Field(String),
    /// Field -> direction; directions are validated by the order compiler.
    Directions(IndexMap<String, Value>),
    Invalid(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GroupParam {
    Toggle(bool),
    Field(String),
    Fields(Vec<String>),
    Invalid(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum JoinsParam {
    Keys(Vec<String>),
    Invalid(Value),
}
