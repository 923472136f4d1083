use crate::spec::is_truthy;
use serde::Deserialize;
use serde_json::{Map, Value};

/// A join declaration as written in the schema.
///
/// Loading never rejects a join by its shape: a declaration that is not an
/// object, or whose `on`/`orOn` is not a list, is kept as written and
/// rejected by the join compiler once a query actually uses that join.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct JoinDecl {
    /// Physical table; the join key when absent.
    pub table: Option<String>,
    pub alias: Option<String>,
    pub method: Option<String>,
    pub on: Option<ConditionList>,
    pub or_on: Option<ConditionList>,
    /// The declaration itself when it is not an object.
    pub malformed: Option<Value>,
}

/// The value of `on` or `orOn`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionList {
    Items(Vec<OnItem>),
    Invalid(Value),
}

/// One element of an `on`/`orOn` list: either part of a single
/// `[a, (op,) b]` condition, or a whole condition in a multi-condition list.
#[derive(Debug, Clone, PartialEq)]
pub enum OnItem {
    Field(String),
    Condition(Vec<String>),
    Invalid(Value),
}

impl JoinDecl {
    pub fn table_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.table
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(key)
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|a| !a.is_empty())
    }
}

impl From<Value> for JoinDecl {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return JoinDecl {
                malformed: Some(value),
                ..Default::default()
            };
        };

        JoinDecl {
            table: text(&map, "table"),
            alias: text(&map, "alias"),
            method: text(&map, "method"),
            on: conditions(&map, "on"),
            or_on: conditions(&map, "orOn"),
            malformed: None,
        }
    }
}

impl From<&Value> for OnItem {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(field) => OnItem::Field(field.clone()),
            Value::Array(parts) => parts
                .iter()
                .map(|p| p.as_str().map(String::from))
                .collect::<Option<Vec<_>>>()
                .map(OnItem::Condition)
                .unwrap_or_else(|| OnItem::Invalid(value.clone())),
            other => OnItem::Invalid(other.clone()),
        }
    }
}

/// Falsy members count as absent; other scalars keep their JSON text.
fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        value if !is_truthy(value) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn conditions(map: &Map<String, Value>, key: &str) -> Option<ConditionList> {
    match map.get(key)? {
        value if !is_truthy(value) => None,
        Value::Array(items) => Some(ConditionList::Items(
            items.iter().map(OnItem::from).collect(),
        )),
        other => Some(ConditionList::Invalid(other.clone())),
    }
}
