use crate::error::ModelError;
use serde::Deserialize;
use serde_json::Value;

pub mod filter;
pub mod params;

pub use filter::{FilterGroup, FilterSpec, FilterValue, Filters};
pub use params::{AggregateParam, FieldsParam, GroupParam, JoinsParam, OrderParam};

/// A declarative query, supplied per call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    /// Absent selects `t.*` plus flags; `false` selects nothing.
    #[serde(default)]
    pub fields: Option<FieldsParam>,
    /// Appended to `t.*`, only when `fields` is absent.
    #[serde(default)]
    pub extra_fields: Option<Value>,
    #[serde(default)]
    pub count: Option<AggregateParam>,
    #[serde(default)]
    pub min: Option<AggregateParam>,
    #[serde(default)]
    pub max: Option<AggregateParam>,
    #[serde(default)]
    pub sum: Option<AggregateParam>,
    #[serde(default)]
    pub avg: Option<AggregateParam>,
    #[serde(default)]
    pub filters: Option<Filters>,
    #[serde(default)]
    pub order: Option<params::OrderParam>,
    #[serde(default)]
    pub group: Option<params::GroupParam>,
    /// Join keys; recomputed by join inference before a select is compiled.
    #[serde(default)]
    pub joins: Option<params::JoinsParam>,
    #[serde(default)]
    pub limit: Option<Value>,
    #[serde(default)]
    pub page: Option<Value>,
    #[serde(default)]
    pub offset: Option<Value>,
    #[serde(default)]
    pub no_flags: bool,
    #[serde(default)]
    pub debug: bool,
    /// Overrides the schema's root table for this call.
    #[serde(default)]
    pub table: Option<String>,
}

impl QuerySpec {
    pub fn from_json(input: &str) -> Result<Self, ModelError> {
        serde_json::from_str(input).map_err(ModelError::Spec)
    }

    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        serde_json::from_value(value).map_err(ModelError::Spec)
    }

    /// The aggregate directive named `name` (`count`, `min`, `max`, `sum`, `avg`).
    pub fn aggregate(&self, name: &str) -> Option<&AggregateParam> {
        match name {
            "count" => self.count.as_ref(),
            "min" => self.min.as_ref(),
            "max" => self.max.as_ref(),
            "sum" => self.sum.as_ref(),
            "avg" => self.avg.as_ref(),
            _ => None,
        }
    }

    /// Whether any member other than `joins` is set.
    pub fn is_empty(&self) -> bool {
        let Self {
            fields,
            extra_fields,
            count,
            min,
            max,
            sum,
            avg,
            filters,
            order,
            group,
            joins: _,
            limit,
            page,
            offset,
            no_flags,
            debug,
            table,
        } = self;

        fields.is_none()
            && extra_fields.is_none()
            && [count, min, max, sum, avg].iter().all(|a| a.is_none())
            && filters.is_none()
            && order.is_none()
            && group.is_none()
            && limit.is_none()
            && page.is_none()
            && offset.is_none()
            && !no_flags
            && !debug
            && table.is_none()
    }
}

/// Loose truthiness of a JSON value: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
