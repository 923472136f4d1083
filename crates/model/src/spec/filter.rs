use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// One conjunctive group: field name -> filter.
pub type FilterGroup = IndexMap<String, FilterValue>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Filters {
    /// A single map, compiled as one `AND` group.
    Group(FilterGroup),
    /// Each map is one `OR` branch.
    Branches(Vec<FilterGroup>),
    Invalid(Value),
}

impl Filters {
    /// Every field referenced across all groups, in order of appearance.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Filters::Group(group) => group.keys().map(String::as_str).collect(),
            Filters::Branches(branches) => branches
                .iter()
                .flat_map(|group| group.keys().map(String::as_str))
                .collect(),
            Filters::Invalid(_) => Vec::new(),
        }
    }
}

/// The right-hand side of a filter entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum FilterValue {
    /// A scalar or array used directly as the value.
    Bare(Value),
    /// An object carrying `type` and/or `value`.
    Spec(FilterSpec),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub filter_type: Option<String>,
    pub value: Option<Value>,
    /// The object as written, used as the value when `value` is absent.
    pub raw: Value,
}

impl FilterValue {
    pub fn filter_type(&self) -> Option<&str> {
        match self {
            FilterValue::Spec(spec) => spec.filter_type.as_deref(),
            FilterValue::Bare(_) => None,
        }
    }

    /// `value` when given, otherwise the filter itself.
    pub fn value(&self) -> &Value {
        match self {
            FilterValue::Bare(value) => value,
            FilterValue::Spec(spec) => spec.value.as_ref().unwrap_or(&spec.raw),
        }
    }

    pub fn has_explicit_value(&self) -> bool {
        match self {
            FilterValue::Bare(_) => true,
            FilterValue::Spec(spec) => spec.value.is_some(),
        }
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        let Value::Object(map) = &value else {
            return FilterValue::Bare(value);
        };
        if !map.contains_key("type") && !map.contains_key("value") {
            return FilterValue::Bare(value);
        }

        let filter_type = match map.get("type") {
            Some(Value::String(t)) if !t.is_empty() => Some(t.clone()),
            Some(other) if super::is_truthy(other) => Some(other.to_string()),
            _ => None,
        };
        let explicit = map.get("value").filter(|v| !v.is_null()).cloned();

        FilterValue::Spec(FilterSpec {
            filter_type,
            value: explicit,
            raw: value,
        })
    }
}
