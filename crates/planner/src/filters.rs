//! Filter types and the `WHERE` clause compiler.

use crate::{error::QueryError, resolver::FieldResolver};
use model::spec::{FilterGroup, FilterValue, Filters, is_truthy};
use query_builder::{ConditionBuilder, StatementBuilder, ast::common::CompareOp};
use serde_json::Value;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Equal,
    NotEqual,
    FlagEqual,
    Greater,
    GreaterOrEqual,
    Lesser,
    LesserOrEqual,
    Search,
    Between,
    NotBetween,
    Null,
    NotNull,
}

/// The policy a filter type compiles with. Each variant carries exactly
/// what its emission needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Equality against one value, or membership in a list.
    Set { negated: bool },
    /// Bit test against a flag mask.
    Flag,
    /// A single-value comparison.
    Range { operator: CompareOp },
    /// A single-value pattern match; the value is wrapped in prefix/suffix.
    Pattern {
        operator: CompareOp,
        prefix: &'static str,
        suffix: &'static str,
    },
    /// A fixed-arity array of bounds.
    Interval { negated: bool, arity: usize },
    /// No value at all.
    Nullness { negated: bool },
}

impl FilterType {
    pub fn name(&self) -> &'static str {
        match self {
            FilterType::Equal => "equal",
            FilterType::NotEqual => "notEqual",
            FilterType::FlagEqual => "flagEqual",
            FilterType::Greater => "greater",
            FilterType::GreaterOrEqual => "greaterOrEqual",
            FilterType::Lesser => "lesser",
            FilterType::LesserOrEqual => "lesserOrEqual",
            FilterType::Search => "search",
            FilterType::Between => "between",
            FilterType::NotBetween => "notBetween",
            FilterType::Null => "null",
            FilterType::NotNull => "notNull",
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterType::Equal => FilterKind::Set { negated: false },
            FilterType::NotEqual => FilterKind::Set { negated: true },
            FilterType::FlagEqual => FilterKind::Flag,
            FilterType::Greater => FilterKind::Range {
                operator: CompareOp::Gt,
            },
            FilterType::GreaterOrEqual => FilterKind::Range {
                operator: CompareOp::GtEq,
            },
            FilterType::Lesser => FilterKind::Range {
                operator: CompareOp::Lt,
            },
            FilterType::LesserOrEqual => FilterKind::Range {
                operator: CompareOp::LtEq,
            },
            FilterType::Search => FilterKind::Pattern {
                operator: CompareOp::Like,
                prefix: "%",
                suffix: "%",
            },
            FilterType::Between => FilterKind::Interval {
                negated: false,
                arity: 2,
            },
            FilterType::NotBetween => FilterKind::Interval {
                negated: true,
                arity: 2,
            },
            FilterType::Null => FilterKind::Nullness { negated: false },
            FilterType::NotNull => FilterKind::Nullness { negated: true },
        }
    }
}

impl FromStr for FilterType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "equal" => FilterType::Equal,
            "notEqual" => FilterType::NotEqual,
            "flagEqual" => FilterType::FlagEqual,
            "greater" => FilterType::Greater,
            "greaterOrEqual" => FilterType::GreaterOrEqual,
            "lesser" => FilterType::Lesser,
            "lesserOrEqual" => FilterType::LesserOrEqual,
            "search" => FilterType::Search,
            "between" => FilterType::Between,
            "notBetween" => FilterType::NotBetween,
            "null" => FilterType::Null,
            "notNull" => FilterType::NotNull,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FilterKind {
    pub fn allows_multiple(&self) -> bool {
        matches!(self, FilterKind::Set { .. } | FilterKind::Interval { .. })
    }

    pub fn needs_value(&self) -> bool {
        !matches!(self, FilterKind::Nullness { .. })
    }
}

/// One validated condition, ready for emission.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    Compare {
        column: String,
        operator: CompareOp,
        value: Value,
    },
    Not {
        column: String,
        value: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },
    Between {
        column: String,
        low: Value,
        high: Value,
        negated: bool,
    },
    Null {
        column: String,
        negated: bool,
    },
    Raw {
        sql: String,
        params: Vec<Value>,
    },
}

impl FilterCondition {
    pub fn apply(&self, builder: &mut dyn ConditionBuilder) {
        match self {
            FilterCondition::Compare {
                column,
                operator,
                value,
            } => builder.where_clause(column, *operator, value.clone()),
            FilterCondition::Not { column, value } => builder.where_not(column, value.clone()),
            FilterCondition::In {
                column,
                values,
                negated: false,
            } => builder.where_in(column, values.clone()),
            FilterCondition::In {
                column,
                values,
                negated: true,
            } => builder.where_not_in(column, values.clone()),
            FilterCondition::Between {
                column,
                low,
                high,
                negated: false,
            } => builder.where_between(column, low.clone(), high.clone()),
            FilterCondition::Between {
                column,
                low,
                high,
                negated: true,
            } => builder.where_not_between(column, low.clone(), high.clone()),
            FilterCondition::Null {
                column,
                negated: false,
            } => builder.where_null(column),
            FilterCondition::Null {
                column,
                negated: true,
            } => builder.where_not_null(column),
            FilterCondition::Raw { sql, params } => builder.where_raw(sql, params.clone()),
        }
    }
}

/// Validated filters: one `AND` group, or several `OR` branches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterClause {
    pub groups: Vec<Vec<FilterCondition>>,
    pub disjunctive: bool,
}

impl FilterClause {
    pub fn compile(
        resolver: &FieldResolver<'_>,
        filters: Option<&Filters>,
    ) -> Result<Self, QueryError> {
        let Some(filters) = filters else {
            return Ok(Self::default());
        };

        match filters {
            Filters::Group(group) if group.is_empty() => Ok(Self::default()),
            Filters::Group(group) => Ok(Self {
                groups: vec![compile_group(resolver, group)?],
                disjunctive: false,
            }),
            Filters::Branches(branches) => Ok(Self {
                groups: branches
                    .iter()
                    .map(|group| compile_group(resolver, group))
                    .collect::<Result<_, _>>()?,
                disjunctive: true,
            }),
            Filters::Invalid(value) if !is_truthy(value) => Ok(Self::default()),
            Filters::Invalid(_) => Err(QueryError::InvalidFilters(
                "Param 'filters' must be an object or an array of objects".to_string(),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn apply(&self, builder: &mut dyn StatementBuilder) {
        for group in &self.groups {
            let mut emit = |w: &mut dyn ConditionBuilder| {
                for condition in group {
                    condition.apply(w);
                }
            };
            if self.disjunctive {
                builder.or_where_group(&mut emit);
            } else {
                builder.where_group(&mut emit);
            }
        }
    }
}

fn compile_group(
    resolver: &FieldResolver<'_>,
    group: &FilterGroup,
) -> Result<Vec<FilterCondition>, QueryError> {
    group
        .iter()
        .map(|(field, filter)| compile_filter(resolver, field, filter))
        .collect()
}

/// Validates and compiles one `field: filter` entry.
pub fn compile_filter(
    resolver: &FieldResolver<'_>,
    field: &str,
    filter: &FilterValue,
) -> Result<FilterCondition, QueryError> {
    let resolved = resolver.resolve(field)?;
    let filter_type = filter_type(resolver, field, filter, resolved.is_flag())?;
    let kind = filter_type.kind();

    if let Some(mask) = resolved.mask {
        let bit = if flag_is_set(filter.value()) { mask } else { 0 };
        return Ok(FilterCondition::Raw {
            sql: format!("{} = ?", resolved.column),
            params: vec![Value::from(bit)],
        });
    }

    let value = filter.value();
    let multiple = value.is_array();

    if multiple && !kind.allows_multiple() {
        return Err(QueryError::InvalidFilters(format!(
            "Filter type '{filter_type}' does not allow multiple values for filter '{field}'"
        )));
    }

    if kind.needs_value() {
        if !filter.has_explicit_value() {
            return Err(QueryError::InvalidFilters(format!(
                "Filter type '{filter_type}' needs a value for filter '{field}'"
            )));
        }
        if value.is_object() {
            return Err(QueryError::InvalidFilters(format!(
                "Invalid value for filter '{field}'"
            )));
        }
    }

    let column = resolved.column;
    let condition = match kind {
        FilterKind::Set { negated } => match value {
            Value::Array(values) => FilterCondition::In {
                column,
                values: values.clone(),
                negated,
            },
            Value::Null => FilterCondition::Null { column, negated },
            _ if negated => FilterCondition::Not {
                column,
                value: value.clone(),
            },
            _ => FilterCondition::Compare {
                column,
                operator: CompareOp::Eq,
                value: value.clone(),
            },
        },
        FilterKind::Range { operator } => FilterCondition::Compare {
            column,
            operator,
            value: value.clone(),
        },
        FilterKind::Pattern {
            operator,
            prefix,
            suffix,
        } => FilterCondition::Compare {
            column,
            operator,
            value: Value::String(format!("{prefix}{}{suffix}", plain_text(value))),
        },
        FilterKind::Interval { negated, arity } => {
            let bounds = match value {
                Value::Array(bounds) if bounds.len() == arity => bounds,
                Value::Array(_) => {
                    return Err(QueryError::InvalidFilters(format!(
                        "Filter type '{filter_type}' must be an array with {arity} values for filter '{field}'"
                    )));
                }
                _ => {
                    return Err(QueryError::InvalidFilters(format!(
                        "Filter type '{filter_type}' needs multiple values for filter '{field}'"
                    )));
                }
            };
            FilterCondition::Between {
                column,
                low: bounds[0].clone(),
                high: bounds[1].clone(),
                negated,
            }
        }
        FilterKind::Nullness { negated } => FilterCondition::Null { column, negated },
        FilterKind::Flag => {
            return Err(QueryError::InvalidFilters(format!(
                "Filter type '{filter_type}' can only be used on flag fields, got '{field}'"
            )));
        }
    };

    Ok(condition)
}

/// Flags always win; otherwise the filter's own type, then the field's declared
/// type, then `equal`.
fn filter_type(
    resolver: &FieldResolver<'_>,
    field: &str,
    filter: &FilterValue,
    is_flag: bool,
) -> Result<FilterType, QueryError> {
    if is_flag {
        return Ok(FilterType::FlagEqual);
    }

    let declared = filter.filter_type().or_else(|| {
        resolver
            .schema()
            .field(field)
            .and_then(|decl| decl.filter_type())
    });

    match declared {
        None => Ok(FilterType::Equal),
        Some(name) => name.parse().map_err(|_| {
            QueryError::InvalidFilters(format!(
                "Unknown filter type '{name}' for filter '{field}'"
            ))
        }),
    }
}

/// Flag filters only ever test for the whole mask or for zero.
fn flag_is_set(value: &Value) -> bool {
    match value {
        Value::String(s) => is_truthy(value) && s != "0" && s != "false",
        other => is_truthy(other),
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
