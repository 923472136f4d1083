//! Join validation and emission.

use crate::{error::QueryError, resolver::FieldResolver};
use model::{
    ConditionList, OnItem,
    spec::{JoinsParam, is_truthy},
};
use query_builder::{
    StatementBuilder,
    ast::common::{CompareOp, JoinKind},
};

/// Join methods a schema may declare, by name.
pub fn join_kind(method: &str) -> Option<JoinKind> {
    Some(match method {
        "join" => JoinKind::Join,
        "inner" => JoinKind::Inner,
        "left" => JoinKind::Left,
        "leftOuter" => JoinKind::LeftOuter,
        "right" => JoinKind::Right,
        "rightOuter" => JoinKind::RightOuter,
        "fullOuter" => JoinKind::FullOuter,
        "cross" => JoinKind::Cross,
        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
    pub left: String,
    pub operator: CompareOp,
    pub right: String,
}

/// A validated join, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub key: String,
    pub kind: JoinKind,
    pub table: String,
    pub alias: String,
    pub conditions: Vec<JoinCondition>,
    /// Conditions are joined with `OR` (multi-condition `orOn`).
    pub disjunctive: bool,
}

impl JoinClause {
    pub fn apply(&self, builder: &mut dyn StatementBuilder) {
        builder.join(self.kind, &self.table, &self.alias, &mut |on| {
            for condition in &self.conditions {
                if self.disjunctive {
                    on.or_on(&condition.left, condition.operator, &condition.right);
                } else {
                    on.on(&condition.left, condition.operator, &condition.right);
                }
            }
        });
    }
}

/// Compiles the `joins` member of a specification.
pub fn compile_joins(
    resolver: &FieldResolver<'_>,
    joins: Option<&JoinsParam>,
) -> Result<Vec<JoinClause>, QueryError> {
    match joins {
        None => Ok(Vec::new()),
        Some(JoinsParam::Keys(keys)) => keys
            .iter()
            .map(|key| compile_join(resolver, key))
            .collect(),
        Some(JoinsParam::Invalid(value)) if !is_truthy(value) => Ok(Vec::new()),
        Some(JoinsParam::Invalid(_)) => Err(QueryError::InvalidJoins(
            "Param 'joins' must be an array".to_string(),
        )),
    }
}

pub fn compile_join(resolver: &FieldResolver<'_>, key: &str) -> Result<JoinClause, QueryError> {
    let model = &resolver.schema().name;
    let invalid = |reason: &str| {
        QueryError::InvalidJoins(format!(
            "join '{key}' {reason}, check {model}.joins.{key}"
        ))
    };

    let decl = resolver.schema().join(key).ok_or_else(|| {
        QueryError::InvalidJoins(format!("Unknown joinKey '{key}', check {model}.joins"))
    })?;

    if decl.malformed.is_some() {
        return Err(invalid("must be an object"));
    }

    let alias = decl.alias().ok_or_else(|| invalid("'alias' is required"))?;

    let kind = match decl.method.as_deref().filter(|m| !m.is_empty()) {
        None => JoinKind::default(),
        Some(method) => join_kind(method).ok_or_else(|| {
            QueryError::InvalidJoins(format!(
                "invalid join method '{method}' for join '{key}'"
            ))
        })?,
    };

    let (list, or_on) = match (&decl.on, &decl.or_on) {
        (Some(on), None) => (on, false),
        (None, Some(or_on)) => (or_on, true),
        (None, None) => return Err(invalid("'on' or 'orOn' are required")),
        (Some(_), Some(_)) => return Err(invalid("must declare only one of 'on' or 'orOn'")),
    };

    let ConditionList::Items(items) = list else {
        return Err(invalid("parts 'on' and 'orOn' must be an array"));
    };

    if items.is_empty() {
        return Err(invalid("parts 'on' and 'orOn' must be an array with content"));
    }

    let parts = condition_parts(items).ok_or_else(|| {
        invalid("parts 'on' and 'orOn' must be arrays or strings")
    })?;
    let multiple = parts.len() > 1 || matches!(items[0], OnItem::Condition(_));

    let conditions = parts
        .into_iter()
        .map(|part| compile_condition(resolver, key, part))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(JoinClause {
        key: key.to_string(),
        kind,
        table: decl.table_name(key).to_string(),
        alias: alias.to_string(),
        conditions,
        // a single orOn condition is emitted through `on`
        disjunctive: or_on && multiple,
    })
}

/// Splits an `on`/`orOn` list into conditions: a flat list of strings is one
/// condition, a list of lists is several. Mixed lists are rejected.
fn condition_parts(items: &[OnItem]) -> Option<Vec<Vec<&str>>> {
    if items.iter().all(|i| matches!(i, OnItem::Field(_))) {
        let single = items
            .iter()
            .filter_map(|i| match i {
                OnItem::Field(f) => Some(f.as_str()),
                _ => None,
            })
            .collect();
        return Some(vec![single]);
    }

    items
        .iter()
        .map(|i| match i {
            OnItem::Condition(parts) => Some(parts.iter().map(String::as_str).collect()),
            OnItem::Field(_) | OnItem::Invalid(_) => None,
        })
        .collect()
}

fn compile_condition(
    resolver: &FieldResolver<'_>,
    key: &str,
    part: Vec<&str>,
) -> Result<JoinCondition, QueryError> {
    let model = &resolver.schema().name;
    let (left, operator, right) = match part.as_slice() {
        [left, right] => (*left, "=", *right),
        [left, operator, right] => (*left, *operator, *right),
        _ => {
            return Err(QueryError::InvalidJoins(format!(
                "join '{key}' parts 'on' and 'orOn' must have 2 or 3 values, check {model}.joins.{key}"
            )));
        }
    };

    let operator = match operator {
        "=" => CompareOp::Eq,
        "!=" => CompareOp::NotEq,
        other => {
            return Err(QueryError::InvalidJoins(format!(
                "Unknown join operator '{other}' in join '{key}'"
            )));
        }
    };

    Ok(JoinCondition {
        left: join_field(resolver, key, left)?,
        operator,
        right: join_field(resolver, key, right)?,
    })
}

fn join_field(resolver: &FieldResolver<'_>, key: &str, name: &str) -> Result<String, QueryError> {
    let field = resolver.resolve(name).map_err(|_| {
        QueryError::InvalidFields(format!(
            "Unknown field '{name}' in join '{key}', check {}.fields",
            resolver.schema().name
        ))
    })?;

    if field.is_flag() {
        return Err(QueryError::InvalidFields(format!(
            "Flag field '{name}' can't be used in join '{key}'"
        )));
    }

    Ok(field.column)
}
