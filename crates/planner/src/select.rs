//! Select list: plain columns, flag columns and aggregate functions.

use crate::{error::QueryError, resolver::FieldResolver};
use model::{
    QuerySpec,
    schema::ROOT_ALIAS,
    spec::{AggregateParam, FieldsParam, is_truthy},
};
use query_builder::{
    StatementBuilder,
    ast::common::{AggregateFn, AggregateTarget, SelectColumn},
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub function: AggregateFn,
    pub target: AggregateTarget,
    pub alias: String,
}

/// A validated select list, ready to be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectClause {
    pub columns: Vec<SelectColumn>,
    /// `((alias.carrier & mask) = mask) as flag`, one per flag.
    pub flag_columns: Vec<String>,
    pub aggregates: Vec<Aggregate>,
}

impl SelectClause {
    pub fn compile(resolver: &FieldResolver<'_>, spec: &QuerySpec) -> Result<Self, QueryError> {
        let mut clause = SelectClause::default();

        match &spec.fields {
            None => {
                clause
                    .columns
                    .push(SelectColumn::new(&format!("{ROOT_ALIAS}.*")));
                if !spec.no_flags {
                    for flag in resolver.schema().flag_names() {
                        clause.push_flag(resolver, flag)?;
                    }
                }
                if let Some(Value::Array(extra)) = &spec.extra_fields {
                    clause.push_extra_fields(resolver, extra)?;
                }
            }
            Some(FieldsParam::Toggle(false)) => {}
            Some(FieldsParam::Names(names)) => {
                // every name is validated before anything is resolved
                if let Some(unknown) = names.iter().find(|n| !resolver.exists(n)) {
                    return Err(resolver.unknown_field(unknown));
                }
                for name in names {
                    clause.push_field(resolver, name)?;
                }
            }
            Some(FieldsParam::Toggle(true) | FieldsParam::Invalid(_)) => {
                return Err(QueryError::InvalidFields(
                    "Param 'fields' must be an array".to_string(),
                ));
            }
        }

        for function in AggregateFn::ALL {
            if let Some(aggregate) = compile_aggregate(resolver, spec, function)? {
                clause.aggregates.push(aggregate);
            }
        }

        if clause.is_empty() {
            return Err(QueryError::NothingSelect("Nothing to select".to_string()));
        }

        Ok(clause)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.flag_columns.is_empty() && self.aggregates.is_empty()
    }

    pub fn apply(&self, builder: &mut dyn StatementBuilder) {
        if !self.columns.is_empty() {
            builder.select(&self.columns);
        }
        if !self.flag_columns.is_empty() {
            builder.select_raw(&self.flag_columns.join(", "));
        }
        for aggregate in &self.aggregates {
            builder.aggregate(
                aggregate.function,
                aggregate.target.clone(),
                &aggregate.alias,
            );
        }
    }

    fn push_field(&mut self, resolver: &FieldResolver<'_>, name: &str) -> Result<(), QueryError> {
        let field = resolver.resolve(name)?;
        match field.mask {
            Some(mask) => self.push_flag_column(&field.column, mask, name),
            None => {
                let column = SelectColumn::aliased(&field.alias, &field.column);
                // a repeated output alias takes the later column in the earlier slot
                match self
                    .columns
                    .iter_mut()
                    .find(|c| c.alias.as_ref() == Some(&field.alias))
                {
                    Some(existing) => *existing = column,
                    None => self.columns.push(column),
                }
            }
        }
        Ok(())
    }

    fn push_flag(&mut self, resolver: &FieldResolver<'_>, name: &str) -> Result<(), QueryError> {
        let field = resolver.resolve_flag_by_name(name)?;
        if let Some(mask) = field.mask {
            self.push_flag_column(&field.column, mask, name);
        }
        Ok(())
    }

    fn push_flag_column(&mut self, expr: &str, mask: i64, name: &str) {
        let column = format!("({expr} = {mask}) as {name}");
        if !self.flag_columns.contains(&column) {
            self.flag_columns.push(column);
        }
    }

    fn push_extra_fields(
        &mut self,
        resolver: &FieldResolver<'_>,
        extra: &[Value],
    ) -> Result<(), QueryError> {
        for entry in extra {
            let name = entry
                .as_str()
                .ok_or_else(|| resolver.unknown_field(&entry.to_string()))?;
            self.push_field(resolver, name)?;
        }
        Ok(())
    }
}

fn compile_aggregate(
    resolver: &FieldResolver<'_>,
    spec: &QuerySpec,
    function: AggregateFn,
) -> Result<Option<Aggregate>, QueryError> {
    let name = function.name();
    let Some(param) = spec.aggregate(name) else {
        return Ok(None);
    };

    let (field, alias) = match param {
        AggregateParam::All(false) => return Ok(None),
        AggregateParam::All(true) => (None, None),
        AggregateParam::Field(field) if field.is_empty() => return Ok(None),
        AggregateParam::Field(field) => (Some(field.as_str()), None),
        AggregateParam::Spec { field, alias } => (field.as_deref(), alias.as_deref()),
        AggregateParam::Invalid(value) if !is_truthy(value) => return Ok(None),
        AggregateParam::Invalid(Value::Array(_)) => {
            return Err(QueryError::InvalidSelectFunction(format!(
                "Param '{name}' can't be an array"
            )));
        }
        AggregateParam::Invalid(_) => {
            return Err(QueryError::InvalidSelectFunction(format!(
                "Param '{name}' invalid format"
            )));
        }
    };

    let target = match field {
        None | Some("*") => AggregateTarget::All,
        Some(field) => {
            let resolved = resolver.resolve(field)?;
            if resolved.is_flag() {
                AggregateTarget::Raw(resolved.column)
            } else {
                AggregateTarget::Column(resolved.column)
            }
        }
    };

    Ok(Some(Aggregate {
        function,
        target,
        alias: alias.unwrap_or(name).to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorCode,
        tests::{fixtures, recorder::Recorder},
    };
    use serde_json::json;

    fn compile(spec: serde_json::Value) -> Result<Vec<String>, QueryError> {
        let schema = fixtures::users_schema();
        let resolver = FieldResolver::new(&schema);
        let clause = SelectClause::compile(&resolver, &fixtures::spec(spec))?;
        let mut recorder = Recorder::new();
        clause.apply(&mut recorder);
        Ok(recorder.calls)
    }

    #[test]
    fn test_default_selects_all_and_flags() {
        assert_eq!(
            compile(json!({})).unwrap(),
            [
                "select(t.*)",
                "select_raw(((t.status & 1) = 1) as isActive, ((t.status & 4) = 4) as isAdmin)"
            ]
        );
    }

    #[test]
    fn test_no_flags() {
        assert_eq!(compile(json!({ "noFlags": true })).unwrap(), ["select(t.*)"]);
    }

    #[test]
    fn test_explicit_fields_with_aliases_and_flags() {
        assert_eq!(
            compile(json!({ "fields": ["id", "login", "photoUrl", "isAdmin"] })).unwrap(),
            [
                "select(id: t.id, login: t.user_login, photo: ph.url)",
                "select_raw(((t.status & 4) = 4) as isAdmin)"
            ]
        );
    }

    #[test]
    fn test_repeated_alias_keeps_last_column() {
        let schema = fixtures::schema(json!({
            "table": "users",
            "fields": {
                "id": true,
                "name": true,
                "title": { "field": "label", "alias": "name" }
            }
        }));
        let resolver = FieldResolver::new(&schema);
        let spec = fixtures::spec(json!({ "fields": ["name", "id", "title"] }));
        let clause = SelectClause::compile(&resolver, &spec).unwrap();
        let mut recorder = Recorder::new();
        clause.apply(&mut recorder);
        assert_eq!(recorder.calls, ["select(name: t.label, id: t.id)"]);
    }

    #[test]
    fn test_extra_fields_merge_with_automatic_flags() {
        assert_eq!(
            compile(json!({ "extraFields": ["profileName", "isActive"] })).unwrap(),
            [
                "select(t.*, profileName: p.name)",
                "select_raw(((t.status & 1) = 1) as isActive, ((t.status & 4) = 4) as isAdmin)"
            ]
        );
    }

    #[test]
    fn test_extra_fields_ignored_with_fields_or_when_not_a_list() {
        assert_eq!(
            compile(json!({ "fields": ["id"], "extraFields": ["name"] })).unwrap(),
            ["select(id: t.id)"]
        );
        assert_eq!(
            compile(json!({ "noFlags": true, "extraFields": true })).unwrap(),
            ["select(t.*)"]
        );
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(
            compile(json!({
                "fields": false,
                "count": true,
                "max": "price",
                "avg": { "field": "isActive", "alias": "activeRatio" },
                "sum": false
            }))
            .unwrap(),
            [
                "count(* as count)",
                "max(t.price as max)",
                "avg((t.status & 1) as activeRatio)"
            ]
        );
    }

    #[test]
    fn test_invalid_aggregates() {
        let err = compile(json!({ "count": ["id"] })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSelectFunction);

        let err = compile(json!({ "min": 3 })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSelectFunction);

        let err = compile(json!({ "min": "unknown" })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidFields);
    }

    #[test]
    fn test_nothing_to_select() {
        for spec in [json!({ "fields": false }), json!({ "fields": [] })] {
            let err = compile(spec).unwrap_err();
            assert_eq!(err.code(), ErrorCode::NothingSelect);
        }
    }

    #[test]
    fn test_invalid_fields_param() {
        for spec in [json!({ "fields": true }), json!({ "fields": "id" })] {
            let err = compile(spec).unwrap_err();
            assert_eq!(err.to_string(), "Param 'fields' must be an array");
        }

        let err = compile(json!({ "fields": ["id", "ghost"] })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidFields);
    }
}
