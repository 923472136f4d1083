//! The compiler facade: join inference, then every clause compiler in a
//! fixed order, then emission against a statement builder.

use crate::{
    error::QueryError,
    filters::FilterClause,
    group::GroupClause,
    inference::infer_joins,
    joins::{JoinClause, compile_joins},
    order::OrderClause,
    pagination::Pagination,
    resolver::FieldResolver,
    select::SelectClause,
    settings::Settings,
};
use model::{QuerySpec, SchemaModel, schema::ROOT_ALIAS};
use query_builder::{Statement, StatementBuilder, ast::common::TableRef};
use tracing::{debug, info, warn};

/// Every clause of a specification, validated and ready to emit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    pub select: SelectClause,
    pub joins: Vec<JoinClause>,
    pub filters: FilterClause,
    pub order: OrderClause,
    pub group: GroupClause,
    pub pagination: Pagination,
}

impl CompiledQuery {
    /// Emits select, joins, filters, order, group and pagination, in that order.
    pub fn apply(&self, builder: &mut dyn StatementBuilder) {
        self.select.apply(builder);
        for join in &self.joins {
            join.apply(builder);
        }
        self.filters.apply(builder);
        self.order.apply(builder);
        self.group.apply(builder);
        self.pagination.apply(builder);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a> {
    schema: &'a SchemaModel,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(schema: &'a SchemaModel) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a SchemaModel {
        self.schema
    }

    pub fn resolver(&self) -> FieldResolver<'a> {
        FieldResolver::new(self.schema)
    }

    /// Validates the whole specification without touching a builder.
    pub fn plan(&self, spec: &QuerySpec) -> Result<CompiledQuery, QueryError> {
        let spec = infer_joins(self.schema, spec);
        let resolver = self.resolver();

        let select = SelectClause::compile(&resolver, &spec)?;
        debug!(
            model = %self.schema.name,
            columns = select.columns.len(),
            flags = select.flag_columns.len(),
            aggregates = select.aggregates.len(),
            "Compiled select"
        );

        let mut compiled = CompiledQuery {
            select,
            ..Default::default()
        };

        if self.schema.has_fields() {
            compiled.joins = compile_joins(&resolver, spec.joins.as_ref())?;
            let keys: Vec<&str> = compiled.joins.iter().map(|j| j.key.as_str()).collect();
            debug!(joins = ?keys, "Compiled joins");

            compiled.filters = FilterClause::compile(&resolver, spec.filters.as_ref())?;
            debug!(
                groups = compiled.filters.groups.len(),
                disjunctive = compiled.filters.disjunctive,
                "Compiled filters"
            );

            compiled.order = OrderClause::compile(&resolver, spec.order.as_ref())?;
            compiled.group = GroupClause::compile(&resolver, spec.group.as_ref())?;
            debug!(
                order = compiled.order.items.len(),
                group = compiled.group.items.len(),
                "Compiled order and group"
            );
        } else {
            warn!(model = %self.schema.name, "No fields structure");
        }

        compiled.pagination = Pagination::compile(&spec)?;
        debug!(
            limit = ?compiled.pagination.limit,
            offset = ?compiled.pagination.offset,
            "Compiled pagination"
        );

        Ok(compiled)
    }

    /// Compiles `spec` and emits it against `builder`. Nothing is emitted
    /// when any clause fails validation.
    pub fn compile(
        &self,
        spec: &QuerySpec,
        builder: &mut dyn StatementBuilder,
    ) -> Result<CompiledQuery, QueryError> {
        let compiled = self.plan(spec)?;
        compiled.apply(builder);

        if spec.debug {
            info!(statement = %builder.sql(), "statement");
        }

        Ok(compiled)
    }

    /// A `SELECT` over the root table, rendered for `settings.dialect`.
    pub fn statement(
        &self,
        spec: &QuerySpec,
        settings: &Settings,
    ) -> Result<Statement, QueryError> {
        let mut statement =
            Statement::from_table(self.root_table(spec, settings), ROOT_ALIAS, settings.dialect);
        self.compile(spec, &mut statement)?;
        Ok(statement)
    }

    /// The root table, honouring a per-call override and the configured database.
    pub fn root_table(&self, spec: &QuerySpec, settings: &Settings) -> TableRef {
        let table = spec
            .table
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.schema.table);
        TableRef::with_schema(settings.database.as_deref(), table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorCode,
        tests::{fixtures, recorder::Recorder},
    };
    use query_builder::DialectKind;
    use serde_json::json;
    use tracing_test::traced_test;

    fn compile(spec: serde_json::Value) -> Result<Vec<String>, QueryError> {
        let schema = fixtures::users_schema();
        let mut recorder = Recorder::new();
        QueryCompiler::new(&schema).compile(&fixtures::spec(spec), &mut recorder)?;
        Ok(recorder.calls)
    }

    #[test]
    fn test_phases_run_in_order() {
        let calls = compile(json!({
            "fields": ["id", "profileName"],
            "filters": { "isActive": true },
            "order": { "name": "desc" },
            "group": "id",
            "limit": 10,
            "page": 2,
        }))
        .unwrap();

        assert_eq!(
            calls,
            [
                "select(id: t.id, profileName: p.name)",
                "LEFT JOIN(profiles as p; on(t.profile, =, p.id))",
                "where(where_raw((t.status & 1) = ?, [1]))",
                "order_by(t.name, desc)",
                "group_by(t.id)",
                "limit(10)",
                "offset(10)",
            ]
        );
    }

    #[test]
    fn test_failure_emits_nothing() {
        let schema = fixtures::users_schema();
        let mut recorder = Recorder::new();
        let err = QueryCompiler::new(&schema)
            .compile(
                &fixtures::spec(json!({ "fields": ["id"], "order": ["id"] })),
                &mut recorder,
            )
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidOrders);
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_caller_joins_are_ignored() {
        assert_eq!(
            compile(json!({ "fields": ["id"], "joins": ["Photos"] })).unwrap(),
            ["select(id: t.id)"]
        );
    }

    #[traced_test]
    #[test]
    fn test_schema_without_fields_skips_clauses() {
        let schema = fixtures::schema(json!({ "table": "logs" }));
        let mut recorder = Recorder::new();
        QueryCompiler::new(&schema)
            .compile(
                &fixtures::spec(json!({ "order": ["id"], "limit": 3 })),
                &mut recorder,
            )
            .unwrap();

        assert_eq!(recorder.calls, ["select(t.*)", "limit(3)"]);
        assert!(logs_contain("No fields structure"));
    }

    #[traced_test]
    #[test]
    fn test_debug_logs_rendered_statement() {
        let schema = fixtures::users_schema();
        let spec = fixtures::spec(json!({
            "fields": ["id"],
            "filters": { "id": 7 },
            "debug": true
        }));
        QueryCompiler::new(&schema)
            .statement(&spec, &Settings::default())
            .unwrap();

        assert!(logs_contain(
            "SELECT `t`.`id` AS `id` FROM `users` AS `t` WHERE (`t`.`id` = ?)"
        ));
    }

    #[test]
    fn test_statement_uses_settings() {
        let schema = fixtures::users_schema();
        let settings = Settings {
            dialect: DialectKind::Postgres,
            database: Some("shop".into()),
            ..Settings::default()
        };
        let spec = fixtures::spec(json!({
            "fields": ["name"],
            "filters": { "price": 10 },
            "table": "users_archive",
        }));

        let (sql, params) = QueryCompiler::new(&schema)
            .statement(&spec, &settings)
            .unwrap()
            .to_sql();

        assert_eq!(
            sql,
            r#"SELECT "t"."name" AS "name" FROM "shop"."users_archive" AS "t" WHERE ("t"."price" > $1)"#
        );
        assert_eq!(params, vec![json!(10)]);
    }
}
