//! CRUD over a [`Driver`]: compiled specifications for reads and deletes,
//! column-filtered items for writes.

pub mod driver;

use crate::{
    compiler::QueryCompiler,
    error::QueryError,
    filters::FilterClause,
    joins::compile_joins,
    settings::Settings,
};
use driver::{Driver, DriverError, Row};
use model::{
    QuerySpec, SchemaModel,
    schema::ROOT_ALIAS,
    spec::{Filters, JoinsParam},
};
use query_builder::{InsertBuilder, Statement, ast::common::TableRef};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Never overwritten by an upsert.
const CREATED_FIELD: &str = "date_created";
const KEY_FIELD: &str = "id";

pub struct Repository<D> {
    driver: D,
    schema: SchemaModel,
    settings: Settings,
}

impl<D: Driver> Repository<D> {
    pub fn new(driver: D, schema: SchemaModel, settings: Settings) -> Self {
        Self {
            driver,
            schema,
            settings,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn schema(&self) -> &SchemaModel {
        &self.schema
    }

    fn compiler(&self) -> QueryCompiler<'_> {
        QueryCompiler::new(&self.schema)
    }

    fn table(&self) -> TableRef {
        TableRef::with_schema(self.settings.database.as_deref(), &self.schema.table)
    }

    /// Rows matching `spec`.
    pub async fn get(&self, spec: &QuerySpec) -> Result<Vec<Row>, QueryError> {
        let statement = self.compiler().statement(spec, &self.settings)?;
        let (sql, params) = statement.to_sql();
        debug!(sql = %sql, params = params.len(), "Fetching rows");
        self.driver.fetch(&sql, params).await.map_err(driver_failure)
    }

    /// Inserts one object or an array of objects.
    pub async fn insert(&self, items: Value) -> Result<u64, QueryError> {
        let items = as_items(items, "Not valid items to Insert")?;
        let (sql, params) = self.insert_statement(&items, false).await?;
        self.execute(&sql, params).await
    }

    /// Inserts, or updates rows whose key already exists.
    pub async fn save(&self, items: Value) -> Result<u64, QueryError> {
        let items = as_items(items, "Not valid items to Save")?;
        let (sql, params) = self.insert_statement(&items, true).await?;
        self.execute(&sql, params).await
    }

    /// Sets `values` on the rows matching `filters`. Keys that are not
    /// columns of the table are dropped.
    pub async fn update(
        &self,
        values: &Value,
        filters: Option<&Filters>,
    ) -> Result<u64, QueryError> {
        let Value::Object(values) = values else {
            return Err(QueryError::NoValues("No values to Update".to_string()));
        };

        let columns = self.columns().await?;
        let assignments: Vec<(String, Value)> = values
            .iter()
            .filter(|(key, _)| columns.contains(key))
            .map(|(key, value)| (format!("{ROOT_ALIAS}.{key}"), value.clone()))
            .collect();
        if assignments.is_empty() {
            return Err(QueryError::NoValues("No values to Update".to_string()));
        }

        let resolver = self.compiler().resolver();
        let filters = FilterClause::compile(&resolver, filters)?;

        let mut statement =
            Statement::update(self.table(), ROOT_ALIAS, assignments, self.settings.dialect);
        filters.apply(&mut statement);

        let (sql, params) = statement.to_sql();
        self.execute(&sql, params).await
    }

    /// Deletes the root rows matching `filters`, across the given joins.
    pub async fn remove(
        &self,
        filters: Option<&Filters>,
        joins: Option<&JoinsParam>,
    ) -> Result<u64, QueryError> {
        let resolver = self.compiler().resolver();
        let filters = FilterClause::compile(&resolver, filters)?;
        let joins = compile_joins(&resolver, joins)?;

        let mut statement = Statement::delete(self.table(), ROOT_ALIAS, self.settings.dialect);
        for join in &joins {
            join.apply(&mut statement);
        }
        filters.apply(&mut statement);

        let (sql, params) = statement.to_sql();
        self.execute(&sql, params).await
    }

    async fn columns(&self) -> Result<Vec<String>, QueryError> {
        let table = self.table().to_string();
        self.driver.columns(&table).await.map_err(|e| {
            warn!(table = %table, error = %e, "Column lookup failed");
            QueryError::InvalidTable("Can't get Table information from Database".to_string())
        })
    }

    /// Renders a multi-row insert over every table column, optionally as an upsert.
    async fn insert_statement(
        &self,
        items: &[Map<String, Value>],
        upsert: bool,
    ) -> Result<(String, Vec<Value>), QueryError> {
        let columns = self.columns().await?;
        let now = chrono::Utc::now().timestamp();

        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        let mut insert = InsertBuilder::new(self.table()).columns(&names);
        for item in items {
            let row = columns
                .iter()
                .map(|column| match item.get(column) {
                    Some(value) if !value.is_null() => value.clone(),
                    _ if self.settings.is_date_field(column) => Value::from(now),
                    _ => Value::Null,
                })
                .collect();
            insert = insert.row(row);
        }

        if upsert {
            let updates: Vec<&str> = names
                .iter()
                .copied()
                .filter(|c| *c != CREATED_FIELD)
                .collect();
            insert = insert.on_conflict(&[KEY_FIELD], &updates);
        }

        Ok(insert.render(self.settings.dialect.dialect()))
    }

    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64, QueryError> {
        debug!(sql = %sql, params = params.len(), "Executing statement");
        self.driver.execute(sql, params).await.map_err(driver_failure)
    }
}

fn as_items(items: Value, message: &str) -> Result<Vec<Map<String, Value>>, QueryError> {
    let no_items = || QueryError::NoItems(message.to_string());
    let items = match items {
        Value::Object(item) => vec![item],
        Value::Array(items) if !items.is_empty() => items
            .into_iter()
            .map(|item| match item {
                Value::Object(item) => Ok(item),
                _ => Err(no_items()),
            })
            .collect::<Result<_, _>>()?,
        _ => return Err(no_items()),
    };
    Ok(items)
}

fn driver_failure(error: DriverError) -> QueryError {
    warn!(error = %error, "Driver failure");
    match error {
        DriverError::Duplicate(message) => QueryError::DuplicateItem(message),
        other => QueryError::DriverError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, tests::fixtures};
    use async_trait::async_trait;
    use query_builder::DialectKind;
    use serde_json::json;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct FakeDriver {
        columns: Option<Vec<String>>,
        rows: Vec<Row>,
        failure: Option<DriverError>,
        statements: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl FakeDriver {
        fn with_columns(columns: &[&str]) -> Self {
            Self {
                columns: Some(columns.iter().map(|c| c.to_string()).collect()),
                ..Default::default()
            }
        }

        fn last(&self) -> (String, Vec<Value>) {
            self.statements.lock().unwrap().last().cloned().unwrap()
        }

        fn record(&self, sql: &str, params: Vec<Value>) -> Result<(), DriverError> {
            self.statements.lock().unwrap().push((sql.to_string(), params));
            match &self.failure {
                Some(failure) => Err(failure.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl Driver for FakeDriver {
        async fn columns(&self, _table: &str) -> Result<Vec<String>, DriverError> {
            self.columns
                .clone()
                .ok_or_else(|| DriverError::Query("Table doesn't exist".into()))
        }

        async fn fetch(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, DriverError> {
            self.record(sql, params)?;
            Ok(self.rows.clone())
        }

        async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64, DriverError> {
            self.record(sql, params)?;
            Ok(1)
        }
    }

    fn repository(driver: FakeDriver) -> Repository<FakeDriver> {
        Repository::new(driver, fixtures::users_schema(), Settings::default())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_get_fetches_compiled_statement() {
        let mut driver = FakeDriver::default();
        driver.rows = vec![json!({ "id": 1 }).as_object().cloned().unwrap()];
        let repo = repository(driver);

        let rows = repo
            .get(&fixtures::spec(json!({ "fields": ["id"], "filters": { "isAdmin": 1 } })))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            repo.driver().last(),
            (
                "SELECT `t`.`id` AS `id` FROM `users` AS `t` WHERE ((t.status & 4) = ?)".to_string(),
                vec![json!(4)]
            )
        );
        assert!(logs_contain("Fetching rows"));
    }

    #[tokio::test]
    async fn test_insert_fills_columns() {
        let repo = repository(FakeDriver::with_columns(&["id", "name", "date_created"]));

        repo.insert(json!({ "name": "ann", "extra": true })).await.unwrap();

        let (sql, params) = repo.driver().last();
        assert_eq!(
            sql,
            "INSERT INTO `users` (`id`, `name`, `date_created`) VALUES (?, ?, ?)"
        );
        assert_eq!(params[0], Value::Null);
        assert_eq!(params[1], json!("ann"));
        assert!(params[2].as_i64().is_some_and(|t| t > 0));
    }

    #[tokio::test]
    async fn test_save_appends_upsert() {
        let repo = repository(FakeDriver::with_columns(&[
            "id",
            "name",
            "date_created",
            "date_modified",
        ]));

        repo.save(json!([{ "id": 1, "name": "a" }, { "id": 2, "name": "b" }]))
            .await
            .unwrap();

        let (sql, params) = repo.driver().last();
        assert!(sql.starts_with(
            "INSERT INTO `users` (`id`, `name`, `date_created`, `date_modified`) VALUES (?, ?, ?, ?), (?, ?, ?, ?)"
        ));
        assert!(sql.ends_with(
            " ON DUPLICATE KEY UPDATE `id` = LAST_INSERT_ID(`id`), `name` = VALUES(`name`), `date_modified` = VALUES(`date_modified`)"
        ));
        assert_eq!(params.len(), 8);
    }

    #[tokio::test]
    async fn test_save_for_postgres() {
        let settings = Settings {
            dialect: DialectKind::Postgres,
            ..Settings::default()
        };
        let repo = Repository::new(
            FakeDriver::with_columns(&["id", "name", "date_created"]),
            fixtures::users_schema(),
            settings,
        );

        repo.save(json!({ "id": 1, "name": "a" })).await.unwrap();

        assert_eq!(
            repo.driver().last().0,
            r#"INSERT INTO "users" ("id", "name", "date_created") VALUES ($1, $2, $3) ON CONFLICT ("id") DO UPDATE SET "name" = EXCLUDED."name""#
        );
    }

    #[tokio::test]
    async fn test_no_items() {
        let repo = repository(FakeDriver::with_columns(&["id"]));
        for items in [json!([]), json!(null), json!("x"), json!([1])] {
            let err = repo.insert(items).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::NoItems);
        }
        assert_eq!(
            repo.save(json!([])).await.unwrap_err().code(),
            ErrorCode::NoItems
        );
    }

    #[tokio::test]
    async fn test_invalid_table() {
        let repo = repository(FakeDriver::default());
        let err = repo.insert(json!({ "id": 1 })).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTable);
    }

    #[tokio::test]
    async fn test_update_keeps_table_columns() {
        let repo = repository(FakeDriver::with_columns(&["id", "name", "status"]));
        let filters = fixtures::spec(json!({ "filters": { "id": [1, 2] } })).filters;

        repo.update(&json!({ "name": "bo", "ghost": 1 }), filters.as_ref())
            .await
            .unwrap();

        assert_eq!(
            repo.driver().last(),
            (
                "UPDATE `users` AS `t` SET `t`.`name` = ? WHERE (`t`.`id` IN (?, ?))".to_string(),
                vec![json!("bo"), json!(1), json!(2)]
            )
        );
    }

    #[tokio::test]
    async fn test_update_without_values() {
        let repo = repository(FakeDriver::with_columns(&["id"]));
        for values in [json!(null), json!("x"), json!({ "ghost": 1 })] {
            let err = repo.update(&values, None).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::NoValues);
        }
    }

    #[tokio::test]
    async fn test_remove_with_joins() {
        let repo = repository(FakeDriver::default());
        let spec = fixtures::spec(json!({
            "filters": { "profileName": "x" },
            "joins": ["Profile"],
        }));

        repo.remove(spec.filters.as_ref(), spec.joins.as_ref())
            .await
            .unwrap();

        assert_eq!(
            repo.driver().last(),
            (
                "DELETE `t` FROM `users` AS `t` LEFT JOIN `profiles` AS `p` ON `t`.`profile` = `p`.`id` WHERE (`p`.`name` = ?)".to_string(),
                vec![json!("x")]
            )
        );
    }

    #[tokio::test]
    async fn test_compiler_errors_pass_through() {
        let repo = repository(FakeDriver::default());
        let spec = fixtures::spec(json!({ "joins": ["Nope"] }));
        let err = repo.remove(None, spec.joins.as_ref()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidJoins);
        assert!(repo.driver().statements.lock().unwrap().is_empty());
    }

    #[traced_test]
    #[tokio::test]
    async fn test_driver_failures_are_wrapped() {
        let mut driver = FakeDriver::with_columns(&["id"]);
        driver.failure = Some(DriverError::Duplicate("id 1".into()));
        let repo = repository(driver);
        let err = repo.insert(json!({ "id": 1 })).await.unwrap_err();
        assert_eq!(err, QueryError::DuplicateItem("id 1".into()));

        let mut driver = FakeDriver::default();
        driver.failure = Some(DriverError::Connection("gone".into()));
        let repo = repository(driver);
        let err = repo.get(&QuerySpec::default()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DriverError);
        assert!(logs_contain("Driver failure"));
    }
}
