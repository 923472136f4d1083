use crate::{
    ast::insert::Insert,
    render::{Render, Renderer},
};

impl Render for Insert {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("INSERT INTO ");
        r.push_table(&self.table, None);

        let cols = self
            .columns
            .iter()
            .map(|c| r.dialect.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        r.sql.push_str(&format!(" ({cols}) VALUES "));

        for (i, row) in self.values.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            r.sql.push('(');
            r.push_list(row);
            r.sql.push(')');
        }

        if let Some(on_conflict) = &self.on_conflict {
            let clause = r.dialect.upsert_clause(on_conflict);
            r.sql.push_str(&clause);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{
            common::TableRef,
            insert::{Insert, OnConflict},
        },
        dialect::{MySql, Postgres},
        render::{Render, Renderer},
        value,
    };
    use serde_json::json;

    fn users_insert() -> Insert {
        Insert {
            table: TableRef::new("users"),
            columns: vec!["id".into(), "name".into()],
            values: vec![
                vec![value(json!(1)), value(json!("ann"))],
                vec![value(json!(2)), value(json!("bob"))],
            ],
            on_conflict: None,
        }
    }

    #[test]
    fn test_render_multi_row_insert_postgres() {
        let dialect = Postgres;
        let mut r = Renderer::new(&dialect);
        users_insert().render(&mut r);
        let (sql, params) = r.finish();

        assert_eq!(
            sql,
            r#"INSERT INTO "users" ("id", "name") VALUES ($1, $2), ($3, $4)"#
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_render_upsert_mysql() {
        let mut ast = users_insert();
        ast.on_conflict = Some(OnConflict {
            key_columns: vec!["id".into()],
            update_columns: vec!["id".into(), "name".into()],
        });

        let dialect = MySql;
        let mut r = Renderer::new(&dialect);
        ast.render(&mut r);
        assert_eq!(
            r.finish().0,
            "INSERT INTO `users` (`id`, `name`) VALUES (?, ?), (?, ?) ON DUPLICATE KEY UPDATE `id` = LAST_INSERT_ID(`id`), `name` = VALUES(`name`)"
        );
    }
}
