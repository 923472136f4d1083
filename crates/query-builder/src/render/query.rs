use crate::{
    ast::{
        common::OrderDir,
        condition::{Condition, ConditionGroup},
        query::{Assignment, FromClause, JoinClause, OrderByExpr, Query, QueryKind},
    },
    render::{Render, Renderer},
};

impl Render for Query {
    fn render(&self, r: &mut Renderer) {
        match &self.kind {
            QueryKind::Select => self.render_select(r),
            QueryKind::Update { assignments } => self.render_update(assignments, r),
            QueryKind::Delete { target } => self.render_delete(target, r),
        }
    }
}

impl Query {
    fn render_select(&self, r: &mut Renderer) {
        // 1. SELECT clause
        r.sql.push_str("SELECT ");
        if self.columns.is_empty() {
            r.sql.push('*');
        } else {
            r.push_list(&self.columns);
        }

        // 2. FROM
        if let Some(from) = &self.from {
            r.sql.push_str(" FROM ");
            from.render(r);
        }

        // 3. JOIN
        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        // 4. WHERE
        render_where(&self.where_clause, r);

        // 5. GROUP BY
        if !self.group_by.is_empty() {
            r.sql.push_str(" GROUP BY ");
            r.push_list(&self.group_by);
        }

        // 6. ORDER BY
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            r.push_list(&self.order_by);
        }

        // 7. LIMIT / OFFSET
        if let Some(limit) = self.limit {
            r.sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            r.sql.push_str(&format!(" OFFSET {offset}"));
        }
    }

    fn render_update(&self, assignments: &[Assignment], r: &mut Renderer) {
        r.sql.push_str("UPDATE ");
        if let Some(from) = &self.from {
            from.render(r);
        }

        let inline_joins = r.dialect.joins_in_mutations();
        if inline_joins {
            for join in &self.joins {
                r.sql.push(' ');
                join.render(r);
            }
        }

        r.sql.push_str(" SET ");
        let qualified = r.dialect.qualified_assignments();
        for (i, assignment) in assignments.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            if let (true, Some(qualifier)) = (qualified, &assignment.column.qualifier) {
                r.push_quoted(qualifier);
                r.sql.push('.');
            }
            r.push_quoted(&assignment.column.name);
            r.sql.push_str(" = ");
            assignment.value.render(r);
        }

        if inline_joins {
            render_where(&self.where_clause, r);
        } else {
            self.render_using_joins(" FROM ", r);
        }
    }

    fn render_delete(&self, target: &str, r: &mut Renderer) {
        if r.dialect.joins_in_mutations() {
            r.sql.push_str("DELETE ");
            r.push_quoted(target);
            r.sql.push_str(" FROM ");
            if let Some(from) = &self.from {
                from.render(r);
            }
            for join in &self.joins {
                r.sql.push(' ');
                join.render(r);
            }
            render_where(&self.where_clause, r);
        } else {
            r.sql.push_str("DELETE FROM ");
            if let Some(from) = &self.from {
                from.render(r);
            }
            self.render_using_joins(" USING ", r);
        }
    }

    /// Lists joined tables after `keyword` and folds their `ON` conditions into
    /// the `WHERE` clause, for dialects without join syntax in `UPDATE`/`DELETE`.
    fn render_using_joins(&self, keyword: &str, r: &mut Renderer) {
        if self.joins.is_empty() {
            render_where(&self.where_clause, r);
            return;
        }

        r.sql.push_str(keyword);
        for (i, join) in self.joins.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            r.push_table(&join.table, join.alias.as_deref());
        }

        let mut merged = ConditionGroup::new();
        for join in self.joins.iter().filter(|j| !j.on.is_empty()) {
            merged.and(Condition::Group(join.on.clone()));
        }
        if !self.where_clause.is_empty() {
            merged.and(Condition::Group(self.where_clause.clone()));
        }
        render_where(&merged, r);
    }
}

fn render_where(group: &ConditionGroup, r: &mut Renderer) {
    if !group.is_empty() {
        r.sql.push_str(" WHERE ");
        group.render(r);
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.push_table(&self.table, self.alias.as_deref());
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(self.kind.keyword());
        r.sql.push(' ');
        r.push_table(&self.table, self.alias.as_deref());
        if !self.on.is_empty() {
            r.sql.push_str(" ON ");
            self.on.render(r);
        }
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if let Some(dir) = &self.direction {
            let dir_str = match dir {
                OrderDir::Asc => "ASC",
                OrderDir::Desc => "DESC",
            };
            r.sql.push(' ');
            r.sql.push_str(dir_str);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{
            common::{CompareOp, JoinKind, OrderDir, TableRef},
            condition::{Condition, ConditionGroup},
            expr::{Expr, FunctionCall, Ident},
            query::{Assignment, FromClause, JoinClause, OrderByExpr, Query, QueryKind},
        },
        dialect::{MySql, Postgres},
        ident,
        render::{Render, Renderer},
        value,
    };
    use serde_json::json;

    fn from(table: &str) -> Option<FromClause> {
        Some(FromClause {
            table: TableRef::new(table),
            alias: Some("t".to_string()),
        })
    }

    fn eq(column: &str, val: serde_json::Value) -> Condition {
        Condition::Compare {
            left: ident(column),
            op: CompareOp::Eq,
            right: value(val),
        }
    }

    fn profile_join() -> JoinClause {
        let mut on = ConditionGroup::new();
        on.and(Condition::Compare {
            left: ident("t.profile"),
            op: CompareOp::Eq,
            right: ident("p.id"),
        });
        JoinClause {
            kind: JoinKind::Left,
            table: TableRef::new("profiles"),
            alias: Some("p".to_string()),
            on,
        }
    }

    #[test]
    fn test_simple_select_postgres() {
        let mut where_clause = ConditionGroup::new();
        where_clause.and(eq("t.id", json!(123)));
        let ast = Query {
            columns: vec![ident("t.id"), ident("t.name")],
            from: from("users"),
            where_clause,
            ..Default::default()
        };

        let dialect = Postgres;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        assert_eq!(
            sql,
            r#"SELECT "t"."id", "t"."name" FROM "users" AS "t" WHERE "t"."id" = $1"#
        );
        assert_eq!(params, vec![json!(123)]);
    }

    #[test]
    fn test_complex_select_mysql() {
        let mut group = ConditionGroup::new();
        group.and(eq("t.status", json!("inactive")));
        group.or(Condition::IsNull {
            expr: ident("p.id"),
            negated: false,
        });
        let mut where_clause = ConditionGroup::new();
        where_clause.and(Condition::Group(group));

        let ast = Query {
            columns: vec![
                ident("t.id"),
                Expr::FunctionCall(FunctionCall {
                    name: "COUNT".to_string(),
                    args: vec![ident("p.id")],
                    wildcard: false,
                })
                .alias("posts"),
            ],
            from: from("users"),
            joins: vec![profile_join()],
            where_clause,
            group_by: vec![ident("t.id")],
            order_by: vec![OrderByExpr {
                expr: ident("t.created_at"),
                direction: Some(OrderDir::Desc),
            }],
            limit: Some(10),
            offset: Some(20),
            ..Default::default()
        };

        let dialect = MySql;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        let expected_sql = "SELECT `t`.`id`, COUNT(`p`.`id`) AS `posts` FROM `users` AS `t` \
            LEFT JOIN `profiles` AS `p` ON `t`.`profile` = `p`.`id` \
            WHERE (`t`.`status` = ? OR `p`.`id` IS NULL) GROUP BY `t`.`id` \
            ORDER BY `t`.`created_at` DESC LIMIT 10 OFFSET 20";
        assert_eq!(sql, expected_sql);
        assert_eq!(params, vec![json!("inactive")]);
    }

    #[test]
    fn test_update_with_qualified_assignments() {
        let mut where_clause = ConditionGroup::new();
        where_clause.and(eq("t.id", json!(7)));
        let ast = Query {
            kind: QueryKind::Update {
                assignments: vec![Assignment {
                    column: Ident::parse("t.name"),
                    value: value(json!("bob")),
                }],
            },
            from: from("users"),
            where_clause,
            ..Default::default()
        };

        let dialect = MySql;
        let mut r = Renderer::new(&dialect);
        ast.render(&mut r);
        assert_eq!(
            r.finish().0,
            "UPDATE `users` AS `t` SET `t`.`name` = ? WHERE `t`.`id` = ?"
        );

        let dialect = Postgres;
        let mut r = Renderer::new(&dialect);
        ast.render(&mut r);
        assert_eq!(
            r.finish().0,
            r#"UPDATE "users" AS "t" SET "name" = $1 WHERE "t"."id" = $2"#
        );
    }

    #[test]
    fn test_delete_with_joins() {
        let mut where_clause = ConditionGroup::new();
        where_clause.and(eq("p.name", json!("x")));
        let ast = Query {
            kind: QueryKind::Delete {
                target: "t".to_string(),
            },
            from: from("users"),
            joins: vec![profile_join()],
            where_clause,
            ..Default::default()
        };

        let dialect = MySql;
        let mut r = Renderer::new(&dialect);
        ast.render(&mut r);
        assert_eq!(
            r.finish().0,
            "DELETE `t` FROM `users` AS `t` LEFT JOIN `profiles` AS `p` ON `t`.`profile` = `p`.`id` WHERE `p`.`name` = ?"
        );

        let dialect = Postgres;
        let mut r = Renderer::new(&dialect);
        ast.render(&mut r);
        assert_eq!(
            r.finish().0,
            r#"DELETE FROM "users" AS "t" USING "profiles" AS "p" WHERE ("t"."profile" = "p"."id") AND ("p"."name" = $1)"#
        );
    }
}
