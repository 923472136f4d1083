use crate::{
    ast::condition::{Condition, ConditionGroup},
    render::{Render, Renderer},
};

/// Renders the items of a group without surrounding parentheses.
impl Render for ConditionGroup {
    fn render(&self, r: &mut Renderer) {
        for (i, (conjunction, condition)) in self.items.iter().enumerate() {
            if i > 0 {
                r.sql.push(' ');
                r.sql.push_str(conjunction.keyword());
                r.sql.push(' ');
            }
            condition.render(r);
        }
    }
}

impl Render for Condition {
    fn render(&self, r: &mut Renderer) {
        match self {
            Condition::Compare { left, op, right } => {
                left.render(r);
                r.sql.push(' ');
                r.sql.push_str(op.as_str());
                r.sql.push(' ');
                right.render(r);
            }
            Condition::Not(inner) => {
                r.sql.push_str("NOT ");
                inner.render(r);
            }
            Condition::InList {
                expr,
                values,
                negated,
            } => {
                // an empty list can never match
                if values.is_empty() {
                    r.sql.push_str(if *negated { "1 = 1" } else { "1 = 0" });
                    return;
                }
                expr.render(r);
                r.sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                r.push_list(values);
                r.sql.push(')');
            }
            Condition::IsNull { expr, negated } => {
                expr.render(r);
                r.sql
                    .push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Condition::Between {
                expr,
                low,
                high,
                negated,
            } => {
                expr.render(r);
                r.sql
                    .push_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                low.render(r);
                r.sql.push_str(" AND ");
                high.render(r);
            }
            Condition::Raw { sql, params } => r.push_raw(sql, params),
            Condition::Group(group) => {
                r.sql.push('(');
                group.render(r);
                r.sql.push(')');
            }
        }
    }
}
