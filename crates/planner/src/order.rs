use crate::{error::QueryError, resolver::FieldResolver};
use model::spec::{OrderParam, is_truthy};
use query_builder::{StatementBuilder, ast::common::OrderDir};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub column: String,
    pub direction: OrderDir,
    /// Flag expressions can't be bound, so they go through `order_by_raw`.
    pub raw: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderClause {
    pub items: Vec<OrderItem>,
}

impl OrderClause {
    pub fn compile(
        resolver: &FieldResolver<'_>,
        order: Option<&OrderParam>,
    ) -> Result<Self, QueryError> {
        let entries: Vec<(&str, Value)> = match order {
            None => return Ok(Self::default()),
            Some(OrderParam::Field(field)) if field.is_empty() => return Ok(Self::default()),
            Some(OrderParam::Field(field)) => vec![(field.as_str(), Value::from("asc"))],
            Some(OrderParam::Directions(map)) => {
                map.iter().map(|(f, d)| (f.as_str(), d.clone())).collect()
            }
            Some(OrderParam::Invalid(value)) if !is_truthy(value) => return Ok(Self::default()),
            Some(OrderParam::Invalid(_)) => {
                return Err(QueryError::InvalidOrders(
                    "Param 'order' must be an object or string".to_string(),
                ));
            }
        };

        let items = entries
            .into_iter()
            .map(|(field, direction)| {
                let resolved = resolver.resolve(field)?;
                let direction = match direction.as_str() {
                    Some("asc") => OrderDir::Asc,
                    Some("desc") => OrderDir::Desc,
                    _ => {
                        return Err(QueryError::InvalidOrders(format!(
                            "Order direction must be 'asc' or 'desc', received {direction}"
                        )));
                    }
                };
                Ok(OrderItem {
                    raw: resolved.is_flag(),
                    column: resolved.column,
                    direction,
                })
            })
            .collect::<Result<_, QueryError>>()?;

        Ok(Self { items })
    }

    pub fn apply(&self, builder: &mut dyn StatementBuilder) {
        for item in &self.items {
            if item.raw {
                builder.order_by_raw(&format!("{} {}", item.column, item.direction.as_str()));
            } else {
                builder.order_by(&item.column, item.direction);
            }
        }
    }
}
