use crate::{error::QueryError, resolver::FieldResolver};
use model::spec::GroupParam;
use query_builder::StatementBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupItem {
    pub column: String,
    pub raw: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupClause {
    pub items: Vec<GroupItem>,
}

impl GroupClause {
    pub fn compile(
        resolver: &FieldResolver<'_>,
        group: Option<&GroupParam>,
    ) -> Result<Self, QueryError> {
        let fields: Vec<&str> = match group {
            None | Some(GroupParam::Toggle(false)) => return Ok(Self::default()),
            Some(GroupParam::Field(field)) => vec![field.as_str()],
            Some(GroupParam::Fields(fields)) if fields.is_empty() => {
                return Err(QueryError::InvalidGroups(format!(
                    "Param 'group' must have some fields, check {}.fields",
                    resolver.schema().name
                )));
            }
            Some(GroupParam::Fields(fields)) => fields.iter().map(String::as_str).collect(),
            Some(GroupParam::Toggle(true) | GroupParam::Invalid(_)) => {
                return Err(QueryError::InvalidGroups(
                    "Param 'group' must be string or an array".to_string(),
                ));
            }
        };

        let mut unique: Vec<&str> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.contains(&field) {
                unique.push(field);
            }
        }

        let items = unique
            .into_iter()
            .map(|field| {
                let resolved = resolver.resolve(field)?;
                Ok(GroupItem {
                    raw: resolved.is_flag(),
                    column: resolved.column,
                })
            })
            .collect::<Result<_, QueryError>>()?;

        Ok(Self { items })
    }

    pub fn apply(&self, builder: &mut dyn StatementBuilder) {
        for item in &self.items {
            if item.raw {
                builder.group_by_raw(&item.column);
            } else {
                builder.group_by(&item.column);
            }
        }
    }
}
