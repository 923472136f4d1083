use crate::error::QueryError;
use model::{QuerySpec, spec::is_truthy};
use query_builder::StatementBuilder;
use serde_json::Value;

/// Validated `LIMIT`/`OFFSET`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// `page` wins over `offset` and requires `limit`.
    pub fn compile(spec: &QuerySpec) -> Result<Self, QueryError> {
        let limit = coerce("limit", spec.limit.as_ref())?;
        let page = coerce("page", spec.page.as_ref())?;

        let offset = match page {
            Some(page) => {
                let limit = limit.ok_or_else(|| {
                    QueryError::InvalidLimits(
                        "Param 'limit' is required when param 'page' given".to_string(),
                    )
                })?;
                if page < 1 {
                    return Err(QueryError::InvalidLimits(format!(
                        "Param 'page' must be positive, got {page}"
                    )));
                }
                let offset = (page - 1).checked_mul(limit).ok_or_else(|| {
                    QueryError::InvalidLimits(format!(
                        "Param 'page' is out of range for limit {limit}"
                    ))
                })?;
                Some(offset)
            }
            None => coerce("offset", spec.offset.as_ref())?,
        };

        Ok(Self {
            limit: non_negative("limit", limit)?,
            offset: non_negative("offset", offset)?,
        })
    }

    pub fn apply(&self, builder: &mut dyn StatementBuilder) {
        if let Some(limit) = self.limit {
            builder.limit(limit);
        }
        if let Some(offset) = self.offset {
            builder.offset(offset);
        }
    }
}

/// Integers and integral numeric strings coerce; falsy values are absent.
fn coerce(name: &str, value: Option<&Value>) -> Result<Option<i64>, QueryError> {
    let Some(value) = value.filter(|v| is_truthy(v)) else {
        return Ok(None);
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };

    match parsed {
        Some(0) => Ok(None),
        Some(n) => Ok(Some(n)),
        None => Err(QueryError::InvalidLimits(format!(
            "Invalid '{name}' format, '{name}' must be an integer"
        ))),
    }
}

/// Whole floats inside the `i64` range.
fn integral(f: f64) -> Option<i64> {
    let range = i64::MIN as f64..i64::MAX as f64;
    (f.fract() == 0.0 && range.contains(&f)).then_some(f as i64)
}

fn non_negative(name: &str, value: Option<i64>) -> Result<Option<u64>, QueryError> {
    value
        .map(|n| {
            u64::try_from(n).map_err(|_| {
                QueryError::InvalidLimits(format!("Param '{name}' can't be negative, got {n}"))
            })
        })
        .transpose()
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
        let pagination = Pagination::compile(&fixtures::spec(spec))?;
        let mut recorder = Recorder::new();
        pagination.apply(&mut recorder);
        Ok(recorder.calls)
    }

    #[test]
    fn test_limit_and_page() {
        assert_eq!(
            compile(json!({ "limit": 5, "page": 3 })).unwrap(),
            ["limit(5)", "offset(10)"]
        );
        assert_eq!(
            compile(json!({ "limit": 1, "page": 9223372036854775807i64 })).unwrap(),
            ["limit(1)", "offset(9223372036854775806)"]
        );
    }

    #[test]
    fn test_page_wins_over_offset() {
        assert_eq!(
            compile(json!({ "limit": "20", "page": "1", "offset": 99 })).unwrap(),
            ["limit(20)", "offset(0)"]
        );
    }

    #[test]
    fn test_offset_alone() {
        assert_eq!(compile(json!({ "offset": 15 })).unwrap(), ["offset(15)"]);
    }

    #[test]
    fn test_falsy_values_are_absent() {
        assert!(
            compile(json!({ "limit": 0, "page": "", "offset": null }))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_invalid_limits() {
        for spec in [
            json!({ "limit": "foo" }),
            json!({ "limit": [5] }),
            json!({ "limit": { "n": 5 } }),
            json!({ "limit": 2.5 }),
            json!({ "page": 2 }),
            json!({ "limit": 5, "page": "x" }),
            json!({ "offset": "ten" }),
            json!({ "limit": -1 }),
            json!({ "limit": 5, "page": -2 }),
            json!({ "limit": 5, "page": "-9223372036854775808" }),
            json!({ "limit": 1000, "page": 9223372036854775807i64 }),
            json!({ "limit": 18446744073709551615u64 }),
            json!({ "limit": "1e30" }),
            json!({ "offset": -1e300 }),
        ] {
            let err = compile(spec.clone()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidLimits, "{spec}");
        }
    }
}
