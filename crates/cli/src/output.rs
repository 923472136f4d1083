use crate::error::CliError;
use serde::Serialize;
use serde_json::Value;

/// A rendered statement as printed by `specql compile`.
#[derive(Debug, Serialize)]
pub struct CompiledStatement {
    pub dialect: String,
    pub sql: String,
    pub params: Vec<Value>,
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub async fn emit<T: Serialize>(value: &T, path: Option<String>) -> Result<(), CliError> {
    let json = to_json(value)?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compiled_statement_json() {
        let statement = CompiledStatement {
            dialect: "mysql".into(),
            sql: "SELECT `t`.* FROM `users` AS `t` LIMIT 1".into(),
            params: vec![],
        };
        let parsed: Value = serde_json::from_str(&to_json(&statement).unwrap()).unwrap();
        assert_eq!(
            parsed,
            json!({
                "dialect": "mysql",
                "sql": "SELECT `t`.* FROM `users` AS `t` LIMIT 1",
                "params": []
            })
        );
    }
}
