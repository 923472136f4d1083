//! Defines the AST for SQL expressions.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `t.id` or `p.*`.
    Identifier(Ident),

    /// A bound parameter value.
    Value(Value),

    /// A raw SQL fragment whose `?` markers bind `params` in order.
    Raw { sql: String, params: Vec<Value> },

    /// A function call, e.g., `COUNT(*)` or `MAX(t.price)`.
    FunctionCall(FunctionCall),

    /// An aliased expression, e.g. `COUNT(*) AS total_count`
    Alias { expr: Box<Expr>, alias: String },
}

impl Expr {
    pub fn raw(sql: &str) -> Self {
        Expr::Raw {
            sql: sql.to_string(),
            params: Vec::new(),
        }
    }

    pub fn alias(self, alias: &str) -> Self {
        Expr::Alias {
            expr: Box::new(self),
            alias: alias.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 't' in 't.id'
    pub name: String,              // e.g., the 'id' in 't.id'
}

impl Ident {
    /// Splits `qualifier.name` on the last dot; a bare name has no qualifier.
    pub fn parse(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((qualifier, column)) if !qualifier.is_empty() => Ident {
                qualifier: Some(qualifier.to_string()),
                name: column.to_string(),
            },
            _ => Ident {
                qualifier: None,
                name: name.to_string(),
            },
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "*"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool, // represents the '*' in 'COUNT(*)'
}
