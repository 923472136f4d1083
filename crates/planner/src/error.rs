use model::ModelError;
use query_builder::DialectError;
use std::fmt;
use thiserror::Error;

/// Every way compiling or executing a query specification can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid statement builder: {0}")]
    InvalidKnex(String),

    #[error("{0}")]
    InvalidFields(String),

    #[error("{0}")]
    InvalidSelectFunction(String),

    #[error("{0}")]
    InvalidJoins(String),

    #[error("{0}")]
    InvalidFilters(String),

    #[error("{0}")]
    InvalidFlags(String),

    #[error("{0}")]
    InvalidOrders(String),

    #[error("{0}")]
    InvalidGroups(String),

    #[error("{0}")]
    InvalidLimits(String),

    #[error("{0}")]
    InvalidTable(String),

    #[error("{0}")]
    NoItems(String),

    #[error("{0}")]
    NoValues(String),

    #[error("{0}")]
    NothingSelect(String),

    #[error("Duplicate item: {0}")]
    DuplicateItem(String),

    #[error("Driver error: {0}")]
    DriverError(String),
}

/// Machine-checkable kind of a [`QueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidModel = 1,
    InvalidKnex = 2,
    InvalidFields = 3,
    InvalidSelectFunction = 4,
    InvalidJoins = 5,
    InvalidFilters = 6,
    InvalidFlags = 7,
    InvalidOrders = 8,
    InvalidGroups = 9,
    InvalidLimits = 10,
    InvalidTable = 11,
    NoItems = 12,
    NoValues = 13,
    NothingSelect = 14,
    DuplicateItem = 15,
    DriverError = 16,
}

impl ErrorCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidModel => "INVALID_MODEL",
            ErrorCode::InvalidKnex => "INVALID_KNEX",
            ErrorCode::InvalidFields => "INVALID_FIELDS",
            ErrorCode::InvalidSelectFunction => "INVALID_SELECT_FUNCTION",
            ErrorCode::InvalidJoins => "INVALID_JOINS",
            ErrorCode::InvalidFilters => "INVALID_FILTERS",
            ErrorCode::InvalidFlags => "INVALID_FLAGS",
            ErrorCode::InvalidOrders => "INVALID_ORDERS",
            ErrorCode::InvalidGroups => "INVALID_GROUPS",
            ErrorCode::InvalidLimits => "INVALID_LIMITS",
            ErrorCode::InvalidTable => "INVALID_TABLE",
            ErrorCode::NoItems => "NO_ITEMS",
            ErrorCode::NoValues => "NO_VALUES",
            ErrorCode::NothingSelect => "NOTHING_SELECT",
            ErrorCode::DuplicateItem => "DUPLICATE_ITEM",
            ErrorCode::DriverError => "DRIVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.as_u8())
    }
}

impl QueryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            QueryError::InvalidModel(_) => ErrorCode::InvalidModel,
            QueryError::InvalidKnex(_) => ErrorCode::InvalidKnex,
            QueryError::InvalidFields(_) => ErrorCode::InvalidFields,
            QueryError::InvalidSelectFunction(_) => ErrorCode::InvalidSelectFunction,
            QueryError::InvalidJoins(_) => ErrorCode::InvalidJoins,
            QueryError::InvalidFilters(_) => ErrorCode::InvalidFilters,
            QueryError::InvalidFlags(_) => ErrorCode::InvalidFlags,
            QueryError::InvalidOrders(_) => ErrorCode::InvalidOrders,
            QueryError::InvalidGroups(_) => ErrorCode::InvalidGroups,
            QueryError::InvalidLimits(_) => ErrorCode::InvalidLimits,
            QueryError::InvalidTable(_) => ErrorCode::InvalidTable,
            QueryError::NoItems(_) => ErrorCode::NoItems,
            QueryError::NoValues(_) => ErrorCode::NoValues,
            QueryError::NothingSelect(_) => ErrorCode::NothingSelect,
            QueryError::DuplicateItem(_) => ErrorCode::DuplicateItem,
            QueryError::DriverError(_) => ErrorCode::DriverError,
        }
    }
}

impl From<ModelError> for QueryError {
    fn from(err: ModelError) -> Self {
        QueryError::InvalidModel(err.to_string())
    }
}

impl From<DialectError> for QueryError {
    fn from(err: DialectError) -> Self {
        QueryError::InvalidKnex(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::InvalidModel.as_u8(), 1);
        assert_eq!(ErrorCode::InvalidLimits.as_u8(), 10);
        assert_eq!(ErrorCode::DriverError.as_u8(), 16);
        assert_eq!(
            QueryError::NothingSelect("Nothing to select".into()).code(),
            ErrorCode::NothingSelect
        );
    }

    #[test]
    fn test_conversions() {
        let err: QueryError = DialectError("oracle".into()).into();
        assert_eq!(err.code(), ErrorCode::InvalidKnex);

        let err: QueryError = ModelError::MissingTable("Users".into()).into();
        assert_eq!(err.code(), ErrorCode::InvalidModel);
        assert_eq!(
            err.to_string(),
            "Invalid model: Schema model 'Users' must declare a table"
        );
    }
}
