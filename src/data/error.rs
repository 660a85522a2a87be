use thiserror::Error;

use super::model::Field;

/// Conditions the query layer can signal. None of them are fatal and none are
/// worth retrying: queries are deterministic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// `low > high` in a range filter.
    #[error("invalid range: {low} > {high}")]
    InvalidRange { low: f64, high: f64 },

    /// The caller named a column that is not part of the schema.
    #[error("no such field: {0:?}")]
    MissingField(String),

    /// No dataset loaded, or a result the caller needs at least one row of is empty.
    #[error("dataset is empty")]
    EmptyDataset,

    /// A count parameter (`n`) below 1.
    #[error("count must be at least 1, got {0}")]
    InvalidCount(usize),

    /// The field exists but has the wrong kind for the operation.
    #[error("field {field} is not a {expected} field")]
    FieldKind { field: Field, expected: &'static str },
}

pub type QueryResult<T> = Result<T, QueryError>;
