use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Unknown field: {0}")]
    InvalidField(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Cannot mix inclusion and exclusion in fields")]
    MixedProjection,

    #[error("Invalid query parameter: {0}")]
    InvalidParameter(String),
}
