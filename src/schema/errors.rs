use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("Failed to read schema definition: {0}")]
    Read(String),

    #[error("Failed to parse schema definition: {0}")]
    Parse(String),

    #[error("Unknown collection `{0}`")]
    UnknownCollection(String),
}
