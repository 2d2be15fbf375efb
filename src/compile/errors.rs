use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown filter operator `{0}`")]
    UnknownOperator(String),

    #[error("Filter nesting depth {depth} exceeds the limit of {limit}")]
    FilterTooDeep { depth: usize, limit: usize },
}

pub type CompileResult<T> = Result<T, CompileError>;
