use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A known attribute received a value of the wrong shape.
    #[error("invalid value for field: {0}")]
    InvalidField(String),
    #[error("unknown class: {0}")]
    UnknownClass(String),
}

