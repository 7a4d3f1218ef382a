use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FillError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Event dispatch failed: {0}")]
    DispatchFailure(String),

    #[error("Event class not supported: {0}")]
    UnsupportedEvent(String),

    #[error("Document backend error: {0}")]
    BackendError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}
