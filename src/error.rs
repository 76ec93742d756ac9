//! Crate-level error types.

/// Result alias used throughout the crate.
pub type AnimateResult<T> = Result<T, AnimateError>;

/// Errors produced by the auto-animate crate.
#[derive(thiserror::Error, Debug)]
pub enum AnimateError {
    /// Options rejected at attach/validate time (e.g. negative duration).
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// The watched container is no longer part of the document.
    #[error("container is detached from the document")]
    ContainerDetached,
    /// TOML/JSON options parsing or serialization failure.
    #[error("options parse error: {0}")]
    OptionsParse(String),
    /// Generic I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnimateError {
    /// Build an [`AnimateError::InvalidOptions`] from any message.
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }

    /// Build an [`AnimateError::OptionsParse`] from any message.
    pub fn options_parse(msg: impl Into<String>) -> Self {
        Self::OptionsParse(msg.into())
    }
}
