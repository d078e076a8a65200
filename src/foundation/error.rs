/// Convenience result type used across kinegraph.
pub type KinegraphResult<T> = Result<T, KinegraphError>;

/// Top-level error taxonomy used by compiler APIs.
#[derive(thiserror::Error, Debug)]
pub enum KinegraphError {
    /// Invalid stage configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An event references configuration the stage does not provide.
    #[error("config error: {0}")]
    Config(String),

    /// A malformed record in the event table.
    #[error("record error: {0}")]
    Record(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KinegraphError {
    /// Build a [`KinegraphError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KinegraphError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`KinegraphError::Record`] value.
    pub fn record(msg: impl Into<String>) -> Self {
        Self::Record(msg.into())
    }
}
