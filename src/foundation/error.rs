/// Convenience result type used across Montage.
pub type MontageResult<T> = Result<T, MontageError>;

/// Top-level error taxonomy for a render job.
///
/// `Render` failures are absorbed by the pipeline (the overlay or watermark is skipped);
/// `Decode` failures drop the offending asset. Every other class reaches the caller.
#[derive(thiserror::Error, Debug)]
pub enum MontageError {
    /// No valid or supported media was supplied.
    #[error("input error: {0}")]
    Input(String),

    /// A media asset could not be opened or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Title or watermark construction failed.
    #[error("render error: {0}")]
    Render(String),

    /// Container or codec failure while writing the output.
    #[error("encode error: {0}")]
    Encode(String),

    /// The external store rejected or could not receive the artifact.
    #[error("publish error: {0}")]
    Publish(String),

    /// Invalid configuration or internal invariant violation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The job was cancelled before the artifact was committed.
    #[error("job cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stable, serializable name of an error class for structured failure payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`MontageError::Input`].
    InputError,
    /// See [`MontageError::Decode`].
    DecodeError,
    /// See [`MontageError::Render`].
    RenderError,
    /// See [`MontageError::Encode`].
    EncodeError,
    /// See [`MontageError::Publish`].
    PublishError,
    /// See [`MontageError::Validation`].
    ValidationError,
    /// See [`MontageError::Cancelled`].
    Cancelled,
    /// See [`MontageError::Other`].
    InternalError,
}

impl MontageError {
    /// Build a [`MontageError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`MontageError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MontageError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MontageError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`MontageError::Publish`] value.
    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// Build a [`MontageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Classify this error for the service boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::InputError,
            Self::Decode(_) => ErrorKind::DecodeError,
            Self::Render(_) => ErrorKind::RenderError,
            Self::Encode(_) => ErrorKind::EncodeError,
            Self::Publish(_) => ErrorKind::PublishError,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other(_) => ErrorKind::InternalError,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
