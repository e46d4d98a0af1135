//! Structured error handling for storage operations.

use hipstr::HipStr;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in storage operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Bucket or object does not exist.
    NotFound,
    /// Name collision on create.
    AlreadyExists,
    /// Delete of a bucket that still contains objects.
    BucketNotEmpty,
    /// Caller is not allowed to perform the operation.
    PermissionDenied,
    /// Credentials were rejected by the transport.
    Authentication,
    /// Network or HTTP failure reported by the transport.
    Transport,
    /// Invalid local input or an operation invoked in a terminal state.
    Configuration,
    /// Declared upload length differs from the bytes actually pushed.
    LengthMismatch,
    /// Upload abandoned before it was finished.
    Cancelled,
    /// Wire payload could not be encoded or decoded.
    Serialization,
}

impl ErrorKind {
    /// Check if this error kind is typically retryable.
    ///
    /// The client itself never retries; this is a hint for the transport.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport)
    }
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<HipStr<'static>>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<HipStr<'static>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Creates a [`ErrorKind::NotFound`] error.
    pub fn not_found(message: impl Into<HipStr<'static>>) -> Self {
        Self::new(ErrorKind::NotFound).with_message(message)
    }

    /// Creates a [`ErrorKind::AlreadyExists`] error.
    pub fn already_exists(message: impl Into<HipStr<'static>>) -> Self {
        Self::new(ErrorKind::AlreadyExists).with_message(message)
    }

    /// Creates a [`ErrorKind::BucketNotEmpty`] error.
    pub fn bucket_not_empty(bucket: &str) -> Self {
        Self::new(ErrorKind::BucketNotEmpty).with_message(format!("bucket '{bucket}' is not empty"))
    }

    /// Creates a [`ErrorKind::Configuration`] error.
    pub fn configuration(message: impl Into<HipStr<'static>>) -> Self {
        Self::new(ErrorKind::Configuration).with_message(message)
    }

    /// Creates a [`ErrorKind::LengthMismatch`] error.
    pub fn length_mismatch(expected: u64, actual: u64) -> Self {
        Self::new(ErrorKind::LengthMismatch).with_message(format!(
            "declared length {expected} bytes, received {actual} bytes"
        ))
    }

    /// Creates a [`ErrorKind::Cancelled`] error.
    pub fn cancelled(message: impl Into<HipStr<'static>>) -> Self {
        Self::new(ErrorKind::Cancelled).with_message(message)
    }

    /// Creates a [`ErrorKind::Transport`] error.
    pub fn transport(message: impl Into<HipStr<'static>>) -> Self {
        Self::new(ErrorKind::Transport).with_message(message)
    }

    /// Returns whether this error indicates a missing bucket or object.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Returns whether this error was raised by local validation.
    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }

    /// Check if this error is retryable based on its kind.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::from_source(ErrorKind::Serialization, error).with_message("Invalid wire payload")
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        let message = if error.is_cancelled() {
            "upload task was aborted"
        } else {
            "upload task panicked"
        };
        Self::from_source(ErrorKind::Cancelled, error).with_message(message)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_error_new() {
        let error = Error::new(ErrorKind::NotFound);
        assert_eq!(error.kind, ErrorKind::NotFound);
        assert!(error.message.is_none());
        assert!(error.source.is_none());
    }

    #[test]
    fn test_error_display() {
        let error = Error::bucket_not_empty("photos");
        let display_str = error.to_string();
        assert!(display_str.contains("bucket_not_empty"));
        assert!(display_str.contains("photos"));
    }

    #[test]
    fn test_static_message_is_borrowed() {
        let error = Error::configuration("page size must be at least 1");
        assert!(error.message.as_ref().is_some_and(|m| m.is_borrowed()));
    }

    #[test]
    fn test_length_mismatch_message() {
        let error = Error::length_mismatch(10, 7);
        assert_eq!(error.kind, ErrorKind::LengthMismatch);
        assert_eq!(
            error.message.as_deref(),
            Some("declared length 10 bytes, received 7 bytes")
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            ErrorKind::from_str("already_exists").unwrap(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            ErrorKind::from_str("permission_denied").unwrap(),
            ErrorKind::PermissionDenied
        );
        assert!(ErrorKind::from_str("teapot").is_err());
    }

    #[test]
    fn test_retryable() {
        assert!(Error::transport("reset").is_retryable());
        assert!(!Error::not_found("gone").is_retryable());
        assert!(!Error::configuration("bad").is_retryable());
    }

    #[test]
    fn test_serde_conversion() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let error = Error::from(err);
        assert_eq!(error.kind, ErrorKind::Serialization);
        assert!(error.source.is_some());
    }
}
