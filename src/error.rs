//! Error types for the blackout service.
//!
//! Every failure the engine or the upload handler can produce is one
//! variant of [`RedactorError`]. Callers that only care about the
//! client-facing category use [`RedactorError::kind`].

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for redaction operations.
pub type RedactorResult<T> = Result<T, RedactorError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Comprehensive error type for all redaction operations.
#[derive(Debug, Error)]
pub enum RedactorError {
    /// Access credential did not match the configured secret
    #[error("Invalid access credentials")]
    AccessDenied,

    /// Upload rejected before the engine saw it
    #[error("Invalid upload: {reason}")]
    InvalidUpload { reason: String },

    /// Upload exceeded the configured maximum size
    #[error("Upload exceeds the {max} byte limit")]
    UploadTooLarge { max: u64 },

    /// Input bytes are not a parseable PDF
    #[error("Unreadable document: {message}")]
    UnreadableDocument {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Document is encrypted and the open password was rejected
    #[error("Incorrect PDF password")]
    IncorrectPassword,

    /// Mutation or serialization failed
    #[error("{}", processing_message(.message, .page))]
    Processing {
        message: String,
        page: Option<usize>,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Reading or writing a file failed
    #[error("IO error for path '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration or parameters
    #[error("Invalid input for '{parameter}': {reason}")]
    InvalidInput { parameter: String, reason: String },
}

fn processing_message(message: &str, page: &Option<usize>) -> String {
    match page {
        Some(p) => format!("PDF processing error on page {}: {}", p, message),
        None => format!("PDF processing error: {}", message),
    }
}

/// Client-facing failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AccessDenied,
    InvalidUpload,
    UnreadableDocument,
    IncorrectPassword,
    ProcessingError,
}

impl RedactorError {
    /// Collapses the variant into its client-facing category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccessDenied => ErrorKind::AccessDenied,
            Self::InvalidUpload { .. } | Self::UploadTooLarge { .. } | Self::InvalidInput { .. } => {
                ErrorKind::InvalidUpload
            }
            Self::UnreadableDocument { .. } => ErrorKind::UnreadableDocument,
            Self::IncorrectPassword => ErrorKind::IncorrectPassword,
            Self::Processing { .. } | Self::Io { .. } => ErrorKind::ProcessingError,
        }
    }

    /// Returns true when the caller should prompt for a new document password.
    pub fn is_password_error(&self) -> bool {
        matches!(self, Self::IncorrectPassword)
    }

    pub(crate) fn unreadable(detail: impl fmt::Display) -> Self {
        Self::UnreadableDocument {
            message: detail.to_string(),
            source: None,
        }
    }

    pub(crate) fn processing(
        message: impl fmt::Display,
        page: Option<usize>,
        detail: impl fmt::Display,
    ) -> Self {
        Self::Processing {
            message: format!("{}: {}", message, detail),
            page,
            source: None,
        }
    }
}

// Storage I/O without a known path is still a processing failure
impl From<io::Error> for RedactorError {
    fn from(err: io::Error) -> Self {
        Self::Processing {
            message: err.to_string(),
            page: None,
            source: Some(Box::new(err)),
        }
    }
}
