//! Mapping of [`RedactorError`] onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::RedactorError;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
}

/// Handler error wrapper so [`RedactorError`] can be returned from axum handlers.
#[derive(Debug)]
pub struct ApiError(pub RedactorError);

impl From<RedactorError> for ApiError {
    fn from(err: RedactorError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RedactorError::AccessDenied => StatusCode::UNAUTHORIZED,
            RedactorError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RedactorError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RedactorError::InvalidUpload { .. }
            | RedactorError::InvalidInput { .. }
            | RedactorError::UnreadableDocument { .. }
            | RedactorError::IncorrectPassword
            | RedactorError::Processing { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Never includes server paths.
    pub fn message(&self) -> String {
        match &self.0 {
            RedactorError::AccessDenied => "Invalid access credentials".to_string(),
            RedactorError::UploadTooLarge { max } => format!(
                "File too large. Maximum allowed size is {} MB.",
                max / (1024 * 1024)
            ),
            RedactorError::InvalidUpload { reason } => reason.clone(),
            RedactorError::IncorrectPassword => "Incorrect PDF password".to_string(),
            RedactorError::Io { .. } => "Failed to store the document".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::info!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        let body = Json(ErrorBody {
            status_code: status.as_u16(),
            message: self.message(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_classes() {
        assert_eq!(
            ApiError(RedactorError::AccessDenied).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError(RedactorError::IncorrectPassword).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(RedactorError::UploadTooLarge { max: 1 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError(RedactorError::IncorrectPassword).message(),
            "Incorrect PDF password"
        );
        assert_eq!(
            ApiError(RedactorError::UploadTooLarge {
                max: 200 * 1024 * 1024
            })
            .message(),
            "File too large. Maximum allowed size is 200 MB."
        );

        let io = ApiError(RedactorError::Io {
            path: PathBuf::from("/tmp/secret_input.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        });
        assert!(!io.message().contains("/tmp"));
    }
}
