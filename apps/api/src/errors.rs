use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;

/// Failure categories surfaced across the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    RateLimited,
    UnreadableDocument,
    Timeout,
    MalformedOutput,
    UnknownFailure,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidInput | ErrorKind::UnreadableDocument => StatusCode::BAD_REQUEST,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Timeout | ErrorKind::MalformedOutput | ErrorKind::UnknownFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large (limit {limit} bytes)")]
    FileTooLarge { limit: usize },

    #[error("Invalid upload: {0}")]
    MalformedUpload(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::MissingFile
            | AppError::InvalidFileType(_)
            | AppError::FileTooLarge { .. }
            | AppError::MalformedUpload(_) => ErrorKind::InvalidInput,
            AppError::Analysis(e) => e.kind(),
            AppError::Internal(_) => ErrorKind::UnknownFailure,
        }
    }

    /// The `(error, details)` pair shown to the client.
    fn public_message(&self) -> (&'static str, String) {
        match self {
            AppError::MissingFile => ("No file uploaded", "Please select a file to upload".into()),
            AppError::InvalidFileType(_) => (
                "Invalid file type",
                "Only PDF and Word documents are allowed.".into(),
            ),
            AppError::FileTooLarge { limit } => (
                "File too large",
                format!("The uploaded file exceeds the {} limit.", format_limit(*limit)),
            ),
            AppError::MalformedUpload(_) => (
                "Invalid upload",
                "The upload could not be read. Please try again.".into(),
            ),
            AppError::Analysis(e) => e.public_message(),
            AppError::Internal(_) => (
                "Server error",
                "An unexpected error occurred. Please try again.".into(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::Analysis(e) => tracing::error!("Analysis error: {e}"),
            other => tracing::warn!("Rejected upload: {other}"),
        }

        let status = self.kind().status();
        let (error, details) = self.public_message();
        let body = Json(json!({
            "error": error,
            "details": details,
        }));

        (status, body).into_response()
    }
}

fn format_limit(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{bytes} bytes")
    }
}
