//! Analysis Orchestrator — runs the external résumé analysis process and turns its
//! output streams into an `AnalysisResult` or a classified `AnalysisError`.
//!
//! `AppState` holds an `Arc<dyn Analyzer>`; `ScriptAnalyzer` is the production backend.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::ErrorKind;
use crate::models::analysis::{AnalysisRequest, AnalysisResult};

pub mod classify;
pub mod output;
pub mod runner;

pub use runner::ScriptAnalyzer;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analyzer rejected the input: {0}")]
    InvalidInput(String),

    #[error("Upstream AI service rate limited: {0}")]
    RateLimited(String),

    #[error("Document could not be read: {0}")]
    UnreadableDocument(String),

    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed analysis output: {0}")]
    MalformedOutput(String),

    #[error("Analysis failed: {0}")]
    Failed(String),

    #[error("Analyzer process I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InvalidInput(_) => ErrorKind::InvalidInput,
            AnalysisError::RateLimited(_) => ErrorKind::RateLimited,
            AnalysisError::UnreadableDocument(_) => ErrorKind::UnreadableDocument,
            AnalysisError::Timeout(_) => ErrorKind::Timeout,
            AnalysisError::MalformedOutput(_) => ErrorKind::MalformedOutput,
            AnalysisError::Failed(_) | AnalysisError::Io(_) => ErrorKind::UnknownFailure,
        }
    }

    /// Client-facing `(error, details)`. Never includes process output.
    pub fn public_message(&self) -> (&'static str, String) {
        let (error, details) = match self {
            AnalysisError::InvalidInput(_) => (
                "Invalid file",
                "The uploaded file could not be analyzed. Please check the document and try again.",
            ),
            AnalysisError::RateLimited(_) => (
                "API rate limit exceeded",
                "The service is experiencing high demand. Please try again in a few minutes.",
            ),
            AnalysisError::UnreadableDocument(_) => (
                "Invalid PDF file",
                "The uploaded file could not be read. Please ensure it's a valid PDF document.",
            ),
            AnalysisError::Timeout(_) => (
                "Analysis timeout",
                "The analysis took too long to complete. Please try again.",
            ),
            AnalysisError::MalformedOutput(_) => (
                "Failed to parse analysis results",
                "There was an error processing the analysis results. Please try again.",
            ),
            AnalysisError::Failed(_) | AnalysisError::Io(_) => (
                "Analysis failed",
                "There was an error analyzing your resume. Please try again.",
            ),
        };
        (error, details.to_string())
    }
}

/// The analysis backend. Implement this to swap the external process for another
/// collaborator without touching the upload endpoint.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;
}
