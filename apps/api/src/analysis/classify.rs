//! Failure classification for a non-zero analyzer exit.
//!
//! The analyzer reports its failure category through stderr. Two channels are understood:
//! a structured `ANALYSIS_ERROR {"kind": ..., "detail": ...}` line, and the legacy marker
//! phrases the existing Python script prints. Structured lines take precedence; scripts that
//! never emit them are classified by markers alone.

use serde::Deserialize;
use tracing::debug;

use crate::analysis::AnalysisError;

/// Printed by the Gemini client when the upstream quota is exhausted.
pub const RATE_LIMIT_MARKER: &str = "429 Resource has been exhausted";
/// Printed by the script when PDF text extraction fails.
pub const PDF_READ_MARKER: &str = "Error reading PDF";
pub const STRUCTURED_ERROR_PREFIX: &str = "ANALYSIS_ERROR";

const MAX_DETAIL_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct StructuredError {
    kind: ReportedKind,
    #[serde(default)]
    detail: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReportedKind {
    InvalidInput,
    RateLimited,
    UnreadableDocument,
    MalformedOutput,
    UnknownFailure,
}

/// Maps a failed run's exit code and accumulated stderr to an `AnalysisError`.
pub fn classify_failure(exit_code: Option<i32>, stderr: &str) -> AnalysisError {
    if let Some(reported) = last_structured_error(stderr) {
        let detail = if reported.detail.is_empty() {
            exit_detail(exit_code, stderr)
        } else {
            truncate(&reported.detail)
        };
        return match reported.kind {
            ReportedKind::InvalidInput => AnalysisError::InvalidInput(detail),
            ReportedKind::RateLimited => AnalysisError::RateLimited(detail),
            ReportedKind::UnreadableDocument => AnalysisError::UnreadableDocument(detail),
            ReportedKind::MalformedOutput => AnalysisError::MalformedOutput(detail),
            ReportedKind::UnknownFailure => AnalysisError::Failed(detail),
        };
    }

    let detail = exit_detail(exit_code, stderr);
    if stderr.contains(RATE_LIMIT_MARKER) {
        AnalysisError::RateLimited(detail)
    } else if stderr.contains(PDF_READ_MARKER) {
        AnalysisError::UnreadableDocument(detail)
    } else {
        AnalysisError::Failed(detail)
    }
}

fn last_structured_error(stderr: &str) -> Option<StructuredError> {
    stderr
        .lines()
        .rev()
        .filter_map(|line| line.trim().strip_prefix(STRUCTURED_ERROR_PREFIX))
        .find_map(|payload| match serde_json::from_str::<StructuredError>(payload.trim()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Ignoring unparseable structured error line: {e}");
                None
            }
        })
}

/// Exit code plus the last non-empty stderr line, for logs.
fn exit_detail(exit_code: Option<i32>, stderr: &str) -> String {
    let code = exit_code.map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"));
    match stderr.lines().rev().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => format!("{code}: {}", truncate(line)),
        None => code,
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DETAIL_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_DETAIL_CHARS).collect();
        format!("{cut}…")
    }
}
