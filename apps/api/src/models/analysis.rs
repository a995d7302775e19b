use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::upload::UploadedResume;

/// Feedback produced by the external analysis process.
/// All four fields are required and must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub strengths: String,
    pub weaknesses: String,
    pub job_suggestions: String,
}

/// Input to a single orchestration call.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub file_path: PathBuf,
}

impl AnalysisRequest {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl From<&UploadedResume> for AnalysisRequest {
    fn from(resume: &UploadedResume) -> Self {
        Self::new(resume.stored_path.clone())
    }
}
