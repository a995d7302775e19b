use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use chrono::Utc;
use rand::Rng;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::errors::AppError;
use crate::models::upload::{DocumentType, UploadedResume};
use crate::upload::intake::PendingUpload;

const RANDOM_SUFFIX_BOUND: u32 = 1_000_000_000;
const MAX_EXTENSION_CHARS: usize = 8;

/// Staging directory for accepted uploads.
///
/// The directory is created on first use and re-created if it disappears later, so an
/// external cleanup job may remove it at any time. Files are never removed here; retention
/// is left to whoever operates the service.
#[derive(Debug)]
pub struct StagingArea {
    dir: PathBuf,
    announced: AtomicBool,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            announced: AtomicBool::new(false),
        }
    }

    /// Idempotent create-if-absent, run before every store.
    async fn ensure_dir(&self) -> std::io::Result<()> {
        match fs::create_dir_all(&self.dir).await {
            Ok(()) => {}
            // Lost a creation race with another process; the directory is there.
            Err(e) if e.kind() == IoErrorKind::AlreadyExists && self.dir.is_dir() => {}
            Err(e) => return Err(e),
        }
        if !self.announced.swap(true, Ordering::Relaxed) {
            info!("Staging directory ready at {}", self.dir.display());
        }
        Ok(())
    }

    /// Persists a validated upload under a fresh `resume-<millis>-<random>.<ext>` name.
    pub async fn store(&self, upload: PendingUpload) -> Result<UploadedResume, AppError> {
        self.ensure_dir()
            .await
            .with_context(|| format!("Failed to create staging directory {}", self.dir.display()))?;

        let stored_path = self
            .dir
            .join(staged_file_name(&upload.original_filename, upload.document_type));

        // create_new: a name collision fails loudly instead of overwriting another upload.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&stored_path)
            .await
            .with_context(|| format!("Failed to create staged file {}", stored_path.display()))?;
        file.write_all(&upload.data)
            .await
            .with_context(|| format!("Failed to write staged file {}", stored_path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("Failed to flush staged file {}", stored_path.display()))?;

        Ok(UploadedResume {
            original_filename: upload.original_filename,
            stored_path,
            document_type: upload.document_type,
            size_bytes: upload.data.len(),
        })
    }
}

fn staged_file_name(original_filename: &str, document_type: DocumentType) -> String {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_CHARS
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| document_type.extension().to_string());

    let millis = Utc::now().timestamp_millis();
    let suffix = rand::rng().random_range(0..RANDOM_SUFFIX_BOUND);
    format!("resume-{millis}-{suffix}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn pending(name: &str, document_type: DocumentType, data: &'static [u8]) -> PendingUpload {
        PendingUpload {
            original_filename: name.to_string(),
            document_type,
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_file_name_shape() {
        let name = staged_file_name("My Resume.PDF", DocumentType::Pdf);
        let parts: Vec<&str> = name.trim_end_matches(".pdf").split('-').collect();
        assert!(name.ends_with(".pdf"), "{name}");
        assert_eq!(parts.len(), 3, "{name}");
        assert_eq!(parts[0], "resume");
        assert!(parts[1].parse::<i64>().is_ok());
        assert!(parts[2].parse::<u32>().unwrap() < RANDOM_SUFFIX_BOUND);
    }

    #[test]
    fn test_suspicious_extension_uses_canonical() {
        let name = staged_file_name("cv.do c", DocumentType::Doc);
        assert!(name.ends_with(".doc"), "{name}");
        let name = staged_file_name("no_extension", DocumentType::Docx);
        assert!(name.ends_with(".docx"), "{name}");
    }

    #[test]
    fn test_path_components_never_leak_into_name() {
        let name = staged_file_name("../../etc/passwd.pdf", DocumentType::Pdf);
        assert!(!name.contains('/'), "{name}");
    }

    #[tokio::test]
    async fn test_store_creates_directory_lazily() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("uploads");
        let staging = StagingArea::new(&dir);
        assert!(!dir.exists());

        let stored = staging
            .store(pending("resume.pdf", DocumentType::Pdf, b"%PDF-1.7"))
            .await
            .unwrap();

        assert!(dir.is_dir());
        assert_eq!(stored.stored_path.parent(), Some(dir.as_path()));
        assert_eq!(stored.size_bytes, 8);
        assert_eq!(std::fs::read(&stored.stored_path).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_existing_directory_is_reused() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("keep.txt"), b"x").unwrap();
        let staging = StagingArea::new(root.path());

        staging
            .store(pending("cv.docx", DocumentType::Docx, b"PK"))
            .await
            .unwrap();

        assert!(root.path().join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_directory_removed_at_runtime_is_recreated() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("uploads");
        let staging = StagingArea::new(&dir);

        staging
            .store(pending("resume.pdf", DocumentType::Pdf, b"%PDF-1"))
            .await
            .unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let stored = staging
            .store(pending("resume.pdf", DocumentType::Pdf, b"%PDF-2"))
            .await
            .unwrap();

        assert!(dir.is_dir());
        assert_eq!(std::fs::read(&stored.stored_path).unwrap(), b"%PDF-2");
    }

    #[tokio::test]
    async fn test_concurrent_stores_get_distinct_files() {
        let root = tempfile::tempdir().unwrap();
        let staging = Arc::new(StagingArea::new(root.path().join("uploads")));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let staging = Arc::clone(&staging);
            tasks.spawn(async move {
                staging
                    .store(pending("resume.pdf", DocumentType::Pdf, b"%PDF"))
                    .await
                    .map(|stored| stored.stored_path)
            });
        }

        let mut paths = HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            paths.insert(joined.unwrap().unwrap());
        }
        assert_eq!(paths.len(), 16);
    }
}
