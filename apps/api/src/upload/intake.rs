use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::upload::DocumentType;

/// Multipart field name the résumé must be submitted under.
pub const RESUME_FIELD: &str = "resume";

/// A validated upload held in memory. Nothing touches disk until it is staged.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub original_filename: String,
    pub document_type: DocumentType,
    pub data: Bytes,
}

/// Pulls the résumé out of a multipart submission.
///
/// Only file parts named `resume` are considered. The first one with an allowed type wins;
/// any later candidates are skipped without being buffered. A candidate larger than
/// `max_bytes` fails the whole request before anything is written.
pub async fn receive_resume(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<PendingUpload, AppError> {
    let mut accepted: Option<PendingUpload> = None;
    let mut rejected: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(RESUME_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let file_name = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => continue,
        };

        if let Some(kept) = &accepted {
            warn!(
                "Ignoring additional file '{file_name}'; only '{}' is analyzed",
                kept.original_filename
            );
            continue;
        }

        let declared = field.content_type().map(str::to_string);
        let Some(document_type) = resolve_document_type(declared.as_deref(), &file_name) else {
            warn!(
                "Rejected '{file_name}' with declared type {:?}",
                declared.as_deref().unwrap_or("<none>")
            );
            rejected.get_or_insert_with(|| match &declared {
                Some(ct) => format!("{file_name} ({ct})"),
                None => file_name.clone(),
            });
            continue;
        };

        let data = read_capped(&mut field, max_bytes).await?;
        accepted = Some(PendingUpload {
            original_filename: file_name,
            document_type,
            data,
        });
    }

    match (accepted, rejected) {
        (Some(upload), _) => Ok(upload),
        (None, Some(rejected)) => Err(AppError::InvalidFileType(rejected)),
        (None, None) => Err(AppError::MissingFile),
    }
}

/// The declared media type is authoritative. Clients that send no type, or the generic
/// `application/octet-stream`, fall back to the filename extension.
fn resolve_document_type(declared: Option<&str>, file_name: &str) -> Option<DocumentType> {
    match declared.map(str::trim) {
        Some(ct) if !ct.is_empty() && !is_octet_stream(ct) => DocumentType::from_media_type(ct),
        _ => DocumentType::from_file_name(file_name),
    }
}

fn is_octet_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/octet-stream"))
}

async fn read_capped(field: &mut Field<'_>, max_bytes: usize) -> Result<Bytes, AppError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if data.len() + chunk.len() > max_bytes {
            return Err(AppError::FileTooLarge { limit: max_bytes });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data.freeze())
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { limit: max_bytes }
    } else {
        AppError::MalformedUpload(err.body_text())
    }
}
