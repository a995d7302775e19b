use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::{AnalysisRequest, AnalysisResult};
use crate::state::AppState;
use crate::upload::receive_resume;

/// POST /api/analyze-resume
///
/// Validates and stages the uploaded résumé, then runs the analyzer on the staged copy.
/// Each request gets its own analyzer run; identical uploads are not de-duplicated.
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let pending = receive_resume(multipart, state.config.max_upload_bytes).await?;
    let resume = state.staging.store(pending).await?;
    info!(
        original = %resume.original_filename,
        document_type = ?resume.document_type,
        size_bytes = resume.size_bytes,
        "Staged upload at {}",
        resume.stored_path.display()
    );

    let result = state.analyzer.analyze(AnalysisRequest::from(&resume)).await?;
    info!("Analysis complete for {}", resume.stored_path.display());

    Ok(Json(result))
}
