//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::analysis::pipeline::run_analysis;
use crate::analysis::render::AnalysisReport;
use crate::analysis::upload::parse_multipart;
use crate::errors::AppError;
use crate::models::analysis::AnalysisRequest;
use crate::resume::extract_resume_text;
use crate::state::AppState;

/// POST /api/v1/analyze
///
/// Multipart fields: `api_key`, `job_description`, `resume` (PDF).
/// Missing inputs are rejected before the PDF is read or the model is called.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let form = parse_multipart(multipart).await?.require_all()?;

    info!(
        "Received resume '{}' ({} bytes)",
        form.resume.filename,
        form.resume.data.len()
    );
    let resume_text = extract_resume_text(form.resume.data).await?;

    let request = AnalysisRequest {
        resume_text,
        job_description: form.job_description,
        api_key: form.api_key,
    };

    let report = run_analysis(state.generator.as_ref(), &request).await?;
    Ok(Json(report))
}
