//! Analysis pipeline — compose prompt → call model → extract → render.
//!
//! One pass per submission. Nothing is retried; any failure ends the submission.

use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::extractor::extract_analysis;
use crate::analysis::prompts::compose_prompt;
use crate::analysis::render::{render_report, AnalysisReport};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::analysis::AnalysisRequest;

pub async fn run_analysis(
    generator: &dyn TextGenerator,
    request: &AnalysisRequest,
) -> Result<AnalysisReport, AppError> {
    let analysis_id = Uuid::new_v4();
    info!(%analysis_id, ?request, "Starting resume analysis");

    let prompt = compose_prompt(&request.resume_text, &request.job_description);
    let raw = generator.generate(&request.api_key, &prompt).await?;

    let result = extract_analysis(&raw).map_err(|e| {
        warn!(
            %analysis_id,
            raw_chars = e.raw().len(),
            "Could not extract analysis from model output: {e}"
        );
        AppError::from(e)
    })?;

    info!(
        %analysis_id,
        match_percentage = result.match_percentage,
        missing_keywords = result.missing_keywords.len(),
        "Analysis complete"
    );

    Ok(render_report(analysis_id, result))
}
