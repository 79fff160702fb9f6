use serde::{Deserialize, Serialize};

/// One user submission. Lives for a single request and is never persisted.
///
/// `Debug` is implemented by hand so the API key and resume text never reach the logs.
#[derive(Clone)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub job_description: String,
    pub api_key: String,
}

impl std::fmt::Debug for AnalysisRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisRequest")
            .field("resume_chars", &self.resume_text.chars().count())
            .field("job_description_chars", &self.job_description.chars().count())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// The validated result of one model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Always within 0..=100.
    pub match_percentage: u8,
    pub missing_keywords: Vec<String>,
    pub profile_summary: String,
    pub improvement_suggestions: Option<String>,
}
