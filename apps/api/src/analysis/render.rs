//! Report rendering — turns an `AnalysisResult` into the view the page displays.
//!
//! The page only draws what it is given: banner levels and messages are decided here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;

pub const ALL_KEYWORDS_COVERED: &str = "Your resume seems to cover all the important keywords!";
pub const NO_SUGGESTIONS: &str = "No specific improvement suggestions were generated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerLevel {
    Success,
    Warning,
    Info,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSection {
    /// Drives the progress bar; 0..=100.
    pub percentage: u8,
    pub headline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub result: AnalysisResult,
    #[serde(rename = "match")]
    pub match_section: MatchSection,
    pub profile_summary: String,
    pub keywords: Banner,
    pub suggestions: Banner,
}

pub fn render_report(analysis_id: Uuid, result: AnalysisResult) -> AnalysisReport {
    AnalysisReport {
        analysis_id,
        generated_at: Utc::now(),
        match_section: MatchSection {
            percentage: result.match_percentage,
            headline: format!("Job Description Match: {}%", result.match_percentage),
        },
        profile_summary: result.profile_summary.clone(),
        keywords: keyword_banner(&result.missing_keywords),
        suggestions: suggestions_block(result.improvement_suggestions.as_deref()),
        result,
    }
}

fn keyword_banner(missing: &[String]) -> Banner {
    if missing.is_empty() {
        Banner {
            level: BannerLevel::Success,
            message: ALL_KEYWORDS_COVERED.to_string(),
        }
    } else {
        Banner {
            level: BannerLevel::Warning,
            message: format!(
                "Consider adding these keywords to your resume: {}",
                missing.join(", ")
            ),
        }
    }
}

fn suggestions_block(suggestions: Option<&str>) -> Banner {
    match suggestions {
        Some(text) => Banner {
            level: BannerLevel::Info,
            message: text.to_string(),
        },
        None => Banner {
            level: BannerLevel::Plain,
            message: NO_SUGGESTIONS.to_string(),
        },
    }
}
