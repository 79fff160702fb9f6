//! Response Extractor — turns raw model text into a validated `AnalysisResult`.
//!
//! Extraction runs a fixed fallback chain (`ExtractionStage`):
//! 1. `FencedBlock` — exactly one ```` ```json { ... } ``` ```` block, nothing else around it.
//! 2. `WholeText`  — no fenced block at all; the trimmed text must be one JSON object.
//!
//! Anything ambiguous (several fenced blocks, prose around the JSON) is a failure.
//! The raw text always travels with the error so the caller can show it.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::analysis::AnalysisResult;

pub const DEFAULT_PROFILE_SUMMARY: &str = "No summary provided.";

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```json\s*(\{.*?\})\s*```").unwrap());
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The text holds no locatable, well-formed JSON object.
    #[error("could not parse model response as JSON: {reason}")]
    Parse { reason: String, raw: String },

    /// The JSON parsed but a field is unusable.
    #[error("unusable field value: {reason}")]
    Format { reason: String, raw: String },
}

impl ExtractionError {
    pub fn raw(&self) -> &str {
        match self {
            ExtractionError::Parse { raw, .. } | ExtractionError::Format { raw, .. } => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    FencedBlock,
    WholeText,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStage::FencedBlock => f.write_str("fenced-block"),
            ExtractionStage::WholeText => f.write_str("whole-text"),
        }
    }
}

/// Model output as written by the model. Fields stay untyped here so a wrong type is
/// reported against its field in `into_result`, not as a JSON syntax problem.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(rename = "JD Match")]
    jd_match: Option<Value>,
    #[serde(rename = "MissingKeywords")]
    missing_keywords: Option<Value>,
    #[serde(rename = "Profile Summary")]
    profile_summary: Option<Value>,
    #[serde(rename = "ImprovementSuggestions")]
    improvement_suggestions: Option<Value>,
}

/// The prompt asks for a list, but a comma-separated string is accepted as well.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeywordList {
    Many(Vec<String>),
    One(String),
}

impl KeywordList {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            KeywordList::Many(items) => items,
            KeywordList::One(joined) => joined.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Free text, or a list of lines joined with newlines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextBlock {
    Text(String),
    Lines(Vec<String>),
}

impl TextBlock {
    /// `None` when blank.
    fn into_text(self) -> Option<String> {
        let text = match self {
            TextBlock::Text(text) => text,
            TextBlock::Lines(lines) => lines
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Extracts an `AnalysisResult` from raw model output.
pub fn extract_analysis(raw: &str) -> Result<AnalysisResult, ExtractionError> {
    let (stage, json_text) = locate_json(raw)?;
    debug!("Locating model JSON via {stage} stage");

    let value: Value = serde_json::from_str(json_text).map_err(|e| parse_error(raw, e))?;
    if !value.is_object() {
        return Err(ExtractionError::Parse {
            reason: "expected a JSON object".to_string(),
            raw: raw.to_string(),
        });
    }

    let parsed: RawAnalysis = serde_json::from_value(value).map_err(|e| parse_error(raw, e))?;
    into_result(parsed, raw)
}

/// Runs the fallback chain and returns the JSON slice to parse.
fn locate_json(raw: &str) -> Result<(ExtractionStage, &str), ExtractionError> {
    let blocks: Vec<_> = FENCED_JSON.captures_iter(raw).collect();

    match blocks.as_slice() {
        [] => Ok((ExtractionStage::WholeText, raw.trim())),
        [block] => {
            let (Some(whole), Some(body)) = (block.get(0), block.get(1)) else {
                return Err(ExtractionError::Parse {
                    reason: "malformed fenced block".to_string(),
                    raw: raw.to_string(),
                });
            };
            let outside_is_blank = raw[..whole.start()].trim().is_empty()
                && raw[whole.end()..].trim().is_empty();
            if !outside_is_blank {
                return Err(ExtractionError::Parse {
                    reason: "unexpected text outside the JSON code block".to_string(),
                    raw: raw.to_string(),
                });
            }
            Ok((ExtractionStage::FencedBlock, body.as_str()))
        }
        many => Err(ExtractionError::Parse {
            reason: format!("found {} JSON code blocks, expected one", many.len()),
            raw: raw.to_string(),
        }),
    }
}

fn into_result(parsed: RawAnalysis, raw: &str) -> Result<AnalysisResult, ExtractionError> {
    let match_text = match parsed.jd_match {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Null) | None => return Err(format_error(raw, "\"JD Match\" is missing")),
        Some(other) => {
            return Err(format_error(
                raw,
                &format!("\"JD Match\" should be a string like \"85%\", got {other}"),
            ))
        }
    };
    let match_percentage = parse_match_percentage(&match_text)
        .map_err(|r| format_error(raw, &format!("\"JD Match\": {r}")))?;

    let missing_keywords: Option<KeywordList> =
        typed_field(parsed.missing_keywords, "MissingKeywords", raw)?;
    let profile_summary: Option<TextBlock> =
        typed_field(parsed.profile_summary, "Profile Summary", raw)?;
    let improvement_suggestions: Option<TextBlock> =
        typed_field(parsed.improvement_suggestions, "ImprovementSuggestions", raw)?;

    Ok(AnalysisResult {
        match_percentage,
        missing_keywords: missing_keywords
            .map(KeywordList::into_vec)
            .unwrap_or_default(),
        profile_summary: profile_summary
            .and_then(TextBlock::into_text)
            .unwrap_or_else(|| DEFAULT_PROFILE_SUMMARY.to_string()),
        improvement_suggestions: improvement_suggestions.and_then(TextBlock::into_text),
    })
}

/// Converts an optional field; a value of the wrong shape is a `Format` error naming it.
fn typed_field<T: DeserializeOwned>(
    value: Option<Value>,
    name: &str,
    raw: &str,
) -> Result<Option<T>, ExtractionError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let kind = json_kind(&value);
            serde_json::from_value(value)
                .map(Some)
                .map_err(|_| format_error(raw, &format!("\"{name}\" has unexpected type {kind}")))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads the first run of decimal digits as the percentage ("85%" → 85).
pub fn parse_match_percentage(text: &str) -> Result<u8, String> {
    let digits = DIGIT_RUN
        .find(text)
        .ok_or_else(|| format!("'{text}' contains no digits"))?;
    let value: u32 = digits
        .as_str()
        .parse()
        .map_err(|_| format!("'{}' is too large", digits.as_str()))?;
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| format!("{value} is outside 0-100"))
}

fn parse_error(raw: &str, err: serde_json::Error) -> ExtractionError {
    ExtractionError::Parse {
        reason: err.to_string(),
        raw: raw.to_string(),
    }
}

fn format_error(raw: &str, reason: &str) -> ExtractionError {
    ExtractionError::Format {
        reason: reason.to_string(),
        raw: raw.to_string(),
    }
}
