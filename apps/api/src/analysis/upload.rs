use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::errors::AppError;

/// An uploaded resume file.
#[derive(Debug)]
pub struct UploadedResume {
    pub filename: String,
    pub data: Bytes,
}

/// Raw form fields as submitted. Blank values are stored as `None`.
#[derive(Debug, Default)]
pub struct AnalysisForm {
    pub api_key: Option<String>,
    pub job_description: Option<String>,
    pub resume: Option<UploadedResume>,
}

/// Form fields after the missing-input check.
#[derive(Debug)]
pub struct CompleteForm {
    pub api_key: String,
    pub job_description: String,
    pub resume: UploadedResume,
}

/// Parse a multipart form upload into `AnalysisForm`.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<AnalysisForm, AppError> {
    let mut form = AnalysisForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error("Failed to read form field", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or("resume.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| form_error("Failed to read file data", e))?;
                if !data.is_empty() {
                    form.resume = Some(UploadedResume { filename, data });
                }
            }
            "api_key" | "job_description" => {
                let val = field
                    .text()
                    .await
                    .map_err(|e| form_error(&format!("Failed to read {name}"), e))?;
                let val = non_blank(val);
                if name == "api_key" {
                    form.api_key = val.map(|k| k.trim().to_string());
                } else {
                    form.job_description = val;
                }
            }
            _ => {
                // Unknown fields are drained and dropped
                field
                    .bytes()
                    .await
                    .map_err(|e| form_error(&format!("Failed to read {name}"), e))?;
            }
        }
    }

    Ok(form)
}

impl AnalysisForm {
    /// Fails with `MissingInput` naming every absent field, so no model call is made.
    pub fn require_all(self) -> Result<CompleteForm, AppError> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push("the API Key");
        }
        if self.job_description.is_none() {
            missing.push("the Job Description");
        }
        if self.resume.is_none() {
            missing.push("your Resume");
        }

        match (self.api_key, self.job_description, self.resume) {
            (Some(api_key), Some(job_description), Some(resume)) => Ok(CompleteForm {
                api_key,
                job_description,
                resume,
            }),
            _ => Err(AppError::MissingInput(format!(
                "Please provide {} to proceed.",
                missing.join(", ")
            ))),
        }
    }
}

/// Over-limit bodies become `UploadTooLarge`; every other read failure is `Validation`.
fn form_error(context: &str, err: MultipartError) -> AppError {
    let message = format!("{context}: {}", err.body_text());
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadTooLarge(message)
    } else {
        AppError::Validation(message)
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
