/// LLM Client — the single point of entry for all Gemini API calls in Smart ATS.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All LLM interactions MUST go through the `TextGenerator` trait.
///
/// Model: gemini-1.5-flash-latest (hardcoded — do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// The model used for all LLM calls in Smart ATS.
pub const MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API key rejected: {0}")]
    Auth(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Anything that turns a prompt into raw model text.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>` so handlers never depend on the
/// concrete HTTP client.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_tokens: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    pub candidate_tokens: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Wraps the Gemini `generateContent` endpoint. The API key is per call, never stored.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(timeout: Duration) -> Result<Self, LlmError> {
        Self::with_base_url(GEMINI_API_BASE, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, MODEL)
    }

    /// Makes a single call to the Gemini API. No retries: a failure is terminal for
    /// the submission.
    pub async fn call(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}", status);
            return Err(classify_api_error(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&response.text().await?)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_tokens, usage.candidate_tokens
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(api_key, prompt).await?;
        match response.text() {
            Some(text) => Ok(text),
            None => {
                let reason = response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .unwrap_or("none");
                warn!("Gemini returned no text (finish_reason={reason})");
                Err(LlmError::EmptyContent)
            }
        }
    }
}

/// Maps a non-success status and body to an `LlmError`, singling out rejected keys.
/// Gemini reports a bad key as 400 INVALID_ARGUMENT, so the message is inspected too.
fn classify_api_error(status: u16, body: String) -> LlmError {
    let parsed = serde_json::from_str::<GeminiError>(&body).ok();
    let invalid_key = parsed
        .as_ref()
        .map(|e| {
            e.error.message.contains("API key")
                || e.error.status.as_deref() == Some("PERMISSION_DENIED")
                || e.error.status.as_deref() == Some("UNAUTHENTICATED")
        })
        .unwrap_or(false);
    let message = parsed.map(|e| e.error.message).unwrap_or(body);

    if status == 401 || status == 403 || invalid_key {
        LlmError::Auth(message)
    } else {
        LlmError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> GeminiClient {
        GeminiClient::with_base_url(&server.url(), Duration::from_secs(5)).unwrap()
    }

    fn endpoint_path() -> String {
        format!("/v1beta/models/{MODEL}:generateContent")
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "```json\n{"}, {"text": "}\n```"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("```json\n{}\n```"));
        assert_eq!(response.usage.unwrap().prompt_tokens, 10);
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_classify_invalid_key_as_auth() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            classify_api_error(400, body.to_string()),
            LlmError::Auth(_)
        ));
    }

    #[test]
    fn test_classify_forbidden_as_auth() {
        assert!(matches!(
            classify_api_error(403, "forbidden".to_string()),
            LlmError::Auth(_)
        ));
    }

    #[test]
    fn test_classify_server_error_keeps_message() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        match classify_api_error(503, body.to_string()) {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "The model is overloaded.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_sends_key_header_and_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", endpoint_path().as_str())
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates": [{"content": {"parts": [{"text": "{\"JD Match\": \"70%\"}"}]}}]}"#)
            .create_async()
            .await;

        let text = client_for(&server)
            .generate("test-key", "prompt")
            .await
            .unwrap();

        assert_eq!(text, r#"{"JD Match": "70%"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_unauthorized_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", endpoint_path().as_str())
            .with_status(401)
            .with_body(r#"{"error": {"code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED"}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .generate("bad-key", "prompt")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Auth(_)));
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_empty_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", endpoint_path().as_str())
            .with_status(200)
            .with_body(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .generate("test-key", "prompt")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::EmptyContent));
    }
}
