use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::GenerationError;
use crate::config::GenerativeConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Google Generative Language API.
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Build a client from explicit settings. A missing API key is not an
    /// error here; every `generate` call reports `MissingApiKey` instead.
    pub fn new(config: GenerativeConfig) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

/// Request body for `models/{model}:generateContent`.
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn single_prompt(text: &'a str) -> Self {
        Self {
            contents: [RequestContent {
                parts: [RequestPart { text }],
            }],
        }
    }
}

/// Response body from `models/{model}:generateContent`.
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate, verbatim.
///
/// Only a missing candidate, content or text part is an empty response;
/// whitespace the model returned is passed through.
fn reply_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let parts: Vec<String> = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if parts.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(parts.concat())
}

impl LlmClient for GeminiClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let url = self.endpoint(model);

        tracing::debug!(model, prompt_chars = prompt.len(), "Calling generative model");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&GenerateContentRequest::single_prompt(prompt))
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    GenerationError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    GenerationError::Timeout(self.timeout_secs)
                } else {
                    GenerationError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        reply_text(parsed)
    }
}

/// Mock LLM client for testing. Returns a fixed response, or fails every
/// call, and records each `(model, prompt)` it was given.
pub struct MockLlmClient {
    response: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails with a connection error.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((model.to_string(), prompt.to_string()));
        }
        self.response
            .clone()
            .ok_or_else(|| GenerationError::Connection("mock".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String, GenerationError> {
        reply_text(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        let result = client.generate("model", "prompt").unwrap();
        assert_eq!(result, "test response");
        assert_eq!(client.calls(), vec![("model".into(), "prompt".into())]);
    }

    #[test]
    fn failing_mock_reports_connection_error() {
        let client = MockLlmClient::failing();
        let result = client.generate("model", "prompt");
        assert!(matches!(result, Err(GenerationError::Connection(_))));
        assert_eq!(client.calls().len(), 1);
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::single_prompt("hi")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn reply_concatenates_first_candidate_parts() {
        let text = parse(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "Your glucose "}, {"text": "is high."}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(text, "Your glucose is high.");
    }

    #[test]
    fn reply_without_candidates_is_empty_response() {
        assert!(matches!(parse(r#"{}"#), Err(GenerationError::EmptyResponse)));
        assert!(matches!(
            parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            parse(r#"{"candidates": [{"content": {"parts": [{"inlineData": {}}]}}]}"#),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn whitespace_reply_is_returned_verbatim() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": " "}, {"text": "\n"}]}}]}"#;
        assert_eq!(parse(body).unwrap(), " \n");
        let body = r#"{"candidates": [{"content": {"parts": [{"text": ""}]}}]}"#;
        assert_eq!(parse(body).unwrap(), "");
    }

    #[test]
    fn endpoint_includes_model_and_trims_slash() {
        let config = GenerativeConfig {
            base_url: "http://localhost:8080/".into(),
            ..GenerativeConfig::default()
        };
        let client = GeminiClient::new(config).unwrap();
        assert_eq!(
            client.endpoint("gemini-1.5-flash"),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn missing_api_key_fails_without_network() {
        let client = GeminiClient::new(GenerativeConfig::default()).unwrap();
        assert!(!client.has_api_key());
        let result = client.generate("gemini-1.5-pro", "prompt");
        assert!(matches!(result, Err(GenerationError::MissingApiKey)));
    }

    #[test]
    fn unreachable_server_is_an_error() {
        let config = GenerativeConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
            ..GenerativeConfig::default()
        }
        .with_api_key("test-key");
        let client = GeminiClient::new(config).unwrap();
        assert!(client.generate("gemini-1.5-flash", "hello").is_err());
    }
}
