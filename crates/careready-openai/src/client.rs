// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI chat-completions API.
//!
//! Provides [`OpenAiClient`], which handles request construction, bearer
//! authentication, and transient error retry. Two call shapes are exposed
//! through [`InferenceAdapter`]: JSON-mode classification of caregiver
//! messages into readiness observations, and free-text reply drafting for
//! the family digital twin.

use std::time::Duration;

use async_trait::async_trait;
use careready_config::model::InferenceConfig;
use careready_core::inference::ReadinessAnalysis;
use careready_core::{CarereadyError, InferenceAdapter};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse, ResponseFormat};

const CLASSIFY_SYSTEM_PROMPT: &str = "\
You analyze operational messages from home-care caregivers about upcoming \
appointments. Extract readiness observations as JSON with this shape: \
{\"updates\": [{\"category\": \"ACCESS_CODE\" | \"SAFETY_ASSESSMENT\" | \
\"CAREGIVER_CONFIRMATION\", \"status\": \"PASS\" | \"FAIL\", \"confidence\": \
0.0-1.0, \"reasoning\": \"...\"}], \"summary\": \"...\"}. \
ACCESS_CODE covers door codes, keys, and entry instructions. \
SAFETY_ASSESSMENT covers hazards, pets, equipment, and home conditions. \
CAREGIVER_CONFIRMATION covers the caregiver confirming or declining the \
visit. Report only observations the message actually supports; an empty \
updates array is a valid answer.";

const REPLY_SYSTEM_PROMPT: &str = "\
You are a courteous scheduling assistant replying on behalf of a home-care \
client's family. Answer the incoming message briefly and warmly, confirm \
any logistics you can, and never invent medical or scheduling facts you \
were not given.";

/// HTTP client for OpenAI API communication.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    model: String,
    max_tokens: u32,
    max_retries: u32,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, CarereadyError> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            CarereadyError::Config("inference.api_key is not set".to_string())
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| CarereadyError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| CarereadyError::inference("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_retries: 1,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Sends a chat-completion request and returns the first choice's text.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second delay.
    async fn complete(&self, request: &ChatRequest) -> Result<String, CarereadyError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| CarereadyError::inference("HTTP request failed", e))?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body = response
                    .text()
                    .await
                    .map_err(|e| CarereadyError::inference("failed to read response body", e))?;
                let parsed: ChatResponse = serde_json::from_str(&body)
                    .map_err(|e| CarereadyError::inference("failed to parse API response", e))?;
                let content = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or_else(|| CarereadyError::Inference {
                        message: "response contained no choices".to_string(),
                        source: None,
                    })?;
                return Ok(content);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(CarereadyError::Inference {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "OpenAI API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(CarereadyError::Inference {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| CarereadyError::Inference {
            message: "completion request failed after retries".to_string(),
            source: None,
        }))
    }
}

#[async_trait]
impl InferenceAdapter for OpenAiClient {
    async fn classify_readiness(&self, text: &str) -> Result<ReadinessAnalysis, CarereadyError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(CLASSIFY_SYSTEM_PROMPT),
                ChatMessage::user(text),
            ],
            max_tokens: self.max_tokens,
            temperature: Some(0.0),
            response_format: Some(ResponseFormat::json_object()),
        };

        let content = self.complete(&request).await?;
        serde_json::from_str(&content)
            .map_err(|e| CarereadyError::inference("classification output was not valid JSON", e))
    }

    async fn generate_reply(&self, text: &str) -> Result<String, CarereadyError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(REPLY_SYSTEM_PROMPT),
                ChatMessage::user(text),
            ],
            max_tokens: self.max_tokens,
            temperature: Some(0.7),
            response_format: None,
        };

        self.complete(&request).await
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use careready_core::types::{CheckOutcome, CheckType};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OpenAiClient {
        let config = InferenceConfig {
            api_key: Some("test-api-key".to_string()),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 512,
            confidence_threshold: 0.85,
        };
        OpenAiClient::new(&config)
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    fn chat_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        })
    }

    #[tokio::test]
    async fn classify_parses_json_mode_output() {
        let server = MockServer::start().await;
        let analysis = serde_json::json!({
            "updates": [{
                "category": "ACCESS_CODE",
                "status": "PASS",
                "confidence": 0.95,
                "reasoning": "caregiver quoted the door code"
            }],
            "summary": "access confirmed"
        })
        .to_string();

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&analysis)))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client
            .classify_readiness("door code is 4821, all set")
            .await
            .unwrap();

        assert_eq!(result.updates.len(), 1);
        assert_eq!(result.updates[0].category, CheckType::AccessCode);
        assert_eq!(result.updates[0].status, CheckOutcome::Pass);
        assert!(result.updates[0].confidence > 0.9);
    }

    #[tokio::test]
    async fn classify_rejects_malformed_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("not json at all")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.classify_readiness("hello").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn generate_reply_returns_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body("Thanks, we'll be ready at 9am.")),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.generate_reply("Arriving at 9am").await.unwrap();
        assert_eq!(reply, "Thanks, we'll be ready at 9am.");
    }

    #[tokio::test]
    async fn retries_once_on_429() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"type": "rate_limit_error", "message": "slow down"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("after retry")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.generate_reply("hi").await.unwrap();
        assert_eq!(reply, "after retry");
    }

    #[tokio::test]
    async fn fails_fast_on_400() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "bad model"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.generate_reply("hi").await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid_request_error"), "got: {err}");
    }

    #[tokio::test]
    async fn exhausts_retries_on_503() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": {"type": "overloaded_error", "message": "try later"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.generate_reply("hi").await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("overloaded_error"), "got: {err}");
    }

    #[tokio::test]
    async fn missing_api_key_is_a_config_error() {
        let config = InferenceConfig {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 512,
            confidence_threshold: 0.85,
        };
        let result = OpenAiClient::new(&config);
        assert!(matches!(result, Err(CarereadyError::Config(_))));
    }
}
