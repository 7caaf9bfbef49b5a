//! Google Gemini API client implementation.
//!
//! Implements the `ModelClient` trait over the `generateContent` REST
//! endpoint. Failures surface immediately: each failed turn requires a new
//! user-initiated submission, so there is no retry here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::llm::{ModelClient, ModelConversation};
use crate::session::MessageRole;

/// Default base URL for the Gemini API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// `timeout` bounds every request so a hung upstream call cannot wedge
    /// the dispatch loop.
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        timeout: Duration,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("Gemini API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            max_output_tokens,
            temperature,
        })
    }

    /// Build the wire request: replayed history plus the pending user text.
    fn build_request(&self, conversation: &ModelConversation, text: &str) -> GeminiRequest {
        let mut contents: Vec<GeminiContent> = conversation
            .history()
            .iter()
            .map(|msg| GeminiContent {
                role: Some(
                    match msg.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect();

        contents.push(GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: text.to_string(),
            }],
        });

        GeminiRequest {
            contents,
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: conversation.system_instruction().to_string(),
                }],
            }),
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(self.max_output_tokens),
                temperature: Some(self.temperature),
            }),
        }
    }

    /// Pull the reply text out of a response.
    fn extract_text(response: GeminiResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::Upstream("no candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(Error::Upstream(format!(
                "empty response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }

    /// Map an HTTP error status and body to an upstream error.
    fn status_error(status: reqwest::StatusCode, body: &str) -> Error {
        let message = serde_json::from_str::<GeminiErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status.as_u16() {
            401 | 403 => Error::Upstream(format!("authentication failed: {}", message)),
            429 => Error::Upstream(format!("rate limit exceeded: {}", message)),
            400..=499 => Error::Upstream(format!("invalid request: {}", message)),
            500..=599 => Error::Upstream(format!("server error {}: {}", status, message)),
            _ => Error::Upstream(format!("HTTP {}: {}", status, message)),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn send(&self, conversation: &mut ModelConversation, text: &str) -> Result<String> {
        let request = self.build_request(conversation, text);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        log::debug!(
            "sending turn to {} ({} prior messages)",
            self.model,
            conversation.history().len()
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Network(format!("request timed out: {}", e))
                } else if e.is_connect() {
                    Error::Network(format!("connection failed: {}", e))
                } else {
                    Error::Network(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Upstream(format!("failed to parse response: {} - {}", e, body)))?;

        let reply = Self::extract_text(parsed)?;
        conversation.record_exchange(text, &reply);
        Ok(reply)
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: GeminiContent,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
    #[allow(dead_code)]
    status: Option<String>,
}
