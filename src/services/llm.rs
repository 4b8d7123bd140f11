// src/services/llm.rs

use std::fmt;

use serde_json::{Value, json};

use crate::config::LlmConfig;

/// Reasons an external completion could not be obtained.
///
/// These never reach HTTP clients; the grading and generation services turn
/// them into their local fallbacks.
#[derive(Debug)]
pub enum LlmError {
    /// No API key configured.
    MissingCredential,
    /// Connection failure or timeout.
    Transport(String),
    /// The endpoint answered with a non-success status.
    Status(u16),
    /// The body was not the expected chat-completion shape.
    Malformed(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::MissingCredential => write!(f, "no API key configured"),
            LlmError::Transport(msg) => write!(f, "transport error: {}", msg),
            LlmError::Status(code) => write!(f, "endpoint returned HTTP {}", code),
            LlmError::Malformed(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

/// Thin client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        let http = match reqwest::Client::builder().timeout(config.timeout).build() {
            Ok(client) => client,
            Err(e) => {
                // Requests still carry their own timeout, see `complete`.
                tracing::warn!("Failed to build LLM HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            }
        };

        Self { http, config }
    }

    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends one system + user message pair and returns the assistant text.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingCredential)?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        tracing::debug!(model = %self.config.model, "Sending chat completion request");

        let response = self
            .http
            .post(&url)
            .timeout(self.config.timeout)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        extract_content(&body)
            .map(str::to_owned)
            .ok_or_else(|| LlmError::Malformed("missing choices[0] content".to_string()))
    }
}

/// Reads `choices[0].message.content`, or the legacy `choices[0].text`.
fn extract_content(body: &Value) -> Option<&str> {
    let choice = body.get("choices")?.get(0)?;

    choice
        .get("message")
        .and_then(|m| m.get("content"))
        .or_else(|| choice.get("text"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_chat_content() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "87"}}]
        });
        assert_eq!(extract_content(&body), Some("87"));
    }

    #[test]
    fn test_extract_legacy_text() {
        let body = json!({"choices": [{"text": "42"}]});
        assert_eq!(extract_content(&body), Some("42"));
    }

    #[test]
    fn test_extract_missing_choices() {
        assert_eq!(extract_content(&json!({"error": "bad key"})), None);
        assert_eq!(extract_content(&json!({"choices": []})), None);
    }

    #[tokio::test]
    async fn test_complete_without_key_is_missing_credential() {
        let client = LlmClient::new(LlmConfig::offline());
        assert!(!client.has_credential());

        let err = client.complete("sys", "user", 10, 0.0).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential));
    }
}
