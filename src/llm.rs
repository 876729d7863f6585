use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LlmConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of a non-streaming chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Why a completion request failed. The variant is kept for logs even
/// though callers only show the message.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("authentication failed ({status}): {detail}")]
    Auth { status: u16, detail: String },

    #[error("rate limited (429): {0}")]
    RateLimit(String),

    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Network(_) => "network",
            LlmError::Auth { .. } => "auth",
            LlmError::RateLimit(_) => "rate_limit",
            LlmError::Api { .. } => "api",
            LlmError::Malformed(_) => "malformed",
        }
    }
}

/// Anything that can turn a chat request into completion text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// OpenAI-compatible chat completions client.
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Resolve the chat completions endpoint from the base URL.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut req = self.client.post(self.endpoint()).json(request);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        debug!(model = %request.model, messages = request.messages.len(), "sending completion request");
        let resp = req.send().await.map_err(LlmError::Network)?;
        let status = resp.status();
        let text = resp.text().await.map_err(LlmError::Network)?;

        if !status.is_success() {
            let detail = error_detail(&text);
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth {
                    status: status.as_u16(),
                    detail,
                },
                429 => LlmError::RateLimit(detail),
                code => LlmError::Api {
                    status: code,
                    detail,
                },
            });
        }

        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| LlmError::Malformed(format!("invalid JSON: {}", e)))?;

        // choices[0].message.content; an empty string is a valid answer, null is not.
        json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .map(str::to_string)
            .ok_or_else(|| LlmError::Malformed("no completion content in response".to_string()))
    }
}

/// Pull `error.message` out of an OpenAI-style error body, else the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.chars().count() > 200 {
                format!("{}...", trimmed.chars().take(200).collect::<String>())
            } else {
                trimmed.to_string()
            }
        })
}
