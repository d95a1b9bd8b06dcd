//! Chat completion client for OpenAI-compatible endpoints.
//!
//! One HTTP request per attempt against `{base_url}/chat/completions`,
//! with a fixed timeout and the bounded [`RetryPolicy`] schedule. The
//! status mapping is deterministic: 429 and 5xx retry with backoff,
//! timeouts retry while budget remains, everything else is terminal for
//! the turn. Failures come back as [`ChatError`] kinds — rendering them
//! for users happens at the boundary, not here.

use async_trait::async_trait;
use cornerman_config::{ChatSettings, RemoteSettings};
use cornerman_core::error::ChatError;
use cornerman_core::message::{ChatMessage, Role};
use cornerman_core::model::ChatModel;
use cornerman_core::text::truncate_chars;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::retry::RetryPolicy;

/// Per-message character cap applied before sending.
const MAX_MESSAGE_CHARS: usize = 1500;

/// Context cap: above this many messages, keep the first (system) plus the
/// most recent window — a sliding-window policy, not summarization.
const MAX_CONTEXT_MESSAGES: usize = 12;
const KEEP_RECENT_MESSAGES: usize = 10;

/// Marker appended where message content was cut.
const TRUNCATION_MARKER: &str = "... [truncado]";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat client over an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    policy: RetryPolicy,
}

impl OpenAiChatClient {
    /// Create a client with default model parameters and a 30 s timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.5,
            max_tokens: 800,
            top_p: 0.9,
            policy: RetryPolicy::default(),
        }
    }

    /// Build a client from resolved configuration.
    pub fn from_settings(remote: &RemoteSettings, settings: &ChatSettings) -> Self {
        Self::with_timeout(
            remote.chat_base_url.clone(),
            remote.api_key.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
        .with_model(settings.model.clone())
        .with_sampling(settings.temperature, settings.max_tokens, settings.top_p)
        .with_retry_policy(RetryPolicy::new(settings.retries))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32, top_p: f32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self.top_p = top_p;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        let api_messages = prepare_messages(messages);

        let body = serde_json::json!({
            "model": self.model,
            "messages": &api_messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "top_p": self.top_p,
        });

        for attempt in 0..self.policy.total_attempts() {
            debug!(
                attempt,
                model = %self.model,
                message_count = api_messages.len(),
                "sending chat completion request"
            );

            let result = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) if e.is_timeout() => match self.policy.backoff_for_timeout(attempt) {
                    Some(delay) => {
                        warn!(attempt, "chat request timed out, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    None => return Err(ChatError::Timeout {
                        attempts: attempt + 1,
                    }),
                },
                Err(e) if e.is_connect() => return Err(ChatError::Connection(e.to_string())),
                Err(e) => return Err(ChatError::Malformed(e.to_string())),
            };

            let status = response.status().as_u16();
            match status {
                200 => {
                    let parsed: ApiResponse = response
                        .json()
                        .await
                        .map_err(|e| ChatError::Malformed(e.to_string()))?;
                    let choice = parsed
                        .choices
                        .into_iter()
                        .next()
                        .ok_or_else(|| ChatError::Malformed("no choices in response".into()))?;
                    let content = choice
                        .message
                        .content
                        .ok_or_else(|| ChatError::Malformed("choice has no content".into()))?;
                    return Ok(content);
                }
                400 => {
                    let body = crate::body_snippet(&response.text().await.unwrap_or_default());
                    warn!(body = %body, "chat endpoint rejected the request (400)");
                    return Err(ChatError::BadRequest(body));
                }
                401 => return Err(ChatError::Auth),
                _ => {
                    if let Some(delay) = self.policy.backoff_for_status(status, attempt) {
                        warn!(status, attempt, "retryable chat error, backing off");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    let body = crate::body_snippet(&response.text().await.unwrap_or_default());
                    warn!(status, body = %body, "chat endpoint returned terminal status");
                    return Err(ChatError::Status { status, body });
                }
            }
        }

        Err(ChatError::Exhausted {
            attempts: self.policy.total_attempts(),
        })
    }
}

/// Clean the outgoing context: drop blank messages, cap each content, and
/// slide the window when the conversation has grown past the cap.
fn prepare_messages(messages: &[ChatMessage]) -> Vec<ApiMessage> {
    let mut cleaned: Vec<ApiMessage> = messages
        .iter()
        .filter(|m| !m.content.trim().is_empty())
        .map(|m| ApiMessage {
            role: role_name(m.role),
            content: truncate_chars(&m.content, MAX_MESSAGE_CHARS, TRUNCATION_MARKER),
        })
        .collect();

    if cleaned.len() > MAX_CONTEXT_MESSAGES {
        let tail = cleaned.split_off(cleaned.len() - KEEP_RECENT_MESSAGES);
        cleaned.truncate(1);
        cleaned.extend(tail);
    }

    cleaned
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiReply,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    #[serde(default)]
    content: Option<String>,
}
