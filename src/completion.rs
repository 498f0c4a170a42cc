use crate::auth::AuthProvider;
use crate::errors::{JournalError, JournalResult};
use serde_json::json;
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "gpt-5-nano";

#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.6,
            max_tokens: 60,
        }
    }
}

impl CompletionOptions {
    pub fn with_limits(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
            ..Self::default()
        }
    }
}

/// Opaque text-completion capability. One call, no retries; a failed call is
/// the caller's problem to recover from.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> JournalResult<String>;
}

/// Chat-completion endpoint adapter. Requires a signed-in `AuthProvider`;
/// fails fast with `NotAuthenticated` before any request goes out.
pub struct HttpCompletion {
    client: reqwest::Client,
    endpoint: String,
    auth: Arc<dyn AuthProvider>,
}

impl HttpCompletion {
    pub fn new(endpoint: &str, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            auth,
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for HttpCompletion {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> JournalResult<String> {
        let token = self.auth.bearer_token()?;
        let body = json!({
            "model": options.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|err| JournalError::Completion(err.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(JournalError::NotAuthenticated(
                "completion endpoint rejected the session".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(JournalError::Completion(format!("HTTP {status}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|err| JournalError::Completion(err.to_string()))?;
        parse_completion_text(&payload)
            .ok_or_else(|| JournalError::Completion("response carried no text".to_string()))
    }
}

/// Accepts both response shapes the upstream service emits: a chat-style
/// `choices[0].message.content` / `message.content`, or a bare `text` field.
fn parse_completion_text(payload: &serde_json::Value) -> Option<String> {
    let candidates = [
        payload.pointer("/choices/0/message/content"),
        payload.pointer("/message/content"),
        payload.get("text"),
    ];
    for candidate in candidates.into_iter().flatten() {
        if let Some(text) = candidate.as_str() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}
