/// LLM Client: the single point of entry for all chat-completion calls in Ideator.
///
/// ARCHITECTURAL RULE: No other module may call the remote API directly.
/// All LLM interactions MUST go through the `ChatCompletion` trait so handlers
/// can be exercised with an in-process fake.
///
/// One request per call. No retry, no backoff, no streaming.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

#[cfg(test)]
pub mod fake;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const REQUEST_TIMEOUT_SECS: u64 = 120;
/// Environment variable the credential is read from. Quoted in error messages.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("missing API credential: env var {var} not set")]
    MissingCredential { var: &'static str },

    #[error("remote service error (status {}): {body}", status_label(.status))]
    RemoteService { status: Option<u16>, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no response".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Model name and sampling knobs for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The chat-completion seam. `AppState` carries an `Arc<dyn ChatCompletion>`;
/// production uses `LlmClient`, tests inject fakes.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completion client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.openai_api_key.clone(), &config.openai_base_url)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential { var: API_KEY_VAR })?;

        let request_body = ChatCompletionRequest {
            model: &params.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        if status != 200 {
            warn!("Chat completion API returned {status}");
            return Err(GenerationError::RemoteService {
                status: Some(status),
                body,
            });
        }

        let text = parse_chat_completion(&body)?;
        debug!(
            "Chat completion succeeded: model={}, chars={}",
            params.model,
            text.chars().count()
        );
        Ok(text)
    }
}

fn transport_error(e: reqwest::Error) -> GenerationError {
    let body = if e.is_timeout() {
        format!("request timed out after {REQUEST_TIMEOUT_SECS}s")
    } else {
        e.to_string()
    };
    warn!("Chat completion request failed: {body}");
    GenerationError::RemoteService { status: None, body }
}

/// Extracts `choices[0].message.content` from a chat-completion body.
fn parse_chat_completion(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON body: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse("response has no choices".to_string()))?
        .message
        .content
        .ok_or_else(|| {
            GenerationError::MalformedResponse("first choice has no message content".to_string())
        })
}
