//! Chat-completion client abstraction used for summaries and answers.
//!
//! The processing layer only sees [`CompletionClient`]; the production adapter speaks the
//! OpenAI-compatible `/chat/completions` protocol that Groq exposes. Requests are sent exactly
//! once: there is no retry, no streaming, and no timeout beyond the transport default.

use crate::config::{Config, get_config};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// No API key was configured for the provider.
    #[error("API key not configured: {0}")]
    MissingApiKey(String),
    /// Provider could not be reached.
    #[error("Completion provider unavailable: {0}")]
    Unavailable(String),
    /// Provider returned an error response.
    #[error("Completion request failed: {0}")]
    RequestFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// A single system/user exchange sent to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction framing the task.
    pub system: String,
    /// User message, sent verbatim.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Interface implemented by chat-completion providers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a completion for the given exchange.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// Build the completion client described by the global configuration.
pub fn get_completion_client() -> Result<Box<dyn CompletionClient>, CompletionError> {
    Ok(Box::new(ChatCompletionsClient::from_config(get_config())?))
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct ChatCompletionsClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionsClient {
    /// Construct a client from explicit connection settings.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, CompletionError> {
        let http = Client::builder()
            .user_agent("documind/completion")
            .build()
            .map_err(|error| {
                CompletionError::Unavailable(format!("failed to build HTTP client: {error}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        })
    }

    /// Construct a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, CompletionError> {
        Self::new(
            config.completion_base_url.clone(),
            config.completion_model.clone(),
            config.completion_api_key.clone(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CompletionError::MissingApiKey("GROQ_API_KEY is not set".into()));
        };

        let payload = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
        };

        tracing::debug!(
            model = %self.model,
            temperature = request.temperature,
            system_chars = request.system.chars().count(),
            user_chars = request.user.chars().count(),
            "Requesting completion"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompletionError::Unavailable(format!(
                    "failed to reach completion API at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::RequestFailed(format!(
                "provider returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            CompletionError::InvalidResponse(format!("failed to decode completion: {error}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| CompletionError::InvalidResponse("response contained no message".into()))
    }
}
