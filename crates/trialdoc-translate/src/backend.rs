//! Translation backends
//!
//! The translator talks to a [`TranslationBackend`]; production runs use
//! [`ChatCompletionsBackend`] against an OpenAI-compatible endpoint, tests
//! plug in an in-process implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::error::{Result, TranslateError};

/// One request to a translation model
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub system: String,
    pub prompt: String,
}

/// Something that turns a prompt into model output
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Send one prompt and return the raw response text
    async fn complete(&self, request: &BackendRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Async client for OpenAI-compatible chat-completion endpoints
#[derive(Debug, Clone)]
pub struct ChatCompletionsBackend {
    client: Client,
    config: BackendConfig,
    api_key: String,
}

impl ChatCompletionsBackend {
    /// Build a client, reading the API key from `config.api_key_env`
    pub fn from_config(config: BackendConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            TranslateError::Backend(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: BackendConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn body<'a>(&'a self, request: &'a BackendRequest) -> ChatRequest<'a> {
        // gpt-5 models only accept the default temperature
        let temperature = if self.config.model.starts_with("gpt-5") {
            1.0
        } else {
            self.config.temperature
        };
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_completion_tokens: self.config.max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl TranslationBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: &BackendRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslateError::Backend(format!(
                "{} returned {}: {}",
                self.config.endpoint, status, message
            )));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TranslateError::Backend("response has no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();
        Ok(content)
    }
}
