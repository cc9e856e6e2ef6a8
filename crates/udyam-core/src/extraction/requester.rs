//! Chat-completion client that asks a language model to reformat raw text.

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::LlmConfig;

use super::Result;
use super::schema::schema_description;

/// System instruction sent with every extraction request.
pub const SYSTEM_PROMPT: &str = "You are an OCR post-processor. Always return valid JSON only.";

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

impl CompletionRequest {
    /// Build the extraction request for a block of recognized text.
    pub fn for_raw_text(model: impl Into<String>, raw_text: &str) -> Self {
        Self {
            model: model.into(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: format!(
                "Raw text:\n{}\n\nExpected output format:\n{}",
                raw_text,
                schema_description()
            ),
        }
    }
}

/// Trait for completion services.
pub trait CompletionClient {
    /// Send one request and return the model's text response verbatim.
    fn complete(&self, request: &CompletionRequest) -> impl Future<Output = Result<String>> + Send;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
///
/// Requests block until the service answers: there is no timeout and no retry.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: LlmConfig::default().base_url,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create a client from configuration, resolving the API key.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self::new(api_key).with_base_url(config.base_url.as_str()))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
        };

        info!("Requesting extraction from {} ({})", self.base_url, request.model);
        debug!("Prompt is {} chars", request.user_prompt.chars().count());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ExtractionError::Service {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = decode_chat_response(&text)?;
        debug!("Model returned {} chars", content.chars().count());
        Ok(content)
    }
}

/// Pull the first choice's message content out of a chat-completion body.
///
/// A `null` content yields an empty string, which the parser reports as no data.
pub fn decode_chat_response(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ExtractionError::Decode(e.to_string()))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ExtractionError::Decode("response has no choices".to_string()))?;
    Ok(choice.message.content.unwrap_or_default())
}
