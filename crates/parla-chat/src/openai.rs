//! OpenAI-compatible chat-completion gateway.
//!
//! Sends `POST {base_url}/v1/chat/completions` with bearer auth and maps
//! HTTP status codes to [`GatewayError`] variants. The API key is never
//! logged.

use std::time::Duration;

use async_trait::async_trait;
use parla_core::config::GatewayConfig;
use parla_core::types::{ConversationTurn, Usage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::gateway::{Completion, CompletionGateway, CompletionRequest};

pub struct OpenAiGateway {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiGateway {
    /// Build a gateway. A missing key is not an error here; every call then
    /// fails with [`GatewayError::MissingCredentials`].
    pub fn new(config: &GatewayConfig, api_key: Option<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!(
                env = %config.api_key_env,
                "no API key configured; completion requests will fail"
            );
        }

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Build a gateway reading the key from the configured environment variable.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(config, config.api_key_from_env())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingCredentials)?;

        debug!(
            purpose = request.purpose.as_str(),
            model = %self.model,
            messages = request.messages.len(),
            max_tokens = request.max_tokens,
            "sending completion request"
        );

        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = map_http_error(status.as_u16(), &text);
            warn!(
                purpose = request.purpose.as_str(),
                status = status.as_u16(),
                error = %err,
                "completion request failed"
            );
            return Err(err);
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| GatewayError::Upstream {
                status: Some(status.as_u16()),
                detail: format!("malformed completion response: {e}"),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GatewayError::Upstream {
                status: Some(status.as_u16()),
                detail: "completion response has no message content".to_string(),
            })?;

        Ok(Completion {
            content: content.trim().to_string(),
            usage: parsed.usage,
        })
    }
}

/// Map a non-success HTTP status to a gateway error kind.
fn map_http_error(status: u16, body: &str) -> GatewayError {
    let message = extract_error_message(body);
    match status {
        401 => GatewayError::InvalidCredentials(message),
        429 => GatewayError::QuotaExceeded(message),
        402 | 403 => GatewayError::Billing(message),
        _ => GatewayError::Upstream {
            status: Some(status),
            detail: message,
        },
    }
}

/// Pull `error.message` out of an OpenAI error body, falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
