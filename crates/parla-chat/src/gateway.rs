//! Completion gateway abstraction.
//!
//! Every language-model call in the engine goes through [`CompletionGateway`].
//! The production implementation lives in [`crate::openai`]; [`ScriptedGateway`]
//! replays canned replies for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use parla_core::config::CompletionProfile;
use parla_core::types::{ConversationTurn, Usage};

use crate::error::GatewayError;

/// What a completion request is for. Used for logging and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestPurpose {
    Chat,
    Translate,
    Detect,
    RealtimeTranslate,
}

impl RequestPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPurpose::Chat => "chat",
            RequestPurpose::Translate => "translate",
            RequestPurpose::Detect => "detect",
            RequestPurpose::RealtimeTranslate => "realtime_translate",
        }
    }
}

/// One chat-completion request: ordered messages plus sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub purpose: RequestPurpose,
    pub messages: Vec<ConversationTurn>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(
        purpose: RequestPurpose,
        profile: CompletionProfile,
        messages: Vec<ConversationTurn>,
    ) -> Self {
        Self {
            purpose,
            messages,
            temperature: profile.temperature,
            max_tokens: profile.max_tokens,
        }
    }

    /// Content of the last message, typically the user prompt.
    pub fn last_content(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }
}

/// Assistant text returned by the completion service, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }
}

/// A stateless request/response channel to a chat-completion service.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError>;
}

// =============================================================================
// ScriptedGateway
// =============================================================================

/// Gateway that answers from a queue of scripted results and records every
/// request it receives.
///
/// Once the queue is exhausted every call fails with an upstream error, so a
/// test that makes an unexpected extra call sees it immediately.
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<Completion, GatewayError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(self, content: impl Into<String>) -> Self {
        self.push(Ok(Completion::text(content)));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: GatewayError) -> Self {
        self.push(Err(error));
        self
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, result: Result<Completion, GatewayError>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Copies of every request received, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Scripted results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| {
                Err(GatewayError::Upstream {
                    status: None,
                    detail: "no scripted reply left".to_string(),
                })
            })
    }
}
