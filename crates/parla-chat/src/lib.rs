//! Dialogue engine for Parla.
//!
//! Routes user utterances through translate-command detection, optional
//! real-time translation and an assistant reply, keeping a bounded
//! conversation history per session.

pub mod context;
pub mod error;
pub mod gateway;
pub mod openai;
pub mod orchestrator;
pub mod parser;
pub mod session;
pub mod translation;
pub mod voice;

pub use context::ConversationState;
pub use error::{ChatError, FailureCategory, GatewayError, GatewayErrorKind};
pub use gateway::{
    Completion, CompletionGateway, CompletionRequest, RequestPurpose, ScriptedGateway,
};
pub use openai::OpenAiGateway;
pub use orchestrator::DialogueController;
pub use parser::{CommandParser, ParsedInput};
pub use session::{SessionRegistry, SessionSummary};
pub use translation::{TranslationOrchestrator, TranslationProfiles};
pub use voice::{recognition_locale, CaptureFailure};
