//! Application state shared across all route handlers.
//!
//! AppState holds the dialogue controller and the session registry.
//! It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use parla_chat::error::ChatError;
use parla_chat::gateway::CompletionGateway;
use parla_chat::orchestrator::DialogueController;
use parla_chat::session::SessionRegistry;
use parla_core::config::ParlaConfig;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<ParlaConfig>,
    /// Dialogue engine bound to the completion gateway.
    pub controller: Arc<DialogueController>,
    /// Live conversation sessions.
    pub sessions: Arc<SessionRegistry>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: ParlaConfig,
        gateway: Arc<dyn CompletionGateway>,
    ) -> Result<Self, ChatError> {
        let controller = DialogueController::new(gateway, &config)?;
        let sessions = SessionRegistry::new(config.dialogue.max_history_turns, &config.session);
        Ok(Self {
            config: Arc::new(config),
            controller: Arc::new(controller),
            sessions: Arc::new(sessions),
            start_time: Instant::now(),
        })
    }
}
