//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path parameters and JSON bodies via axum
//! extractors, calls into the dialogue engine and returns JSON responses.
//! Request and response bodies use camelCase field names.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parla_chat::context::ConversationState;
use parla_chat::session::SessionSummary;
use parla_chat::voice::CaptureFailure;
use parla_core::language::SourceLanguage;
use parla_core::types::{
    ConversationTurn, DialogueResult, SessionConfig, TranslationResult, Usage, Utterance,
};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
    pub response_language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: String,
    pub target_language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeTranslateRequest {
    #[serde(default)]
    pub text: String,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtteranceRequest {
    #[serde(default)]
    pub text: String,
    /// Language reported by speech capture, if any. Defaults to `auto`.
    pub detected_language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CaptureFailureRequest {
    /// Recognizer error code such as `no-speech` or `not-allowed`.
    #[serde(default)]
    pub code: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub uptime_secs: u64,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureFailureResponse {
    pub failure: String,
    pub message: String,
    pub blocking: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub config: SessionConfig,
    pub recognition_locale: String,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub turns: Vec<ConversationTurn>,
}

// =============================================================================
// Health
// =============================================================================

/// GET /api/health - liveness probe.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        model: state.config.gateway.model.clone(),
    })
}

// =============================================================================
// Stateless relay
// =============================================================================

/// POST /api/chat - one assistant reply for client-held history.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let catalog = state.controller.catalog();
    let language = catalog.resolve(req.response_language.as_deref().unwrap_or_default());
    let history = ConversationState::from_history(
        req.conversation_history,
        state.controller.max_history_turns(),
    );

    let completion = state
        .controller
        .reply(&history.snapshot_for_context(), &req.message, language)
        .await?;

    Ok(Json(ChatResponse {
        response: completion.content,
        usage: completion.usage,
    }))
}

/// POST /api/translate - one-shot translation.
pub async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let target = state
        .controller
        .catalog()
        .resolve(req.target_language.as_deref().unwrap_or_default());

    let translation = state
        .controller
        .translator()
        .translate_one_shot(&req.text, target)
        .await?;

    Ok(Json(TranslateResponse { translation }))
}

/// POST /api/translate-realtime - detect (if needed) and translate.
pub async fn translate_realtime(
    State(state): State<AppState>,
    Json(req): Json<RealtimeTranslateRequest>,
) -> Result<Json<TranslationResult>, ApiError> {
    let catalog = state.controller.catalog();
    let source = catalog.resolve_source(req.source_language.as_deref().unwrap_or_default());
    let target = catalog.resolve(req.target_language.as_deref().unwrap_or_default());

    let result = state
        .controller
        .translator()
        .orchestrate(&req.text, source, target)
        .await?;

    Ok(Json(result))
}

/// POST /api/capture-failure - user wording for a speech capture error.
pub async fn capture_failure(
    Json(req): Json<CaptureFailureRequest>,
) -> Json<CaptureFailureResponse> {
    let failure = CaptureFailure::from_code(&req.code);
    if let CaptureFailure::Other(code) = &failure {
        tracing::debug!(code = %code, "unclassified capture failure");
    }
    Json(CaptureFailureResponse {
        failure: failure.as_str().to_string(),
        message: failure.user_message().to_string(),
        blocking: failure.is_blocking(),
    })
}

// =============================================================================
// Sessions
// =============================================================================

/// POST /api/sessions - start a session. An empty body uses the defaults.
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let config = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let config: SessionConfig = serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid session config: {}", e)))?;
        Some(config)
    };

    let summary = state.sessions.create(config)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: summary.id,
            config: summary.config,
            recognition_locale: summary.recognition_locale,
        }),
    ))
}

/// GET /api/sessions - list live sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.sessions.list()?;
    Ok(Json(SessionListResponse { sessions }))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, ApiError> {
    Ok(Json(state.sessions.summary(id)?))
}

/// PUT /api/sessions/{id}/config - replace the session's preferences.
pub async fn update_session_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(config): Json<SessionConfig>,
) -> Result<Json<SessionSummary>, ApiError> {
    Ok(Json(state.sessions.update_config(id, config)?))
}

/// POST /api/sessions/{id}/utterances - run one exchange.
pub async fn post_utterance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UtteranceRequest>,
) -> Result<Json<DialogueResult>, ApiError> {
    // An unrecognised capture language is detected server-side instead.
    let detected_language = req
        .detected_language
        .as_deref()
        .and_then(|code| code.parse::<SourceLanguage>().ok())
        .unwrap_or_default();
    let utterance = Utterance {
        text: req.text,
        detected_language,
    };

    let result = state
        .sessions
        .handle_utterance(&state.controller, id, utterance)
        .await?;
    Ok(Json(result))
}

/// GET /api/sessions/{id}/history
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let turns = state.sessions.history(id).await?;
    Ok(Json(HistoryResponse { turns }))
}

/// POST /api/sessions/{id}/restart - clear history, keep config.
pub async fn restart_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, ApiError> {
    Ok(Json(state.sessions.restart(id)?))
}

/// DELETE /api/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
