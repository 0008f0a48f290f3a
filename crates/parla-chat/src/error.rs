//! Error types for the dialogue engine and the completion gateway.
//!
//! Gateway failures are classified when they are produced and are never
//! re-derived from message text. User-facing wording is chosen from the
//! classification alone.

use uuid::Uuid;

/// Failure of a single completion-service round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("API key is not configured on the server")]
    MissingCredentials,
    #[error("invalid API key: {0}")]
    InvalidCredentials(String),
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("billing problem: {0}")]
    Billing(String),
    #[error("upstream error: {detail}")]
    Upstream { status: Option<u16>, detail: String },
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Tag-only view of [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorKind {
    MissingCredentials,
    InvalidCredentials,
    QuotaExceeded,
    Billing,
    Upstream,
    Transport,
}

/// The three failure categories shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    InvalidCredentials,
    QuotaExceeded,
    Connectivity,
}

impl FailureCategory {
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureCategory::InvalidCredentials => {
                "Error: the API key is invalid or not configured on the server."
            }
            FailureCategory::QuotaExceeded => {
                "Error: the API quota has been exceeded or billing needs to be set up."
            }
            FailureCategory::Connectivity => {
                "Connection problem with the language service. Please try again."
            }
        }
    }
}

impl GatewayError {
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::MissingCredentials => GatewayErrorKind::MissingCredentials,
            GatewayError::InvalidCredentials(_) => GatewayErrorKind::InvalidCredentials,
            GatewayError::QuotaExceeded(_) => GatewayErrorKind::QuotaExceeded,
            GatewayError::Billing(_) => GatewayErrorKind::Billing,
            GatewayError::Upstream { .. } => GatewayErrorKind::Upstream,
            GatewayError::Transport(_) => GatewayErrorKind::Transport,
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self.kind() {
            GatewayErrorKind::MissingCredentials | GatewayErrorKind::InvalidCredentials => {
                FailureCategory::InvalidCredentials
            }
            GatewayErrorKind::QuotaExceeded | GatewayErrorKind::Billing => {
                FailureCategory::QuotaExceeded
            }
            GatewayErrorKind::Upstream | GatewayErrorKind::Transport => {
                FailureCategory::Connectivity
            }
        }
    }
}

/// Errors from the dialogue engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("session {0} is still processing a previous message")]
    SessionBusy(Uuid),
    #[error("session {0} was restarted; the pending exchange was abandoned")]
    SessionRestarted(Uuid),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// User-facing category for gateway failures; `None` for everything else.
    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            ChatError::Gateway(err) => Some(err.category()),
            _ => None,
        }
    }

    /// Fixed message suitable for showing (or speaking) to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChatError::Gateway(err) => err.category().user_message(),
            ChatError::InvalidInput(_) => "Please say or type something first.",
            ChatError::SessionNotFound(_) => "This conversation has expired. Please start a new one.",
            ChatError::SessionBusy(_) => "Still working on your previous message.",
            ChatError::SessionRestarted(_) => "The conversation was restarted.",
            ChatError::Config(_) | ChatError::Internal(_) => {
                "Sorry, something went wrong while processing your message."
            }
        }
    }
}
