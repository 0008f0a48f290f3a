//! Session registry.
//!
//! Each session owns one [`ConversationState`] and a [`SessionConfig`].
//! Exchanges on a session run one at a time: a second utterance arriving
//! while one is in flight is rejected with [`ChatError::SessionBusy`].
//! Restarting or deleting a session cancels its in-flight exchange, whose
//! late result is then discarded without touching the new state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeZone};
use parla_core::config::SessionSettings;
use parla_core::types::{ConversationTurn, DialogueResult, SessionConfig, Utterance};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::ConversationState;
use crate::error::ChatError;
use crate::orchestrator::DialogueController;
use crate::voice::recognition_locale;

struct SessionEntry {
    config: SessionConfig,
    started_at: i64,
    last_activity_at: i64,
    turn_count: usize,
    state: Arc<tokio::sync::Mutex<ConversationState>>,
    cancel: CancellationToken,
}

impl SessionEntry {
    fn new(config: SessionConfig, max_turns: usize) -> Self {
        let now = Local::now().timestamp();
        Self {
            config,
            started_at: now,
            last_activity_at: now,
            turn_count: 0,
            state: Arc::new(tokio::sync::Mutex::new(ConversationState::new(max_turns))),
            cancel: CancellationToken::new(),
        }
    }

    fn is_busy(&self) -> bool {
        self.state.try_lock().is_err()
    }

    fn summary(&self, id: Uuid) -> SessionSummary {
        SessionSummary {
            id,
            config: self.config,
            turn_count: self.turn_count,
            started_at: format_epoch(self.started_at),
            last_activity_at: format_epoch(self.last_activity_at),
            recognition_locale: recognition_locale(&self.config).to_string(),
            busy: self.is_busy(),
        }
    }
}

/// Public view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub config: SessionConfig,
    pub turn_count: usize,
    pub started_at: String,
    pub last_activity_at: String,
    /// Locale speech capture should use for this session.
    pub recognition_locale: String,
    pub busy: bool,
}

/// In-memory map of live sessions.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    max_history_turns: usize,
    timeout_minutes: u32,
    defaults: SessionConfig,
}

impl SessionRegistry {
    pub fn new(max_history_turns: usize, settings: &SessionSettings) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_history_turns,
            timeout_minutes: settings.timeout_minutes,
            defaults: settings.defaults,
        }
    }

    /// Start a new session, using the configured defaults when `config` is `None`.
    pub fn create(&self, config: Option<SessionConfig>) -> Result<SessionSummary, ChatError> {
        let id = Uuid::new_v4();
        let entry = SessionEntry::new(config.unwrap_or(self.defaults), self.max_history_turns);
        let summary = entry.summary(id);

        self.lock()?.insert(id, entry);
        info!(session_id = %id, "created session");
        Ok(summary)
    }

    pub fn summary(&self, id: Uuid) -> Result<SessionSummary, ChatError> {
        let mut sessions = self.lock()?;
        let entry = self.live_entry(&mut sessions, id)?;
        Ok(entry.summary(id))
    }

    /// Summaries of every live session, oldest first.
    pub fn list(&self) -> Result<Vec<SessionSummary>, ChatError> {
        self.prune_expired()?;
        let sessions = self.lock()?;
        let mut entries: Vec<_> = sessions.iter().collect();
        entries.sort_by_key(|(_, e)| e.started_at);
        Ok(entries.into_iter().map(|(id, e)| e.summary(*id)).collect())
    }

    /// Replace the session's config. Takes effect from the next utterance.
    pub fn update_config(
        &self,
        id: Uuid,
        config: SessionConfig,
    ) -> Result<SessionSummary, ChatError> {
        let mut sessions = self.lock()?;
        let entry = self.live_entry(&mut sessions, id)?;
        entry.config = config;
        entry.last_activity_at = Local::now().timestamp();
        debug!(session_id = %id, ?config, "updated session config");
        Ok(entry.summary(id))
    }

    /// Stored turns, oldest first. Waits for an in-flight exchange to finish.
    pub async fn history(&self, id: Uuid) -> Result<Vec<ConversationTurn>, ChatError> {
        let state = {
            let mut sessions = self.lock()?;
            self.live_entry(&mut sessions, id)?.state.clone()
        };
        let state = state.lock().await;
        Ok(state.snapshot_for_context())
    }

    /// Run one utterance through `controller` on this session's state.
    pub async fn handle_utterance(
        &self,
        controller: &DialogueController,
        id: Uuid,
        utterance: Utterance,
    ) -> Result<DialogueResult, ChatError> {
        let (state, cancel, config) = {
            let mut sessions = self.lock()?;
            let entry = self.live_entry(&mut sessions, id)?;
            (entry.state.clone(), entry.cancel.clone(), entry.config)
        };

        let mut guard = state.try_lock().map_err(|_| ChatError::SessionBusy(id))?;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = controller.handle_utterance(&mut guard, &utterance, &config) => Some(result),
        };

        let Some(result) = outcome else {
            warn!(session_id = %id, "exchange abandoned by restart or delete");
            let still_exists = self.lock()?.contains_key(&id);
            return Err(if still_exists {
                ChatError::SessionRestarted(id)
            } else {
                ChatError::SessionNotFound(id)
            });
        };

        let turn_count = guard.len();
        drop(guard);

        let mut sessions = self.lock()?;
        if let Some(entry) = sessions.get_mut(&id) {
            if Arc::ptr_eq(&entry.state, &state) {
                entry.last_activity_at = Local::now().timestamp();
                entry.turn_count = turn_count;
            }
        }

        result
    }

    /// Discard the session's history and cancel any in-flight exchange.
    ///
    /// The session keeps its id and config.
    pub fn restart(&self, id: Uuid) -> Result<SessionSummary, ChatError> {
        let mut sessions = self.lock()?;
        let old = self.live_entry(&mut sessions, id)?;
        old.cancel.cancel();

        let fresh = SessionEntry::new(old.config, self.max_history_turns);
        let summary = fresh.summary(id);
        sessions.insert(id, fresh);

        info!(session_id = %id, "restarted session");
        Ok(summary)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), ChatError> {
        let mut sessions = self.lock()?;
        match sessions.remove(&id) {
            Some(entry) => {
                entry.cancel.cancel();
                info!(session_id = %id, "deleted session");
                Ok(())
            }
            None => Err(ChatError::SessionNotFound(id)),
        }
    }

    /// Drop every idle session past the timeout. Returns how many were removed.
    pub fn prune_expired(&self) -> Result<usize, ChatError> {
        let cutoff = self.expiry_cutoff();
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_activity_at >= cutoff || entry.is_busy();
            if !keep {
                entry.cancel.cancel();
                debug!(session_id = %id, "session expired");
            }
            keep
        });
        Ok(before - sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionEntry>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::Internal(format!("session lock poisoned: {}", e)))
    }

    fn expiry_cutoff(&self) -> i64 {
        Local::now().timestamp() - i64::from(self.timeout_minutes) * 60
    }

    /// Look up a session, removing it and reporting not-found if it expired.
    fn live_entry<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, SessionEntry>,
        id: Uuid,
    ) -> Result<&'a mut SessionEntry, ChatError> {
        let expired = match sessions.get(&id) {
            None => return Err(ChatError::SessionNotFound(id)),
            Some(entry) => entry.last_activity_at < self.expiry_cutoff() && !entry.is_busy(),
        };
        if expired {
            if let Some(entry) = sessions.remove(&id) {
                entry.cancel.cancel();
            }
            debug!(session_id = %id, "session expired");
            return Err(ChatError::SessionNotFound(id));
        }
        sessions.get_mut(&id).ok_or(ChatError::SessionNotFound(id))
    }
}

fn format_epoch(epoch: i64) -> String {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt: DateTime<Local>| dt.to_rfc3339())
        .unwrap_or_else(|| epoch.to_string())
}

// =============================================================================
// Tests
// =============================================================================
