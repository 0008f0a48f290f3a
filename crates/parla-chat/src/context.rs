//! Conversation context management.
//!
//! Holds the ordered user/assistant turns of one session and enforces the
//! rolling window: after every append the oldest turns are dropped until at
//! most `max_turns` remain. System instructions are never stored here; they
//! are rebuilt for each request.

use std::collections::VecDeque;

use parla_core::types::{ConversationTurn, Role};

/// Bounded FIFO of conversation turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    turns: VecDeque<ConversationTurn>,
    max_turns: usize,
}

impl ConversationState {
    /// Create an empty state. A `max_turns` of zero is treated as one.
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_turns: max_turns.max(1),
        }
    }

    /// Seed a state from client-supplied history.
    ///
    /// System turns are discarded and only the most recent `max_turns`
    /// user/assistant turns are kept.
    pub fn from_history(history: impl IntoIterator<Item = ConversationTurn>, max_turns: usize) -> Self {
        let mut state = Self::new(max_turns);
        state.turns.extend(history.into_iter().filter(|t| t.role != Role::System));
        state.trim();
        state
    }

    pub fn append_user_turn(&mut self, text: impl Into<String>) {
        self.turns.push_back(ConversationTurn::user(text));
        self.trim();
    }

    pub fn append_assistant_turn(&mut self, text: impl Into<String>) {
        self.turns.push_back(ConversationTurn::assistant(text));
        self.trim();
    }

    /// Record a completed exchange: the user message, then the reply.
    pub fn commit_exchange(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.append_user_turn(user_text);
        self.append_assistant_turn(assistant_text);
    }

    /// Owned copy of the stored turns, oldest first, for building a request.
    pub fn snapshot_for_context(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    /// Drop oldest turns until the window holds at most `max_turns`.
    pub fn trim(&mut self) {
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
