use serde::{Deserialize, Serialize};

use crate::language::{LanguageCode, SourceLanguage};

// =============================================================================
// Conversation
// =============================================================================

/// Speaker of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single captured or typed user input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub text: String,
    pub detected_language: SourceLanguage,
}

impl Utterance {
    /// An utterance whose language is still unknown, as delivered by speech capture.
    pub fn captured(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detected_language: SourceLanguage::Auto,
        }
    }
}

// =============================================================================
// Translation
// =============================================================================

/// Outcome of one real-time translation request.
///
/// `translated` is false exactly when the resolved source equals the target,
/// in which case `translation` is the original text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translation: String,
    pub original_text: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub translated: bool,
}

/// Token accounting reported by the completion service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

// =============================================================================
// Dialogue
// =============================================================================

/// Per-session user preferences that steer the dialogue flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub response_language: LanguageCode,
    pub realtime_translation_enabled: bool,
    pub source_language: SourceLanguage,
    pub auto_speak: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            response_language: LanguageCode::Es,
            realtime_translation_enabled: false,
            source_language: SourceLanguage::Auto,
            auto_speak: true,
        }
    }
}

/// Which branch of the dialogue flow produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueKind {
    /// An assistant reply; history was updated.
    Conversation,
    /// An explicit translate command; history was not touched.
    Translation,
}

/// Text to be read aloud, with the locale the voice should use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub locale: String,
}

/// What the presentation layer renders and speaks after one exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueResult {
    pub kind: DialogueKind,
    /// User message as shown and stored (translated text when translated).
    pub user_text: String,
    pub display_text: String,
    pub spoken_text: String,
    /// Set only when the user's words were translated.
    pub original_user_text: Option<String>,
    pub was_translated: bool,
    pub speech: Option<SpeechRequest>,
}
