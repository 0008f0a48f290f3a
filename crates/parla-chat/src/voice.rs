//! Speech capture and playback contracts.
//!
//! Capture and playback run outside the engine (typically in a browser).
//! This module defines what crosses that boundary: the failures capture can
//! report, the request handed to playback, and the locale each side uses.

use parla_core::language::{LanguageCode, SourceLanguage};
use parla_core::types::{SessionConfig, SpeechRequest};

/// Why a capture attempt produced no utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureFailure {
    NoSpeechDetected,
    PermissionDenied,
    Other(String),
}

impl CaptureFailure {
    /// Classify a recognizer error code (`no-speech`, `not-allowed`, ...).
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "no-speech" => CaptureFailure::NoSpeechDetected,
            "not-allowed" | "service-not-allowed" => CaptureFailure::PermissionDenied,
            other => CaptureFailure::Other(other.to_string()),
        }
    }

    /// Stable snake_case name reported to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureFailure::NoSpeechDetected => "no_speech",
            CaptureFailure::PermissionDenied => "permission_denied",
            CaptureFailure::Other(_) => "other",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureFailure::NoSpeechDetected => "No speech was detected. Please try again.",
            CaptureFailure::PermissionDenied => {
                "Microphone permission denied. Please allow microphone access."
            }
            CaptureFailure::Other(_) => "Something went wrong while listening. Please try again.",
        }
    }

    /// Permission problems need user action and are shown as errors rather
    /// than as a transient status.
    pub fn is_blocking(&self) -> bool {
        matches!(self, CaptureFailure::PermissionDenied)
    }
}

/// Locale the recognizer should listen in.
///
/// With real-time translation on and a fixed source language the user is
/// expected to speak that language; otherwise they speak the response
/// language.
pub fn recognition_locale(config: &SessionConfig) -> &'static str {
    match (config.realtime_translation_enabled, config.source_language) {
        (true, SourceLanguage::Fixed(source)) => source.locale_tag(),
        _ => config.response_language.locale_tag(),
    }
}

/// Playback request for `text` in `language`, or `None` when auto-speak is off.
pub fn speech_request(text: &str, language: LanguageCode, auto_speak: bool) -> Option<SpeechRequest> {
    if !auto_speak || text.trim().is_empty() {
        return None;
    }
    Some(SpeechRequest {
        text: text.to_string(),
        locale: language.locale_tag().to_string(),
    })
}
