//! Translation orchestration.
//!
//! Turns "translate this text into language X" into one or two gateway
//! calls: an optional detection call when the source is `auto`, then a
//! translation call unless the resolved source already equals the target.

use std::sync::{Arc, LazyLock};

use parla_core::config::{CompletionProfile, GatewayConfig};
use parla_core::language::{LanguageCatalog, LanguageCode, SourceLanguage};
use parla_core::types::{ConversationTurn, TranslationResult};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{ChatError, GatewayError};
use crate::gateway::{CompletionGateway, CompletionRequest, RequestPurpose};

/// One layer of surrounding quotes, straight or typographic.
static SURROUNDING_QUOTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^["'“”«»‘’]|["'“”«»‘’]$"#).expect("Invalid quote regex")
});

/// Sampling profiles used by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationProfiles {
    pub translate: CompletionProfile,
    pub detect: CompletionProfile,
    pub realtime_translate: CompletionProfile,
}

impl From<&GatewayConfig> for TranslationProfiles {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            translate: config.translate,
            detect: config.detect,
            realtime_translate: config.realtime_translate,
        }
    }
}

pub struct TranslationOrchestrator {
    gateway: Arc<dyn CompletionGateway>,
    catalog: LanguageCatalog,
    profiles: TranslationProfiles,
}

impl TranslationOrchestrator {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        catalog: LanguageCatalog,
        profiles: TranslationProfiles,
    ) -> Self {
        Self {
            gateway,
            catalog,
            profiles,
        }
    }

    pub fn catalog(&self) -> LanguageCatalog {
        self.catalog
    }

    /// Translate `text` into `target`, detecting the source when it is `auto`.
    ///
    /// No translation call is made when the resolved source equals the
    /// target; the result then carries the original text with
    /// `translated == false`. `original_text` is always `text` as given.
    /// An empty translation fails as an upstream error.
    pub async fn orchestrate(
        &self,
        text: &str,
        source: SourceLanguage,
        target: LanguageCode,
    ) -> Result<TranslationResult, ChatError> {
        let trimmed = require_text(text)?;

        let source_language = match source {
            SourceLanguage::Fixed(code) => code,
            SourceLanguage::Auto => self.detect(trimmed).await,
        };

        if source_language == target {
            debug!(language = %target, "source equals target; skipping translation");
            return Ok(TranslationResult {
                translation: text.to_string(),
                original_text: text.to_string(),
                source_language,
                target_language: target,
                translated: false,
            });
        }

        let messages = vec![
            ConversationTurn::system(format!(
                "You are a professional translator. Translate the text from {} into {}. \
                 Return only the translation: no explanations, no quotation marks, no prefixes.",
                source_language.display_name(),
                target.display_name()
            )),
            ConversationTurn::user(format!(
                "Translate this text from {} into {}: \"{}\"",
                source_language.display_name(),
                target.display_name(),
                trimmed
            )),
        ];

        let completion = self
            .gateway
            .complete(CompletionRequest::new(
                RequestPurpose::RealtimeTranslate,
                self.profiles.realtime_translate,
                messages,
            ))
            .await?;

        let translation = require_translation(strip_surrounding_quotes(&completion.content))?;
        debug!(
            source = %source_language,
            target = %target,
            "translated utterance"
        );

        Ok(TranslationResult {
            translation,
            original_text: text.to_string(),
            source_language,
            target_language: target,
            translated: true,
        })
    }

    /// Translate `text` into `target` with a single call and no detection.
    pub async fn translate_one_shot(
        &self,
        text: &str,
        target: LanguageCode,
    ) -> Result<String, ChatError> {
        let text = require_text(text)?;

        let messages = vec![
            ConversationTurn::system(format!(
                "You are a professional translator. Translate the provided text into {}. \
                 Return only the translation, without any explanation.",
                target.display_name()
            )),
            ConversationTurn::user(format!(
                "Translate this into {}: \"{}\"",
                target.display_name(),
                text
            )),
        ];

        let completion = self
            .gateway
            .complete(CompletionRequest::new(
                RequestPurpose::Translate,
                self.profiles.translate,
                messages,
            ))
            .await?;

        require_translation(completion.content.trim().to_string())
    }

    /// Ask the gateway which language `text` is in.
    ///
    /// Any failure or unrecognised answer resolves to the catalog default.
    async fn detect(&self, text: &str) -> LanguageCode {
        let fallback = self.catalog.default_language();
        let codes: Vec<&str> = LanguageCode::ALL.iter().map(|c| c.as_str()).collect();

        let messages = vec![
            ConversationTurn::system(format!(
                "You are a language detector. Reply with ONLY the ISO 639-1 code of the \
                 language of the text, one of: {}. If unsure, reply \"{}\".",
                codes.join(", "),
                fallback
            )),
            ConversationTurn::user(format!("Which language is this text? \"{text}\"")),
        ];

        let request =
            CompletionRequest::new(RequestPurpose::Detect, self.profiles.detect, messages);

        match self.gateway.complete(request).await {
            Ok(completion) => {
                let detected = parse_detected_language(&completion.content);
                if detected.is_none() {
                    warn!(
                        answer = %completion.content,
                        fallback = %fallback,
                        "unrecognised language detection answer"
                    );
                }
                detected.unwrap_or(fallback)
            }
            Err(e) => {
                warn!(error = %e, fallback = %fallback, "language detection failed");
                fallback
            }
        }
    }
}

/// An empty model answer is an upstream fault, not the caller's.
fn require_translation(translation: String) -> Result<String, ChatError> {
    if translation.is_empty() {
        return Err(GatewayError::Upstream {
            status: None,
            detail: "empty translation in completion response".to_string(),
        }
        .into());
    }
    Ok(translation)
}

fn require_text(text: &str) -> Result<&str, ChatError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChatError::InvalidInput(
            "text to translate must not be empty".to_string(),
        ));
    }
    Ok(text)
}

/// Read a language code out of a detector reply such as `"fr"`, `FR.` or `'fr'`.
///
/// Only the first alphabetic token is considered.
pub fn parse_detected_language(answer: &str) -> Option<LanguageCode> {
    answer
        .split(|c: char| !c.is_alphabetic())
        .find(|token| !token.is_empty())
        .and_then(|token| token.parse().ok())
}

/// Remove one layer of surrounding quotes and whitespace.
pub fn strip_surrounding_quotes(text: &str) -> String {
    SURROUNDING_QUOTES_RE
        .replace_all(text.trim(), "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureCategory;
    use crate::gateway::ScriptedGateway;

    fn orchestrator(gateway: &Arc<ScriptedGateway>) -> TranslationOrchestrator {
        TranslationOrchestrator::new(
            gateway.clone(),
            LanguageCatalog::default(),
            TranslationProfiles::from(&GatewayConfig::default()),
        )
    }

    // ---- parsing helpers ----

    #[test]
    fn test_parse_detected_language() {
        assert_eq!(parse_detected_language("fr"), Some(LanguageCode::Fr));
        assert_eq!(parse_detected_language(" FR. "), Some(LanguageCode::Fr));
        assert_eq!(parse_detected_language("'de'"), Some(LanguageCode::De));
        assert_eq!(parse_detected_language("\"ja\"\n"), Some(LanguageCode::Ja));
        assert_eq!(parse_detected_language("xx"), None);
        assert_eq!(parse_detected_language(""), None);
        assert_eq!(parse_detected_language("The language is fr"), None);
    }

    #[test]
    fn test_strip_surrounding_quotes() {
        assert_eq!(strip_surrounding_quotes("\"Hola\""), "Hola");
        assert_eq!(strip_surrounding_quotes("'Hola'"), "Hola");
        assert_eq!(strip_surrounding_quotes("  «Bonjour»  "), "Bonjour");
        assert_eq!(strip_surrounding_quotes("“Hallo”"), "Hallo");
        assert_eq!(strip_surrounding_quotes("Hola"), "Hola");
        // Only one layer is removed
        assert_eq!(strip_surrounding_quotes("\"\"Hola\"\""), "\"Hola\"");
        // Inner quotes survive
        assert_eq!(strip_surrounding_quotes("Dice \"hola\" y se va"), "Dice \"hola\" y se va");
    }

    // ---- orchestrate ----

    #[tokio::test]
    async fn test_auto_source_detects_then_translates() {
        let gateway = Arc::new(ScriptedGateway::new().reply("fr").reply("\"Hola\""));
        let result = orchestrator(&gateway)
            .orchestrate("Bonjour", SourceLanguage::Auto, LanguageCode::Es)
            .await
            .unwrap();

        assert_eq!(result.translation, "Hola");
        assert_eq!(result.original_text, "Bonjour");
        assert_eq!(result.source_language, LanguageCode::Fr);
        assert_eq!(result.target_language, LanguageCode::Es);
        assert!(result.translated);

        let requests = gateway.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].purpose, RequestPurpose::Detect);
        assert_eq!(requests[0].temperature, 0.1);
        assert_eq!(requests[0].max_tokens, 10);
        assert_eq!(requests[1].purpose, RequestPurpose::RealtimeTranslate);
        assert_eq!(requests[1].temperature, 0.3);
        assert_eq!(requests[1].max_tokens, 300);
        assert!(requests[1].last_content().unwrap().contains("Bonjour"));
    }

    #[tokio::test]
    async fn test_same_language_skips_translation() {
        let gateway = Arc::new(ScriptedGateway::new().reply("es"));
        let result = orchestrator(&gateway)
            .orchestrate("hola", SourceLanguage::Auto, LanguageCode::Es)
            .await
            .unwrap();

        assert!(!result.translated);
        assert_eq!(result.translation, "hola");
        assert_eq!(result.source_language, LanguageCode::Es);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_fixed_source_skips_detection() {
        let gateway = Arc::new(ScriptedGateway::new().reply("Good morning"));
        let result = orchestrator(&gateway)
            .orchestrate("Buenos días", LanguageCode::Es.into(), LanguageCode::En)
            .await
            .unwrap();

        assert_eq!(result.translation, "Good morning");
        assert_eq!(result.source_language, LanguageCode::Es);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(gateway.requests()[0].purpose, RequestPurpose::RealtimeTranslate);
    }

    #[tokio::test]
    async fn test_fixed_source_equal_to_target_makes_no_calls() {
        let gateway = Arc::new(ScriptedGateway::new());
        let result = orchestrator(&gateway)
            .orchestrate("Hello", LanguageCode::En.into(), LanguageCode::En)
            .await
            .unwrap();

        assert!(!result.translated);
        assert_eq!(result.translation, "Hello");
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_every_pair() {
        for source in LanguageCode::ALL {
            for target in LanguageCode::ALL {
                let gateway = Arc::new(ScriptedGateway::new().reply("translated"));
                let result = orchestrator(&gateway)
                    .orchestrate("text", source.into(), target)
                    .await
                    .unwrap();

                assert_eq!(result.source_language, source);
                assert_eq!(result.target_language, target);
                if source == target {
                    assert!(!result.translated);
                    assert_eq!(result.translation, "text");
                    assert_eq!(gateway.calls(), 0);
                } else {
                    assert!(result.translated);
                    assert_eq!(result.translation, "translated");
                    assert_eq!(gateway.calls(), 1);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_detection_failure_falls_back_to_default() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .fail(GatewayError::Transport("timeout".into()))
                .reply("Hello"),
        );
        let result = orchestrator(&gateway)
            .orchestrate("hola amigo", SourceLanguage::Auto, LanguageCode::En)
            .await
            .unwrap();

        // Default language is Spanish, which differs from the target
        assert_eq!(result.source_language, LanguageCode::Es);
        assert!(result.translated);
        assert_eq!(result.translation, "Hello");
    }

    #[tokio::test]
    async fn test_unrecognised_detection_answer_falls_back() {
        let gateway = Arc::new(ScriptedGateway::new().reply("I think it's Klingon"));
        let result = orchestrator(&gateway)
            .orchestrate("nuqneH", SourceLanguage::Auto, LanguageCode::Es)
            .await
            .unwrap();

        assert_eq!(result.source_language, LanguageCode::Es);
        assert!(!result.translated);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_translation_failure_propagates() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply("fr")
                .fail(GatewayError::QuotaExceeded("limit".into())),
        );
        let err = orchestrator(&gateway)
            .orchestrate("Bonjour", SourceLanguage::Auto, LanguageCode::Es)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChatError::Gateway(GatewayError::QuotaExceeded(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_translation_is_upstream_failure() {
        let gateway = Arc::new(ScriptedGateway::new().reply("fr").reply("\"\""));
        let err = orchestrator(&gateway)
            .orchestrate("Bonjour", SourceLanguage::Auto, LanguageCode::Es)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChatError::Gateway(GatewayError::Upstream { status: None, .. })
        ));
        assert_eq!(err.category(), Some(FailureCategory::Connectivity));
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_padded_text_keeps_original() {
        let gateway = Arc::new(ScriptedGateway::new().reply("fr").reply("Hola"));
        let result = orchestrator(&gateway)
            .orchestrate("  Bonjour \n", SourceLanguage::Auto, LanguageCode::Es)
            .await
            .unwrap();
        assert_eq!(result.original_text, "  Bonjour \n");
        assert_eq!(result.translation, "Hola");
        // Prompts see the trimmed text
        let requests = gateway.requests();
        assert!(requests[0].last_content().unwrap().contains("\"Bonjour\""));
        assert!(requests[1].last_content().unwrap().contains("\"Bonjour\""));

        let gateway = Arc::new(ScriptedGateway::new());
        let result = orchestrator(&gateway)
            .orchestrate(" Hello ", LanguageCode::En.into(), LanguageCode::En)
            .await
            .unwrap();
        assert!(!result.translated);
        assert_eq!(result.original_text, " Hello ");
        assert_eq!(result.translation, " Hello ");
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_without_calls() {
        let gateway = Arc::new(ScriptedGateway::new());
        let err = orchestrator(&gateway)
            .orchestrate("   ", SourceLanguage::Auto, LanguageCode::Es)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
        assert_eq!(gateway.calls(), 0);
    }

    // ---- translate_one_shot ----

    #[tokio::test]
    async fn test_one_shot_uses_translate_profile() {
        let gateway = Arc::new(ScriptedGateway::new().reply("  Bonjour  "));
        let translation = orchestrator(&gateway)
            .translate_one_shot("hola", LanguageCode::Fr)
            .await
            .unwrap();

        assert_eq!(translation, "Bonjour");
        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].purpose, RequestPurpose::Translate);
        assert_eq!(requests[0].temperature, 0.3);
        assert_eq!(requests[0].max_tokens, 200);
        assert!(requests[0].messages[0].content.contains("French"));
    }

    #[tokio::test]
    async fn test_one_shot_blank_reply_is_upstream_failure() {
        let gateway = Arc::new(ScriptedGateway::new().reply("  \n "));
        let err = orchestrator(&gateway)
            .translate_one_shot("hola", LanguageCode::Fr)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Gateway(GatewayError::Upstream { .. })));
        assert_eq!(err.category(), Some(FailureCategory::Connectivity));
    }

    #[tokio::test]
    async fn test_one_shot_empty_text() {
        let gateway = Arc::new(ScriptedGateway::new());
        let err = orchestrator(&gateway)
            .translate_one_shot("", LanguageCode::Fr)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
    }
}
