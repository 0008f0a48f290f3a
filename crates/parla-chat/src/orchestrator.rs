//! Dialogue controller: central coordinator wiring the command parser, the
//! translation orchestrator, conversation state and the completion gateway.
//!
//! One call to [`DialogueController::handle_utterance`] processes one user
//! utterance end to end. Gateway calls are made strictly in order
//! (detection, translation, reply) and conversation state is only mutated
//! after the final call succeeds, so an error or an abandoned call leaves
//! the state exactly as it was.

use std::sync::Arc;

use parla_core::config::{CompletionProfile, DialogueConfig, ParlaConfig};
use parla_core::language::{LanguageCatalog, LanguageCode, SourceLanguage};
use parla_core::types::{
    ConversationTurn, DialogueKind, DialogueResult, Role, SessionConfig, Utterance,
};
use tracing::{debug, info};

use crate::context::ConversationState;
use crate::error::ChatError;
use crate::gateway::{Completion, CompletionGateway, CompletionRequest, RequestPurpose};
use crate::parser::{CommandParser, ParsedInput};
use crate::translation::{TranslationOrchestrator, TranslationProfiles};
use crate::voice::speech_request;

pub struct DialogueController {
    gateway: Arc<dyn CompletionGateway>,
    translator: TranslationOrchestrator,
    commands: CommandParser,
    dialogue: DialogueConfig,
    chat_profile: CompletionProfile,
}

impl DialogueController {
    pub fn new(gateway: Arc<dyn CompletionGateway>, config: &ParlaConfig) -> Result<Self, ChatError> {
        let commands = CommandParser::new(&config.dialogue.translate_commands)?;
        let translator = TranslationOrchestrator::new(
            gateway.clone(),
            config.catalog(),
            TranslationProfiles::from(&config.gateway),
        );

        Ok(Self {
            gateway,
            translator,
            commands,
            dialogue: config.dialogue.clone(),
            chat_profile: config.gateway.chat,
        })
    }

    pub fn translator(&self) -> &TranslationOrchestrator {
        &self.translator
    }

    pub fn catalog(&self) -> LanguageCatalog {
        self.translator.catalog()
    }

    /// Size of the rolling history window.
    pub fn max_history_turns(&self) -> usize {
        self.dialogue.max_history_turns
    }

    /// Fresh, empty conversation state sized for this controller.
    pub fn new_state(&self) -> ConversationState {
        ConversationState::new(self.dialogue.max_history_turns)
    }

    /// Process one utterance against `state` under the session's `config`.
    ///
    /// - A translate command is answered with a one-shot translation and
    ///   leaves `state` untouched.
    /// - Otherwise the utterance is optionally translated (when real-time
    ///   translation is on), the assistant is asked for a reply with the
    ///   current history, and the exchange is appended to `state`.
    pub async fn handle_utterance(
        &self,
        state: &mut ConversationState,
        utterance: &Utterance,
        config: &SessionConfig,
    ) -> Result<DialogueResult, ChatError> {
        let text = utterance.text.trim();
        if text.is_empty() {
            return Err(ChatError::InvalidInput(
                "utterance text must not be empty".to_string(),
            ));
        }

        let response_language = config.response_language;

        if let ParsedInput::TranslateCommand(to_translate) = self.commands.parse(text) {
            let translation = self
                .translator
                .translate_one_shot(to_translate, response_language)
                .await?;

            info!(target_language = %response_language, "handled translate command");
            return Ok(DialogueResult {
                kind: DialogueKind::Translation,
                user_text: text.to_string(),
                display_text: translation.clone(),
                spoken_text: translation.clone(),
                original_user_text: Some(to_translate.to_string()),
                was_translated: true,
                speech: speech_request(&translation, response_language, config.auto_speak),
            });
        }

        let (user_text, original_user_text) = if config.realtime_translation_enabled {
            // A language already reported by capture wins over the session setting.
            let source = match utterance.detected_language {
                SourceLanguage::Fixed(code) => SourceLanguage::Fixed(code),
                SourceLanguage::Auto => config.source_language,
            };
            let result = self
                .translator
                .orchestrate(text, source, response_language)
                .await?;
            if result.translated {
                (result.translation, Some(text.to_string()))
            } else {
                (text.to_string(), None)
            }
        } else {
            (text.to_string(), None)
        };

        let history = state.snapshot_for_context();
        let reply = self.reply(&history, &user_text, response_language).await?;

        state.commit_exchange(user_text.clone(), reply.content.clone());
        debug!(
            turns = state.len(),
            translated = original_user_text.is_some(),
            "committed exchange"
        );

        Ok(DialogueResult {
            kind: DialogueKind::Conversation,
            user_text,
            display_text: reply.content.clone(),
            spoken_text: reply.content.clone(),
            was_translated: original_user_text.is_some(),
            original_user_text,
            speech: speech_request(&reply.content, response_language, config.auto_speak),
        })
    }

    /// Ask the assistant for a reply to `message` given prior `history`.
    ///
    /// The system instruction is rebuilt for every request and system turns
    /// in `history` are skipped. Stateless: nothing is recorded.
    pub async fn reply(
        &self,
        history: &[ConversationTurn],
        message: &str,
        language: LanguageCode,
    ) -> Result<Completion, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ConversationTurn::system(
            self.dialogue.system_prompt_for(language),
        ));
        messages.extend(
            history
                .iter()
                .filter(|t| t.role != Role::System)
                .cloned(),
        );
        messages.push(ConversationTurn::user(message));

        let completion = self
            .gateway
            .complete(CompletionRequest::new(
                RequestPurpose::Chat,
                self.chat_profile,
                messages,
            ))
            .await?;
        Ok(completion)
    }
}
