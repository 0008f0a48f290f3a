use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ParlaError, Result};
use crate::language::{LanguageCatalog, LanguageCode};
use crate::types::SessionConfig;

/// Top-level configuration for Parla.
///
/// Loaded from `~/.parla/config.toml` by default. Every section falls back to
/// its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParlaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
    #[serde(default)]
    pub session: SessionSettings,
}

impl ParlaConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParlaConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from `path` when the file exists.
    ///
    /// A missing file is `Ok(None)`; a file that exists but cannot be read,
    /// parsed or validated is an error.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values that would make the dialogue flow misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.dialogue.max_history_turns == 0 {
            return Err(ParlaError::Config(
                "dialogue.max_history_turns must be at least 1".to_string(),
            ));
        }
        if self.dialogue.translate_commands.iter().any(|c| c.trim().is_empty()) {
            return Err(ParlaError::Config(
                "dialogue.translate_commands must not contain empty entries".to_string(),
            ));
        }
        if self.gateway.model.trim().is_empty() {
            return Err(ParlaError::Config("gateway.model must be set".to_string()));
        }
        if self.gateway.request_timeout_secs == 0 {
            return Err(ParlaError::Config(
                "gateway.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        for (name, profile) in [
            ("chat", &self.gateway.chat),
            ("translate", &self.gateway.translate),
            ("detect", &self.gateway.detect),
            ("realtime_translate", &self.gateway.realtime_translate),
        ] {
            if !(0.0..=2.0).contains(&profile.temperature) {
                return Err(ParlaError::Config(format!(
                    "gateway.{}.temperature must be within 0.0..=2.0",
                    name
                )));
            }
            if profile.max_tokens == 0 {
                return Err(ParlaError::Config(format!(
                    "gateway.{}.max_tokens must be at least 1",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Language catalog using the configured default language.
    pub fn catalog(&self) -> LanguageCatalog {
        LanguageCatalog::new(self.dialogue.default_language)
    }
}

/// Server and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Address the HTTP relay binds to.
    pub host: String,
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_level: "info".to_string(),
        }
    }
}

/// Sampling parameters for one kind of completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionProfile {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionProfile {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Completion service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of an OpenAI-compatible API (without `/v1/...`).
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the bearer token. The key itself is
    /// never stored in the config file.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
    pub chat: CompletionProfile,
    pub translate: CompletionProfile,
    pub detect: CompletionProfile,
    pub realtime_translate: CompletionProfile,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 30,
            chat: CompletionProfile::new(0.7, 150),
            translate: CompletionProfile::new(0.3, 200),
            detect: CompletionProfile::new(0.1, 10),
            realtime_translate: CompletionProfile::new(0.3, 300),
        }
    }
}

impl GatewayConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

/// Dialogue flow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Fallback for unknown language codes.
    pub default_language: LanguageCode,
    /// Retained user/assistant turns per session.
    pub max_history_turns: usize,
    /// Command words that trigger a one-shot translation, matched
    /// case-insensitively at the start of an utterance.
    pub translate_commands: Vec<String>,
    /// System prompt template; `{language}` is replaced by the response
    /// language's display name.
    pub system_prompt: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            default_language: LanguageCode::Es,
            max_history_turns: 20,
            translate_commands: [
                "traduce", "translate", "traduis", "traduire", "übersetze", "traduci",
                "traduza", "переведи", "翻訳", "翻译",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            system_prompt: "You are a friendly, conversational voice assistant. Reply naturally \
                            and briefly in {language}. Keep answers concise because they will \
                            be read aloud."
                .to_string(),
        }
    }
}

impl DialogueConfig {
    /// Render the system prompt for a response language.
    pub fn system_prompt_for(&self, language: LanguageCode) -> String {
        self.system_prompt
            .replace("{language}", language.display_name())
    }
}

/// Session lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Idle minutes after which a session expires.
    pub timeout_minutes: u32,
    /// Preferences applied to newly created sessions.
    pub defaults: SessionConfig,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_minutes: 30,
            defaults: SessionConfig::default(),
        }
    }
}
