pub mod config;
pub mod error;
pub mod language;
pub mod types;

pub use config::{
    CompletionProfile, DialogueConfig, GatewayConfig, GeneralConfig, ParlaConfig, SessionSettings,
};
pub use error::{ParlaError, Result};
pub use language::{LanguageCatalog, LanguageCode, SourceLanguage};
pub use types::*;
