//! Language catalog.
//!
//! Static mapping of supported language codes to display names and BCP 47
//! locale tags. Lookups by free-form code never fail: unknown input resolves
//! to the catalog's configured default language.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language that can be the target of a translation or a response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    Es,
    En,
    Fr,
    De,
    It,
    Pt,
    Ja,
    Zh,
    Ru,
}

impl LanguageCode {
    /// Every supported code, in catalog order.
    pub const ALL: [LanguageCode; 9] = [
        LanguageCode::Es,
        LanguageCode::En,
        LanguageCode::Fr,
        LanguageCode::De,
        LanguageCode::It,
        LanguageCode::Pt,
        LanguageCode::Ja,
        LanguageCode::Zh,
        LanguageCode::Ru,
    ];

    /// Two-letter ISO 639-1 code.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::Es => "es",
            LanguageCode::En => "en",
            LanguageCode::Fr => "fr",
            LanguageCode::De => "de",
            LanguageCode::It => "it",
            LanguageCode::Pt => "pt",
            LanguageCode::Ja => "ja",
            LanguageCode::Zh => "zh",
            LanguageCode::Ru => "ru",
        }
    }

    /// Human-readable name, used when building prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageCode::Es => "Spanish",
            LanguageCode::En => "English",
            LanguageCode::Fr => "French",
            LanguageCode::De => "German",
            LanguageCode::It => "Italian",
            LanguageCode::Pt => "Portuguese",
            LanguageCode::Ja => "Japanese",
            LanguageCode::Zh => "Chinese",
            LanguageCode::Ru => "Russian",
        }
    }

    /// Locale tag handed to speech capture and playback.
    pub fn locale_tag(&self) -> &'static str {
        match self {
            LanguageCode::Es => "es-ES",
            LanguageCode::En => "en-US",
            LanguageCode::Fr => "fr-FR",
            LanguageCode::De => "de-DE",
            LanguageCode::It => "it-IT",
            LanguageCode::Pt => "pt-PT",
            LanguageCode::Ja => "ja-JP",
            LanguageCode::Zh => "zh-CN",
            LanguageCode::Ru => "ru-RU",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the supported language codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language code: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for LanguageCode {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        LanguageCode::ALL
            .into_iter()
            .find(|c| c.as_str() == code)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// The language an utterance is spoken in: either known or to be detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SourceLanguage {
    /// Detect the language with a gateway round trip.
    #[default]
    Auto,
    Fixed(LanguageCode),
}

impl SourceLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLanguage::Auto => "auto",
            SourceLanguage::Fixed(code) => code.as_str(),
        }
    }
}

impl From<LanguageCode> for SourceLanguage {
    fn from(code: LanguageCode) -> Self {
        SourceLanguage::Fixed(code)
    }
}

impl From<SourceLanguage> for String {
    fn from(source: SourceLanguage) -> Self {
        source.as_str().to_string()
    }
}

impl TryFrom<String> for SourceLanguage {
    type Error = UnknownLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for SourceLanguage {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(SourceLanguage::Auto);
        }
        s.parse().map(SourceLanguage::Fixed)
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup table with a configured fallback language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LanguageCatalog {
    default: LanguageCode,
}

impl LanguageCatalog {
    pub fn new(default: LanguageCode) -> Self {
        Self { default }
    }

    /// The language unknown codes fall back to.
    pub fn default_language(&self) -> LanguageCode {
        self.default
    }

    /// Resolve a free-form code to a supported language.
    ///
    /// `"auto"`, empty input and unknown codes all yield the default.
    pub fn resolve(&self, code: &str) -> LanguageCode {
        code.parse().unwrap_or(self.default)
    }

    /// Resolve a free-form source code. Empty input means auto-detection.
    pub fn resolve_source(&self, code: &str) -> SourceLanguage {
        if code.trim().is_empty() {
            return SourceLanguage::Auto;
        }
        code.parse()
            .unwrap_or(SourceLanguage::Fixed(self.default))
    }

    pub fn name_of(&self, code: &str) -> &'static str {
        self.resolve(code).display_name()
    }

    pub fn locale_of(&self, code: &str) -> &'static str {
        self.resolve(code).locale_tag()
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::new(LanguageCode::default())
    }
}
