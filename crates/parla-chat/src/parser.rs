//! Translate-command detection.
//!
//! An utterance is an explicit translation request when it starts with one
//! of the configured command words (case-insensitive), followed by
//! whitespace and a non-empty remainder. A bare command word is ordinary
//! conversation.

use regex::{Regex, RegexBuilder};

use crate::error::ChatError;

/// Classification of one user utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedInput<'a> {
    /// "translate <text>": carries the trimmed text to translate.
    TranslateCommand(&'a str),
    /// Anything else: carries the trimmed utterance.
    Message(&'a str),
}

/// Compiled matcher for the translate command words.
#[derive(Debug, Clone)]
pub struct CommandParser {
    pattern: Option<Regex>,
}

impl CommandParser {
    /// Build a parser for the given command words. An empty list disables
    /// command detection.
    pub fn new<S: AsRef<str>>(commands: &[S]) -> Result<Self, ChatError> {
        let alternatives: Vec<String> = commands
            .iter()
            .map(|c| c.as_ref().trim())
            .filter(|c| !c.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&format!(r"^(?:{})\s+(.*)$", alternatives.join("|")))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| ChatError::Config(format!("invalid translate command list: {e}")))?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn parse<'a>(&self, input: &'a str) -> ParsedInput<'a> {
        let input = input.trim();
        let remainder = self
            .pattern
            .as_ref()
            .and_then(|re| re.captures(input))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|rest| !rest.is_empty());

        match remainder {
            Some(rest) => ParsedInput::TranslateCommand(rest),
            None => ParsedInput::Message(input),
        }
    }
}
