//! Parser factory for creating language-specific walkers
//!
//! Creation goes through the factory so per-language enable flags from the
//! settings are honored in one place.

use super::{JavaParser, Language, LanguageParser, PythonParser};
use crate::config::Settings;
use crate::error::{AstError, AstResult};
use std::sync::Arc;

pub struct ParserFactory {
    settings: Arc<Settings>,
}

impl ParserFactory {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Create a walker for the specified language.
    pub fn create_parser(&self, language: Language) -> AstResult<Box<dyn LanguageParser>> {
        if !self.is_language_enabled(language) {
            return Err(AstError::LanguageDisabled(language));
        }

        match language {
            Language::Java => Ok(Box::new(JavaParser::new()?)),
            Language::Python => Ok(Box::new(PythonParser::new()?)),
        }
    }

    pub fn is_language_enabled(&self, language: Language) -> bool {
        self.settings
            .languages
            .get(language.config_key())
            .map(|config| config.enabled)
            .unwrap_or(true)
    }

    pub fn enabled_languages(&self) -> Vec<Language> {
        Language::all()
            .iter()
            .copied()
            .filter(|&language| self.is_language_enabled(language))
            .collect()
    }
}
