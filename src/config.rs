//! Configuration for the extraction layer.
//!
//! Layered: defaults, then a `codetarget.toml` file, then environment
//! variables. Environment variables are prefixed with `CT_` and use double
//! underscores to separate nested levels:
//! - `CT_LANGUAGES__JAVA__ENABLED=false` sets `languages.java.enabled`
//! - `CT_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Per-language settings, keyed by `Language::config_key`
    #[serde(default = "default_languages")]
    pub languages: HashMap<String, LanguageConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    /// Whether this language is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// File extensions for this language
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Additional parser options
    #[serde(default)]
    pub parser_options: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    let mut languages = HashMap::new();

    languages.insert(
        "java".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["java".to_string()],
            parser_options: HashMap::new(),
        },
    );

    languages.insert(
        "python".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["py".to_string(), "pyi".to_string()],
            parser_options: HashMap::new(),
        },
    );

    languages
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            languages: default_languages(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from("codetarget.toml")
    }

    /// Load configuration layered on top of a specific file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CT_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Save current configuration to file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_both_languages() {
        let settings = Settings::default();
        assert!(settings.languages["java"].enabled);
        assert!(settings.languages["python"].enabled);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codetarget.toml");

        let mut settings = Settings::default();
        settings.languages.get_mut("python").unwrap().enabled = false;
        settings.save(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert!(!loaded.languages["python"].enabled);
        assert!(loaded.languages["java"].enabled);
    }

    #[test]
    fn file_layer_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codetarget.toml");
        std::fs::write(&path, "[logging]\ndefault = \"debug\"\n").unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.logging.default, "debug");
        // untouched sections keep their defaults
        assert!(loaded.languages["java"].enabled);
    }
}
