use crate::parsing::Language;
use thiserror::Error;

/// Errors surfaced by parsing and extraction.
///
/// `Aborted` is kept distinct from the parse-level failures so that callers
/// can tell a cancelled re-parse from malformed input.
#[derive(Error, Debug)]
pub enum AstError {
    #[error("no parser available for language: {0}")]
    UnsupportedLanguage(String),

    #[error("language {0} is disabled in configuration")]
    LanguageDisabled(Language),

    #[error("failed to initialize {language} grammar: {reason}")]
    ParserInit { language: Language, reason: String },

    #[error("{language} parser produced no syntax tree")]
    Parse { language: Language },

    #[error("required {kind} node missing at line {line}")]
    MissingNode { kind: &'static str, line: u32 },

    #[error("parse aborted")]
    Aborted,

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

pub type AstResult<T> = Result<T, AstError>;
