//! The text-document handle consumed by the extraction layer.
//!
//! Holds the full source text of one document snapshot together with its
//! language tag, and resolves spans back to source text. Line starts are
//! indexed once at construction so span lookups stay cheap during tests and
//! decoration rendering.

use crate::error::{AstError, AstResult};
use crate::parsing::Language;
use crate::types::{Position, Span};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Document {
    language: Language,
    path: Option<PathBuf>,
    text: Arc<str>,
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(language: Language, text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let line_starts = line_starts(&text);
        Self {
            language,
            path: None,
            text,
            line_starts,
        }
    }

    /// Read a document from disk, detecting the language from the file
    /// extension.
    pub fn from_path(path: impl AsRef<Path>) -> AstResult<Self> {
        let path = path.as_ref();
        let language = Language::from_path(path)
            .ok_or_else(|| AstError::UnsupportedLanguage(path.display().to_string()))?;
        let text = std::fs::read_to_string(path)?;
        let mut document = Self::new(language, text);
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn text_arc(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of a position, or `None` when it falls outside the
    /// document or inside a multi-byte character.
    fn offset_of(&self, position: Position) -> Option<usize> {
        let line_start = *self.line_starts.get(position.line as usize)?;
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .copied()
            .unwrap_or(self.text.len());
        let offset = line_start + position.column as usize;
        if offset > line_end || !self.text.is_char_boundary(offset) {
            return None;
        }
        Some(offset)
    }

    /// Source text covered by `span`, if it resolves in this document.
    pub fn span_text(&self, span: &Span) -> Option<&str> {
        let start = self.offset_of(span.start)?;
        let end = self.offset_of(span.end)?;
        self.text.get(start..end)
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(
        text.bytes()
            .enumerate()
            .filter(|(_, byte)| *byte == b'\n')
            .map(|(index, _)| index + 1),
    );
    starts
}
