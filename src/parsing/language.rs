//! Supported source languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Python,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Java => "Java",
            Self::Python => "Python",
        }
    }

    /// Key used for this language in the `[languages]` settings table.
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Python => "python",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Java => &["java"],
            Self::Python => &["py", "pyi"],
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "java" => Some(Self::Java),
            "py" | "pyi" => Some(Self::Python),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn all() -> &'static [Self] {
        &[Self::Java, Self::Python]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_language_from_extension() {
        assert_eq!(Language::from_extension("java"), Some(Language::Java));
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("pyi"), Some(Language::Python));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn detects_language_from_path() {
        assert_eq!(
            Language::from_path(&PathBuf::from("src/Main.java")),
            Some(Language::Java)
        );
        assert_eq!(
            Language::from_path(&PathBuf::from("pkg/__init__.py")),
            Some(Language::Python)
        );
        assert_eq!(Language::from_path(&PathBuf::from("README.md")), None);
    }
}
