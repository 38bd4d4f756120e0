use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{FillError, Result};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub placeholders: PlaceholderConfig,
    pub table: TableConfig,
    pub links: LinksConfig,
    pub page: PageConfig,
}

/// How a placeholder with no matching field is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingField {
    /// Render `[name]` so the gap is visible in the output.
    #[default]
    Label,
    /// Render an empty paragraph.
    Empty,
    /// Leave the placeholder in the document.
    Keep,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub open: String,
    pub close: String,
    pub missing: MissingField,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
            missing: MissingField::Label,
        }
    }
}

impl PlaceholderConfig {
    /// The literal token text for a field name, e.g. `{{summary}}`.
    pub fn token(&self, name: &str) -> String {
        format!("{}{}{}", self.open, name, self.close)
    }

    /// The value substituted for a placeholder that has no field, if any.
    pub fn fallback(&self, name: &str) -> Option<String> {
        match self.missing {
            MissingField::Label => Some(format!("[{name}]")),
            MissingField::Empty => Some(String::new()),
            MissingField::Keep => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub header_background: String,
    pub header_bold: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            header_background: "#d9e2f3".to_string(),
            header_bold: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub color: String,
    pub underline: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            color: "#1a4f8b".to_string(),
            underline: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PageConfig {
    pub numbers: bool,
}

impl Config {
    /// The configuration bundled with the crate.
    pub fn compiled_default() -> Self {
        // build.rs rejects an invalid bundled file, so the fallback never differs.
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::compiled_default()),
            Err(e) => Err(FillError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_default_matches_default_impl() {
        let compiled = Config::compiled_default();
        assert_eq!(compiled.placeholders.open, "{{");
        assert_eq!(compiled.placeholders.close, "}}");
        assert_eq!(compiled.placeholders.missing, MissingField::Label);
        assert_eq!(compiled.table.header_background, "#d9e2f3");
        assert!(compiled.table.header_bold);
        assert_eq!(compiled.links.color, LinksConfig::default().color);
        assert!(!compiled.page.numbers);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = Config::from_toml("[placeholders]\nmissing = \"keep\"\n").unwrap();
        assert_eq!(config.placeholders.missing, MissingField::Keep);
        assert_eq!(config.placeholders.open, "{{");
        assert_eq!(config.table.header_background, "#d9e2f3");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = Config::from_toml("[placeholders\n").unwrap_err();
        assert!(matches!(err, FillError::Config(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/docfill.toml")).unwrap();
        assert_eq!(config.placeholders.close, "}}");
    }

    #[test]
    fn token_and_fallback() {
        let placeholders = PlaceholderConfig::default();
        assert_eq!(placeholders.token("summary"), "{{summary}}");
        assert_eq!(placeholders.fallback("summary").as_deref(), Some("[summary]"));

        let keep = PlaceholderConfig {
            missing: MissingField::Keep,
            ..PlaceholderConfig::default()
        };
        assert_eq!(keep.fallback("summary"), None);
    }
}
