//! Error types for template filling and rendering.

use thiserror::Error;

/// Errors that can occur while filling a template or rendering the result.
#[derive(Debug, Error)]
pub enum FillError {
    /// A position or handle does not name a top-level element.
    #[error("No element at index {index} (document has {len} elements)")]
    NoSuchElement { index: usize, len: usize },

    /// Text or glyph styling was applied to an element that does not hold text runs.
    #[error("Element at index {index} is a {kind}, not a text container")]
    NotTextContainer { index: usize, kind: &'static str },

    /// A cell operation named an element that is not a table.
    #[error("Element at index {index} is not a table")]
    NotATable { index: usize },

    /// A cell address lies outside the table.
    #[error("Cell ({row}, {col}) is outside table at index {table}")]
    CellOutOfBounds { table: usize, row: usize, col: usize },

    /// A style range does not fit the cell's text buffer.
    #[error("Invalid style range {start}..{end} for text of length {len}")]
    InvalidStyleRange { start: usize, end: usize, len: usize },

    /// The field input is well-formed JSON but not an object of fields.
    #[error("Invalid fields: {message}")]
    InvalidFields { message: String },

    /// The field input is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file is not valid TOML for this crate.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error (e.g., reading a config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Typst compilation or PDF export failed.
    #[error("Render error: {message}")]
    Render { message: String },
}

impl FillError {
    /// Whether the document body rejected a structural or styling call.
    pub fn is_style_failure(&self) -> bool {
        matches!(
            self,
            FillError::NoSuchElement { .. }
                | FillError::NotTextContainer { .. }
                | FillError::NotATable { .. }
                | FillError::CellOutOfBounds { .. }
                | FillError::InvalidStyleRange { .. }
        )
    }
}

/// Result type for docfill operations.
pub type Result<T> = std::result::Result<T, FillError>;
