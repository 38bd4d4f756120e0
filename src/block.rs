/// Style of one inline run of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanStyle {
    Plain,
    Bold,
    Italic,
    Code,
    Link(String),
}

/// A styled text element appended to a paragraph or list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub style: SpanStyle,
}

impl Run {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A style applied to a char range of a cell's text buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRange {
    pub start: usize,
    pub end: usize,
    pub style: SpanStyle,
}

/// A table cell: one plain text buffer plus ranges styled over it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub ranges: Vec<StyleRange>,
    pub background: Option<String>,
    pub bold: bool,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Length of the text buffer in chars, the unit style ranges are measured in.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Visual marker of a list item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Bullet,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
}

impl HeadingLevel {
    /// Map a markdown heading depth onto the three supported levels.
    pub fn clamped(level: usize) -> Self {
        match level {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    pub fn depth(self) -> usize {
        self as usize
    }
}

/// Top-level elements of a document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph {
        heading: Option<HeadingLevel>,
        runs: Vec<Run>,
    },
    ListItem {
        glyph: Glyph,
        runs: Vec<Run>,
    },
    Table {
        rows: Vec<Vec<Cell>>,
    },
    CodeBlock {
        content: String,
    },
    Rule,
    PageBreak,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            heading: None,
            runs: text_runs(text),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph { heading: None, .. } => "paragraph",
            Block::Paragraph { .. } => "heading",
            Block::ListItem { .. } => "list item",
            Block::Table { .. } => "table",
            Block::CodeBlock { .. } => "code block",
            Block::Rule => "rule",
            Block::PageBreak => "page break",
        }
    }

    /// Runs of a paragraph, heading or list item.
    pub fn runs(&self) -> Option<&[Run]> {
        match self {
            Block::Paragraph { runs, .. } | Block::ListItem { runs, .. } => Some(runs),
            _ => None,
        }
    }

    pub fn runs_mut(&mut self) -> Option<&mut Vec<Run>> {
        match self {
            Block::Paragraph { runs, .. } | Block::ListItem { runs, .. } => Some(runs),
            _ => None,
        }
    }

    /// Concatenated run text, or `None` for blocks that don't hold runs.
    pub fn plain_text(&self) -> Option<String> {
        self.runs()
            .map(|runs| runs.iter().map(|run| run.text.as_str()).collect())
    }
}

pub(crate) fn text_runs(text: impl Into<String>) -> Vec<Run> {
    let text = text.into();
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Run::new(text, SpanStyle::Plain)]
    }
}

/// An ordered sequence of top-level blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}
