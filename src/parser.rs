//! Line-oriented block parsing of a scalar field.
//!
//! Each line is classified on its own into a heading, bullet item, numbered
//! item or plain paragraph, then inserted at the cursor with its inline spans.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::block::{Glyph, HeadingLevel};
use crate::body::DocumentBody;
use crate::error::Result;
use crate::inline::{ElementSink, write_inline};

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*•]\s+(.+)$").unwrap());
static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\.\s+(.+)$").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,3})\s+(.+)$").unwrap());

/// What a single line of field text renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Heading { level: HeadingLevel, text: &'a str },
    BulletItem { text: &'a str },
    /// The literal ordinal is dropped; lists are renumbered when rendered.
    NumberedItem { text: &'a str },
    Plain { text: &'a str },
}

impl LineKind<'_> {
    fn glyph(&self) -> Option<Glyph> {
        match self {
            LineKind::BulletItem { .. } => Some(Glyph::Bullet),
            LineKind::NumberedItem { .. } => Some(Glyph::Number),
            _ => None,
        }
    }
}

pub fn classify(line: &str) -> LineKind<'_> {
    if let Some(caps) = BULLET.captures(line) {
        return LineKind::BulletItem {
            text: caps.get(1).map_or("", |m| m.as_str()),
        };
    }
    if let Some(caps) = NUMBERED.captures(line) {
        return LineKind::NumberedItem {
            text: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    if let Some(caps) = HEADING.captures(line) {
        let hashes = caps.get(1).map_or(1, |m| m.len());
        return LineKind::Heading {
            level: HeadingLevel::clamped(hashes),
            text: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    LineKind::Plain { text: line }
}

/// Split on `\n`, dropping the `\r` of a `\r\n` pair.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Position where the next top-level element is inserted. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct InsertionCursor(usize);

impl InsertionCursor {
    pub fn new(position: usize) -> Self {
        Self(position)
    }

    pub fn position(self) -> usize {
        self.0
    }

    /// Return the current position and step past it.
    pub fn advance(&mut self) -> usize {
        let at = self.0;
        self.0 += 1;
        at
    }
}

/// Render a scalar field at `cursor`, one element per line.
///
/// `None` and `""` both produce exactly one empty paragraph.
pub fn render_block<B: DocumentBody + ?Sized>(
    body: &mut B,
    mut cursor: InsertionCursor,
    text: Option<&str>,
) -> Result<InsertionCursor> {
    let text = match text {
        Some(text) if !text.is_empty() => text,
        _ => {
            body.insert_paragraph(cursor.advance(), "")?;
            return Ok(cursor);
        }
    };

    // Tracks the kind of list we're in; items are still inserted one by one.
    let mut current_run: Option<Glyph> = None;

    for line in lines(text) {
        let kind = classify(line);
        let glyph = kind.glyph();
        if glyph.is_some() && glyph != current_run {
            debug!(glyph = ?glyph, position = cursor.position(), "starting list run");
        }
        current_run = glyph;
        render_line(body, &mut cursor, kind)?;
    }

    Ok(cursor)
}

/// Insert one classified line at the cursor and fill it with inline spans.
pub fn render_line<B: DocumentBody + ?Sized>(
    body: &mut B,
    cursor: &mut InsertionCursor,
    kind: LineKind<'_>,
) -> Result<()> {
    let at = cursor.advance();
    let text = match kind {
        LineKind::Heading { level, text } => {
            body.insert_paragraph(at, "")?;
            body.set_heading_level(at, level)?;
            text
        }
        LineKind::BulletItem { text } => {
            body.insert_list_item(at, "")?;
            body.set_glyph(at, Glyph::Bullet)?;
            text
        }
        LineKind::NumberedItem { text } => {
            body.insert_list_item(at, "")?;
            body.set_glyph(at, Glyph::Number)?;
            text
        }
        LineKind::Plain { text } => {
            body.insert_paragraph(at, "")?;
            text
        }
    };
    write_inline(&mut ElementSink::new(body, at), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, Document, Run, SpanStyle};
    use pretty_assertions::assert_eq;

    fn render(text: Option<&str>) -> (Document, InsertionCursor) {
        let mut doc = Document::default();
        let cursor = render_block(&mut doc, InsertionCursor::new(0), text).unwrap();
        (doc, cursor)
    }

    fn plain_runs(text: &str) -> Vec<Run> {
        vec![Run::new(text, SpanStyle::Plain)]
    }

    #[test]
    fn classify_lines() {
        assert_eq!(
            classify("## Costs"),
            LineKind::Heading {
                level: HeadingLevel::H2,
                text: "Costs"
            }
        );
        assert_eq!(
            classify("### Deep"),
            LineKind::Heading {
                level: HeadingLevel::H3,
                text: "Deep"
            }
        );
        assert_eq!(classify("#### Too deep"), LineKind::Plain { text: "#### Too deep" });
        assert_eq!(classify("#NoSpace"), LineKind::Plain { text: "#NoSpace" });
        assert_eq!(classify("  - dash"), LineKind::BulletItem { text: "dash" });
        assert_eq!(classify("* star"), LineKind::BulletItem { text: "star" });
        assert_eq!(classify("• dot"), LineKind::BulletItem { text: "dot" });
        assert_eq!(classify("12. twelve"), LineKind::NumberedItem { text: "twelve" });
        assert_eq!(classify("**bold** start"), LineKind::Plain { text: "**bold** start" });
        assert_eq!(classify("3.5 apples"), LineKind::Plain { text: "3.5 apples" });
    }

    #[test]
    fn empty_and_missing_text_yield_one_empty_paragraph() {
        for text in [None, Some("")] {
            let (doc, cursor) = render(text);
            assert_eq!(doc.blocks, vec![Block::paragraph("")]);
            assert_eq!(cursor.position(), 1);
        }
    }

    #[test]
    fn heading_then_bullets() {
        let (doc, cursor) = render(Some("# Title\n- item one\n- item two"));
        assert_eq!(cursor.position(), 3);
        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph {
                    heading: Some(HeadingLevel::H1),
                    runs: plain_runs("Title"),
                },
                Block::ListItem {
                    glyph: Glyph::Bullet,
                    runs: plain_runs("item one"),
                },
                Block::ListItem {
                    glyph: Glyph::Bullet,
                    runs: plain_runs("item two"),
                },
            ]
        );
    }

    #[test]
    fn numbered_items_drop_their_ordinals() {
        let (doc, _) = render(Some("7. alpha\r\n3. beta"));
        assert_eq!(
            doc.blocks,
            vec![
                Block::ListItem {
                    glyph: Glyph::Number,
                    runs: plain_runs("alpha"),
                },
                Block::ListItem {
                    glyph: Glyph::Number,
                    runs: plain_runs("beta"),
                },
            ]
        );
    }

    #[test]
    fn blank_lines_become_empty_paragraphs() {
        let (doc, cursor) = render(Some("one\n\ntwo"));
        assert_eq!(cursor.position(), 3);
        assert_eq!(
            doc.blocks,
            vec![
                Block::paragraph("one"),
                Block::paragraph(""),
                Block::paragraph("two"),
            ]
        );
    }

    #[test]
    fn inline_styles_inside_list_items() {
        let (doc, _) = render(Some("- **Risk**: `low`"));
        assert_eq!(
            doc.blocks,
            vec![Block::ListItem {
                glyph: Glyph::Bullet,
                runs: vec![
                    Run::new("Risk", SpanStyle::Bold),
                    Run::new(": ", SpanStyle::Plain),
                    Run::new("low", SpanStyle::Code),
                ],
            }]
        );
    }

    #[test]
    fn renders_at_cursor_between_existing_blocks() {
        let mut doc = Document::new(vec![Block::paragraph("before"), Block::paragraph("after")]);
        let cursor = render_block(&mut doc, InsertionCursor::new(1), Some("a\nb")).unwrap();
        assert_eq!(cursor.position(), 3);
        let texts: Vec<_> = doc.blocks.iter().filter_map(Block::plain_text).collect();
        assert_eq!(texts, vec!["before", "a", "b", "after"]);
    }
}
