//! Inline span parsing for one line or one table cell.
//!
//! The scanner is greedy and single pass. At every position it tries, in
//! order: `**bold**`, `*italic*` / `_italic_`, `` `code` ``, `[text](url)`;
//! if none match it consumes plain text up to the next trigger character.
//! A match consumes its span opaquely, so styles never nest.
//!
//! Spans reach the document through a [`StyledTextSink`]: [`ElementSink`]
//! appends each span as its own styled element, [`RangeSink`] appends plain
//! text to a cell buffer and styles char ranges over it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::SpanStyle;
use crate::body::{CellRef, DocumentBody};
use crate::error::Result;

const TRIGGERS: [char; 4] = ['*', '_', '`', '['];

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\*([^*]+)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\*([^*_]+)\*|_([^*_]+)_)").unwrap());
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^`([^`]+)`").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// A contiguous styled fragment of a line, markers stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    pub text: String,
    pub style: SpanStyle,
}

impl InlineSpan {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Split `text` into styled spans, left to right.
pub fn parse_inline(text: &str) -> Vec<InlineSpan> {
    let mut spans: Vec<InlineSpan> = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let (span, consumed) = match_styled(rest).unwrap_or_else(|| plain_prefix(rest));
        rest = &rest[consumed..];

        // An unmatched trigger must not split plain text into several spans.
        if span.style == SpanStyle::Plain {
            if let Some(last) = spans.last_mut().filter(|s| s.style == SpanStyle::Plain) {
                last.text.push_str(&span.text);
                continue;
            }
        }
        spans.push(span);
    }

    spans
}

/// Try each styled rule in precedence order at the start of `rest`.
fn match_styled(rest: &str) -> Option<(InlineSpan, usize)> {
    if let Some(caps) = BOLD.captures(rest) {
        return Some((InlineSpan::new(&caps[1], SpanStyle::Bold), caps[0].len()));
    }
    if let Some(caps) = ITALIC.captures(rest) {
        let inner = caps.get(1).or_else(|| caps.get(2))?;
        return Some((
            InlineSpan::new(inner.as_str(), SpanStyle::Italic),
            caps[0].len(),
        ));
    }
    if let Some(caps) = CODE.captures(rest) {
        return Some((InlineSpan::new(&caps[1], SpanStyle::Code), caps[0].len()));
    }
    if let Some(caps) = LINK.captures(rest) {
        return Some((
            InlineSpan::new(&caps[1], SpanStyle::Link(caps[2].to_string())),
            caps[0].len(),
        ));
    }
    None
}

/// Plain text up to the next trigger. A leading trigger that matched no rule
/// is taken as literal text so the scan always advances.
fn plain_prefix(rest: &str) -> (InlineSpan, usize) {
    let skip = rest
        .chars()
        .next()
        .filter(|c| TRIGGERS.contains(c))
        .map_or(0, char::len_utf8);
    let end = rest[skip..]
        .find(TRIGGERS)
        .map_or(rest.len(), |at| skip + at);
    (InlineSpan::new(&rest[..end], SpanStyle::Plain), end)
}

/// Receives the spans of one line in order.
pub trait StyledTextSink {
    fn push_span(&mut self, span: &InlineSpan) -> Result<()>;
}

/// Parse `text` and feed every span to `sink`.
pub fn write_inline<S: StyledTextSink + ?Sized>(sink: &mut S, text: &str) -> Result<()> {
    for span in parse_inline(text) {
        sink.push_span(&span)?;
    }
    Ok(())
}

/// Appends each span as a separately styled element of a paragraph or list item.
pub struct ElementSink<'a, B: DocumentBody + ?Sized> {
    body: &'a mut B,
    index: usize,
}

impl<'a, B: DocumentBody + ?Sized> ElementSink<'a, B> {
    pub fn new(body: &'a mut B, index: usize) -> Self {
        Self { body, index }
    }
}

impl<B: DocumentBody + ?Sized> StyledTextSink for ElementSink<'_, B> {
    fn push_span(&mut self, span: &InlineSpan) -> Result<()> {
        self.body
            .append_styled_text(self.index, &span.text, &span.style)
    }
}

/// Appends spans as plain text to one cell and styles their char ranges.
pub struct RangeSink<'a, B: DocumentBody + ?Sized> {
    body: &'a mut B,
    cell: CellRef,
}

impl<'a, B: DocumentBody + ?Sized> RangeSink<'a, B> {
    pub fn new(body: &'a mut B, cell: CellRef) -> Self {
        Self { body, cell }
    }
}

impl<B: DocumentBody + ?Sized> StyledTextSink for RangeSink<'_, B> {
    fn push_span(&mut self, span: &InlineSpan) -> Result<()> {
        let start = self.body.append_cell_text(self.cell, &span.text)?;
        if span.style != SpanStyle::Plain {
            let end = start + span.text.chars().count();
            self.body
                .set_style_range(self.cell, start, end, &span.style)?;
        }
        Ok(())
    }
}
