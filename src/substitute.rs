//! Placeholder substitution: locate a token, remove its paragraph and render
//! the field value in its place.

use tracing::{debug, info, warn};

use crate::block::Glyph;
use crate::body::{CellRef, DocumentBody};
use crate::config::{Config, PlaceholderConfig, TableConfig};
use crate::error::Result;
use crate::fields::{FieldValue, Fields};
use crate::inline::{ElementSink, RangeSink, write_inline};
use crate::parser::{InsertionCursor, render_block};

/// What happened to each placeholder during [`fill`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Fields whose placeholder was found and replaced.
    pub rendered: Vec<String>,
    /// Fields whose placeholder is not in the document.
    pub skipped: Vec<String>,
    /// Placeholders without a field that received the fallback value.
    pub fallbacks: Vec<String>,
}

/// Replace the paragraph holding the first occurrence of `token` with `value`.
///
/// Returns the cursor after the last inserted element, or `None` when the
/// token isn't in the body, which leaves the body untouched.
pub fn render_field<B: DocumentBody + ?Sized>(
    body: &mut B,
    token: &str,
    value: &FieldValue,
    config: &Config,
) -> Result<Option<InsertionCursor>> {
    let Some(index) = body.locate(token) else {
        debug!(token, "placeholder not found");
        return Ok(None);
    };
    body.delete_element(index)?;
    let cursor = InsertionCursor::new(index);

    let end = match value {
        FieldValue::Scalar(text) => render_block(body, cursor, Some(text))?,
        FieldValue::ItemList(items) => render_items(body, cursor, items)?,
        FieldValue::Table(rows) => render_table(body, cursor, rows, &config.table)?,
    };
    debug!(
        token,
        index,
        inserted = end.position() - index,
        "rendered placeholder"
    );
    Ok(Some(end))
}

/// One bullet per non-empty item. Only inline markdown is parsed, so list
/// markers or `#` inside an item stay literal text.
fn render_items<B: DocumentBody + ?Sized>(
    body: &mut B,
    mut cursor: InsertionCursor,
    items: &[String],
) -> Result<InsertionCursor> {
    for item in items.iter().filter(|item| !item.is_empty()) {
        let at = cursor.advance();
        body.insert_list_item(at, "")?;
        body.set_glyph(at, Glyph::Bullet)?;
        write_inline(&mut ElementSink::new(body, at), item)?;
    }
    Ok(cursor)
}

/// A table shaped exactly like `rows`, header row tinted and bolded, every
/// cell restyled from its inline markdown.
fn render_table<B: DocumentBody + ?Sized>(
    body: &mut B,
    mut cursor: InsertionCursor,
    rows: &[Vec<String>],
    style: &TableConfig,
) -> Result<InsertionCursor> {
    let table = cursor.advance();
    body.insert_table(table, rows)?;

    for (row, cells) in rows.iter().enumerate() {
        for (col, text) in cells.iter().enumerate() {
            let cell = CellRef { table, row, col };
            body.clear_cell(cell)?;
            write_inline(&mut RangeSink::new(body, cell), text)?;
            if row == 0 {
                body.set_cell_background(cell, &style.header_background)?;
                if style.header_bold {
                    body.set_cell_bold(cell)?;
                }
            }
        }
    }
    Ok(cursor)
}

/// Substitute every field in declaration order, then give template
/// placeholders that have no field the configured fallback.
///
/// The first failing document call aborts the batch; whatever was already
/// written stays in the body.
pub fn fill<B: DocumentBody + ?Sized>(
    body: &mut B,
    fields: &Fields,
    config: &Config,
) -> Result<FillReport> {
    let placeholders = &config.placeholders;
    let mut report = FillReport::default();

    // Only tokens the template itself carries get a fallback, never tokens
    // that arrive inside field values.
    let unfilled: Vec<String> = placeholder_names(body, placeholders)
        .into_iter()
        .filter(|name| !fields.contains(name))
        .collect();

    for (name, value) in fields.iter() {
        let token = placeholders.token(name);
        match render_field(body, &token, value, config)? {
            Some(_) => report.rendered.push(name.to_string()),
            None => report.skipped.push(name.to_string()),
        }
    }

    for name in unfilled {
        let Some(fallback) = placeholders.fallback(&name) else {
            continue;
        };
        warn!(field = %name, "no value for placeholder, using fallback");
        let token = placeholders.token(&name);
        if render_field(body, &token, &FieldValue::Scalar(fallback), config)?.is_some() {
            report.fallbacks.push(name);
        }
    }

    info!(
        rendered = report.rendered.len(),
        skipped = report.skipped.len(),
        fallbacks = report.fallbacks.len(),
        "filled template"
    );
    Ok(report)
}

/// Names of all placeholders left in the body, in document order, once each.
pub fn placeholder_names<B: DocumentBody + ?Sized>(
    body: &B,
    placeholders: &PlaceholderConfig,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for index in 0..body.element_count() {
        let Some(text) = body.element_text(index) else {
            continue;
        };
        for name in scan_placeholders(&text, &placeholders.open, &placeholders.close) {
            if !names.iter().any(|seen| seen == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

fn scan_placeholders<'a>(text: &'a str, open: &str, close: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    if open.is_empty() || close.is_empty() {
        return found;
    }

    let mut rest = text;
    while let Some(start) = rest.find(open) {
        let after_open = &rest[start + open.len()..];
        let Some(end) = after_open.find(close) else {
            break;
        };
        let name = &after_open[..end];
        // `{{ {{x}}`: restart from the inner opener.
        if let Some(inner) = name.find(open) {
            rest = &after_open[inner..];
            continue;
        }
        if !name.is_empty() && !name.contains(char::is_whitespace) {
            found.push(name);
        }
        rest = &after_open[end + close.len()..];
    }
    found
}
