use crate::block::{Block, Cell, Document, Glyph, Run, SpanStyle};
use crate::config::Config;

/// Top-level output unit: a single block, or consecutive list items of one glyph
enum Segment<'a> {
    Block(&'a Block),
    List { glyph: Glyph, items: Vec<&'a [Run]> },
}

fn segments(blocks: &[Block]) -> Vec<Segment<'_>> {
    let mut out: Vec<Segment<'_>> = Vec::new();
    for block in blocks {
        if let Block::ListItem { glyph, runs } = block {
            if let Some(Segment::List { glyph: open, items }) = out.last_mut() {
                if *open == *glyph {
                    items.push(runs.as_slice());
                    continue;
                }
            }
            out.push(Segment::List {
                glyph: *glyph,
                items: vec![runs.as_slice()],
            });
        } else {
            out.push(Segment::Block(block));
        }
    }
    out
}

/// Convert a document to Typst markup
pub fn document_to_typst(document: &Document, config: &Config) -> String {
    let mut out = String::new();

    // Set up paragraph settings to prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    if config.page.numbers {
        out.push_str("#set page(numbering: \"1\")\n");
    }
    out.push_str("#show link: set text(fill: rgb(");
    push_string_literal(&config.links.color, &mut out);
    out.push_str("))\n");
    if config.links.underline {
        out.push_str("#show link: underline\n");
    }
    out.push('\n');

    let segments = segments(&document.blocks);
    let mut i = 0;
    while i < segments.len() {
        match &segments[i] {
            Segment::Block(Block::Paragraph {
                heading: Some(_), ..
            }) => {
                // Keep heading with following content using a block that prevents breaks
                out.push_str("#block(breakable: false)[\n");
                emit_segment(&segments[i], &mut out);

                // Include the next segment if it exists (to keep heading with first content)
                if i + 1 < segments.len() {
                    i += 1;
                    emit_segment(&segments[i], &mut out);
                }
                out.push_str("]\n\n");
            }
            segment => {
                emit_segment(segment, &mut out);
            }
        }

        i += 1;
    }

    out
}

fn emit_segment(segment: &Segment<'_>, out: &mut String) {
    match segment {
        Segment::Block(block) => emit_block(block, out),
        Segment::List { glyph, items } => {
            // Wrap list to keep together when small, allow breaks when large
            if items.len() <= 5 {
                out.push_str("#block(breakable: false)[\n");
                list_to_typst(*glyph, items, out);
                out.push_str("]\n\n");
            } else {
                list_to_typst(*glyph, items, out);
                out.push('\n');
            }
        }
    }
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Paragraph {
            heading: Some(level),
            runs,
        } => {
            for _ in 0..level.depth() {
                out.push('=');
            }
            out.push(' ');
            runs_to_typst(runs, out);
            out.push_str("\n\n");
        }
        Block::Paragraph {
            heading: None,
            runs,
        } => {
            if runs.iter().all(|run| run.text.is_empty()) {
                // Keep the vertical space of an empty paragraph
                out.push_str("#v(1em)\n\n");
            } else {
                escape_line_start(runs, out);
                out.push_str("\n\n");
            }
        }
        Block::ListItem { glyph, runs } => {
            list_to_typst(*glyph, &[runs.as_slice()], out);
            out.push('\n');
        }
        Block::Table { rows } => {
            // Keep tables together when possible
            out.push_str("#block(breakable: false)[\n");
            table_to_typst(rows, out);
            out.push_str("]\n\n");
        }
        Block::CodeBlock { content } => {
            out.push_str("#block(breakable: false)[\n#raw(block: true, ");
            push_string_literal(content.trim_end_matches('\n'), out);
            out.push_str(")\n]\n\n");
        }
        Block::Rule => {
            out.push_str("#line(length: 100%)\n\n");
        }
        Block::PageBreak => {
            out.push_str("#pagebreak()\n\n");
        }
    }
}

fn runs_to_typst(runs: &[Run], out: &mut String) {
    for run in runs {
        run_to_typst(run, out);
    }
}

/// Like `runs_to_typst`, but text at the start of a line must not read as a
/// heading, list or enum marker.
fn escape_line_start(runs: &[Run], out: &mut String) {
    let Some((first, rest)) = runs.split_first() else {
        return;
    };
    if first.style != SpanStyle::Plain {
        runs_to_typst(runs, out);
        return;
    }

    // Typst reads a marker after leading spaces as markup too.
    let text = first.text.trim_start();
    out.push_str(&first.text[..first.text.len() - text.len()]);
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if text.starts_with(['=', '-', '+']) {
        out.push('\\');
        escape_text(text, out);
    } else if digits > 0 && text[digits..].starts_with('.') {
        escape_text(&text[..digits], out);
        out.push('\\');
        escape_text(&text[digits..], out);
    } else {
        escape_text(text, out);
    }
    runs_to_typst(rest, out);
}

fn run_to_typst(run: &Run, out: &mut String) {
    match &run.style {
        SpanStyle::Plain => escape_text(&run.text, out),
        SpanStyle::Bold => {
            out.push_str("#strong[");
            escape_text(&run.text, out);
            out.push(']');
        }
        SpanStyle::Italic => {
            out.push_str("#emph[");
            escape_text(&run.text, out);
            out.push(']');
        }
        SpanStyle::Code => {
            out.push_str("#raw(");
            push_string_literal(&run.text, out);
            out.push(')');
        }
        SpanStyle::Link(url) => {
            out.push_str("#link(");
            push_string_literal(url, out);
            out.push_str(")[");
            escape_text(&run.text, out);
            out.push(']');
        }
    }
}

/// Escape special Typst markup characters. Shorthands (`--`, `...`, `-?`)
/// and smart quotes are escaped too, so text renders as typed.
fn escape_text(text: &str, out: &mut String) {
    let mut prev = None;
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '~' | '/' | '"'
            | '\'' => {
                out.push('\\');
                out.push(ch);
            }
            '-' | '?' if prev == Some('-') => {
                out.push('\\');
                out.push(ch);
            }
            '.' if prev == Some('.') => {
                out.push('\\');
                out.push(ch);
            }
            '\n' | '\r' => out.push(' '),
            _ => out.push(ch),
        }
        prev = Some(ch);
    }
}

/// Write `text` as a quoted Typst string
fn push_string_literal(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn list_to_typst(glyph: Glyph, items: &[&[Run]], out: &mut String) {
    let prefix = match glyph {
        Glyph::Bullet => "-",
        Glyph::Number => "+",
    };

    for runs in items {
        out.push_str(prefix);
        out.push(' ');
        escape_line_start(runs, out);
        out.push('\n');
    }
}

fn table_to_typst(rows: &[Vec<Cell>], out: &mut String) {
    let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    if col_count == 0 {
        return;
    }

    out.push_str("#table(\n");
    out.push_str(&format!("  columns: {},\n", col_count));

    for row in rows {
        for col in 0..col_count {
            out.push_str("  ");
            match row.get(col) {
                Some(cell) => cell_to_typst(cell, out),
                // Ragged rows are padded with empty cells
                None => out.push_str("[]"),
            }
            out.push_str(",\n");
        }
    }

    out.push_str(")\n");
}

fn cell_to_typst(cell: &Cell, out: &mut String) {
    if let Some(color) = &cell.background {
        out.push_str("table.cell(fill: rgb(");
        push_string_literal(color, out);
        out.push_str("))");
    }
    out.push('[');
    if cell.bold {
        out.push_str("#strong[");
    }
    escape_line_start(&cell_runs(cell), out);
    if cell.bold {
        out.push(']');
    }
    out.push(']');
}

/// Split a cell buffer at its style range boundaries. Overlapping or
/// out-of-bounds ranges are ignored.
fn cell_runs(cell: &Cell) -> Vec<Run> {
    let chars: Vec<char> = cell.text.chars().collect();
    let mut ranges: Vec<_> = cell.ranges.iter().collect();
    ranges.sort_by_key(|range| range.start);

    let mut runs = Vec::new();
    let mut pos = 0;
    for range in ranges {
        if range.start < pos || range.end > chars.len() || range.start >= range.end {
            continue;
        }
        if range.start > pos {
            runs.push(Run::new(
                chars[pos..range.start].iter().collect::<String>(),
                SpanStyle::Plain,
            ));
        }
        runs.push(Run::new(
            chars[range.start..range.end].iter().collect::<String>(),
            range.style.clone(),
        ));
        pos = range.end;
    }
    if pos < chars.len() {
        runs.push(Run::new(
            chars[pos..].iter().collect::<String>(),
            SpanStyle::Plain,
        ));
    }
    runs
}
