use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::block::{Block, Cell, Document, Glyph, HeadingLevel, Run, SpanStyle, StyleRange};

/// Strip YAML frontmatter from the beginning of markdown content
fn strip_frontmatter(markdown: &str) -> &str {
    if !markdown.starts_with("---") {
        return markdown;
    }
    // Find the closing ---
    if let Some(end) = markdown[3..].find("\n---") {
        // Skip past the closing --- and any trailing newline
        let after_frontmatter = &markdown[3 + end + 4..];
        after_frontmatter.trim_start_matches('\n')
    } else {
        markdown
    }
}

/// Load a markdown template into a document body.
pub fn load_template(markdown: &str) -> Document {
    let markdown = strip_frontmatter(markdown);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(markdown, options);
    let mut blocks = Vec::new();
    let mut state = LoadState::default();

    for event in parser {
        process_event(event, &mut state, &mut blocks);
    }

    Document::new(blocks)
}

#[derive(Default)]
struct LoadState {
    // Runs of the block being built
    runs: Vec<Run>,
    // Open bold/italic/link styles; the innermost one applies
    style_stack: Vec<SpanStyle>,

    heading_level: Option<HeadingLevel>,

    in_code_block: bool,
    code_content: String,

    // Nested lists are flattened into the enclosing sequence
    list_stack: Vec<ListFrame>,

    in_table: bool,
    in_table_head: bool,
    table_rows: Vec<Vec<Cell>>,
    current_row: Vec<Cell>,
}

struct ListFrame {
    glyph: Glyph,
    // Set once the current item's text has been emitted ahead of a nested list
    item_emitted: bool,
}

impl LoadState {
    fn current_style(&self) -> SpanStyle {
        self.style_stack.last().cloned().unwrap_or(SpanStyle::Plain)
    }

    fn push_text(&mut self, text: &str, style: SpanStyle) {
        if let Some(last) = self.runs.last_mut().filter(|run| run.style == style) {
            last.text.push_str(text);
        } else {
            self.runs.push(Run::new(text, style));
        }
    }

    fn emit_item(&mut self, blocks: &mut Vec<Block>) {
        if let Some(frame) = self.list_stack.last_mut() {
            blocks.push(Block::ListItem {
                glyph: frame.glyph,
                runs: std::mem::take(&mut self.runs),
            });
            frame.item_emitted = true;
        }
    }
}

fn process_event(event: Event, state: &mut LoadState, blocks: &mut Vec<Block>) {
    match event {
        // Headings
        Event::Start(Tag::Heading { level, .. }) => {
            state.heading_level = Some(HeadingLevel::clamped(level as usize));
        }
        Event::End(TagEnd::Heading(_)) => {
            if let Some(level) = state.heading_level.take() {
                let runs = std::mem::take(&mut state.runs);
                blocks.push(Block::Paragraph {
                    heading: Some(level),
                    runs,
                });
            }
        }

        // Paragraphs
        Event::Start(Tag::Paragraph) => {}
        Event::End(TagEnd::Paragraph) => {
            // Paragraphs inside list items and table cells belong to them
            if !state.list_stack.is_empty() || state.in_table {
                return;
            }
            let runs = std::mem::take(&mut state.runs);
            if runs.len() == 1 && runs[0].text.trim() == "---pagebreak---" {
                blocks.push(Block::PageBreak);
                return;
            }
            if !runs.is_empty() {
                blocks.push(Block::Paragraph {
                    heading: None,
                    runs,
                });
            }
        }

        // Text content
        Event::Text(text) => {
            if state.in_code_block {
                state.code_content.push_str(&text);
            } else {
                let style = state.current_style();
                state.push_text(&text, style);
            }
        }

        Event::Code(code) => {
            state.push_text(&code, SpanStyle::Code);
        }

        // Bold, italic and links
        Event::Start(Tag::Strong) => state.style_stack.push(SpanStyle::Bold),
        Event::Start(Tag::Emphasis) => state.style_stack.push(SpanStyle::Italic),
        Event::Start(Tag::Link { dest_url, .. }) => {
            state
                .style_stack
                .push(SpanStyle::Link(dest_url.into_string()));
        }
        Event::End(TagEnd::Strong | TagEnd::Emphasis | TagEnd::Link) => {
            state.style_stack.pop();
        }

        // Code blocks
        Event::Start(Tag::CodeBlock(_)) => {
            state.in_code_block = true;
            state.code_content.clear();
        }
        Event::End(TagEnd::CodeBlock) => {
            state.in_code_block = false;
            let content = std::mem::take(&mut state.code_content);
            blocks.push(Block::CodeBlock { content });
        }

        // Lists
        Event::Start(Tag::List(first_item)) => {
            // A nested list starts: emit the parent item's text first
            if state
                .list_stack
                .last()
                .is_some_and(|frame| !frame.item_emitted)
            {
                state.emit_item(blocks);
            }
            let glyph = if first_item.is_some() {
                Glyph::Number
            } else {
                Glyph::Bullet
            };
            state.list_stack.push(ListFrame {
                glyph,
                item_emitted: false,
            });
        }
        Event::End(TagEnd::List(_)) => {
            state.list_stack.pop();
        }

        Event::Start(Tag::Item) => {
            state.runs.clear();
            if let Some(frame) = state.list_stack.last_mut() {
                frame.item_emitted = false;
            }
        }
        Event::End(TagEnd::Item) => {
            let emitted = state
                .list_stack
                .last()
                .is_some_and(|frame| frame.item_emitted);
            if !emitted || !state.runs.is_empty() {
                state.emit_item(blocks);
            }
        }

        // Tables
        Event::Start(Tag::Table(_)) => {
            state.in_table = true;
            state.table_rows.clear();
        }
        Event::End(TagEnd::Table) => {
            state.in_table = false;
            let rows = std::mem::take(&mut state.table_rows);
            blocks.push(Block::Table { rows });
        }

        Event::Start(Tag::TableHead) => {
            state.in_table_head = true;
            state.current_row.clear();
        }
        Event::End(TagEnd::TableHead) => {
            state.in_table_head = false;
            let header = std::mem::take(&mut state.current_row);
            state.table_rows.push(header);
        }

        Event::Start(Tag::TableRow) => {
            state.current_row.clear();
        }
        Event::End(TagEnd::TableRow) => {
            let row = std::mem::take(&mut state.current_row);
            state.table_rows.push(row);
        }

        Event::Start(Tag::TableCell) => {
            state.runs.clear();
        }
        Event::End(TagEnd::TableCell) => {
            let runs = std::mem::take(&mut state.runs);
            let mut cell = runs_to_cell(runs);
            cell.bold = state.in_table_head;
            state.current_row.push(cell);
        }

        // Horizontal rule
        Event::Rule => {
            blocks.push(Block::Rule);
        }

        // Breaks inside a block collapse to a space
        Event::SoftBreak | Event::HardBreak => {
            let style = state.current_style();
            state.push_text(" ", style);
        }

        // Ignore other events
        _ => {}
    }
}

/// Flatten runs into one cell buffer with char-offset style ranges.
fn runs_to_cell(runs: Vec<Run>) -> Cell {
    let mut cell = Cell::default();
    for run in runs {
        let start = cell.len();
        cell.text.push_str(&run.text);
        if run.style != SpanStyle::Plain && !run.text.is_empty() {
            cell.ranges.push(StyleRange {
                start,
                end: cell.len(),
                style: run.style,
            });
        }
    }
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(text: &str) -> Vec<Run> {
        vec![Run::new(text, SpanStyle::Plain)]
    }

    #[test]
    fn paragraphs_and_headings() {
        let doc = load_template("# Report\n\nHello **{{name}}**.\n\n#### Deep");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph {
                    heading: Some(HeadingLevel::H1),
                    runs: plain("Report"),
                },
                Block::Paragraph {
                    heading: None,
                    runs: vec![
                        Run::new("Hello ", SpanStyle::Plain),
                        Run::new("{{name}}", SpanStyle::Bold),
                        Run::new(".", SpanStyle::Plain),
                    ],
                },
                Block::Paragraph {
                    heading: Some(HeadingLevel::H3),
                    runs: plain("Deep"),
                },
            ]
        );
    }

    #[test]
    fn placeholder_with_underscores_stays_one_text() {
        let doc = load_template("{{risk_list}}");
        assert_eq!(doc.blocks, vec![Block::paragraph("{{risk_list}}")]);
    }

    #[test]
    fn frontmatter_is_stripped() {
        let doc = load_template("---\ntitle: x\n---\nBody");
        assert_eq!(doc.blocks, vec![Block::paragraph("Body")]);
    }

    #[test]
    fn nested_lists_are_flattened() {
        let doc = load_template("- one\n  1. inner\n- two");
        assert_eq!(
            doc.blocks,
            vec![
                Block::ListItem {
                    glyph: Glyph::Bullet,
                    runs: plain("one"),
                },
                Block::ListItem {
                    glyph: Glyph::Number,
                    runs: plain("inner"),
                },
                Block::ListItem {
                    glyph: Glyph::Bullet,
                    runs: plain("two"),
                },
            ]
        );
    }

    #[test]
    fn table_header_is_bold() {
        let doc = load_template("| A | *B* |\n|---|---|\n| 1 | 2 |");
        let Block::Table { rows } = &doc.blocks[0] else {
            panic!("expected table, got {:?}", doc.blocks);
        };
        assert_eq!(rows.len(), 2);
        assert!(rows[0].iter().all(|cell| cell.bold));
        assert_eq!(rows[0][1].text, "B");
        assert_eq!(
            rows[0][1].ranges,
            vec![StyleRange {
                start: 0,
                end: 1,
                style: SpanStyle::Italic
            }]
        );
        assert_eq!(rows[1][0], Cell::new("1"));
    }

    #[test]
    fn code_rule_and_page_break() {
        let doc = load_template("```\nlet x = 1;\n```\n\n---\n\n---pagebreak---");
        assert_eq!(
            doc.blocks,
            vec![
                Block::CodeBlock {
                    content: "let x = 1;\n".to_string()
                },
                Block::Rule,
                Block::PageBreak,
            ]
        );
    }
}
