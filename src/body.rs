//! The document capability the fill engine writes through.
//!
//! [`DocumentBody`] is the seam between the engine and whatever rich-text
//! model hosts the template. Positions are indices into the top-level block
//! sequence; a handle returned by an insert is simply the index it was
//! inserted at, valid until the next structural change. [`Document`] is the
//! in-memory implementation used by the CLI and the tests.

use crate::block::{
    Block, Cell, Document, Glyph, HeadingLevel, Run, SpanStyle, StyleRange, text_runs,
};
use crate::error::{FillError, Result};

/// Address of one cell of a table element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub table: usize,
    pub row: usize,
    pub col: usize,
}

pub trait DocumentBody {
    /// Number of top-level elements.
    fn element_count(&self) -> usize;

    /// Text of a paragraph, heading or list item; `None` for other elements.
    fn element_text(&self, index: usize) -> Option<String>;

    /// Index of the first paragraph, heading or list item whose text contains `literal`.
    fn locate(&self, literal: &str) -> Option<usize>;

    fn delete_element(&mut self, index: usize) -> Result<()>;

    /// Insert a plain paragraph holding `text` (no runs when empty).
    fn insert_paragraph(&mut self, index: usize, text: &str) -> Result<usize>;

    fn set_heading_level(&mut self, index: usize, level: HeadingLevel) -> Result<()>;

    /// Insert a bullet list item holding `text`.
    fn insert_list_item(&mut self, index: usize, text: &str) -> Result<usize>;

    fn set_glyph(&mut self, index: usize, glyph: Glyph) -> Result<()>;

    /// Insert a table with exactly the given rows and cells.
    fn insert_table(&mut self, index: usize, rows: &[Vec<String>]) -> Result<usize>;

    /// Empty a cell's text buffer and drop its style ranges.
    fn clear_cell(&mut self, cell: CellRef) -> Result<()>;

    /// Append unstyled text to a cell, returning the char offset it starts at.
    fn append_cell_text(&mut self, cell: CellRef, text: &str) -> Result<usize>;

    fn set_cell_background(&mut self, cell: CellRef, color: &str) -> Result<()>;

    fn set_cell_bold(&mut self, cell: CellRef) -> Result<()>;

    /// Append a separately styled element to a paragraph or list item.
    fn append_styled_text(&mut self, index: usize, text: &str, style: &SpanStyle) -> Result<()>;

    /// Style the chars `start..end` of a cell's text buffer.
    fn set_style_range(
        &mut self,
        cell: CellRef,
        start: usize,
        end: usize,
        style: &SpanStyle,
    ) -> Result<()>;
}

impl Document {
    fn element(&self, index: usize) -> Result<&Block> {
        self.blocks.get(index).ok_or(FillError::NoSuchElement {
            index,
            len: self.blocks.len(),
        })
    }

    fn element_mut(&mut self, index: usize) -> Result<&mut Block> {
        let len = self.blocks.len();
        self.blocks
            .get_mut(index)
            .ok_or(FillError::NoSuchElement { index, len })
    }

    fn insert_block(&mut self, index: usize, block: Block) -> Result<usize> {
        if index > self.blocks.len() {
            return Err(FillError::NoSuchElement {
                index,
                len: self.blocks.len(),
            });
        }
        self.blocks.insert(index, block);
        Ok(index)
    }

    fn runs_mut(&mut self, index: usize) -> Result<&mut Vec<Run>> {
        let block = self.element_mut(index)?;
        let kind = block.kind();
        block
            .runs_mut()
            .ok_or(FillError::NotTextContainer { index, kind })
    }

    fn cell_mut(&mut self, cell: CellRef) -> Result<&mut Cell> {
        match self.element_mut(cell.table)? {
            Block::Table { rows } => rows
                .get_mut(cell.row)
                .and_then(|row| row.get_mut(cell.col))
                .ok_or(FillError::CellOutOfBounds {
                    table: cell.table,
                    row: cell.row,
                    col: cell.col,
                }),
            _ => Err(FillError::NotATable { index: cell.table }),
        }
    }
}

impl DocumentBody for Document {
    fn element_count(&self) -> usize {
        self.blocks.len()
    }

    fn element_text(&self, index: usize) -> Option<String> {
        self.blocks.get(index).and_then(Block::plain_text)
    }

    fn locate(&self, literal: &str) -> Option<usize> {
        self.blocks.iter().position(|block| {
            block
                .plain_text()
                .is_some_and(|text| text.contains(literal))
        })
    }

    fn delete_element(&mut self, index: usize) -> Result<()> {
        self.element(index)?;
        self.blocks.remove(index);
        Ok(())
    }

    fn insert_paragraph(&mut self, index: usize, text: &str) -> Result<usize> {
        self.insert_block(index, Block::paragraph(text))
    }

    fn set_heading_level(&mut self, index: usize, level: HeadingLevel) -> Result<()> {
        match self.element_mut(index)? {
            Block::Paragraph { heading, .. } => {
                *heading = Some(level);
                Ok(())
            }
            other => Err(FillError::NotTextContainer {
                index,
                kind: other.kind(),
            }),
        }
    }

    fn insert_list_item(&mut self, index: usize, text: &str) -> Result<usize> {
        self.insert_block(
            index,
            Block::ListItem {
                glyph: Glyph::Bullet,
                runs: text_runs(text),
            },
        )
    }

    fn set_glyph(&mut self, index: usize, glyph: Glyph) -> Result<()> {
        match self.element_mut(index)? {
            Block::ListItem { glyph: current, .. } => {
                *current = glyph;
                Ok(())
            }
            other => Err(FillError::NotTextContainer {
                index,
                kind: other.kind(),
            }),
        }
    }

    fn insert_table(&mut self, index: usize, rows: &[Vec<String>]) -> Result<usize> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(Cell::new).collect())
            .collect();
        self.insert_block(index, Block::Table { rows })
    }

    fn clear_cell(&mut self, cell: CellRef) -> Result<()> {
        let cell = self.cell_mut(cell)?;
        cell.text.clear();
        cell.ranges.clear();
        Ok(())
    }

    fn append_cell_text(&mut self, cell: CellRef, text: &str) -> Result<usize> {
        let cell = self.cell_mut(cell)?;
        let start = cell.len();
        cell.text.push_str(text);
        Ok(start)
    }

    fn set_cell_background(&mut self, cell: CellRef, color: &str) -> Result<()> {
        self.cell_mut(cell)?.background = Some(color.to_string());
        Ok(())
    }

    fn set_cell_bold(&mut self, cell: CellRef) -> Result<()> {
        self.cell_mut(cell)?.bold = true;
        Ok(())
    }

    fn append_styled_text(&mut self, index: usize, text: &str, style: &SpanStyle) -> Result<()> {
        self.runs_mut(index)?.push(Run::new(text, style.clone()));
        Ok(())
    }

    fn set_style_range(
        &mut self,
        cell: CellRef,
        start: usize,
        end: usize,
        style: &SpanStyle,
    ) -> Result<()> {
        let cell = self.cell_mut(cell)?;
        let len = cell.len();
        if start >= end || end > len {
            return Err(FillError::InvalidStyleRange { start, end, len });
        }
        cell.ranges.push(StyleRange {
            start,
            end,
            style: style.clone(),
        });
        Ok(())
    }
}
