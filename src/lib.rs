//! Template-based document generation.
//!
//! A template is a document body containing placeholder tokens such as
//! `{{summary}}`. Each field value replaces the paragraph holding its token:
//! scalar text is parsed as a small markdown dialect (headings, bullet and
//! numbered items, bold/italic/code/links), arrays become bullet lists and
//! arrays of arrays become tables with a styled header row.
//!
//! The engine writes through the [`DocumentBody`] trait; [`Document`] is the
//! in-memory body, loaded from markdown and rendered to Typst markup or PDF.

mod block;
mod body;
mod config;
mod error;
mod fields;
mod inline;
mod parser;
mod substitute;
mod template;
mod typst;

pub use block::{
    Block, Cell, Document, Glyph, HeadingLevel, Run, SpanStyle, StyleRange,
};
pub use body::{CellRef, DocumentBody};
pub use config::{Config, LinksConfig, MissingField, PageConfig, PlaceholderConfig, TableConfig};
pub use error::{FillError, Result};
pub use fields::{FieldValue, Fields};
pub use inline::{ElementSink, InlineSpan, RangeSink, StyledTextSink, parse_inline, write_inline};
pub use parser::{InsertionCursor, LineKind, classify, render_block};
pub use substitute::{FillReport, fill, placeholder_names, render_field};
pub use template::load_template;

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

/// Load a markdown template and fill it from a JSON object of fields.
pub fn fill_markdown_template(
    markdown: &str,
    fields_json: &str,
    config: &Config,
) -> Result<(Document, FillReport)> {
    let fields = Fields::from_json_str(fields_json)?;
    let mut document = load_template(markdown);
    let report = fill(&mut document, &fields, config)?;
    Ok((document, report))
}

/// Convert a document to Typst markup.
pub fn document_to_typst(document: &Document, config: &Config) -> String {
    typst::document_to_typst(document, config)
}

/// Compile a document through Typst.
fn compile_document(document: &Document, config: &Config) -> Result<PagedDocument> {
    let typst_content = document_to_typst(document, config);

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    engine.compile().output.map_err(|e| FillError::Render {
        message: format!("Typst compilation failed: {:?}", e),
    })
}

/// Convert a document to PDF bytes.
pub fn document_to_pdf(document: &Document, config: &Config) -> Result<Vec<u8>> {
    let doc = compile_document(document, config)?;

    typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| FillError::Render {
        message: format!("PDF generation failed: {:?}", e),
    })
}
