//! Raw text extraction from uploaded documents
//!
//! The format is chosen from the filename and the declared content type,
//! never by sniffing the bytes. Anything that is not recognizably PDF or
//! DOCX is decoded as UTF-8 text.

use crate::error::ExtractorError;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use std::fmt;
use tracing::debug;

const DOCX_CONTENT_TYPE: &str = "officedocument.wordprocessingml.document";

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format
    Pdf,
    /// Office Open XML word-processing document
    Docx,
    /// Anything else, decoded as UTF-8
    PlainText,
}

impl DocumentFormat {
    /// Pick a format from the filename and declared content type
    ///
    /// Both inputs are compared case-insensitively. PDF wins over DOCX when
    /// both match.
    pub fn detect(filename: Option<&str>, content_type: Option<&str>) -> Self {
        let name = filename.unwrap_or_default().to_lowercase();
        let ctype = content_type.unwrap_or_default().to_lowercase();

        if name.ends_with(".pdf") || ctype.contains("pdf") {
            DocumentFormat::Pdf
        } else if name.ends_with(".docx") || ctype.contains(DOCX_CONTENT_TYPE) {
            DocumentFormat::Docx
        } else {
            DocumentFormat::PlainText
        }
    }

    /// Read the text out of `bytes` in this format
    pub fn read(self, bytes: &[u8]) -> Result<String, ExtractorError> {
        match self {
            DocumentFormat::Pdf => read_pdf(bytes),
            DocumentFormat::Docx => read_docx(bytes),
            DocumentFormat::PlainText => Ok(read_plain_text(bytes)),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::PlainText => "text",
        };
        write!(f, "{}", s)
    }
}

/// Detect the format and extract the document's raw text
pub fn extract_text(
    bytes: &[u8],
    filename: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, ExtractorError> {
    DocumentFormat::detect(filename, content_type).read(bytes)
}

/// Decode UTF-8, dropping any invalid byte sequences
pub fn read_plain_text(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Concatenate the text of every page, one page per line block
///
/// A page whose text cannot be extracted contributes an empty string.
pub fn read_pdf(bytes: &[u8]) -> Result<String, ExtractorError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| ExtractorError::UnreadableDocument(format!("PDF: {}", e)))?;

    let pages: Vec<String> = doc
        .get_pages()
        .into_keys()
        .map(|page_num| {
            doc.extract_text(&[page_num]).unwrap_or_else(|e| {
                debug!("No text for PDF page {}: {}", page_num, e);
                String::new()
            })
        })
        .collect();

    debug!("Read {} PDF pages", pages.len());
    Ok(pages.join("\n"))
}

/// Concatenate the text of every top-level paragraph, one per line
pub fn read_docx(bytes: &[u8]) -> Result<String, ExtractorError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractorError::UnreadableDocument(format!("DOCX: {}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();

    debug!("Read {} DOCX paragraphs", paragraphs.len());
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_paragraph_children(&paragraph.children, &mut text);
    text
}

fn push_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, out),
            _ => {}
        }
    }
}

fn push_run(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}
