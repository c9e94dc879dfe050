//! # Format Extractor Registry
//!
//! Converts the raw bytes of a document into plain text. Each [`Format`] maps to
//! exactly one [`Extractor`]; the shelf store only ever sees the resulting text.
//!
//! Extraction is a pure transform: extractors read nothing but the bytes they are
//! handed and write nothing at all. The format comes from the caller (the source
//! file's extension) and is never sniffed from content.
//!
//! - [`pdf::PdfExtractor`]: per-page text, pages joined by a newline
//! - [`epub::EpubExtractor`]: content documents in spine order, markup stripped
//! - [`text::TextExtractor`]: UTF-8 passthrough
//!
//! Every failure is reported as [`ShelfError::UnreadableDocument`](crate::error::ShelfError).

use crate::error::Result;
use crate::model::Format;

pub mod epub;
pub mod pdf;
pub mod text;

/// Capability implemented by each format backend.
pub trait Extractor: Send + Sync {
    fn format(&self) -> Format;
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

static PDF: pdf::PdfExtractor = pdf::PdfExtractor;
static EPUB: epub::EpubExtractor = epub::EpubExtractor;
static TEXT: text::TextExtractor = text::TextExtractor;

/// Returns the extractor registered for `format`.
pub fn extractor_for(format: Format) -> &'static dyn Extractor {
    match format {
        Format::Pdf => &PDF,
        Format::Epub => &EPUB,
        Format::Text => &TEXT,
    }
}

/// Extracts plain text from `bytes` interpreted as `format`.
pub fn extract(format: Format, bytes: &[u8]) -> Result<String> {
    let extractor = extractor_for(format);
    tracing::debug!(%format, bytes = bytes.len(), "extracting text");
    extractor.extract(bytes)
}
