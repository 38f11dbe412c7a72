//! PDF text extraction.

use super::{DocumentFormat, TextExtractor};
use crate::error::{RagError, RagResult};
use lopdf::Document;
use std::path::Path;

/// Extracts text page by page. Pages without a text layer contribute
/// nothing instead of failing the document.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, path: &Path) -> RagResult<String> {
        let document = Document::load(path).map_err(|e| RagError::extraction(path, e))?;

        let mut text = String::new();
        let mut skipped = 0usize;
        for page_number in document.get_pages().keys() {
            match document.extract_text(&[*page_number]) {
                Ok(page_text) if !page_text.trim().is_empty() => {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Ok(_) => skipped += 1,
                Err(e) => {
                    tracing::debug!("No text on page {} of {:?}: {}", page_number, path, e);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} pages without text in {:?}", skipped, path);
        }

        Ok(text)
    }
}
