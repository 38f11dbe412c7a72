//! Document text extraction.
//!
//! One [`TextExtractor`] per [`DocumentFormat`]; the format is derived from
//! the file extension, case-insensitively. Extraction is blocking file I/O
//! and parsing, so async callers should run it on a blocking thread.

pub mod docx;
pub mod pdf;
pub mod spreadsheet;

use crate::error::{RagError, RagResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Supported document formats. `xlsx` and `xls` share one extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Spreadsheet,
}

impl DocumentFormat {
    /// Map an extension (with or without leading dot) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Detect the format of a file from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

/// Lower-cased extension of `path` with its leading dot, or empty.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Extracts plain text from one document format.
pub trait TextExtractor: Send + Sync {
    fn format(&self) -> DocumentFormat;

    /// Read `path` and return its text. Only reads the file.
    fn extract(&self, path: &Path) -> RagResult<String>;
}

/// Dispatches extraction to the extractor registered for a format.
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: HashMap<DocumentFormat, Arc<dyn TextExtractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(pdf::PdfExtractor));
        registry.register(Arc::new(docx::DocxExtractor));
        registry.register(Arc::new(spreadsheet::SpreadsheetExtractor));
        registry
    }
}

impl ExtractorRegistry {
    /// Registry without any extractors.
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Add or replace the extractor for its format.
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        self.extractors.insert(extractor.format(), extractor);
    }

    pub fn supports(&self, format: DocumentFormat) -> bool {
        self.extractors.contains_key(&format)
    }

    /// Extract text from `path` as the declared format.
    pub fn extract(&self, path: &Path, format: DocumentFormat) -> RagResult<String> {
        let extractor = self
            .extractors
            .get(&format)
            .ok_or_else(|| RagError::UnsupportedFormat(format.as_str().to_string()))?;

        tracing::debug!("Extracting {:?} as {}", path, format.as_str());
        extractor.extract(path)
    }

    /// Extract text, deriving the format from the extension.
    pub fn extract_path(&self, path: &Path) -> RagResult<String> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| RagError::UnsupportedFormat(extension_of(path)))?;
        self.extract(path, format)
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut formats: Vec<&str> = self.extractors.keys().map(|k| k.as_str()).collect();
        formats.sort_unstable();
        f.debug_struct("ExtractorRegistry")
            .field("formats", &formats)
            .finish()
    }
}
