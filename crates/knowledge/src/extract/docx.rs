//! Word document extraction.
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`.
//! Text runs (`w:t`) are concatenated per paragraph (`w:p`), and blank
//! paragraphs are dropped.

use super::{DocumentFormat, TextExtractor};
use crate::error::{RagError, RagResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract(&self, path: &Path) -> RagResult<String> {
        let file = File::open(path).map_err(|e| RagError::extraction(path, e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| RagError::extraction(path, e))?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| RagError::extraction(path, e))?
            .read_to_string(&mut xml)
            .map_err(|e| RagError::extraction(path, e))?;

        let paragraphs = paragraphs(&xml).map_err(|e| RagError::extraction(path, e))?;
        Ok(paragraphs.join("\n"))
    }
}

/// Non-blank paragraph texts of a WordprocessingML body, in order.
pub(crate) fn paragraphs(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if !current.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Travel policy</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">   </w:t></w:r></w:p>
    <w:p><w:r><w:t>Flights &amp; hotels are </w:t></w:r><w:r><w:t>reimbursed.</w:t></w:r></w:p>
    <w:p/>
  </w:body>
</w:document>"#;

    #[test]
    fn test_paragraphs_join_runs_and_drop_blank() {
        let paragraphs = paragraphs(BODY).unwrap();
        assert_eq!(
            paragraphs,
            vec![
                "Travel policy".to_string(),
                "Flights & hotels are reimbursed.".to_string()
            ]
        );
    }

    #[test]
    fn test_extract_from_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("policy.docx");

        let file = File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(DOCUMENT_PART, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(BODY.as_bytes()).unwrap();
        zip.finish().unwrap();

        let text = DocxExtractor.extract(&path).unwrap();
        assert_eq!(text, "Travel policy\nFlights & hotels are reimbursed.");
    }

    #[test]
    fn test_not_a_zip_is_extraction_failure() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fake.docx");
        std::fs::write(&path, b"plain bytes").unwrap();

        assert!(matches!(
            DocxExtractor.extract(&path),
            Err(RagError::ExtractionFailed { .. })
        ));
    }
}
