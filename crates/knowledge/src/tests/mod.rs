//! End-to-end scenarios over the in-memory index.

mod answering;

use crate::config::RagConfig;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Offline configuration: in-memory index, generation pointed at a closed port.
pub(crate) fn offline_config() -> RagConfig {
    let mut config = RagConfig::default();
    config.vector_store.use_remote = false;
    config.generation.endpoint = Some("http://127.0.0.1:9".to_string());
    config.generation.request_timeout_secs = 5;
    config
}

/// Write a minimal `.docx` with one paragraph per entry.
pub(crate) fn write_docx(dir: &Path, name: &str, paragraphs: &[&str]) -> PathBuf {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            let escaped = p
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", escaped)
        })
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

/// `count` distinct words, each long enough to carry trigram weight.
pub(crate) fn numbered_words(count: usize) -> String {
    (0..count)
        .map(|i| format!("token{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}
