//! Word-window chunking with configurable size and overlap.

use crate::error::{RagError, RagResult};
use crate::types::DocumentChunk;

/// Splits text into overlapping windows of whitespace-delimited words.
///
/// Windows start every `size - overlap` words, so consecutive chunks share
/// `overlap` words. Output is deterministic for identical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker, rejecting a non-positive stride.
    pub fn new(size: usize, overlap: usize) -> RagResult<Self> {
        if size == 0 || overlap >= size {
            return Err(RagError::InvalidChunkConfig { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn stride(&self) -> usize {
        self.size - self.overlap
    }

    /// Split `text` into chunk texts.
    ///
    /// Empty text yields no chunks; text of at most `size` words yields
    /// exactly one chunk equal to the whitespace-normalized text.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();

        if words.len() <= self.size {
            return if words.is_empty() {
                Vec::new()
            } else {
                vec![words.join(" ")]
            };
        }

        let chunks: Vec<String> = (0..words.len())
            .step_by(self.stride())
            .map(|start| {
                let end = (start + self.size).min(words.len());
                words[start..end].join(" ")
            })
            .filter(|chunk| !chunk.trim().is_empty())
            .collect();

        tracing::debug!(
            "Chunked {} words into {} chunks (size: {}, overlap: {})",
            words.len(),
            chunks.len(),
            self.size,
            self.overlap
        );

        chunks
    }

    /// Split `text` into identified chunks attributed to `source`.
    pub fn chunk_document(&self, source: &str, text: &str) -> Vec<DocumentChunk> {
        self.chunk(text)
            .into_iter()
            .enumerate()
            .map(|(position, text)| DocumentChunk {
                id: uuid::Uuid::new_v4().to_string(),
                text,
                source: source.to_string(),
                position: position as u32,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn numbered_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_rejects_overlap_not_below_size() {
        assert!(matches!(
            Chunker::new(50, 50),
            Err(RagError::InvalidChunkConfig { size: 50, overlap: 50 })
        ));
        assert!(Chunker::new(50, 80).is_err());
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(50, 49).is_ok());
    }

    #[test]
    fn test_chunk_empty() {
        let chunker = Chunker::new(500, 50).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t  ").is_empty());
    }

    #[test]
    fn test_short_text_is_one_normalized_chunk() {
        let chunker = Chunker::new(500, 50).unwrap();
        let chunks = chunker.chunk("  Quarterly   revenue\n\nrose\tby 12%  ");
        assert_eq!(chunks, vec!["Quarterly revenue rose by 12%".to_string()]);
    }

    #[test]
    fn test_exactly_size_words_is_one_chunk() {
        let chunker = Chunker::new(10, 2).unwrap();
        let chunks = chunker.chunk(&numbered_words(10));
        assert_eq!(chunks, vec![numbered_words(10)]);

        // One word past the window starts a second, overlapping window.
        let chunks = chunker.chunk(&numbered_words(11));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], "w8 w9 w10");
    }

    #[test]
    fn test_1400_words_with_default_policy() {
        let chunker = Chunker::new(500, 50).unwrap();
        let chunks = chunker.chunk(&numbered_words(1400));

        assert_eq!(chunks.len(), 4);
        let first: Vec<&str> = chunks[0].split(' ').collect();
        assert_eq!(first.len(), 500);
        assert_eq!(first[0], "w0");

        let second: Vec<&str> = chunks[1].split(' ').collect();
        assert_eq!(second[0], "w450");
        assert_eq!(second[499], "w949");

        let third: Vec<&str> = chunks[2].split(' ').collect();
        assert_eq!(third[0], "w900");
        assert_eq!(third.len(), 500);

        let last: Vec<&str> = chunks[3].split(' ').collect();
        assert_eq!(last[0], "w1350");
        assert_eq!(last.len(), 50);
    }

    #[test]
    fn test_windows_cover_every_token_in_order() {
        for (size, overlap) in [(7, 0), (7, 3), (5, 4), (1, 0), (20, 19)] {
            let chunker = Chunker::new(size, overlap).unwrap();
            let text = numbered_words(53);
            let chunks = chunker.chunk(&text);

            // Drop the overlapping prefix of every window after the first.
            let mut rebuilt: Vec<String> = Vec::new();
            for (i, chunk) in chunks.iter().enumerate() {
                let words: Vec<&str> = chunk.split(' ').collect();
                let skip = if i == 0 { 0 } else { overlap.min(words.len()) };
                rebuilt.extend(words[skip..].iter().map(|w| w.to_string()));
            }

            let original: Vec<String> = text.split(' ').map(str::to_string).collect();
            let unique: Vec<String> = {
                let mut seen = HashSet::new();
                rebuilt
                    .into_iter()
                    .filter(|w| seen.insert(w.clone()))
                    .collect()
            };
            assert_eq!(unique, original, "size={} overlap={}", size, overlap);
        }
    }

    #[test]
    fn test_deterministic() {
        let chunker = Chunker::new(8, 3).unwrap();
        let text = numbered_words(40);
        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn test_chunk_document_assigns_unique_ids_and_positions() {
        let chunker = Chunker::new(500, 50).unwrap();
        let chunks = chunker.chunk_document("report.pdf", &numbered_words(1400));

        let ids: HashSet<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), chunks.len());
        assert!(chunks.iter().all(|c| c.source == "report.pdf"));
        let positions: Vec<u32> = chunks.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }
}
