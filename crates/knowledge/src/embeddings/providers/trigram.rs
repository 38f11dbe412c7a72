//! Offline embedding provider built from hashed character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use crate::error::RagResult;
use std::collections::BTreeMap;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "how", "does", "did",
];

/// Deterministic, content-dependent embeddings without any model download.
///
/// Each significant word adds weight to the dimensions its character
/// trigrams hash to, plus one dimension for the whole word. Texts sharing
/// vocabulary end up close under cosine similarity; there is no semantic
/// generalization beyond that.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
    normalize: bool,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            normalize: true,
        }
    }

    /// Keep raw accumulated weights instead of unit vectors.
    pub fn without_normalization(mut self) -> Self {
        self.normalize = false;
        self
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        if self.dimensions == 0 {
            return vector;
        }

        let lower = text.to_lowercase();
        // Ordered so float accumulation is identical on every call.
        let mut frequencies: BTreeMap<&str, u32> = BTreeMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *frequencies.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &frequencies {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let slot = hash_chars(window, 37) % self.dimensions;
                vector[slot] += (*freq as f32).sqrt();
            }

            let slot = hash_chars(&chars, 31) % self.dimensions;
            vector[slot] += *freq as f32;
        }

        if self.normalize {
            let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                vector.iter_mut().for_each(|v| *v /= norm);
            }
        }

        vector
    }
}

fn hash_chars(chars: &[char], multiplier: u64) -> usize {
    chars.iter().fold(0u64, |acc, c| {
        acc.wrapping_mul(multiplier).wrapping_add(*c as u64)
    }) as usize
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vectorize(text)).collect())
    }
}
