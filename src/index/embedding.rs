//! Sentence embedding models used by the vector index.

use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::{debug, info};

use crate::index::error::IndexError;

/// Dimensionality of `all-MiniLM-L6-v2`
pub const MINILM_DIMENSIONS: usize = 384;

/// Environment variable selecting the embedder (`minilm` or `hash`)
pub const EMBEDDER_ENV: &str = "HELPDESK_EMBEDDER";

/// Turns text into fixed-dimension vectors
///
/// An index must be queried with the same embedder it was built with;
/// distances between vectors from different models are meaningless.
pub trait Embedder: Send + Sync {
    /// Short identifier of the model
    fn name(&self) -> &str;

    /// Length of every vector this embedder produces
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one vector per text in input order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError>;
}

/// Local `all-MiniLM-L6-v2` sentence embeddings through fastembed
pub struct FastEmbedder {
    // TextEmbedding::embed takes &mut self
    model: Mutex<TextEmbedding>,
}

impl FastEmbedder {
    /// Load the model, downloading it on first use
    pub fn new() -> Result<Self, IndexError> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| IndexError::Embedding(format!("Failed to load embedding model: {}", e)))?;
        info!("Loaded embedding model all-MiniLM-L6-v2");

        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl Embedder for FastEmbedder {
    fn name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }

    fn dimensions(&self) -> usize {
        MINILM_DIMENSIONS
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError> {
        debug!("Embedding {} texts", texts.len());
        let mut model = self
            .model
            .lock()
            .map_err(|_| IndexError::Embedding("embedding model lock poisoned".to_string()))?;
        model
            .embed(texts.to_vec(), None)
            .map_err(|e| IndexError::Embedding(format!("Failed to generate embeddings: {}", e)))
    }
}

/// Deterministic bag-of-words embedder using feature hashing
///
/// Needs no model download, which makes it suitable for tests and offline
/// use. Texts sharing words land close together; it has no notion of
/// synonyms.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create a hashing embedder producing `dimensions`-long vectors
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(MINILM_DIMENSIONS)
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "feature-hash"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Select the embedder named by `HELPDESK_EMBEDDER`, defaulting to MiniLM
pub fn embedder_from_env() -> Result<Arc<dyn Embedder>, IndexError> {
    match std::env::var(EMBEDDER_ENV).ok().as_deref() {
        Some("hash") => Ok(Arc::new(HashEmbedder::default())),
        Some("minilm") | None => Ok(Arc::new(FastEmbedder::new()?)),
        Some(other) => Err(IndexError::Embedding(format!(
            "Unknown embedder '{}', expected 'minilm' or 'hash'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[test]
    fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::default();
        let texts = vec!["Reset your password".to_string()];

        let first = embedder.embed(&texts).unwrap();
        let second = embedder.embed(&texts).unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].len(), 384);
    }

    #[test]
    fn test_hash_embedder_normalizes() {
        let embedder = HashEmbedder::new(64);
        let vectors = embedder
            .embed(&["billing billing invoices".to_string(), "".to_string()])
            .unwrap();

        let norm: f32 = vectors[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(vectors[1].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_hash_embedder_similarity() {
        let embedder = HashEmbedder::default();
        let vectors = embedder
            .embed(&[
                "How do I reset my password".to_string(),
                "Password reset instructions".to_string(),
                "Shipping rates for international orders".to_string(),
            ])
            .unwrap();

        let related = distance(&vectors[0], &vectors[1]);
        let unrelated = distance(&vectors[0], &vectors[2]);
        assert!(related < unrelated);
    }
}
