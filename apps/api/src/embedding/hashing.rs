use async_trait::async_trait;

use super::{Embedder, EmbeddingError};

const DEFAULT_DIMENSION: usize = 256;
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Bag-of-words feature hashing embedder.
///
/// Texts sharing vocabulary land close together, which is enough for
/// offline use and for tests. Vectors are L2-normalised.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "local-hashing"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(inputs.iter().map(|text| self.embed_text(text)).collect())
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    #[test]
    fn test_same_text_same_vector() {
        let embedder = HashingEmbedder::default();
        assert_eq!(
            embedder.embed_text("Hey everyone, welcome back"),
            embedder.embed_text("Hey everyone, welcome back")
        );
    }

    #[test]
    fn test_case_and_punctuation_ignored() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed_text("Welcome BACK!");
        let b = embedder.embed_text("welcome back");
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let embedder = HashingEmbedder::default();
        let probe = embedder.embed_text("a story about cooking pasta at home");
        let close = embedder.embed_text("cooking pasta at home is a great story");
        let far = embedder.embed_text("quarterly tax filing deadlines explained");
        assert!(cosine_similarity(&probe, &close) > cosine_similarity(&probe, &far));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(8);
        assert!(embedder.embed_text("  ...  ").iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_embed_preserves_input_order() {
        let embedder = HashingEmbedder::default();
        let inputs = vec!["first text".to_string(), "second text".to_string()];
        let vectors = embedder.embed(&inputs).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], embedder.embed_text("second text"));
    }
}
