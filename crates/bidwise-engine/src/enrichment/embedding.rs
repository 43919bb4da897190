//! Embedding step and the hashed-term fallback provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use bidwise_core::barrier::FieldValue;
use bidwise_core::errors::EnrichmentError;
use bidwise_core::models::Recommendation;
use bidwise_core::traits::EmbeddingProvider;

use super::step::{EnrichmentStep, StepId};

/// Dependency-free provider.
///
/// Hashes terms into fixed-dimension buckets weighted by term frequency and
/// L2-normalizes. Deterministic: the same text always yields the same
/// vector, bit for bit.
#[derive(Debug, Clone)]
pub struct HashedTermEmbedder {
    dimensions: usize,
}

impl HashedTermEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// FNV-1a bucket for a term.
    fn bucket(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= u64::from(*b);
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dims as u64) as usize
    }

    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.len() >= 2)
            .map(str::to_lowercase)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vec;
        }

        // Ordered map so bucket sums are accumulated in a stable order.
        let mut tf: BTreeMap<String, f32> = BTreeMap::new();
        let mut total = 0.0f32;
        for tok in Self::tokenize(text) {
            *tf.entry(tok).or_default() += 1.0;
            total += 1.0;
        }
        if tf.is_empty() {
            return vec;
        }

        for (term, count) in &tf {
            let weight = (count / total) * (1.0 + (term.len() as f32).ln());
            vec[Self::bucket(term, self.dimensions)] += weight;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

impl EmbeddingProvider for HashedTermEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EnrichmentError> {
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashed-term"
    }
}

/// Text embedded for a recommendation: the justification followed by the
/// risk descriptions.
pub fn embedding_text(recommendation: &Recommendation) -> String {
    let d = recommendation.decision();
    if d.risks.is_empty() {
        return d.justification.clone();
    }
    let risks: Vec<&str> = d.risks.iter().map(|r| r.description.as_str()).collect();
    format!("{} | Risks: {}", d.justification, risks.join(" | "))
}

/// Writes `embedding`. Rejects vectors of the wrong length or with
/// non-finite components.
pub struct EmbeddingStep {
    provider: Arc<dyn EmbeddingProvider>,
    dimensions: usize,
}

impl EmbeddingStep {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimensions: usize) -> Self {
        Self {
            provider,
            dimensions,
        }
    }
}

impl EnrichmentStep for EmbeddingStep {
    fn id(&self) -> StepId {
        StepId::Embedding
    }

    fn run(&self, recommendation: &Recommendation) -> Result<FieldValue, EnrichmentError> {
        if !self.provider.is_available() {
            return Err(EnrichmentError::Provider {
                provider: self.provider.name().to_string(),
                message: "provider unavailable".to_string(),
            });
        }
        let vector = self.provider.embed(&embedding_text(recommendation))?;
        if vector.len() != self.dimensions {
            return Err(EnrichmentError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        if let Some(index) = vector.iter().position(|v| !v.is_finite()) {
            return Err(EnrichmentError::NonFiniteEmbedding(index));
        }
        Ok(FieldValue::Embedding(vector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_returns_zero_vector() {
        let p = HashedTermEmbedder::new(64);
        let v = p.embed("").unwrap();
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn output_is_normalized_and_deterministic() {
        let p = HashedTermEmbedder::new(256);
        let a = p.embed("ISO 27001 certification expired | Risks: budget overrun").unwrap();
        let b = p.embed("ISO 27001 certification expired | Risks: budget overrun").unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn different_texts_differ() {
        let p = HashedTermEmbedder::new(256);
        assert_ne!(
            p.embed("cloud migration project").unwrap(),
            p.embed("hospital catering tender").unwrap()
        );
    }
}
