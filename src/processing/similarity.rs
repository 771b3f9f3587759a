//! Composite semantic + lexical similarity between two skill strings

use crate::config::SimilarityWeights;
use crate::processing::embedding_cache::EmbeddingMap;
use crate::processing::lexical::token_set_ratio;
use crate::processing::normalizer::TextNormalizer;
use serde::{Deserialize, Serialize};

/// Score breakdown for one skill pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityComponents {
    pub semantic: f64,
    pub lexical: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub semantic: f64,
    pub lexical: f64,
    pub combined: f64,
}

impl Similarity {
    pub fn components(&self) -> SimilarityComponents {
        SimilarityComponents {
            semantic: self.semantic,
            lexical: self.lexical,
        }
    }
}

pub struct SimilarityScorer {
    weights: SimilarityWeights,
    normalizer: TextNormalizer,
}

impl SimilarityScorer {
    pub fn new(weights: SimilarityWeights, normalizer: TextNormalizer) -> Self {
        Self { weights, normalizer }
    }

    pub fn weights(&self) -> &SimilarityWeights {
        &self.weights
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Similarity of the raw strings `a` and `b`.
    ///
    /// Returns `None` when either string has no usable embedding; such a pair
    /// must be skipped rather than scored as zero.
    pub fn similarity(&self, a: &str, b: &str, embeddings: &EmbeddingMap<'_>) -> Option<Similarity> {
        let semantic = semantic_similarity(embeddings.get(a)?, embeddings.get(b)?)?;
        let lexical = self.lexical_similarity(a, b);
        Some(Similarity {
            semantic,
            lexical,
            combined: self.combine(semantic, lexical),
        })
    }

    /// Token-set ratio of the normalized forms.
    pub fn lexical_similarity(&self, a: &str, b: &str) -> f64 {
        token_set_ratio(&self.normalizer.normalize(a), &self.normalizer.normalize(b))
    }

    pub fn combine(&self, semantic: f64, lexical: f64) -> f64 {
        self.weights.semantic * semantic + self.weights.lexical * lexical
    }
}

/// Cosine similarity clamped into `[0, 1]`; opposing directions count as unrelated.
///
/// Returns `None` for empty or dimension-mismatched vectors. A zero vector scores 0.
pub fn semantic_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    cosine_similarity(a, b).map(|score| score.clamp(0.0, 1.0))
}

/// Raw cosine similarity in `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let dot_product: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Some(0.0)
    } else {
        Some(dot_product / (norm_a * norm_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(semantic: f64, lexical: f64) -> SimilarityScorer {
        SimilarityScorer::new(SimilarityWeights { semantic, lexical }, TextNormalizer::passthrough())
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
    }

    #[test]
    fn test_semantic_similarity_is_clamped() {
        assert_eq!(semantic_similarity(&[1.0, 0.0], &[-1.0, 0.0]), Some(0.0));
        let score = semantic_similarity(&[1.0, 1.0], &[1.0, 0.0]).unwrap();
        assert!((score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_pair_without_embedding_is_undefined() {
        let embeddings: EmbeddingMap = [("Python", &[1.0f32, 0.0][..])].into_iter().collect();
        assert!(scorer(0.7, 0.3).similarity("Python", "Rust", &embeddings).is_none());
        assert!(scorer(0.7, 0.3).similarity("Rust", "Python", &embeddings).is_none());
    }

    #[test]
    fn test_combined_is_weighted_sum() {
        let embeddings: EmbeddingMap = [
            ("Python", &[1.0f32, 0.0][..]),
            ("Python Programming", &[0.6f32, 0.8][..]),
        ]
        .into_iter()
        .collect();

        let sim = scorer(0.7, 0.3)
            .similarity("Python", "Python Programming", &embeddings)
            .unwrap();
        assert!((sim.semantic - 0.6).abs() < 1e-6);
        assert_eq!(sim.lexical, 1.0);
        assert!((sim.combined - (0.7 * 0.6 + 0.3)).abs() < 1e-6);
    }

    #[test]
    fn test_raising_semantic_weight_is_monotonic_when_semantic_dominates() {
        let embeddings: EmbeddingMap = [
            ("abc", &[1.0f32, 0.1][..]),
            ("xyz", &[1.0f32, 0.0][..]),
        ]
        .into_iter()
        .collect();

        let mut previous = f64::MIN;
        for step in 0..=10 {
            let weight = step as f64 / 10.0;
            let sim = scorer(weight, 0.3).similarity("abc", "xyz", &embeddings).unwrap();
            assert!(sim.semantic > sim.lexical);
            assert!(sim.combined >= previous);
            previous = sim.combined;
        }
    }
}
