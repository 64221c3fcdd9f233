//! Similarity scoring and ranking

use crate::error::{Result, ResumeRankerError};
use crate::input::ExtractionMethod;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Score of one candidate against the reference document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub filename: String,
    pub path: PathBuf,
    pub score: f32,
    pub method: ExtractionMethod,
}

/// Raw cosine similarity. Empty or zero-norm vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ResumeRankerError::Processing(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (norm_a * norm_b))
}

/// Cosine similarity clamped into `[0.0, 1.0]`. Never returns `-0.0`.
pub fn similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let raw = cosine_similarity(a, b)?;
    if !raw.is_finite() {
        return Err(ResumeRankerError::Processing(format!(
            "Similarity is not a finite number: {}",
            raw
        )));
    }
    // adding +0.0 turns -0.0 into 0.0
    Ok(raw.clamp(0.0, 1.0) + 0.0)
}

/// Sort best match first. Equal scores keep their discovery order.
pub fn rank(records: &mut [MatchRecord]) {
    records.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, score: f32) -> MatchRecord {
        MatchRecord {
            filename: name.to_string(),
            path: PathBuf::from(name),
            score,
            method: ExtractionMethod::DirectTxt,
        }
    }

    #[test]
    fn test_identical_vectors_score_one() {
        let v = [0.3, 0.4, 0.5];
        let score = similarity(&v, &v).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
        assert!(score <= 1.0);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        // rounding pushes the raw cosine of this vector with itself above 1.0
        let v: Vec<f32> = (0..384)
            .map(|i| ((i * 9) % 97) as f32 * 0.013 + 0.001)
            .collect();
        assert!(cosine_similarity(&v, &v).unwrap() > 1.0);
        assert_eq!(similarity(&v, &v).unwrap(), 1.0);
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        let score = similarity(&[1.0, 0.0], &[-0.0, -1.0]).unwrap();
        assert_eq!(score, 0.0);
        assert!(score.is_sign_positive());
        assert_eq!(format!("{:.4}", score), "0.0000");
    }

    #[test]
    fn test_zero_scores_keep_discovery_order() {
        let mut records = vec![
            record("first", similarity(&[1.0, 0.0], &[-0.0, -1.0]).unwrap()),
            record("second", 0.0),
        ];
        rank(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_opposite_vectors_clamp_to_zero() {
        let score = similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert_eq!(score, 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), -1.0);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        assert_eq!(similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap(), 0.0);
        assert_eq!(similarity(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        assert!(similarity(&[1.0, 0.0], &[1.0]).is_err());
    }

    #[test]
    fn test_rank_descending_and_stable() {
        let mut records = vec![
            record("a", 0.3),
            record("b", 0.9),
            record("c", 0.7),
            record("d", 0.9),
        ];
        rank(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "c", "a"]);
    }
}
