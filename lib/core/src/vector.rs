//! Embedding vectors and the vector comparator
//!
//! Vectors are produced upstream by an image model; this module only
//! compares them. Every comparison requires equal dimensionality and
//! fails with [`Error::DimensionMismatch`] otherwise.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A dense embedding vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Fail with `DimensionMismatch` unless both vectors have the same length
    #[inline]
    pub fn check_dim(&self, other: &Vector) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(())
    }

    /// Cosine similarity mapped from [-1, 1] to [0, 1] via `(x + 1) / 2`
    ///
    /// A zero-magnitude vector has no direction; its raw cosine is taken
    /// as 0, which maps to 0.5.
    pub fn cosine_similarity(&self, other: &Vector) -> Result<f32> {
        self.check_dim(other)?;

        let dot = dot_product(&self.data, &other.data);
        let norm_a = norm(&self.data);
        let norm_b = norm(&other.data);

        let raw = if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
        };

        Ok((((raw + 1.0) / 2.0) as f32).clamp(0.0, 1.0))
    }

    /// L2 (Euclidean) distance
    pub fn euclidean_distance(&self, other: &Vector) -> Result<f32> {
        self.check_dim(other)?;
        Ok(l2_distance(&self.data, &other.data) as f32)
    }

    /// Euclidean distance converted to a similarity with [`normalize_distance`]
    pub fn euclidean_similarity(&self, other: &Vector, decay: f32) -> Result<f32> {
        let distance = self.euclidean_distance(other)?;
        Ok(normalize_distance(distance, decay))
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Vector::new(data)
    }
}

/// Convert a distance to a similarity in [0, 1]: `exp(-d / decay)`
///
/// `decay` must be positive; callers validate it at configuration time.
#[inline]
pub fn normalize_distance(distance: f32, decay: f32) -> f32 {
    if decay <= 0.0 || !distance.is_finite() {
        return 0.0;
    }
    (-distance.max(0.0) / decay).exp().clamp(0.0, 1.0)
}

// Accumulate in f64 so that self-comparison of long vectors lands on 1.0
#[inline]
fn dot_product(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

#[inline]
fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt()
}

#[inline]
fn l2_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let v1 = Vector::new(vec![1.0, 0.0]);
        let v2 = Vector::new(vec![1.0, 0.0]);
        assert!((v1.cosine_similarity(&v2).unwrap() - 1.0).abs() < 1e-6);

        // Orthogonal vectors sit in the middle of the mapped range
        let v3 = Vector::new(vec![1.0, 0.0]);
        let v4 = Vector::new(vec![0.0, 1.0]);
        assert!((v3.cosine_similarity(&v4).unwrap() - 0.5).abs() < 1e-6);

        let v5 = Vector::new(vec![-1.0, 0.0]);
        assert!(v1.cosine_similarity(&v5).unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_cosine_ignores_magnitude() {
        let v1 = Vector::new(vec![2.0, 4.0, 6.0]);
        let v2 = Vector::new(vec![1.0, 2.0, 3.0]);
        assert!((v1.cosine_similarity(&v2).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_is_neutral() {
        let zero = Vector::new(vec![0.0, 0.0]);
        let v = Vector::new(vec![1.0, 1.0]);
        assert_eq!(zero.cosine_similarity(&v).unwrap(), 0.5);
    }

    #[test]
    fn test_dimension_mismatch() {
        let v1 = Vector::new(vec![0.1; 512]);
        let v2 = Vector::new(vec![0.1; 1024]);

        assert_eq!(
            v1.cosine_similarity(&v2),
            Err(Error::DimensionMismatch { expected: 512, actual: 1024 })
        );
        assert!(matches!(
            v1.euclidean_distance(&v2),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_euclidean_distance() {
        let v1 = Vector::new(vec![0.0, 0.0]);
        let v2 = Vector::new(vec![3.0, 4.0]);
        assert!((v1.euclidean_distance(&v2).unwrap() - 5.0).abs() < 1e-6);
        assert_eq!(
            v1.euclidean_distance(&v2).unwrap(),
            v2.euclidean_distance(&v1).unwrap()
        );
    }

    #[test]
    fn test_normalize_distance() {
        assert_eq!(normalize_distance(0.0, 1.0), 1.0);
        assert!((normalize_distance(1.0, 1.0) - (-1.0f32).exp()).abs() < 1e-6);
        assert!(normalize_distance(100.0, 1.0) < 1e-6);
        assert_eq!(normalize_distance(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_euclidean_similarity_bounded() {
        let v1 = Vector::new(vec![1.0, 2.0, 3.0]);
        let v2 = Vector::new(vec![-4.0, 8.0, 0.5]);
        let sim = v1.euclidean_similarity(&v2, 2.0).unwrap();
        assert!((0.0..=1.0).contains(&sim));
        assert_eq!(v1.euclidean_similarity(&v1, 2.0).unwrap(), 1.0);
    }

    #[test]
    fn test_serde_transparent() {
        let v = Vector::new(vec![0.5, 0.25]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[0.5,0.25]");
    }
}
