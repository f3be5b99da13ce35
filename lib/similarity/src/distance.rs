//! Per-field similarity functions
//!
//! Every function returns a similarity score in [0.0, 1.0] where 1.0 means
//! identical, and every function is symmetric in its two arguments.

use crate::profile::{FieldKind, NumericMode, VectorMetric};
use hullmatch_core::{AttributeValue, Error, Result, Vector};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Score returned by the categorical comparator for same-family values
pub const FAMILY_MATCH_SCORE: f32 = 0.5;

/// Calculate numeric similarity between two numbers
///
/// # Arguments
/// * `a` - First numeric value
/// * `b` - Second numeric value
/// * `mode` - Tolerance (absolute difference over a scale) or ratio
///
/// # Returns
/// Similarity score in [0.0, 1.0]
pub fn numeric_similarity(a: f64, b: f64, mode: NumericMode) -> f32 {
    match mode {
        NumericMode::Tolerance { scale } => {
            if scale <= 0.0 {
                return if a == b { 1.0 } else { 0.0 };
            }
            (1.0 - (a - b).abs() / scale).clamp(0.0, 1.0) as f32
        }
        NumericMode::Ratio => {
            let (abs_a, abs_b) = (a.abs(), b.abs());
            let max = abs_a.max(abs_b);
            if max == 0.0 {
                1.0 // Both are zero
            } else if a.signum() != b.signum() && a != 0.0 && b != 0.0 {
                0.0 // Opposite signs share no magnitude
            } else {
                (abs_a.min(abs_b) / max).clamp(0.0, 1.0) as f32
            }
        }
    }
}

/// Calculate categorical similarity between two category values
///
/// Exact (case-insensitive) match scores 1.0, values mapped to the same
/// family score [`FAMILY_MATCH_SCORE`], anything else 0.0.
pub fn categorical_similarity(a: &str, b: &str, families: &BTreeMap<String, String>) -> f32 {
    let a = normalize_token(a);
    let b = normalize_token(b);

    if a == b {
        return 1.0;
    }

    match (families.get(&a), families.get(&b)) {
        (Some(family_a), Some(family_b)) if family_a == family_b => FAMILY_MATCH_SCORE,
        _ => 0.0,
    }
}

/// Jaccard index of two string sets, compared case-insensitively
///
/// Two empty sets are identical absence of features and score 1.0.
pub fn set_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let tokens_a: HashSet<String> = a.iter().map(|s| normalize_token(s)).collect();
    let tokens_b: HashSet<String> = b.iter().map(|s| normalize_token(s)).collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    if union == 0 { 0.0 } else { intersection as f32 / union as f32 }
}

/// Normalized edit-distance similarity: `1 - levenshtein / max(len)`
///
/// Case-insensitive; lengths are counted in chars. Two empty strings
/// score 1.0.
pub fn text_similarity(a: &str, b: &str) -> f32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = strsim::levenshtein(&a, &b);
    (1.0 - distance as f32 / max_len as f32).clamp(0.0, 1.0)
}

/// Compare two embeddings under the field's metric
///
/// When `dimension` is declared both vectors must match it; otherwise they
/// must match each other.
pub fn vector_similarity(
    a: &Vector,
    b: &Vector,
    metric: VectorMetric,
    dimension: Option<usize>,
) -> Result<f32> {
    if let Some(expected) = dimension {
        for v in [a, b] {
            if v.dim() != expected {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: v.dim(),
                });
            }
        }
    }

    match metric {
        VectorMetric::Cosine => a.cosine_similarity(b),
        VectorMetric::Euclidean { decay } => a.euclidean_similarity(b, decay),
    }
}

/// Fail unless `value` is of the kind the field declares
pub fn check_kind(field: &str, kind: &FieldKind, value: &AttributeValue) -> Result<()> {
    let matches = matches!(
        (kind, value),
        (FieldKind::Numeric { .. }, AttributeValue::Numeric(_))
            | (FieldKind::Categorical { .. }, AttributeValue::Categorical(_))
            | (FieldKind::Set, AttributeValue::SetOfStrings(_))
            | (FieldKind::Text, AttributeValue::FreeText(_))
            | (FieldKind::Vector { .. }, AttributeValue::Vector(_))
    );

    if !matches {
        return Err(Error::validation(format!(
            "field '{}' is declared {} but the entity holds a {} value",
            field,
            kind.name(),
            value.kind_name()
        )));
    }

    match value {
        AttributeValue::Numeric(n) if !n.is_finite() => {
            return Err(Error::validation(format!(
                "field '{}' holds a non-finite number",
                field
            )));
        }
        AttributeValue::Vector(v) if v.as_slice().iter().any(|x| !x.is_finite()) => {
            return Err(Error::validation(format!(
                "field '{}' holds an embedding with non-finite components",
                field
            )));
        }
        _ => {}
    }

    Ok(())
}

/// Compute similarity for a single field with both sides present
pub fn field_similarity(
    field: &str,
    kind: &FieldKind,
    a: &AttributeValue,
    b: &AttributeValue,
) -> Result<f32> {
    check_kind(field, kind, a)?;
    check_kind(field, kind, b)?;

    let score = match (kind, a, b) {
        (FieldKind::Numeric { mode }, AttributeValue::Numeric(x), AttributeValue::Numeric(y)) => {
            numeric_similarity(*x, *y, *mode)
        }
        (
            FieldKind::Categorical { families },
            AttributeValue::Categorical(x),
            AttributeValue::Categorical(y),
        ) => categorical_similarity(x, y, families),
        (FieldKind::Set, AttributeValue::SetOfStrings(x), AttributeValue::SetOfStrings(y)) => {
            set_similarity(x, y)
        }
        (FieldKind::Text, AttributeValue::FreeText(x), AttributeValue::FreeText(y)) => {
            text_similarity(x, y)
        }
        (
            FieldKind::Vector { metric, dimension },
            AttributeValue::Vector(x),
            AttributeValue::Vector(y),
        ) => vector_similarity(x, y, *metric, *dimension)?,
        // check_kind has already rejected every other combination
        _ => return Err(Error::validation(format!("field '{}' has mismatched values", field))),
    };

    Ok(score.clamp(0.0, 1.0))
}

fn normalize_token(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sail_families() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("sailboat".to_string(), "sail".to_string()),
            ("catamaran".to_string(), "sail".to_string()),
            ("trawler".to_string(), "power".to_string()),
        ])
    }

    #[test]
    fn test_numeric_tolerance() {
        let mode = NumericMode::Tolerance { scale: 100.0 };
        assert_eq!(numeric_similarity(42.0, 42.0, mode), 1.0);
        assert!((numeric_similarity(42.0, 40.0, mode) - 0.98).abs() < 1e-6);
        assert_eq!(numeric_similarity(0.0, 250.0, mode), 0.0);
        assert_eq!(numeric_similarity(40.0, 42.0, mode), numeric_similarity(42.0, 40.0, mode));
    }

    #[test]
    fn test_numeric_ratio() {
        assert_eq!(numeric_similarity(0.0, 0.0, NumericMode::Ratio), 1.0);
        assert_eq!(numeric_similarity(10.0, 20.0, NumericMode::Ratio), 0.5);
        assert_eq!(numeric_similarity(20.0, 10.0, NumericMode::Ratio), 0.5);
        assert_eq!(numeric_similarity(0.0, 5.0, NumericMode::Ratio), 0.0);
        assert_eq!(numeric_similarity(-5.0, 5.0, NumericMode::Ratio), 0.0);
        assert_eq!(numeric_similarity(-5.0, -10.0, NumericMode::Ratio), 0.5);
    }

    #[test]
    fn test_categorical_similarity() {
        let families = sail_families();
        assert_eq!(categorical_similarity("Yacht", "YACHT", &families), 1.0);
        assert_eq!(categorical_similarity("Sailboat", "catamaran", &families), 0.5);
        assert_eq!(categorical_similarity("catamaran", "Sailboat", &families), 0.5);
        assert_eq!(categorical_similarity("sailboat", "trawler", &families), 0.0);
        assert_eq!(categorical_similarity("kayak", "canoe", &families), 0.0);
        assert_eq!(categorical_similarity("kayak", "canoe", &BTreeMap::new()), 0.0);
    }

    #[test]
    fn test_set_similarity_boundaries() {
        assert_eq!(set_similarity(&set(&[]), &set(&[])), 1.0);
        assert_eq!(set_similarity(&set(&[]), &set(&["x"])), 0.0);
        assert_eq!(set_similarity(&set(&["x"]), &set(&[])), 0.0);
        assert_eq!(set_similarity(&set(&["a"]), &set(&["b"])), 0.0);
    }

    #[test]
    fn test_set_similarity_jaccard() {
        let a = set(&["GPS", "Radar"]);
        let b = set(&["gps", "Sonar"]);
        assert!((set_similarity(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(set_similarity(&a, &b), set_similarity(&b, &a));
    }

    #[test]
    fn test_text_similarity() {
        assert_eq!(text_similarity("", ""), 1.0);
        assert_eq!(text_similarity("Beneteau", "BENETEAU"), 1.0);
        assert_eq!(text_similarity("abc", ""), 0.0);
        // kitten -> sitting: distance 3 over 7 chars
        assert!((text_similarity("kitten", "sitting") - (1.0 - 3.0 / 7.0)).abs() < 1e-6);
        assert_eq!(text_similarity("kitten", "sitting"), text_similarity("sitting", "kitten"));
    }

    #[test]
    fn test_text_similarity_counts_chars() {
        // Multi-byte chars count once each
        assert!((text_similarity("Bénéteau", "Beneteau") - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_vector_similarity_declared_dimension() {
        let a = Vector::new(vec![1.0, 0.0, 0.0]);
        let b = Vector::new(vec![1.0, 0.0, 0.0]);
        assert_eq!(vector_similarity(&a, &b, VectorMetric::Cosine, Some(3)).unwrap(), 1.0);
        assert_eq!(
            vector_similarity(&a, &b, VectorMetric::Cosine, Some(4)),
            Err(Error::DimensionMismatch { expected: 4, actual: 3 })
        );
    }

    #[test]
    fn test_vector_similarity_euclidean() {
        let a = Vector::new(vec![0.0, 0.0]);
        let b = Vector::new(vec![3.0, 4.0]);
        let sim = vector_similarity(&a, &b, VectorMetric::Euclidean { decay: 5.0 }, None).unwrap();
        assert!((sim - (-1.0f32).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_field_similarity_kind_mismatch() {
        let kind = FieldKind::Numeric { mode: NumericMode::Ratio };
        let result = field_similarity(
            "length",
            &kind,
            &AttributeValue::Numeric(40.0),
            &AttributeValue::FreeText("forty".to_string()),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_field_similarity_rejects_nan() {
        let kind = FieldKind::Numeric { mode: NumericMode::Ratio };
        let result = field_similarity(
            "length",
            &kind,
            &AttributeValue::Numeric(f64::NAN),
            &AttributeValue::Numeric(40.0),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_field_similarity_rejects_nan_embedding() {
        let kind = FieldKind::Vector {
            metric: VectorMetric::Cosine,
            dimension: None,
        };
        let good = AttributeValue::Vector(Vector::new(vec![1.0, 0.0]));
        let bad = AttributeValue::Vector(Vector::new(vec![f32::NAN, 0.0]));
        let infinite = AttributeValue::Vector(Vector::new(vec![f32::INFINITY, 0.0]));

        assert!(matches!(
            field_similarity("image", &kind, &good, &bad),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            field_similarity("image", &kind, &infinite, &good),
            Err(Error::Validation(_))
        ));
        assert!(check_kind("image", &kind, &bad).is_err());
    }
}
