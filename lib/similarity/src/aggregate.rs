//! Weighted aggregation of per-field scores
//!
//! Fuses the per-field comparator outputs into a single score:
//!
//! ```text
//! overall = Σ contribution / Σ applied_weight
//!
//! both present:   contribution = score × weight
//! either absent:  contribution = weight × uncertainty_fraction
//! always:         applied_weight = weight
//! ```
//!
//! Absence is a partial-confidence signal. It is never scored as a perfect
//! match, a total mismatch, or dropped from the denominator.

use crate::distance::{check_kind, field_similarity};
use crate::profile::WeightProfile;
use hullmatch_core::{AttributeValue, Entity, Field, Result};
use serde::Serialize;

/// One field's share of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldContribution {
    pub field: String,
    /// Value on the first entity, `None` when absent
    pub value_a: Option<AttributeValue>,
    /// Value on the second entity, `None` when absent
    pub value_b: Option<AttributeValue>,
    /// Comparator output; `None` when the uncertainty default was used
    pub score: Option<f32>,
    pub contribution: f32,
    pub applied_weight: f32,
}

impl FieldContribution {
    /// `contribution / applied_weight`, or 0 for zero-weight fields
    pub fn normalized(&self) -> f32 {
        if self.applied_weight > 0.0 {
            (self.contribution / self.applied_weight).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_uncertain(&self) -> bool {
        self.score.is_none()
    }
}

/// Result of comparing two entities
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Fused similarity in [0, 1]
    pub overall_score: f32,
    /// Per-field breakdown in profile order, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<FieldContribution>>,
}

impl ComparisonResult {
    /// `round(overall_score * 100)`
    pub fn percentage(&self) -> u32 {
        (self.overall_score * 100.0).round() as u32
    }

    /// Per-field normalized scores in profile order
    pub fn per_field(&self) -> Option<Vec<(&str, f32)>> {
        self.breakdown.as_ref().map(|fields| {
            fields
                .iter()
                .map(|f| (f.field.as_str(), f.normalized()))
                .collect()
        })
    }
}

/// Profile-driven score fusion
#[derive(Debug, Clone, Copy)]
pub struct WeightedAggregator<'p> {
    profile: &'p WeightProfile,
    breakdown: bool,
}

impl<'p> WeightedAggregator<'p> {
    /// Create an aggregator; the profile is validated up front
    pub fn new(profile: &'p WeightProfile) -> Result<Self> {
        profile.validate()?;
        Ok(Self {
            profile,
            breakdown: false,
        })
    }

    /// Retain the per-field breakdown in each result
    #[must_use]
    pub fn with_breakdown(mut self, breakdown: bool) -> Self {
        self.breakdown = breakdown;
        self
    }

    pub fn profile(&self) -> &WeightProfile {
        self.profile
    }

    /// Compare two entities under the bound profile
    pub fn compare(&self, a: &Entity, b: &Entity) -> Result<ComparisonResult> {
        let uncertainty = self.profile.uncertainty_fraction;
        // f64 totals so that large finite weights cannot overflow to inf
        let mut total_contribution = 0.0f64;
        let mut total_weight = 0.0f64;
        let mut breakdown = self
            .breakdown
            .then(|| Vec::with_capacity(self.profile.fields.len()));

        for config in &self.profile.fields {
            let field_a = a.field(&config.name);
            let field_b = b.field(&config.name);

            let score = match (field_a, field_b) {
                (Field::Present(va), Field::Present(vb)) => {
                    Some(field_similarity(&config.name, &config.kind, va, vb)?)
                }
                (Field::Present(v), Field::Absent) | (Field::Absent, Field::Present(v)) => {
                    // Still reject a wrongly-typed value on the side that has one
                    check_kind(&config.name, &config.kind, v)?;
                    None
                }
                (Field::Absent, Field::Absent) => None,
            };

            let contribution = match score {
                Some(s) => s * config.weight,
                None => config.weight * uncertainty,
            };

            total_contribution += f64::from(contribution);
            total_weight += f64::from(config.weight);

            if let Some(fields) = breakdown.as_mut() {
                fields.push(FieldContribution {
                    field: config.name.clone(),
                    value_a: field_a.value().cloned(),
                    value_b: field_b.value().cloned(),
                    score,
                    contribution,
                    applied_weight: config.weight,
                });
            }
        }

        let overall_score = if total_weight > 0.0 {
            (total_contribution / total_weight).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };

        Ok(ComparisonResult {
            overall_score,
            breakdown,
        })
    }
}

/// Compare two entities and keep the per-field breakdown
pub fn compare(a: &Entity, b: &Entity, profile: &WeightProfile) -> Result<ComparisonResult> {
    WeightedAggregator::new(profile)?
        .with_breakdown(true)
        .compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FieldConfig;
    use hullmatch_core::{Error, Vector};

    fn create_test_profile() -> WeightProfile {
        WeightProfile::new(
            "worked-example",
            vec![
                FieldConfig::categorical("type", 0.35),
                FieldConfig::tolerance("length", 0.25, 100.0),
                FieldConfig::set("features", 0.15),
            ],
        )
    }

    fn boat(id: &str, kind: &str, length: f64, features: &[&str]) -> Entity {
        Entity::new(id)
            .with_categorical("type", kind)
            .with_numeric("length", length)
            .with_set("features", features.iter().copied())
    }

    #[test]
    fn test_worked_example() {
        let a = boat("a", "Yacht", 42.0, &["GPS", "Radar"]);
        let b = boat("b", "Yacht", 40.0, &["GPS", "Sonar"]);

        let result = compare(&a, &b, &create_test_profile()).unwrap();

        let expected = (0.35 + 0.245 + 0.05) / 0.75;
        assert!(
            (result.overall_score - expected).abs() < 1e-4,
            "Expected ~{}, got {}",
            expected,
            result.overall_score
        );
        assert_eq!(result.percentage(), 86);

        let per_field = result.per_field().unwrap();
        assert_eq!(per_field[0], ("type", 1.0));
        assert!((per_field[1].1 - 0.98).abs() < 1e-6);
        assert!((per_field[2].1 - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_symmetry() {
        let a = boat("a", "Sailboat", 31.0, &["GPS", "Autopilot", "Radar"]);
        let b = boat("b", "Yacht", 55.0, &["radar"]);
        let profile = create_test_profile();

        let ab = compare(&a, &b, &profile).unwrap();
        let ba = compare(&b, &a, &profile).unwrap();
        assert_eq!(ab.overall_score, ba.overall_score);
    }

    #[test]
    fn test_self_identity() {
        let profile = WeightProfile::new(
            "all-kinds",
            vec![
                FieldConfig::categorical("type", 0.3),
                FieldConfig::ratio("length", 0.2),
                FieldConfig::set("features", 0.1),
                FieldConfig::text("model", 0.1),
                FieldConfig::vector_cosine("image", 0.3),
            ],
        );
        let a = boat("a", "Trawler", 48.0, &["Radar"])
            .with_text("model", "Nordhavn 47")
            .with_vector("image", Vector::new(vec![0.3, -0.2, 0.9, 0.05]));

        let result = compare(&a, &a, &profile).unwrap();
        assert!((result.overall_score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_field_uses_uncertainty() {
        let profile = create_test_profile();
        let a = Entity::new("a").with_categorical("type", "Yacht");
        let b = Entity::new("b").with_categorical("type", "Yacht");

        let result = compare(&a, &b, &profile).unwrap();
        // type matches fully, length and features fall back to 1/3
        let expected = (0.35 + (0.25 + 0.15) / 3.0) / 0.75;
        assert!((result.overall_score - expected).abs() < 1e-5);

        let breakdown = result.breakdown.unwrap();
        assert!(breakdown[1].is_uncertain());
        assert_eq!(breakdown[1].applied_weight, 0.25);
    }

    #[test]
    fn test_absence_is_flat() {
        let profile = create_test_profile();
        let a = boat("a", "Yacht", 42.0, &["GPS"]);
        let mut b = boat("b", "Yacht", 42.0, &["GPS"]);
        let mut a_missing = a.clone();
        a_missing.remove_attribute("length");
        b.remove_attribute("length");

        let one_side = compare(&a, &b, &profile).unwrap().overall_score;
        let both_sides = compare(&a_missing, &b, &profile).unwrap().overall_score;
        assert_eq!(one_side, both_sides);

        let present_close = compare(&a, &boat("c", "Yacht", 41.0, &["GPS"]), &profile)
            .unwrap()
            .overall_score;
        let present_far = compare(&a, &boat("d", "Yacht", 140.0, &["GPS"]), &profile)
            .unwrap()
            .overall_score;

        assert!(present_close > both_sides);
        assert!(both_sides > present_far);
    }

    #[test]
    fn test_huge_weights_stay_bounded() {
        let profile = WeightProfile::new(
            "huge",
            vec![
                FieldConfig::categorical("type", f32::MAX),
                FieldConfig::tolerance("length", f32::MAX, 100.0),
                FieldConfig::set("features", f32::MAX),
            ],
        );
        let a = boat("a", "Yacht", 42.0, &["GPS"]);
        let b = boat("b", "Kayak", 42.0, &["GPS"]);

        assert_eq!(compare(&a, &a, &profile).unwrap().overall_score, 1.0);
        let score = compare(&a, &b, &profile).unwrap().overall_score;
        assert!((score - 2.0 / 3.0).abs() < 1e-6, "got {}", score);
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let profile = WeightProfile::new("empty", Vec::new());
        let a = boat("a", "Yacht", 42.0, &[]);
        assert_eq!(compare(&a, &a, &profile).unwrap().overall_score, 0.0);
    }

    #[test]
    fn test_zero_uncertainty_fraction() {
        let profile = create_test_profile().with_uncertainty_fraction(0.0);
        let a = Entity::new("a");
        let b = Entity::new("b");
        assert_eq!(compare(&a, &b, &profile).unwrap().overall_score, 0.0);
    }

    #[test]
    fn test_dimension_mismatch_propagates() {
        let profile = WeightProfile::new("img", vec![FieldConfig::vector_cosine("image", 1.0)]);
        let a = Entity::new("a").with_vector("image", Vector::new(vec![0.1; 512]));
        let b = Entity::new("b").with_vector("image", Vector::new(vec![0.1; 1024]));

        assert_eq!(
            compare(&a, &b, &profile).unwrap_err(),
            Error::DimensionMismatch { expected: 512, actual: 1024 }
        );
    }

    #[test]
    fn test_kind_mismatch_on_one_side() {
        let profile = create_test_profile();
        let a = Entity::new("a").with_text("length", "forty two");
        let b = Entity::new("b");
        assert!(matches!(compare(&a, &b, &profile), Err(Error::Validation(_))));
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let profile = WeightProfile::new("bad", vec![FieldConfig::text("model", -1.0)]);
        assert!(WeightedAggregator::new(&profile).is_err());
    }

    #[test]
    fn test_breakdown_off_by_default() {
        let profile = create_test_profile();
        let a = boat("a", "Yacht", 42.0, &[]);
        let result = WeightedAggregator::new(&profile).unwrap().compare(&a, &a).unwrap();
        assert!(result.breakdown.is_none());
        assert!(result.per_field().is_none());
    }
}
