//! Weight profile definitions
//!
//! A weight profile declares which boat attributes take part in a
//! comparison, which comparator each one uses, and how much it weighs in
//! the fused score. Fields are evaluated in declaration order.

use hullmatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;

/// Share of a field's weight credited when either side is missing it
pub const DEFAULT_UNCERTAINTY_FRACTION: f32 = 1.0 / 3.0;

/// Named weight profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightProfile {
    pub name: String,

    /// Fraction of a field's weight credited when the field is absent on either side
    #[serde(default = "default_uncertainty_fraction")]
    pub uncertainty_fraction: f32,

    /// Field configurations in evaluation order
    pub fields: Vec<FieldConfig>,
}

fn default_uncertainty_fraction() -> f32 {
    DEFAULT_UNCERTAINTY_FRACTION
}

impl WeightProfile {
    /// Create a new profile with the default uncertainty fraction
    pub fn new(name: impl Into<String>, fields: Vec<FieldConfig>) -> Self {
        Self {
            name: name.into(),
            uncertainty_fraction: DEFAULT_UNCERTAINTY_FRACTION,
            fields,
        }
    }

    #[must_use]
    pub fn with_uncertainty_fraction(mut self, fraction: f32) -> Self {
        self.uncertainty_fraction = fraction;
        self
    }

    /// Parse a profile from JSON and validate it
    ///
    /// Malformed documents, including unknown field kinds, are reported as
    /// validation errors.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut profile: WeightProfile = serde_json::from_str(json)
            .map_err(|e| Error::validation(format!("invalid weight profile: {}", e)))?;
        profile.validate_and_normalize()?;
        Ok(profile)
    }

    /// Check the profile without modifying it
    /// - uncertainty fraction lies in [0, 1]
    /// - field names are non-empty and unique
    /// - weights are finite and non-negative
    /// - comparator parameters (scale, decay, dimension) are usable
    pub fn validate(&self) -> Result<()> {
        if !self.uncertainty_fraction.is_finite()
            || !(0.0..=1.0).contains(&self.uncertainty_fraction)
        {
            return Err(Error::validation(format!(
                "uncertainty fraction must be within [0, 1], got {}",
                self.uncertainty_fraction
            )));
        }

        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(Error::validation("field name cannot be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::validation(format!(
                    "field '{}' is declared more than once",
                    field.name
                )));
            }
            if !field.weight.is_finite() {
                return Err(Error::validation(format!(
                    "field '{}' has a non-finite weight",
                    field.name
                )));
            }
            if field.weight < 0.0 {
                return Err(Error::validation(format!(
                    "field '{}' has negative weight",
                    field.name
                )));
            }
            field.kind.validate(&field.name)?;
        }

        Ok(())
    }

    /// Validate the profile and canonicalize family tables
    /// (trimmed, lowercase keys and family names)
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        self.validate()?;

        for field in &mut self.fields {
            if let FieldKind::Categorical { families } = &mut field.kind {
                *families = normalize_families(std::mem::take(families));
            }
        }

        Ok(())
    }

    /// Sum of all configured weights
    pub fn total_weight(&self) -> f32 {
        self.fields.iter().map(|f| f.weight).sum()
    }

    /// Get a field config by name
    pub fn get_field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in evaluation order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Copy of this profile with some field weights replaced
    ///
    /// Fields not named in `overrides` keep their weight. Unknown names are
    /// ignored. The result is validated, so a negative override fails.
    pub fn with_weights(&self, overrides: &HashMap<String, f32>) -> Result<WeightProfile> {
        let mut modified = self.clone();

        for (field_name, new_weight) in overrides {
            match modified.fields.iter_mut().find(|f| &f.name == field_name) {
                Some(field) => field.weight = *new_weight,
                None => warn!(
                    profile = %self.name,
                    field = %field_name,
                    "ignoring weight override for unknown field"
                ),
            }
        }

        modified.validate()?;
        Ok(modified)
    }
}

/// Configuration for a single field in a weight profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    /// Attribute name on the entity
    pub name: String,

    /// Comparator for this field
    #[serde(flatten)]
    pub kind: FieldKind,

    /// Relative importance in the fused score (non-negative)
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, kind: FieldKind, weight: f32) -> Self {
        Self {
            name: name.into(),
            kind,
            weight,
        }
    }

    /// Numeric field where small absolute differences degrade the score gently
    pub fn tolerance(name: impl Into<String>, weight: f32, scale: f64) -> Self {
        Self::new(
            name,
            FieldKind::Numeric {
                mode: NumericMode::Tolerance { scale },
            },
            weight,
        )
    }

    /// Numeric field compared by relative magnitude
    pub fn ratio(name: impl Into<String>, weight: f32) -> Self {
        Self::new(
            name,
            FieldKind::Numeric {
                mode: NumericMode::Ratio,
            },
            weight,
        )
    }

    /// Categorical field with exact matching only
    pub fn categorical(name: impl Into<String>, weight: f32) -> Self {
        Self::new(
            name,
            FieldKind::Categorical {
                families: BTreeMap::new(),
            },
            weight,
        )
    }

    /// Categorical field where values of the same family earn partial credit
    ///
    /// `families` maps a value to its family name, e.g. `catamaran → sail`.
    pub fn categorical_with_families<I, K, V>(
        name: impl Into<String>,
        weight: f32,
        families: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let families = normalize_families(
            families
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        Self::new(name, FieldKind::Categorical { families }, weight)
    }

    /// Set-of-strings field compared by Jaccard index
    pub fn set(name: impl Into<String>, weight: f32) -> Self {
        Self::new(name, FieldKind::Set, weight)
    }

    /// Free-text field compared by normalized edit distance
    pub fn text(name: impl Into<String>, weight: f32) -> Self {
        Self::new(name, FieldKind::Text, weight)
    }

    /// Embedding field compared by mapped cosine similarity
    pub fn vector_cosine(name: impl Into<String>, weight: f32) -> Self {
        Self::new(
            name,
            FieldKind::Vector {
                metric: VectorMetric::Cosine,
                dimension: None,
            },
            weight,
        )
    }

    /// Embedding field compared by `exp(-euclidean / decay)`
    pub fn vector_euclidean(name: impl Into<String>, weight: f32, decay: f32) -> Self {
        Self::new(
            name,
            FieldKind::Vector {
                metric: VectorMetric::Euclidean { decay },
                dimension: None,
            },
            weight,
        )
    }

    /// Declare the expected embedding dimensionality (vector fields only)
    #[must_use]
    pub fn with_dimension(mut self, dim: usize) -> Self {
        if let FieldKind::Vector { dimension, .. } = &mut self.kind {
            *dimension = Some(dim);
        }
        self
    }
}

/// Field kind, carrying the comparator parameters for that kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Numeric {
        mode: NumericMode,
    },
    Categorical {
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        families: BTreeMap<String, String>,
    },
    Set,
    Text,
    Vector {
        #[serde(default)]
        metric: VectorMetric,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimension: Option<usize>,
    },
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Numeric { .. } => "numeric",
            FieldKind::Categorical { .. } => "categorical",
            FieldKind::Set => "set",
            FieldKind::Text => "text",
            FieldKind::Vector { .. } => "vector",
        }
    }

    fn validate(&self, field: &str) -> Result<()> {
        match self {
            FieldKind::Numeric {
                mode: NumericMode::Tolerance { scale },
            } if !scale.is_finite() || *scale <= 0.0 => Err(Error::validation(format!(
                "field '{}' needs a positive tolerance scale, got {}",
                field, scale
            ))),
            FieldKind::Vector {
                metric: VectorMetric::Euclidean { decay },
                ..
            } if !decay.is_finite() || *decay <= 0.0 => Err(Error::validation(format!(
                "field '{}' needs a positive decay constant, got {}",
                field, decay
            ))),
            FieldKind::Vector {
                dimension: Some(0), ..
            } => Err(Error::validation(format!(
                "field '{}' declares a zero vector dimension",
                field
            ))),
            _ => Ok(()),
        }
    }
}

/// Numeric comparison mode, declared per field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NumericMode {
    /// `max(0, 1 - |a - b| / scale)`
    Tolerance { scale: f64 },
    /// `min(|a|, |b|) / max(|a|, |b|)`; 1 when both are zero
    Ratio,
}

/// Embedding comparison metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VectorMetric {
    /// Cosine mapped from [-1, 1] to [0, 1]
    #[default]
    Cosine,
    /// `exp(-distance / decay)`
    Euclidean { decay: f32 },
}

fn normalize_families(families: BTreeMap<String, String>) -> BTreeMap<String, String> {
    families
        .into_iter()
        .map(|(value, family)| (value.trim().to_lowercase(), family.trim().to_lowercase()))
        .collect()
}
