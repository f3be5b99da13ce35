//! Built-in weight profiles and profile resolution
//!
//! `legacy-a` and `legacy-b` reproduce the two historical boat-matching
//! weight tables so that new results can be checked against prior
//! behaviour. `visual-hybrid` fuses the image embedding with the
//! structured attributes.
//!
//! Length semantics differ on purpose: `legacy-a` scores length by
//! tolerance over 100 ft, `legacy-b` by ratio. Each preset declares its
//! mode per field and never mixes them.
//!
//! An attribute name always maps to the same value kind in every preset,
//! so one pool can be ranked under each of them side by side.

use crate::profile::{FieldConfig, WeightProfile};
use hullmatch_core::{Error, Result};
use std::collections::BTreeMap;

pub const LEGACY_A: &str = "legacy-a";
pub const LEGACY_B: &str = "legacy-b";
pub const VISUAL_HYBRID: &str = "visual-hybrid";

/// Boat type → family table shared by the presets
pub fn boat_type_families() -> Vec<(&'static str, &'static str)> {
    vec![
        ("sailboat", "sail"),
        ("sloop", "sail"),
        ("ketch", "sail"),
        ("yawl", "sail"),
        ("cutter", "sail"),
        ("schooner", "sail"),
        ("catamaran", "sail"),
        ("trimaran", "sail"),
        ("motor yacht", "power"),
        ("cruiser", "power"),
        ("express cruiser", "power"),
        ("trawler", "power"),
        ("sportfish", "power"),
        ("center console", "power"),
        ("bowrider", "power"),
        ("speedboat", "power"),
        ("kayak", "paddle"),
        ("canoe", "paddle"),
        ("paddleboard", "paddle"),
        ("jet ski", "pwc"),
        ("personal watercraft", "pwc"),
    ]
}

/// Attribute-heavy table: type dominates, length by tolerance
pub fn legacy_a() -> WeightProfile {
    WeightProfile::new(
        LEGACY_A,
        vec![
            FieldConfig::categorical_with_families("type", 0.35, boat_type_families()),
            FieldConfig::tolerance("length", 0.25, 100.0),
            FieldConfig::set("features", 0.15),
            FieldConfig::categorical("manufacturer", 0.15),
            FieldConfig::tolerance("year", 0.10, 50.0),
        ],
    )
}

/// Make/model-heavy table: exact make, fuzzy model text, length by ratio
pub fn legacy_b() -> WeightProfile {
    WeightProfile::new(
        LEGACY_B,
        vec![
            FieldConfig::categorical("manufacturer", 0.30),
            FieldConfig::text("model", 0.20),
            FieldConfig::categorical("type", 0.20),
            FieldConfig::ratio("length", 0.15),
            FieldConfig::tolerance("year", 0.10, 30.0),
            FieldConfig::set("features", 0.05),
        ],
    )
}

/// Image embedding fused with structured attributes
pub fn visual_hybrid() -> WeightProfile {
    WeightProfile::new(
        VISUAL_HYBRID,
        vec![
            FieldConfig::vector_cosine("image", 0.40),
            FieldConfig::categorical_with_families("type", 0.20, boat_type_families()),
            FieldConfig::tolerance("length", 0.15, 100.0),
            FieldConfig::set("features", 0.10),
            FieldConfig::categorical("manufacturer", 0.10),
            FieldConfig::text("description", 0.05),
        ],
    )
}

/// Named weight profiles with an optional default
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, WeightProfile>,
    default: Option<String>,
}

impl ProfileRegistry {
    /// Empty registry with no default
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in presets; no default is set
    pub fn with_presets() -> Self {
        let mut registry = Self::new();
        for profile in [legacy_a(), legacy_b(), visual_hybrid()] {
            registry.profiles.insert(profile.name.clone(), profile);
        }
        registry
    }

    /// Validate and add a profile, replacing any with the same name
    pub fn register(&mut self, mut profile: WeightProfile) -> Result<()> {
        profile.validate_and_normalize()?;
        self.profiles.insert(profile.name.clone(), profile);
        Ok(())
    }

    /// Make `name` the profile used when callers don't name one
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.profiles.contains_key(name) {
            return Err(Error::MissingConfiguration(format!(
                "cannot default to unknown profile '{}'",
                name
            )));
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&WeightProfile> {
        self.profiles.get(name)
    }

    /// Registered profile names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &WeightProfile> {
        self.profiles.values()
    }

    /// Resolve a profile by name, falling back to the default
    pub fn resolve(&self, name: Option<&str>) -> Result<&WeightProfile> {
        match name.or(self.default.as_deref()) {
            Some(name) => self.profiles.get(name).ok_or_else(|| {
                Error::MissingConfiguration(format!("unknown weight profile '{}'", name))
            }),
            None => Err(Error::MissingConfiguration(
                "no weight profile supplied and no default configured".to_string(),
            )),
        }
    }
}
