//! Loading entities and weight profiles from JSON files

use anyhow::{bail, Context};
use hullmatch_core::Entity;
use hullmatch_similarity::{ProfileRegistry, WeightProfile};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Read and validate a weight profile document
pub fn load_profile(path: &Path) -> anyhow::Result<WeightProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let profile = WeightProfile::from_json(&raw)
        .with_context(|| format!("failed to load profile {}", path.display()))?;

    info!(profile = %profile.name, fields = profile.fields.len(), "loaded weight profile");
    Ok(profile)
}

/// Read an array of entities
///
/// Ids are looked up by their rendered form on the command line, so ids
/// that render the same (`3` and `"3"`) count as duplicates and are rejected.
pub fn load_entities(path: &Path) -> anyhow::Result<Vec<Entity>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read entities {}", path.display()))?;
    let entities: Vec<Entity> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse entities {}", path.display()))?;

    let mut seen = HashSet::with_capacity(entities.len());
    for entity in &entities {
        if !seen.insert(entity.id.to_string()) {
            bail!("duplicate entity id '{}' in {}", entity.id, path.display());
        }
    }

    info!(count = entities.len(), "loaded entities");
    Ok(entities)
}

/// Pick the profile for a run: an explicit file wins over a named preset
pub fn resolve_profile(
    profile_path: Option<&Path>,
    preset: Option<&str>,
) -> anyhow::Result<WeightProfile> {
    if let Some(path) = profile_path {
        return load_profile(path);
    }

    let registry = ProfileRegistry::with_presets();
    let profile = registry.resolve(preset)?;
    Ok(profile.clone())
}

/// Find an entity by its id as written on the command line
pub fn find_entity<'a>(entities: &'a [Entity], id: &str) -> anyhow::Result<&'a Entity> {
    entities
        .iter()
        .find(|e| e.id.to_string() == id)
        .with_context(|| format!("entity '{}' not found", id))
}
