//! Top-K ranking of a candidate pool against a query boat
//!
//! Ranking is a full scan: every candidate is scored, so cost grows as
//! O(n log n) in the pool size. No index or approximate search is used.

use crate::aggregate::{ComparisonResult, WeightedAggregator};
use crate::presets::ProfileRegistry;
use crate::profile::WeightProfile;
use hullmatch_core::{Entity, EntityId, Error, Result};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// A ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub entity_id: EntityId,
    pub overall_score: f32,
    /// 1-based position after sorting
    pub rank: usize,
}

/// Score `candidates` against `query` and return the best `k`
///
/// # Arguments
/// * `query` - The reference boat; any candidate sharing its id is skipped
/// * `candidates` - The pool to rank; must not be empty
/// * `profile` - Weight profile used for every comparison
/// * `k` - Maximum number of results (0 yields an empty list)
/// * `threshold` - Minimum overall score in [0, 1]
///
/// # Returns
/// Candidates sorted by descending score, ties broken by ascending id
pub fn find_top_k(
    query: &Entity,
    candidates: &[Entity],
    profile: &WeightProfile,
    k: usize,
    threshold: f32,
) -> Result<Vec<RankedCandidate>> {
    if candidates.is_empty() {
        return Err(Error::validation("candidate pool cannot be empty"));
    }
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(Error::validation(format!(
            "threshold must be within [0, 1], got {}",
            threshold
        )));
    }

    let aggregator = WeightedAggregator::new(profile)?;

    let scored: Vec<(OrderedFloat<f32>, &EntityId)> = candidates
        .par_iter()
        .filter(|candidate| candidate.id != query.id)
        .map(|candidate| {
            aggregator
                .compare(query, candidate)
                .map(|result| (OrderedFloat(result.overall_score), &candidate.id))
        })
        .collect::<Result<Vec<_>>>()?;

    let considered = scored.len();
    let mut kept: Vec<_> = scored
        .into_iter()
        .filter(|(score, _)| score.0 >= threshold)
        .collect();

    // Score descending, then id ascending
    kept.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    kept.truncate(k);

    debug!(
        profile = %profile.name,
        query = %query.id,
        considered,
        returned = kept.len(),
        "ranked candidate pool"
    );

    Ok(kept
        .into_iter()
        .enumerate()
        .map(|(i, (score, id))| RankedCandidate {
            entity_id: id.clone(),
            overall_score: score.0,
            rank: i + 1,
        })
        .collect())
}

/// Ranking engine with an optionally bound weight profile
///
/// Operations fail with `MissingConfiguration` when no profile is bound.
#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    profile: Option<WeightProfile>,
}

impl RankingEngine {
    /// Create an engine bound to `profile`
    pub fn new(profile: WeightProfile) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    /// Create an engine with no profile bound
    pub fn unconfigured() -> Self {
        Self { profile: None }
    }

    /// Bind the profile `name` resolves to in `registry` (or its default)
    pub fn from_registry(registry: &ProfileRegistry, name: Option<&str>) -> Result<Self> {
        Ok(Self::new(registry.resolve(name)?.clone()))
    }

    /// Get the bound profile
    pub fn profile(&self) -> Result<&WeightProfile> {
        self.profile.as_ref().ok_or_else(|| {
            Error::MissingConfiguration("no weight profile bound to ranking engine".to_string())
        })
    }

    /// Compare two boats under the bound profile, keeping the breakdown
    pub fn compare(&self, a: &Entity, b: &Entity) -> Result<ComparisonResult> {
        crate::aggregate::compare(a, b, self.profile()?)
    }

    /// Rank `candidates` against `query` under the bound profile
    pub fn find_top_k(
        &self,
        query: &Entity,
        candidates: &[Entity],
        k: usize,
        threshold: f32,
    ) -> Result<Vec<RankedCandidate>> {
        find_top_k(query, candidates, self.profile()?, k, threshold)
    }

    /// Create a new engine with custom weight overrides
    ///
    /// Fields not in the overrides keep their weights; unknown names are ignored.
    pub fn with_weights(&self, overrides: &HashMap<String, f32>) -> Result<RankingEngine> {
        Ok(RankingEngine::new(self.profile()?.with_weights(overrides)?))
    }
}
