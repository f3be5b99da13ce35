//! Structured explanations of comparison results
//!
//! Emits per-field facts showing how a score was built up. Only data is
//! produced here; rendering it as prose is left to the caller.

use crate::aggregate::{ComparisonResult, FieldContribution, WeightedAggregator};
use crate::profile::WeightProfile;
use crate::rank::RankedCandidate;
use hullmatch_core::{AttributeValue, Entity, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordering of explained fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainView {
    /// Largest contribution first
    #[default]
    MostSimilar,
    /// Smallest contribution first
    MostDifferent,
}

/// A single field's part in a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldFact {
    pub field: String,
    pub value_a: Option<AttributeValue>,
    pub value_b: Option<AttributeValue>,
    /// Comparator output; `None` when the field was absent on either side
    pub score: Option<f32>,
    pub contribution: f32,
    pub applied_weight: f32,
}

impl From<&FieldContribution> for FieldFact {
    fn from(c: &FieldContribution) -> Self {
        Self {
            field: c.field.clone(),
            value_a: c.value_a.clone(),
            value_b: c.value_b.clone(),
            score: c.score,
            contribution: c.contribution,
            applied_weight: c.applied_weight,
        }
    }
}

/// Order the fields of a comparison by contribution
///
/// Ties keep profile order. Fails if the result was computed without a
/// breakdown.
pub fn explain_difference(result: &ComparisonResult, view: ExplainView) -> Result<Vec<FieldFact>> {
    let breakdown = result.breakdown.as_ref().ok_or_else(|| {
        Error::validation("comparison result was computed without a per-field breakdown")
    })?;

    let mut facts: Vec<FieldFact> = breakdown.iter().map(FieldFact::from).collect();
    match view {
        ExplainView::MostSimilar => {
            facts.sort_by(|a, b| b.contribution.total_cmp(&a.contribution))
        }
        ExplainView::MostDifferent => {
            facts.sort_by(|a, b| a.contribution.total_cmp(&b.contribution))
        }
    }

    Ok(facts)
}

/// Change in one field's contribution between two comparisons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDelta {
    pub field: String,
    pub left: f32,
    pub right: f32,
    /// `right - left`
    pub delta: f32,
}

/// Compare two breakdowns taken under the same profile, field by field
///
/// Useful for "why did B rank above C for query A". Sorted by the size of
/// the change, largest first; ties keep profile order.
pub fn diff_results(left: &ComparisonResult, right: &ComparisonResult) -> Result<Vec<FieldDelta>> {
    let missing = || Error::validation("both comparison results need a per-field breakdown");
    let left_fields = left.breakdown.as_ref().ok_or_else(missing)?;
    let right_fields = right.breakdown.as_ref().ok_or_else(missing)?;

    let right_by_name: HashMap<&str, &FieldContribution> = right_fields
        .iter()
        .map(|f| (f.field.as_str(), f))
        .collect();

    if left_fields.len() != right_fields.len() {
        return Err(Error::validation(
            "comparison results were produced by different profiles",
        ));
    }

    let mut deltas = Vec::with_capacity(left_fields.len());
    for l in left_fields {
        let r = right_by_name.get(l.field.as_str()).ok_or_else(|| {
            Error::validation(format!("field '{}' is missing from the second result", l.field))
        })?;
        deltas.push(FieldDelta {
            field: l.field.clone(),
            left: l.contribution,
            right: r.contribution,
            delta: r.contribution - l.contribution,
        });
    }

    deltas.sort_by(|a, b| b.delta.abs().total_cmp(&a.delta.abs()));
    Ok(deltas)
}

/// A ranked candidate annotated with its field facts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedCandidate {
    #[serde(flatten)]
    pub candidate: RankedCandidate,
    pub explain: Vec<FieldFact>,
}

/// Annotate ranking output with per-field facts against the query
///
/// Every ranked id must be present in `pool`.
pub fn annotate(
    query: &Entity,
    pool: &[Entity],
    ranked: Vec<RankedCandidate>,
    profile: &WeightProfile,
    view: ExplainView,
) -> Result<Vec<ExplainedCandidate>> {
    let aggregator = WeightedAggregator::new(profile)?.with_breakdown(true);
    let by_id: HashMap<_, _> = pool.iter().map(|e| (&e.id, e)).collect();

    ranked
        .into_iter()
        .map(|candidate| {
            let entity = by_id.get(&candidate.entity_id).ok_or_else(|| {
                Error::validation(format!(
                    "ranked entity '{}' is not in the candidate pool",
                    candidate.entity_id
                ))
            })?;
            let result = aggregator.compare(query, entity)?;
            Ok(ExplainedCandidate {
                candidate,
                explain: explain_difference(&result, view)?,
            })
        })
        .collect()
}

/// Summary statistics for a ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingStats {
    /// Number of candidates considered
    pub candidates_count: usize,
    /// Number of results returned
    pub results_count: usize,
    /// Average score of results
    pub avg_score: f32,
    /// Score of best result
    pub best_score: f32,
}

impl RankingStats {
    /// Compute stats from ranked results
    pub fn compute(results: &[RankedCandidate], candidates_count: usize) -> Self {
        if results.is_empty() {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
            };
        }

        let total: f32 = results.iter().map(|r| r.overall_score).sum();
        let best_score = results
            .iter()
            .map(|r| r.overall_score)
            .fold(0.0f32, f32::max);

        Self {
            candidates_count,
            results_count: results.len(),
            avg_score: total / results.len() as f32,
            best_score,
        }
    }
}
