//! # hullmatch
//!
//! A boat similarity and ranking engine.
//!
//! hullmatch compares boat records across heterogeneous attributes and
//! image embeddings, fuses the per-field scores into one bounded score
//! under a configurable weight profile, and returns deterministic top-K
//! results with per-field explanations.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! hullmatch similar --entities boats.json --query b1 --k 5 --preset legacy-a
//! hullmatch compare --entities boats.json --a b1 --b b2 --profile profile.json --explain most-different
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use hullmatch::prelude::*;
//!
//! let registry = ProfileRegistry::with_presets();
//! let engine = RankingEngine::from_registry(&registry, Some(LEGACY_A)).unwrap();
//!
//! let query = Entity::new("q").with_categorical("type", "Sloop").with_numeric("length", 34.0);
//! let pool = vec![
//!     Entity::new("a").with_categorical("type", "Catamaran").with_numeric("length", 38.0),
//!     Entity::new("b").with_categorical("type", "Trawler").with_numeric("length", 34.0),
//! ];
//!
//! let top = engine.find_top_k(&query, &pool, 1, 0.0).unwrap();
//! assert_eq!(top[0].rank, 1);
//! ```
//!
//! ## Crate Structure
//!
//! - [`hullmatch-core`](hullmatch_core) - Entities, vectors, embedding cache, errors
//! - [`hullmatch-similarity`](hullmatch_similarity) - Profiles, comparators, aggregation, ranking, explanations

pub mod config;

// Re-export core types
pub use hullmatch_core::{
    AttributeValue, Entity, EntityId, Field,
    Vector, normalize_distance,
    EmbeddingCache, CacheConfig, CacheStats, EvictionPolicy,
    Error, Result,
};

// Re-export similarity engine
pub use hullmatch_similarity::{
    WeightProfile, FieldConfig, FieldKind, NumericMode, VectorMetric,
    compare, ComparisonResult, FieldContribution, WeightedAggregator,
    find_top_k, RankedCandidate, RankingEngine,
    explain_difference, diff_results, annotate,
    ExplainView, ExplainedCandidate, FieldDelta, FieldFact, RankingStats,
    ProfileRegistry, LEGACY_A, LEGACY_B, VISUAL_HYBRID,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AttributeValue, Entity, EntityId, Field, Vector,
        EmbeddingCache, CacheConfig, EvictionPolicy,
        Error, Result,
        WeightProfile, FieldConfig,
        compare, ComparisonResult,
        find_top_k, RankedCandidate, RankingEngine,
        explain_difference, ExplainView, FieldFact,
        ProfileRegistry, LEGACY_A, LEGACY_B, VISUAL_HYBRID,
    };
}
