//! # hullmatch Similarity
//!
//! A profile-driven similarity and ranking engine for boat records.
//!
//! Compares two boats across heterogeneous attributes (numbers, categories,
//! feature sets, free text and image embeddings), fuses the per-field
//! scores into one bounded score, and ranks candidate pools
//! deterministically.
//!
//! ## Features
//!
//! - **Weight Profiles**: Declarative, ordered field list with per-field comparator and weight
//! - **Missing Data**: Absent fields contribute a flat uncertainty fraction instead of zero
//! - **Top-K Ranking**: Full-scan ranking with score-then-id ordering
//! - **Explainability**: Per-field contribution facts for downstream reporting
//!
//! ## Example
//!
//! ```rust
//! use hullmatch_core::Entity;
//! use hullmatch_similarity::{compare, FieldConfig, WeightProfile};
//!
//! let profile = WeightProfile::new(
//!     "example",
//!     vec![
//!         FieldConfig::categorical("type", 0.35),
//!         FieldConfig::tolerance("length", 0.25, 100.0),
//!         FieldConfig::set("features", 0.15),
//!     ],
//! );
//!
//! let a = Entity::new("a")
//!     .with_categorical("type", "Yacht")
//!     .with_numeric("length", 42.0)
//!     .with_set("features", ["GPS", "Radar"]);
//! let b = Entity::new("b")
//!     .with_categorical("type", "Yacht")
//!     .with_numeric("length", 40.0)
//!     .with_set("features", ["GPS", "Sonar"]);
//!
//! let result = compare(&a, &b, &profile).unwrap();
//! assert_eq!(result.percentage(), 86);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Profile   │────>│ Comparators │────>│ Aggregator  │
//! │  (fields)   │     │ (per field) │     │ (weighted)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐           │
//!                      │   Ranking   │<──────────┘
//!                      │   (top-k)   │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │  Explain    │
//!                      │  (facts)    │
//!                      └─────────────┘
//! ```

pub mod profile;
pub mod distance;
pub mod aggregate;
pub mod rank;
pub mod explain;
pub mod presets;

// Re-export main types for convenience
pub use profile::{
    WeightProfile,
    FieldConfig,
    FieldKind,
    NumericMode,
    VectorMetric,
    DEFAULT_UNCERTAINTY_FRACTION,
};
pub use aggregate::{compare, ComparisonResult, FieldContribution, WeightedAggregator};
pub use rank::{find_top_k, RankedCandidate, RankingEngine};
pub use explain::{
    annotate,
    diff_results,
    explain_difference,
    ExplainView,
    ExplainedCandidate,
    FieldDelta,
    FieldFact,
    RankingStats,
};
pub use presets::{ProfileRegistry, LEGACY_A, LEGACY_B, VISUAL_HYBRID};
