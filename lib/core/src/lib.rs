//! # hullmatch Core
//!
//! Core types for the hullmatch boat similarity engine.
//!
//! - [`Entity`] - A boat record: stable id plus typed, possibly-absent attributes
//! - [`Vector`] - Embedding vector with cosine / Euclidean comparison
//! - [`EmbeddingCache`] - Bounded key → embedding store with LRU or FIFO eviction
//! - [`Error`] - Validation, dimension mismatch and missing configuration failures
//!
//! ## Example
//!
//! ```rust
//! use hullmatch_core::{Entity, Field, Vector};
//!
//! let boat = Entity::new("b1")
//!     .with_categorical("type", "Catamaran")
//!     .with_numeric("length", 38.0)
//!     .with_vector("image", Vector::new(vec![0.1, 0.7, 0.2]));
//!
//! assert!(boat.field("type").is_present());
//! assert_eq!(boat.field("year"), Field::Absent);
//!
//! let other = Vector::new(vec![0.1, 0.6, 0.3]);
//! let sim = Vector::new(vec![0.1, 0.7, 0.2]).cosine_similarity(&other).unwrap();
//! assert!(sim > 0.9);
//! ```

pub mod cache;
pub mod entity;
pub mod error;
pub mod vector;

pub use cache::{CacheConfig, CacheStats, EmbeddingCache, EvictionPolicy, DEFAULT_CACHE_CAPACITY};
pub use entity::{AttributeValue, Entity, EntityId, Field};
pub use error::{Error, Result};
pub use vector::{normalize_distance, Vector};
