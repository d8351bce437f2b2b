//! Placeholder to source mapping
//!
//! - [`similarity`] - name similarity scoring
//! - [`engine`] - ordered mapping strategies

pub mod engine;
pub mod similarity;

pub use engine::{Mapping, MappingEngine, MappingEntry, MappingReport, Strategy};
pub use similarity::{best_match, NormalizedLevenshtein, StringSimilarity};
