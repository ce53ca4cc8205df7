//! MoodStream Core
//!
//! Core types and utilities shared across MoodStream components.
//!
//! This crate provides:
//! - The canonical three-class sentiment scheme and its threshold rule
//! - The scored item produced by every scoring tier
//! - Aggregate statistics and collaborator contracts (raw and stored items)
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    AggregateStats, EngagementCounts, LabelCounts, LabelMeans, ModelTier, RawItem, RawScores,
    ScoredItem, SentimentLabel, StoredItem, CONFIDENCE_FLOOR, NEUTRAL_BAND,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        AggregateStats, ModelTier, RawItem, RawScores, ScoredItem, SentimentLabel, StoredItem,
    };
}
