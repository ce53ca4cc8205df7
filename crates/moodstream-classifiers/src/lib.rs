//! MoodStream Classifiers
//!
//! Tiered sentiment scoring for short social-media text.
//!
//! Scorers are tried in order of preference:
//! - Remote: hosted three-class model, reached over HTTP with a bounded timeout
//! - Lexicon: stemmed word lists, deterministic and always available
//!
//! A scoring call never fails. When the remote tier is unavailable or
//! returns something unrecognizable the cascade falls through to the
//! lexicon, and the result's `model_tier` says which tier produced it.

pub mod aggregate;
pub mod cascade;
pub mod config;
pub mod error;
pub mod labels;
pub mod lexicon;
pub mod normalize;
pub mod remote;

pub use aggregate::aggregate;
pub use cascade::{score, ScoreConfig, Scorer, SentimentCascade};
pub use config::{BatchConfig, LexiconConfig, RemoteConfig, ScoringConfig};
pub use error::{TierError, TierResult};
pub use labels::{canonical_label, reconcile};
pub use lexicon::LexiconScorer;
pub use normalize::{normalize, NormalizeProfile, MAX_REMOTE_CHARS};
pub use remote::RemoteClassifier;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aggregate::aggregate;
    pub use crate::cascade::{ScoreConfig, SentimentCascade};
    pub use crate::config::ScoringConfig;
    pub use crate::normalize::{normalize, NormalizeProfile};
    pub use moodstream_core::prelude::*;
}
