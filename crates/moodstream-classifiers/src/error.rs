//! Failures of a single scoring tier
//!
//! These never escape [`SentimentCascade::score`](crate::SentimentCascade::score);
//! the cascade logs them and moves on to the next tier.

/// Result of one tier attempt
pub type TierResult<T> = std::result::Result<T, TierError>;

/// Reason a scoring tier could not produce a result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TierError {
    /// Network failure, timeout, or non-success status from the remote endpoint
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The endpoint answered but the body is not a recognized score list
    #[error("upstream response malformed: {0}")]
    UpstreamMalformed(String),
}

impl TierError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::UpstreamMalformed(msg.into())
    }

    /// Short tag used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable(_) => "unavailable",
            Self::UpstreamMalformed(_) => "malformed",
        }
    }
}
