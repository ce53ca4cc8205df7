//! Fallback cascade over the scoring tiers
//!
//! Tiers are tried in order (remote first when configured, lexicon last)
//! and the first success wins. The lexicon tier cannot fail, so
//! [`SentimentCascade::score`] always returns a well-formed item; callers
//! learn about degraded scoring from [`ScoredItem::model_tier`], never from
//! an error.

use crate::config::{BatchConfig, ScoringConfig};
use crate::error::TierResult;
use crate::lexicon::LexiconScorer;
use crate::normalize::{normalize, NormalizeProfile};
use crate::remote::RemoteClassifier;
use futures::stream::{self, StreamExt};
use moodstream_core::{ModelTier, Result, ScoredItem};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One scoring tier
#[derive(Clone)]
pub enum Scorer {
    /// Remote classification model
    Remote(Arc<RemoteClassifier>),

    /// Deterministic lexicon scorer; `attempt` never fails
    Lexicon(Arc<LexiconScorer>),
}

impl Scorer {
    /// Tier name for logs
    pub fn name(&self) -> &str {
        match self {
            Self::Remote(remote) => remote.model_name(),
            Self::Lexicon(_) => ModelTier::LEXICON,
        }
    }

    /// Score strict-normalized `text`, recording `raw_text` as the source
    pub async fn attempt(&self, raw_text: &str, text: &str) -> TierResult<ScoredItem> {
        match self {
            Self::Remote(remote) => remote.classify_raw(raw_text, text).await,
            Self::Lexicon(lexicon) => Ok(lexicon.score_raw(raw_text, text)),
        }
    }
}

/// Ordered scoring tiers plus batch pacing
pub struct SentimentCascade {
    scorers: Vec<Scorer>,
    lexicon: Arc<LexiconScorer>,
    batch: BatchConfig,
}

impl SentimentCascade {
    /// Build a cascade from explicit tiers.
    ///
    /// A lexicon tier is appended when the list does not already end with one.
    pub fn new(mut scorers: Vec<Scorer>, batch: BatchConfig) -> Self {
        let lexicon = match scorers.last() {
            Some(Scorer::Lexicon(lexicon)) => Arc::clone(lexicon),
            _ => {
                let lexicon = Arc::new(LexiconScorer::new());
                scorers.push(Scorer::Lexicon(Arc::clone(&lexicon)));
                lexicon
            }
        };

        Self {
            scorers,
            lexicon,
            batch,
        }
    }

    /// Build the tiers described by `config`
    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        let lexicon = Arc::new(LexiconScorer::with_extra_words(
            &config.lexicon.extra_positive,
            &config.lexicon.extra_negative,
        ));
        let (positive, negative) = lexicon.dictionary_size();
        debug!(positive, negative, "Lexicon dictionary loaded");

        let mut scorers = Vec::with_capacity(2);
        if config.remote_active() {
            let remote = RemoteClassifier::new(&config.remote)?;
            info!(
                model = %remote.model_name(),
                endpoint = %remote.endpoint(),
                "Remote sentiment tier enabled"
            );
            scorers.push(Scorer::Remote(Arc::new(remote)));
        } else {
            info!("Remote sentiment tier disabled, using lexicon scoring only");
        }
        scorers.push(Scorer::Lexicon(lexicon));

        Ok(Self::new(scorers, config.batch.clone()))
    }

    /// Lexicon-only cascade with no pacing
    pub fn lexicon_only() -> Self {
        Self::new(Vec::new(), BatchConfig::unpaced())
    }

    /// Tier names in attempt order
    pub fn tier_names(&self) -> Vec<&str> {
        self.scorers.iter().map(Scorer::name).collect()
    }

    /// The remote tier, if configured
    pub fn remote(&self) -> Option<&Arc<RemoteClassifier>> {
        self.scorers.iter().find_map(|scorer| match scorer {
            Scorer::Remote(remote) => Some(remote),
            Scorer::Lexicon(_) => None,
        })
    }

    /// Warm up the remote tier if there is one. Failure is non-fatal.
    pub async fn warm_up(&self) -> TierResult<()> {
        match self.remote() {
            Some(remote) => remote.warm_up().await,
            None => Ok(()),
        }
    }

    /// Score one text. Never fails.
    pub async fn score(&self, raw_text: &str) -> ScoredItem {
        let start = Instant::now();
        let normalized = normalize(raw_text, NormalizeProfile::Strict);

        let item = if normalized.is_empty() {
            debug!("Nothing to score after normalization");
            ScoredItem::no_signal(raw_text, normalized)
        } else {
            self.run_tiers(raw_text, &normalized).await
        };

        metrics::counter!("moodstream_scored_total", "tier" => tier_metric(&item.model_tier))
            .increment(1);
        metrics::histogram!("moodstream_scoring_latency_us")
            .record(start.elapsed().as_micros() as f64);

        item
    }

    async fn run_tiers(&self, raw_text: &str, normalized: &str) -> ScoredItem {
        for scorer in &self.scorers {
            match scorer.attempt(raw_text, normalized).await {
                Ok(item) => {
                    debug!(tier = scorer.name(), label = %item.label, "Scored");
                    return item;
                }
                Err(e) => {
                    warn!(tier = scorer.name(), error = %e, "Scoring tier failed, falling back");
                    metrics::counter!("moodstream_tier_fallbacks_total", "reason" => e.kind())
                        .increment(1);
                }
            }
        }

        self.lexicon.score_raw(raw_text, normalized)
    }

    /// Score many texts, keeping input order.
    ///
    /// Sequential with the configured delay between items unless
    /// `batch.concurrency > 1`, in which case at most that many items are in
    /// flight and item starts are still spaced by the delay.
    pub async fn score_batch<S>(&self, texts: &[S]) -> Vec<ScoredItem>
    where
        S: AsRef<str> + Sync,
    {
        let delay = self.batch.inter_item_delay();
        let concurrency = self.batch.concurrency();

        if concurrency == 1 {
            let mut results = Vec::with_capacity(texts.len());
            for (i, text) in texts.iter().enumerate() {
                if i > 0 && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                results.push(self.score(text.as_ref()).await);
            }
            return results;
        }

        // Futures are built up front so the stream holds no borrowing closure.
        let started = tokio::time::Instant::now();
        let pending: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let offset = delay.saturating_mul(u32::try_from(i).unwrap_or(u32::MAX));
                self.score_paced(started + offset, text.as_ref())
            })
            .collect();

        stream::iter(pending).buffered(concurrency).collect().await
    }

    async fn score_paced(&self, at: tokio::time::Instant, raw_text: &str) -> ScoredItem {
        tokio::time::sleep_until(at).await;
        self.score(raw_text).await
    }
}

/// Settings for the one-shot [`score`] entry point
#[derive(Debug, Clone, Default)]
pub struct ScoreConfig {
    pub remote_enabled: bool,
    pub credential: Option<String>,
}

impl From<&ScoreConfig> for ScoringConfig {
    fn from(config: &ScoreConfig) -> Self {
        let mut scoring = ScoringConfig::default();
        scoring.remote.enabled = config.remote_enabled;
        scoring.remote.credential = config.credential.clone();
        scoring
    }
}

/// Score one text with a cascade built from `config`.
///
/// Long-running callers should build a [`SentimentCascade`] once instead.
pub async fn score(text: &str, config: &ScoreConfig) -> ScoredItem {
    match SentimentCascade::from_config(&config.into()) {
        Ok(cascade) => cascade.score(text).await,
        Err(e) => {
            warn!(error = %e, "Could not build remote tier, scoring with lexicon only");
            SentimentCascade::lexicon_only().score(text).await
        }
    }
}

fn tier_metric(tier: &ModelTier) -> &'static str {
    match tier {
        ModelTier::Remote(_) => "remote",
        ModelTier::Lexicon => "lexicon",
        ModelTier::NeutralFallback => "neutral_fallback",
    }
}
