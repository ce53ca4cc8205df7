//! Core types for MoodStream

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Minimum confidence carried by any scored item.
pub const CONFIDENCE_FLOOR: f64 = 0.1;

/// Half-width of the polarity band that maps to neutral.
pub const NEUTRAL_BAND: f64 = 0.1;

/// Canonical three-class sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// All labels in canonical order (negative, neutral, positive)
    pub const ALL: [SentimentLabel; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    /// Label a polarity value.
    ///
    /// This is the single threshold rule shared by item-level scoring and
    /// aggregate statistics: `> 0.1` is positive, `< -0.1` is negative and
    /// everything else (including NaN) is neutral.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > NEUTRAL_BAND {
            Self::Positive
        } else if polarity < -NEUTRAL_BAND {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Signed base value used to turn a class score into a polarity
    pub fn base_polarity(&self) -> f64 {
        match self {
            Self::Negative => -1.0,
            Self::Neutral => 0.0,
            Self::Positive => 1.0,
        }
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "positive" => Ok(Self::Positive),
            other => Err(Error::InvalidLabel(other.to_string())),
        }
    }
}

/// Per-label scores, always holding exactly the three canonical labels.
///
/// Serialized as an ordered list of `{label, score}` objects in canonical
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "Vec<LabelScore>", from = "Vec<LabelScore>")]
pub struct RawScores {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

/// One entry of the serialized score list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: SentimentLabel,
    pub score: f64,
}

impl RawScores {
    pub fn new(negative: f64, neutral: f64, positive: f64) -> Self {
        Self {
            negative,
            neutral,
            positive,
        }
    }

    /// All mass on neutral
    pub fn neutral_only() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    /// Heuristic split of a polarity into three shares.
    pub fn from_polarity(polarity: f64) -> Self {
        Self::new(
            (-polarity).max(0.0),
            1.0 - polarity.abs(),
            polarity.max(0.0),
        )
    }

    /// Score for one label
    pub fn get(&self, label: SentimentLabel) -> f64 {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
        }
    }

    /// Set the score for one label
    pub fn set(&mut self, label: SentimentLabel, score: f64) {
        match label {
            SentimentLabel::Negative => self.negative = score,
            SentimentLabel::Neutral => self.neutral = score,
            SentimentLabel::Positive => self.positive = score,
        }
    }

    /// Label with the highest score; ties go to the earliest canonical label.
    pub fn winner(&self) -> (SentimentLabel, f64) {
        let mut best = (SentimentLabel::Negative, self.negative);
        for label in [SentimentLabel::Neutral, SentimentLabel::Positive] {
            let score = self.get(label);
            if score > best.1 {
                best = (label, score);
            }
        }
        best
    }
}

impl From<RawScores> for Vec<LabelScore> {
    fn from(scores: RawScores) -> Self {
        SentimentLabel::ALL
            .iter()
            .map(|&label| LabelScore {
                label,
                score: scores.get(label),
            })
            .collect()
    }
}

impl From<Vec<LabelScore>> for RawScores {
    fn from(entries: Vec<LabelScore>) -> Self {
        let mut scores = RawScores::default();
        for entry in entries {
            scores.set(entry.label, entry.score);
        }
        scores
    }
}

/// Which scorer produced a result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ModelTier {
    /// Remote classification model, identified by its name
    Remote(String),
    /// Deterministic lexicon scorer
    Lexicon,
    /// Fixed neutral result for input with nothing to score
    NeutralFallback,
}

impl ModelTier {
    pub const LEXICON: &'static str = "rule-based";
    pub const NEUTRAL_FALLBACK: &'static str = "neutral-fallback";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(name) => name,
            Self::Lexicon => Self::LEXICON,
            Self::NeutralFallback => Self::NEUTRAL_FALLBACK,
        }
    }

    /// True when the result did not come from the remote model
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ModelTier> for String {
    fn from(tier: ModelTier) -> Self {
        match tier {
            ModelTier::Remote(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl From<String> for ModelTier {
    fn from(s: String) -> Self {
        match s.as_str() {
            ModelTier::LEXICON => Self::Lexicon,
            ModelTier::NEUTRAL_FALLBACK => Self::NeutralFallback,
            _ => Self::Remote(s),
        }
    }
}

/// Result of scoring one text.
///
/// Constructed only through the constructors below, which keep `label`
/// consistent with `polarity`, clamp `polarity` into [-1, 1] and floor
/// `confidence` at [`CONFIDENCE_FLOOR`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    /// Source text as received
    pub raw_text: String,

    /// Text the producing tier actually scored
    pub normalized_text: String,

    /// Signed sentiment in [-1, 1]
    pub polarity: f64,

    /// Sentiment label
    pub label: SentimentLabel,

    /// Confidence in [0.1, 1]
    pub confidence: f64,

    /// Producing scorer
    pub model_tier: ModelTier,

    /// Per-label scores in canonical order
    pub raw_scores: RawScores,
}

impl ScoredItem {
    /// Terminal result for input with nothing to score
    pub fn no_signal(raw_text: impl Into<String>, normalized_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            normalized_text: normalized_text.into(),
            polarity: 0.0,
            label: SentimentLabel::Neutral,
            confidence: CONFIDENCE_FLOOR,
            model_tier: ModelTier::NeutralFallback,
            raw_scores: RawScores::neutral_only(),
        }
    }

    /// Build a result whose label is derived from `polarity`
    pub fn scored(
        raw_text: impl Into<String>,
        normalized_text: impl Into<String>,
        polarity: f64,
        confidence: f64,
        model_tier: ModelTier,
        raw_scores: RawScores,
    ) -> Self {
        let polarity = sanitize_polarity(polarity);
        Self {
            raw_text: raw_text.into(),
            normalized_text: normalized_text.into(),
            polarity,
            label: SentimentLabel::from_polarity(polarity),
            confidence: sanitize_confidence(confidence),
            model_tier,
            raw_scores,
        }
    }

    /// Build a result with an externally chosen label.
    ///
    /// Returns `None` when `label` disagrees with the threshold rule applied
    /// to `polarity`.
    pub fn scored_with_label(
        raw_text: impl Into<String>,
        normalized_text: impl Into<String>,
        label: SentimentLabel,
        polarity: f64,
        confidence: f64,
        model_tier: ModelTier,
        raw_scores: RawScores,
    ) -> Option<Self> {
        let item = Self::scored(
            raw_text,
            normalized_text,
            polarity,
            confidence,
            model_tier,
            raw_scores,
        );
        (item.label == label).then_some(item)
    }

    /// True when a fallback tier produced this result
    pub fn is_degraded(&self) -> bool {
        self.model_tier.is_degraded()
    }
}

fn sanitize_polarity(polarity: f64) -> f64 {
    if polarity.is_finite() {
        polarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn sanitize_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(CONFIDENCE_FLOOR, 1.0)
    } else {
        CONFIDENCE_FLOOR
    }
}

/// Per-label item counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelCounts {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
}

impl LabelCounts {
    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
        }
    }

    pub fn increment(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Positive => self.positive += 1,
        }
    }

    pub fn sum(&self) -> usize {
        self.negative + self.neutral + self.positive
    }
}

/// Per-label mean polarity (0.0 for labels with no items)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelMeans {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl LabelMeans {
    pub fn get(&self, label: SentimentLabel) -> f64 {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
        }
    }

    pub fn set(&mut self, label: SentimentLabel, mean: f64) {
        match label {
            SentimentLabel::Negative => self.negative = mean,
            SentimentLabel::Neutral => self.neutral = mean,
            SentimentLabel::Positive => self.positive = mean,
        }
    }
}

/// Summary over a set of scored items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Items per label
    pub counts: LabelCounts,

    /// Number of items, always `counts.sum()`
    pub total: usize,

    /// Mean polarity of the items carrying each label
    pub mean_polarity: LabelMeans,

    /// Count-weighted polarity across all labels
    pub weighted_polarity: f64,

    /// Threshold rule applied to `weighted_polarity`
    pub overall_label: SentimentLabel,
}

impl AggregateStats {
    /// Statistics over no items
    pub fn empty() -> Self {
        Self {
            counts: LabelCounts::default(),
            total: 0,
            mean_polarity: LabelMeans::default(),
            weighted_polarity: 0.0,
            overall_label: SentimentLabel::Neutral,
        }
    }
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self::empty()
    }
}

/// Engagement counters reported by the acquisition source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementCounts {
    #[serde(default)]
    pub retweets: u64,

    #[serde(default)]
    pub likes: u64,
}

/// Unscored item handed over by the acquisition source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    /// External identifier used for duplicate suppression
    pub id: String,

    /// Item text (may be empty)
    #[serde(default)]
    pub text: String,

    pub author: String,

    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub engagement: EngagementCounts,
}

/// Scored item as kept by the storage collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    pub id: String,

    /// Search topic the item was ingested under
    pub topic: String,

    pub author: String,

    pub timestamp: DateTime<Utc>,

    pub engagement: EngagementCounts,

    #[serde(flatten)]
    pub scored: ScoredItem,
}

impl StoredItem {
    /// Attach a scoring result to the raw item it came from
    pub fn new(raw: RawItem, topic: impl Into<String>, scored: ScoredItem) -> Self {
        Self {
            id: raw.id,
            topic: topic.into(),
            author: raw.author,
            timestamp: raw.timestamp,
            engagement: raw.engagement,
            scored,
        }
    }
}
