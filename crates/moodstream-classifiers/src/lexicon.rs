//! Lexicon-based sentiment scorer (always-available tier)
//!
//! Deterministic, no I/O. Tokens and dictionary words are reduced with the
//! same English stemmer before lookup, so "loving" matches "love".

use moodstream_core::{ModelTier, RawScores, ScoredItem};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Confidence reported when the text was scanned but no sentiment word matched
pub const INDIFFERENT_CONFIDENCE: f64 = 0.5;

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "awesome",
    "fantastic",
    "love",
    "like",
    "nice",
    "best",
    "better",
    "happy",
    "joy",
    "positive",
    "wonderful",
    "perfect",
    "outstanding",
    "brilliant",
    "superb",
    "incredible",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "hate",
    "worst",
    "horrible",
    "sad",
    "angry",
    "negative",
    "dislike",
    "stupid",
    "dumb",
    "disappointing",
    "poor",
    "rubbish",
    "garbage",
    "trash",
    "useless",
    "horrendous",
    "disgusting",
    "worthless",
    "pathetic",
];

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern compiles"));

/// Counts of dictionary hits in one text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexiconMatches {
    pub positive: usize,
    pub negative: usize,
}

impl LexiconMatches {
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }

    /// `(pos - neg) / (pos + neg)`, or `None` when nothing matched
    pub fn polarity(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| (self.positive as f64 - self.negative as f64) / total as f64)
    }
}

/// Stemming lexicon scorer
pub struct LexiconScorer {
    stemmer: Stemmer,
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl LexiconScorer {
    /// Scorer with the built-in word lists
    pub fn new() -> Self {
        Self::with_words(POSITIVE_WORDS, NEGATIVE_WORDS)
    }

    /// Scorer with caller-supplied word lists
    pub fn with_words<P, N>(positive: &[P], negative: &[N]) -> Self
    where
        P: AsRef<str>,
        N: AsRef<str>,
    {
        let stemmer = Stemmer::create(Algorithm::English);
        let positive = stem_set(&stemmer, positive.iter().map(AsRef::as_ref));
        let negative = stem_set(&stemmer, negative.iter().map(AsRef::as_ref));

        Self {
            stemmer,
            positive,
            negative,
        }
    }

    /// Built-in word lists extended with extra words
    pub fn with_extra_words(extra_positive: &[String], extra_negative: &[String]) -> Self {
        let mut scorer = Self::new();
        scorer
            .positive
            .extend(stem_set(&scorer.stemmer, extra_positive.iter().map(String::as_str)));
        scorer
            .negative
            .extend(stem_set(&scorer.stemmer, extra_negative.iter().map(String::as_str)));
        scorer
    }

    /// Count dictionary hits in `text`.
    ///
    /// A stem present in both sets counts as positive.
    pub fn matches(&self, text: &str) -> LexiconMatches {
        let lowered = text.to_lowercase();
        let cleaned = NON_WORD.replace_all(&lowered, " ");

        let mut matches = LexiconMatches::default();
        for token in cleaned.split_whitespace() {
            let stem = self.stemmer.stem(token);
            if self.positive.contains(stem.as_ref()) {
                matches.positive += 1;
            } else if self.negative.contains(stem.as_ref()) {
                matches.negative += 1;
            }
        }
        matches
    }

    /// Score already-normalized text
    pub fn score(&self, normalized_text: &str) -> ScoredItem {
        self.score_raw(normalized_text, normalized_text)
    }

    /// Score `normalized_text`, recording `raw_text` as the source
    pub fn score_raw(&self, raw_text: &str, normalized_text: &str) -> ScoredItem {
        let matches = self.matches(normalized_text);

        match matches.polarity() {
            None => ScoredItem::scored(
                raw_text,
                normalized_text,
                0.0,
                INDIFFERENT_CONFIDENCE,
                ModelTier::Lexicon,
                RawScores::neutral_only(),
            ),
            Some(polarity) => ScoredItem::scored(
                raw_text,
                normalized_text,
                polarity,
                polarity.abs(),
                ModelTier::Lexicon,
                RawScores::from_polarity(polarity),
            ),
        }
    }

    /// Number of distinct positive and negative stems
    pub fn dictionary_size(&self) -> (usize, usize) {
        (self.positive.len(), self.negative.len())
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn stem_set<'a>(stemmer: &Stemmer, words: impl Iterator<Item = &'a str>) -> HashSet<String> {
    words
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .map(|word| stemmer.stem(&word).into_owned())
        .collect()
}
