//! Canonicalization of remote class labels
//!
//! Sentiment models label their three classes either by name
//! (`negative`/`neutral`/`positive`) or by position (`LABEL_0`/`LABEL_1`/`LABEL_2`).
//! Everything downstream works with [`SentimentLabel`].

use crate::error::TierError;
use moodstream_core::{RawScores, SentimentLabel};
use serde_json::Value;

/// Every accepted spelling of each canonical class
const LABEL_TABLE: [(&str, SentimentLabel); 6] = [
    ("negative", SentimentLabel::Negative),
    ("LABEL_0", SentimentLabel::Negative),
    ("neutral", SentimentLabel::Neutral),
    ("LABEL_1", SentimentLabel::Neutral),
    ("positive", SentimentLabel::Positive),
    ("LABEL_2", SentimentLabel::Positive),
];

/// Map an upstream class name to its canonical label (case-insensitive)
pub fn canonical_label(name: &str) -> Option<SentimentLabel> {
    let name = name.trim();
    LABEL_TABLE
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, label)| *label)
}

/// Turn a classification response body into canonical scores.
///
/// Accepts a non-empty list of `{label, score}` objects, or a list whose
/// first element is such a list. Classes absent from the response score 0.0;
/// when a class appears twice the first entry wins. Entries with labels
/// outside the table are ignored, but at least one must be recognized.
pub fn reconcile(body: &Value) -> Result<RawScores, TierError> {
    let entries = score_entries(body)?;

    let mut scores = RawScores::default();
    let mut seen: Vec<SentimentLabel> = Vec::with_capacity(3);

    for entry in entries {
        let object = entry
            .as_object()
            .ok_or_else(|| TierError::malformed("score entry is not an object"))?;

        let name = object
            .get("label")
            .and_then(Value::as_str)
            .ok_or_else(|| TierError::malformed("score entry has no string label"))?;

        let score = object
            .get("score")
            .and_then(Value::as_f64)
            .ok_or_else(|| TierError::malformed(format!("label {name} has no numeric score")))?;

        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(TierError::malformed(format!(
                "label {name} has out-of-range score {score}"
            )));
        }

        if let Some(label) = canonical_label(name) {
            if !seen.contains(&label) {
                scores.set(label, score);
                seen.push(label);
            }
        }
    }

    if seen.is_empty() {
        return Err(TierError::malformed("no recognized sentiment labels"));
    }

    Ok(scores)
}

fn score_entries(body: &Value) -> Result<&Vec<Value>, TierError> {
    let list = body
        .as_array()
        .ok_or_else(|| TierError::malformed(format!("expected a list, got {}", kind_of(body))))?;

    match list.first() {
        None => Err(TierError::malformed("empty score list")),
        Some(Value::Array(inner)) if inner.is_empty() => {
            Err(TierError::malformed("empty nested score list"))
        }
        Some(Value::Array(inner)) => Ok(inner),
        Some(_) => Ok(list),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
