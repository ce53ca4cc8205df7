//! Aggregate statistics over scored items

use moodstream_core::{AggregateStats, LabelCounts, LabelMeans, ScoredItem, SentimentLabel};

/// Fold scored items into per-label counts and a weighted overall polarity.
///
/// Items are grouped by label; `weighted_polarity` is the count-weighted mean
/// of the per-label mean polarities (0 for no items), and `overall_label`
/// applies [`SentimentLabel::from_polarity`] to it, the same rule used for
/// individual items.
pub fn aggregate<'a, I>(items: I) -> AggregateStats
where
    I: IntoIterator<Item = &'a ScoredItem>,
{
    let mut counts = LabelCounts::default();
    let mut sums = LabelMeans::default();

    for item in items {
        counts.increment(item.label);
        sums.set(item.label, sums.get(item.label) + item.polarity);
    }

    let total = counts.sum();
    if total == 0 {
        return AggregateStats::empty();
    }

    let mut means = LabelMeans::default();
    for label in SentimentLabel::ALL {
        let count = counts.get(label);
        if count > 0 {
            means.set(label, sums.get(label) / count as f64);
        }
    }

    let weighted_polarity = SentimentLabel::ALL
        .iter()
        .map(|&label| means.get(label) * counts.get(label) as f64)
        .sum::<f64>()
        / total as f64;

    AggregateStats {
        counts,
        total,
        mean_polarity: means,
        weighted_polarity,
        overall_label: SentimentLabel::from_polarity(weighted_polarity),
    }
}
