//! Scoring benchmarks
//!
//! Covers the local, deterministic parts of the pipeline: normalization,
//! lexicon scoring, the lexicon-only cascade and aggregation. The remote tier
//! is network-bound and not measured here.
//!
//! Run with: cargo bench -p moodstream-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

use moodstream_classifiers::{aggregate, normalize, LexiconScorer, NormalizeProfile, SentimentCascade};
use moodstream_core::{ModelTier, RawScores, ScoredItem};

const TEST_CASES: &[(&str, &str)] = &[
    ("short_positive", "I love this amazing product"),
    ("short_neutral", "The meeting is at noon"),
    (
        "tagged",
        "Loving the new #RustLang release!!! @rustlang https://blog.rust-lang.org/2024/x so good",
    ),
    (
        "long_mixed",
        "Honestly the first half was terrible and the service was awful, but the ending was \
         brilliant and the cast were wonderful. Would I watch it again? Probably, the best \
         parts outweigh the worst ones. #movienight @cinema https://example.com/review",
    ),
];

fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Normalize");
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("strict", name), text, |b, text| {
            b.iter(|| normalize(black_box(text), NormalizeProfile::Strict))
        });
        group.bench_with_input(BenchmarkId::new("preserve_tags", name), text, |b, text| {
            b.iter(|| normalize(black_box(text), NormalizeProfile::PreserveTags))
        });
    }

    group.finish();
}

fn benchmark_lexicon(c: &mut Criterion) {
    let scorer = LexiconScorer::new();

    let mut group = c.benchmark_group("Lexicon_Scorer");
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        let normalized = normalize(text, NormalizeProfile::Strict);
        group.bench_with_input(BenchmarkId::new("score", name), &normalized, |b, text| {
            b.iter(|| scorer.score(black_box(text)))
        });
    }

    group.finish();
}

fn benchmark_cascade(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cascade = SentimentCascade::lexicon_only();

    let mut group = c.benchmark_group("Lexicon_Cascade");
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("score", name), text, |b, text| {
            b.iter(|| rt.block_on(async { cascade.score(black_box(text)).await }))
        });
    }

    let batch: Vec<&str> = TEST_CASES.iter().map(|(_, text)| *text).cycle().take(100).collect();
    group.bench_function("batch_100", |b| {
        b.iter(|| rt.block_on(async { cascade.score_batch(black_box(batch.as_slice())).await }))
    });

    group.finish();
}

fn benchmark_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Aggregate");

    for size in [10usize, 1_000, 10_000] {
        let items: Vec<ScoredItem> = (0..size)
            .map(|i| {
                let polarity = ((i % 21) as f64 - 10.0) / 10.0;
                ScoredItem::scored(
                    "t",
                    "t",
                    polarity,
                    polarity.abs(),
                    ModelTier::Lexicon,
                    RawScores::from_polarity(polarity),
                )
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| aggregate(black_box(items)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_normalize,
    benchmark_lexicon,
    benchmark_cascade,
    benchmark_aggregate
);
criterion_main!(benches);
