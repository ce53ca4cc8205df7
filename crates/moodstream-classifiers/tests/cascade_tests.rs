//! Remote tier and fallback cascade tests
//!
//! Runs the remote classifier against a local axum stub standing in for the
//! hosted inference endpoint, covering both label schemes, malformed bodies,
//! error statuses, timeouts and unreachable endpoints.

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use moodstream_classifiers::{
    BatchConfig, RemoteClassifier, RemoteConfig, Scorer, SentimentCascade, TierError,
};
use moodstream_core::{ModelTier, SentimentLabel, CONFIDENCE_FLOOR};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MODEL: &str = "stub-model";
const ROUTE: &str = "/models/stub-model";

/// Requests seen by a recording stub: (authorization header, request body)
type Seen = Arc<Mutex<Vec<(String, Value)>>>;

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}{ROUTE}")
}

fn json_stub(body: Value) -> Router {
    Router::new().route(
        ROUTE,
        post(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    )
}

fn recording_stub(body: Value, seen: Seen) -> Router {
    Router::new().route(
        ROUTE,
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let body = body.clone();
            let seen = Arc::clone(&seen);
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                seen.lock().unwrap().push((auth, request));
                Json(body)
            }
        }),
    )
}

/// Answers positive for inputs mentioning "good", negative otherwise
fn echo_stub() -> Router {
    Router::new().route(
        ROUTE,
        post(|Json(request): Json<Value>| async move {
            let text = request["inputs"].as_str().unwrap_or_default().to_string();
            let (neg, pos) = if text.contains("good") { (0.1, 0.8) } else { (0.8, 0.1) };
            Json(json!([
                {"label": "negative", "score": neg},
                {"label": "neutral", "score": 0.1},
                {"label": "positive", "score": pos}
            ]))
        }),
    )
}

async fn unreachable_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{ROUTE}")
}

fn remote_config(endpoint: &str, timeout_ms: u64) -> RemoteConfig {
    RemoteConfig {
        enabled: true,
        endpoint: endpoint.to_string(),
        model_name: MODEL.to_string(),
        credential: Some("test-token".to_string()),
        timeout_ms,
        warmup_timeout_ms: timeout_ms,
    }
}

fn remote(endpoint: &str, timeout_ms: u64) -> Arc<RemoteClassifier> {
    Arc::new(RemoteClassifier::new(&remote_config(endpoint, timeout_ms)).unwrap())
}

fn cascade(endpoint: &str, timeout_ms: u64) -> SentimentCascade {
    SentimentCascade::new(
        vec![Scorer::Remote(remote(endpoint, timeout_ms))],
        BatchConfig::unpaced(),
    )
}

fn three_class(neg: f64, neu: f64, pos: f64) -> Value {
    json!([
        {"label": "LABEL_0", "score": neg},
        {"label": "LABEL_1", "score": neu},
        {"label": "LABEL_2", "score": pos}
    ])
}

#[tokio::test]
async fn test_remote_positional_labels() {
    let endpoint = spawn_stub(json_stub(three_class(0.7, 0.2, 0.1))).await;
    let item = cascade(&endpoint, 2_000)
        .score("This is the worst experience ever.")
        .await;

    assert_eq!(item.model_tier, ModelTier::Remote(MODEL.to_string()));
    assert_eq!(item.label, SentimentLabel::Negative);
    assert!((item.polarity + 0.7).abs() < 1e-12);
    assert!((item.confidence - 0.7).abs() < 1e-12);
}

#[tokio::test]
async fn test_remote_semantic_labels_nested() {
    let body = json!([[
        {"label": "positive", "score": 0.9},
        {"label": "neutral", "score": 0.07},
        {"label": "negative", "score": 0.03}
    ]]);
    let endpoint = spawn_stub(json_stub(body)).await;
    let item = cascade(&endpoint, 2_000).score("JavaScript is fantastic!").await;

    assert_eq!(item.model_tier, ModelTier::Remote(MODEL.to_string()));
    assert_eq!(item.label, SentimentLabel::Positive);
    assert!((item.polarity - 0.9).abs() < 1e-12);
    assert!((item.raw_scores.negative - 0.03).abs() < 1e-12);
}

#[tokio::test]
async fn test_remote_request_shape() {
    let seen: Seen = Arc::default();
    let endpoint = spawn_stub(recording_stub(three_class(0.1, 0.1, 0.8), Arc::clone(&seen))).await;

    let item = cascade(&endpoint, 2_000)
        .score("Loving it!!! @friend #blessed https://t.co/xyz")
        .await;

    assert_eq!(item.normalized_text, "Loving it blessed");
    assert_eq!(item.raw_text, "Loving it!!! @friend #blessed https://t.co/xyz");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "Bearer test-token");
    assert_eq!(seen[0].1, json!({"inputs": "Loving it blessed"}));
}

#[tokio::test]
async fn test_degenerate_input_never_reaches_endpoint() {
    let seen: Seen = Arc::default();
    let endpoint = spawn_stub(recording_stub(three_class(0.1, 0.1, 0.8), Arc::clone(&seen))).await;
    let cascade = cascade(&endpoint, 2_000);

    for text in ["", "   ", "?!", "a"] {
        let item = cascade.score(text).await;
        assert_eq!(item.model_tier, ModelTier::NeutralFallback, "input {text:?}");
        assert_eq!(item.polarity, 0.0);
        assert_eq!(item.confidence, CONFIDENCE_FLOOR);
    }

    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_falls_back_to_lexicon() {
    let body = json!({"error": "Model is currently loading", "estimated_time": 20.0});
    let endpoint = spawn_stub(json_stub(body)).await;

    let item = cascade(&endpoint, 2_000).score("I love this amazing product").await;

    assert_eq!(item.model_tier, ModelTier::Lexicon);
    assert_eq!(item.label, SentimentLabel::Positive);
    assert_eq!(item.polarity, 1.0);
    assert_eq!(item.normalized_text, "I love this amazing product");
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let router = Router::new().route(ROUTE, post(|| async { "<html>oops</html>" }));
    let endpoint = spawn_stub(router).await;

    let err = remote(&endpoint, 2_000).classify("good stuff").await.unwrap_err();
    assert!(matches!(err, TierError::UpstreamMalformed(_)));
}

#[tokio::test]
async fn test_error_status_is_unavailable() {
    for status in [
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusCode::UNAUTHORIZED,
        StatusCode::TOO_MANY_REQUESTS,
    ] {
        let router = Router::new().route(ROUTE, post(move || async move { (status, "nope") }));
        let endpoint = spawn_stub(router).await;

        let err = remote(&endpoint, 2_000).classify("good stuff").await.unwrap_err();
        match err {
            TierError::UpstreamUnavailable(msg) => {
                assert!(msg.contains(status.as_str()), "{msg}")
            }
            other => panic!("expected unavailable, got {other:?}"),
        }

        let item = cascade(&endpoint, 2_000).score("good stuff").await;
        assert_eq!(item.model_tier, ModelTier::Lexicon);
    }
}

#[tokio::test]
async fn test_timeout_falls_back_without_hanging() {
    let router = Router::new().route(
        ROUTE,
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(three_class(0.1, 0.1, 0.8))
        }),
    );
    let endpoint = spawn_stub(router).await;

    let start = Instant::now();
    let item = cascade(&endpoint, 200).score("terrible awful day").await;

    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(item.model_tier, ModelTier::Lexicon);
    assert_eq!(item.label, SentimentLabel::Negative);
}

#[tokio::test]
async fn test_unreachable_endpoint_falls_back() {
    let endpoint = unreachable_endpoint().await;

    let err = remote(&endpoint, 1_000).classify("good stuff").await.unwrap_err();
    assert!(matches!(err, TierError::UpstreamUnavailable(_)));

    let item = cascade(&endpoint, 1_000).score("good bad").await;
    assert_eq!(item.model_tier, ModelTier::Lexicon);
    assert_eq!(item.label, SentimentLabel::Neutral);
    assert_eq!(item.confidence, CONFIDENCE_FLOOR);
}

#[tokio::test]
async fn test_warm_up_success_sets_flag() {
    let seen: Seen = Arc::default();
    let endpoint = spawn_stub(recording_stub(three_class(0.0, 0.1, 0.9), Arc::clone(&seen))).await;
    let remote = remote(&endpoint, 2_000);

    assert!(!remote.is_warm());
    remote.warm_up().await.unwrap();
    assert!(remote.is_warm());
    assert_eq!(seen.lock().unwrap()[0].1, json!({"inputs": "I love this!"}));
}

#[tokio::test]
async fn test_warm_up_failure_is_not_fatal() {
    let endpoint = unreachable_endpoint().await;
    let cascade = cascade(&endpoint, 500);

    assert!(cascade.warm_up().await.is_err());
    assert!(!cascade.remote().unwrap().is_warm());

    let item = cascade.score("happy happy joy").await;
    assert_eq!(item.model_tier, ModelTier::Lexicon);
    assert_eq!(item.label, SentimentLabel::Positive);
}

#[tokio::test]
async fn test_concurrent_batch_keeps_input_order() {
    let endpoint = spawn_stub(echo_stub()).await;
    let cascade = SentimentCascade::new(
        vec![Scorer::Remote(remote(&endpoint, 2_000))],
        BatchConfig {
            inter_item_delay_ms: 5,
            concurrency: 3,
        },
    );

    let texts: Vec<String> = (0..9)
        .map(|i| {
            if i % 3 == 0 {
                format!("item {i} is good")
            } else {
                format!("item {i} is not")
            }
        })
        .collect();

    let results = cascade.score_batch(texts.as_slice()).await;

    assert_eq!(results.len(), texts.len());
    for (i, (text, item)) in texts.iter().zip(&results).enumerate() {
        assert_eq!(&item.raw_text, text);
        let expected = if i % 3 == 0 {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };
        assert_eq!(item.label, expected, "item {i}");
        assert_eq!(item.model_tier, ModelTier::Remote(MODEL.to_string()));
    }
}
