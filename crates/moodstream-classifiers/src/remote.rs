//! Remote three-class sentiment model (preferred tier)
//!
//! Talks to a hosted text-classification endpoint (Hugging Face Inference API
//! shape: `POST {"inputs": text}` answered by a list of `{label, score}`).
//! Built once at startup and shared; the only mutable state is the advisory
//! warm-up flag.

use crate::config::RemoteConfig;
use crate::error::{TierError, TierResult};
use crate::labels::reconcile;
use crate::normalize::{normalize, NormalizeProfile};
use moodstream_core::{Error, ModelTier, Result, ScoredItem};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shortest prepared text worth sending upstream
pub const MIN_REMOTE_CHARS: usize = 2;

const WARMUP_TEXT: &str = "I love this!";

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Client for the remote classification model
pub struct RemoteClassifier {
    client: reqwest::Client,
    endpoint: String,
    credential: String,
    model_name: String,
    timeout: Duration,
    warmup_timeout: Duration,
    warmed: AtomicBool,
}

impl RemoteClassifier {
    /// Build the classifier. Fails when no credential is configured.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let credential = config
            .credential()
            .ok_or_else(|| Error::config("remote tier requires a credential"))?
            .to_string();

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            credential,
            model_name: config.model_name.clone(),
            timeout: config.timeout(),
            warmup_timeout: config.warmup_timeout(),
            warmed: AtomicBool::new(false),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether a warm-up request has succeeded. Advisory only.
    pub fn is_warm(&self) -> bool {
        self.warmed.load(Ordering::Relaxed)
    }

    /// Send a warm-up request so the hosted model is loaded before real traffic.
    ///
    /// Failure is logged and returned; scoring works either way.
    pub async fn warm_up(&self) -> TierResult<()> {
        match self.request(WARMUP_TEXT, self.warmup_timeout).await {
            Ok(_) => {
                self.warmed.store(true, Ordering::Relaxed);
                info!(model = %self.model_name, "Remote sentiment model warmed up");
                Ok(())
            }
            Err(e) => {
                warn!(model = %self.model_name, error = %e, "Remote model warm-up failed");
                Err(e)
            }
        }
    }

    /// Classify already-normalized text
    pub async fn classify(&self, normalized_text: &str) -> TierResult<ScoredItem> {
        self.classify_raw(normalized_text, normalized_text).await
    }

    /// Classify `text`, recording `raw_text` as the source
    pub async fn classify_raw(
        &self,
        raw_text: &str,
        text: &str,
    ) -> TierResult<ScoredItem> {
        let prepared = normalize(text, NormalizeProfile::PreserveTags);

        if prepared.chars().count() < MIN_REMOTE_CHARS {
            debug!(model = %self.model_name, "Input too short for remote model, returning neutral");
            return Ok(ScoredItem::no_signal(raw_text, prepared));
        }

        debug!(model = %self.model_name, chars = prepared.chars().count(), "Remote classification");
        let body = self.request(&prepared, self.timeout).await?;
        self.interpret(raw_text, &prepared, &body)
    }

    /// Turn a response body into a scored item.
    ///
    /// The winning class is the highest score (ties resolved in
    /// negative, neutral, positive order) and polarity is that class's
    /// signed base value times its own score.
    pub fn interpret(
        &self,
        raw_text: &str,
        prepared: &str,
        body: &Value,
    ) -> TierResult<ScoredItem> {
        let scores = reconcile(body)?;
        let (label, score) = scores.winner();
        let polarity = label.base_polarity() * score;

        ScoredItem::scored_with_label(
            raw_text,
            prepared,
            label,
            polarity,
            score,
            ModelTier::Remote(self.model_name.clone()),
            scores,
        )
        .ok_or_else(|| {
            TierError::malformed(format!(
                "winning class {label} has too little mass ({score}) to carry a label"
            ))
        })
    }

    async fn request(&self, text: &str, timeout: Duration) -> TierResult<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.credential)
            .timeout(timeout)
            .json(&InferenceRequest { inputs: text })
            .send()
            .await
            .map_err(|e| TierError::unavailable(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TierError::unavailable(format!(
                "inference endpoint returned {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TierError::unavailable(describe(&e)))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| TierError::malformed(format!("response is not JSON: {e}")))
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
