//! Configuration for the scoring tiers

use moodstream_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Configuration for the whole scoring cascade
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Remote classification tier
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Lexicon tier
    #[serde(default)]
    pub lexicon: LexiconConfig,

    /// Batch pacing
    #[serde(default)]
    pub batch: BatchConfig,
}

impl ScoringConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }

    /// Whether the remote tier takes part in scoring
    pub fn remote_active(&self) -> bool {
        self.remote.is_active()
    }
}

/// Remote classification endpoint settings
#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Master switch; the tier also needs a credential
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Inference endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Name reported as the model tier of remote results
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Bearer token for the endpoint
    #[serde(default)]
    pub credential: Option<String>,

    /// Per-call timeout for scoring requests
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout for the one-time warm-up request
    #[serde(default = "default_warmup_timeout_ms")]
    pub warmup_timeout_ms: u64,
}

impl RemoteConfig {
    /// Enabled and holding a non-empty credential
    pub fn is_active(&self) -> bool {
        self.enabled && self.credential().is_some()
    }

    /// Credential with surrounding whitespace removed, if non-empty
    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn warmup_timeout(&self) -> Duration {
        Duration::from_millis(self.warmup_timeout_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_endpoint(),
            model_name: default_model_name(),
            credential: None,
            timeout_ms: default_timeout_ms(),
            warmup_timeout_ms: default_warmup_timeout_ms(),
        }
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("enabled", &self.enabled)
            .field("endpoint", &self.endpoint)
            .field("model_name", &self.model_name)
            .field("credential", &self.credential().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("warmup_timeout_ms", &self.warmup_timeout_ms)
            .finish()
    }
}

/// Extra dictionary words for the lexicon tier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    #[serde(default)]
    pub extra_positive: Vec<String>,

    #[serde(default)]
    pub extra_negative: Vec<String>,
}

/// Pacing for batch scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Delay between consecutive item starts
    #[serde(default = "default_inter_item_delay_ms")]
    pub inter_item_delay_ms: u64,

    /// Items scored at once; 1 means strictly sequential
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl BatchConfig {
    pub fn inter_item_delay(&self) -> Duration {
        Duration::from_millis(self.inter_item_delay_ms)
    }

    /// Effective concurrency (at least 1)
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// No delay, sequential
    pub fn unpaced() -> Self {
        Self {
            inter_item_delay_ms: 0,
            concurrency: 1,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            inter_item_delay_ms: default_inter_item_delay_ms(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models/cardiffnlp/twitter-roberta-base-sentiment-latest"
        .to_string()
}

fn default_model_name() -> String {
    "twitter-roberta-base".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_warmup_timeout_ms() -> u64 {
    30_000
}

fn default_inter_item_delay_ms() -> u64 {
    100
}

fn default_concurrency() -> usize {
    1
}
