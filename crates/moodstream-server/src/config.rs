//! Server configuration

use moodstream_classifiers::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Scoring tiers and batch pacing
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Upper bound on `limit` for item listings
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: usize,

    /// `limit` used when a listing does not give one
    #[serde(default = "default_list_limit")]
    pub default_list_limit: usize,

    /// Items kept in memory; the oldest are evicted beyond this
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(credential) = &cli.credential {
            config.scoring.remote.credential = Some(credential.clone());
        }

        if cli.no_remote {
            config.scoring.remote.enabled = false;
        }

        Ok(config)
    }

    /// Clamp a requested listing size into `1..=max_list_limit`
    pub fn list_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_list_limit)
            .clamp(1, self.max_list_limit.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            max_list_limit: default_max_list_limit(),
            default_list_limit: default_list_limit(),
            max_items: default_max_items(),
        }
    }
}

fn default_max_list_limit() -> usize {
    500
}

fn default_list_limit() -> usize {
    50
}

fn default_max_items() -> usize {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> crate::Cli {
        crate::Cli::parse_from(std::iter::once("moodstream-server").chain(args.iter().copied()))
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServerConfig::load("/nonexistent/moodstream.yaml", &cli(&["--no-remote"])).unwrap();
        assert_eq!(config.default_list_limit, 50);
        assert_eq!(config.max_list_limit, 500);
        assert_eq!(config.max_items, 10_000);
        assert!(!config.scoring.remote.enabled);
        assert!(!config.scoring.remote_active());
    }

    #[test]
    fn test_cli_credential_overrides_file() {
        let config = ServerConfig::load(
            "/nonexistent/moodstream.yaml",
            &cli(&["--credential", "hf_cli_token"]),
        )
        .unwrap();
        assert_eq!(config.scoring.remote.credential(), Some("hf_cli_token"));
        assert!(config.scoring.remote_active());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
max_list_limit: 100
max_items: 250
scoring:
  batch:
    concurrency: 4
"#;
        let config: ServerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_list_limit, 100);
        assert_eq!(config.default_list_limit, 50);
        assert_eq!(config.max_items, 250);
        assert_eq!(config.scoring.batch.concurrency, 4);
        assert_eq!(config.scoring.batch.inter_item_delay_ms, 100);
    }

    #[test]
    fn test_list_limit() {
        let config = ServerConfig::default();
        assert_eq!(config.list_limit(None), 50);
        assert_eq!(config.list_limit(Some(0)), 1);
        assert_eq!(config.list_limit(Some(20)), 20);
        assert_eq!(config.list_limit(Some(10_000)), 500);
    }
}
