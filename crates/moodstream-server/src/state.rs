//! Shared application state

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use moodstream_classifiers::SentimentCascade;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::store::ItemStore;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Scoring tiers, built once at startup
    pub cascade: Arc<SentimentCascade>,

    /// Scored items received through ingestion
    pub store: Arc<ItemStore>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Initialize application state from configuration
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        let cascade = SentimentCascade::from_config(&config.scoring)?;
        info!(tiers = ?cascade.tier_names(), "Scoring cascade ready");

        let store = ItemStore::new(config.max_items);
        info!(max_items = config.max_items, "Item store ready");

        Ok(Self {
            config: Arc::new(config),
            cascade: Arc::new(cascade),
            store: Arc::new(store),
            metrics_handle,
        })
    }

    /// Warm up the remote tier in the background.
    ///
    /// The result is only logged; requests are served with or without it.
    pub fn spawn_warm_up(&self) {
        if self.cascade.remote().is_none() {
            return;
        }

        let cascade = Arc::clone(&self.cascade);
        tokio::spawn(async move {
            if cascade.warm_up().await.is_err() {
                debug!("Continuing without remote warm-up");
            }
        });
    }
}
