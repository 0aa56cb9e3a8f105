use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use meridian_shared::{LayerConfig, LayerInfo};
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::{upstream_connect_timeout, upstream_http_timeout};

/// A layer's manifest entry plus its pre-serialized GeoJSON payload.
/// Serialized once by the loader, shared by all responses via `Arc`.
#[derive(Debug, Clone)]
pub struct LoadedLayer {
    pub info: LayerInfo,
    pub features_json: Arc<Bytes>,
    pub etag: String,
}

#[derive(Clone)]
pub struct AppState {
    /// Manifest order drives the order layers are listed and drawn.
    pub configs: Arc<Vec<LayerConfig>>,
    /// Layer id -> loaded payload. Entries are replaced wholesale by the
    /// loader; a failed refresh keeps the previous good payload.
    pub layers: Arc<RwLock<HashMap<String, LoadedLayer>>>,
    pub http_client: reqwest::Client,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    manifest_requests_total: AtomicU64,
    feature_requests_total: AtomicU64,
    feature_not_modified_total: AtomicU64,
    layer_loads_total: AtomicU64,
    layer_load_failures_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub manifest_requests_total: u64,
    pub feature_requests_total: u64,
    pub feature_not_modified_total: u64,
    pub layer_loads_total: u64,
    pub layer_load_failures_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            manifest_requests_total: self.manifest_requests_total.load(Ordering::Relaxed),
            feature_requests_total: self.feature_requests_total.load(Ordering::Relaxed),
            feature_not_modified_total: self.feature_not_modified_total.load(Ordering::Relaxed),
            layer_loads_total: self.layer_loads_total.load(Ordering::Relaxed),
            layer_load_failures_total: self.layer_load_failures_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_manifest_request(&self) {
        self.manifest_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_feature_request(&self) {
        self.feature_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_feature_not_modified(&self) {
        self.feature_not_modified_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_layer_load(&self) {
        self.layer_loads_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_layer_load_failure(&self) {
        self.layer_load_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(configs: Vec<LayerConfig>) -> Self {
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("meridian/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })
            .unwrap_or_else(|e| {
                panic!("failed to build timeout-configured HTTP client: {e}");
            });

        Self {
            configs: Arc::new(configs),
            layers: Arc::new(RwLock::new(HashMap::new())),
            http_client,
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}
