use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use meridian_shared::{FeatureCollection, LayerConfig, LayerInfo, LayerSource, Style};
use tracing::{info, warn};

use crate::config::layer_refresh_secs;
use crate::state::{AppState, LoadedLayer};

/// Loads every manifest layer at startup, then refreshes URL-sourced layers
/// on the configured interval. A failed load or refresh is logged and the
/// previous good payload (if any) stays served.
pub async fn run(state: AppState) {
    load_all(&state).await;

    let refresh_secs = layer_refresh_secs();
    let has_remote = state
        .configs
        .iter()
        .any(|config| matches!(config.source, LayerSource::Url { .. }));
    if refresh_secs == 0 || !has_remote {
        info!("layer refresh disabled (interval: {refresh_secs}s, remote layers: {has_remote})");
        return;
    }

    info!("Layer refresher started (interval: {refresh_secs}s)");

    let mut interval = tokio::time::interval(Duration::from_secs(refresh_secs));
    // Consume immediate tick so the first refresh runs after the interval.
    interval.tick().await;

    loop {
        interval.tick().await;
        refresh_remote(&state).await;
    }
}

async fn load_all(state: &AppState) {
    let results = futures::future::join_all(
        state
            .configs
            .iter()
            .map(|config| load_layer(state, config)),
    )
    .await;

    let loaded = results.iter().filter(|result| result.is_ok()).count();
    info!(
        "Initial layer load complete: {loaded}/{} layers",
        state.configs.len()
    );
}

async fn refresh_remote(state: &AppState) {
    for config in state.configs.iter() {
        if matches!(config.source, LayerSource::Url { .. })
            && let Err(e) = load_layer(state, config).await
        {
            warn!(layer = %config.id, "refresh failed: {e}");
        }
    }
}

async fn load_layer(state: &AppState, config: &LayerConfig) -> Result<(), String> {
    let result = match &config.source {
        LayerSource::File { path } => tokio::fs::read(path)
            .await
            .map_err(|e| format!("read {path}: {e}")),
        LayerSource::Url { url } => fetch_bytes(&state.http_client, url).await,
    };

    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            state.observability.record_layer_load_failure();
            warn!(layer = %config.id, "failed to load layer: {e}");
            return Err(e);
        }
    };

    match install_layer(state, config, &bytes).await {
        Ok(feature_count) => {
            state.observability.record_layer_load();
            info!(layer = %config.id, features = feature_count, "layer loaded");
            Ok(())
        }
        Err(e) => {
            state.observability.record_layer_load_failure();
            warn!(layer = %config.id, "failed to install layer: {e}");
            Err(e)
        }
    }
}

/// Decode, re-serialize canonically, and swap the registry entry in.
async fn install_layer(
    state: &AppState,
    config: &LayerConfig,
    bytes: &[u8],
) -> Result<usize, String> {
    let collection: FeatureCollection =
        serde_json::from_slice(bytes).map_err(|e| format!("decode GeoJSON: {e}"))?;
    let feature_count = collection.features.len();

    let payload =
        serde_json::to_vec(&collection).map_err(|e| format!("re-encode GeoJSON: {e}"))?;
    let etag = format!("\"{:08x}\"", crc32fast::hash(&payload));

    let info = LayerInfo {
        id: config.id.clone(),
        title: config.title.clone(),
        visible: config.visible,
        style: config
            .style
            .clone()
            .unwrap_or_else(|| Style::fallback(&config.id)),
        feature_count,
        loaded_at: Utc::now(),
    };

    state.layers.write().await.insert(
        config.id.clone(),
        LoadedLayer {
            info,
            features_json: Arc::new(Bytes::from(payload)),
            etag,
        },
    );

    Ok(feature_count)
}

async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, String> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| format!("failed to read response body: {e}"))?;

    if !status.is_success() {
        let preview = String::from_utf8_lossy(&bytes)
            .chars()
            .take(200)
            .collect::<String>();
        return Err(format!("upstream status {status}; body preview: {preview}"));
    }

    Ok(bytes.to_vec())
}
