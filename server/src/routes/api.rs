use std::fmt::Write as _;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use meridian_shared::LayerInfo;

use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (layer_count, feature_count) = {
        let layers = state.layers.read().await;
        (
            layers.len(),
            layers.values().map(|l| l.info.feature_count).sum::<usize>(),
        )
    };
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "layers_configured": state.configs.len(),
        "layers_loaded": layer_count,
        "features": feature_count,
        "observability": {
            "manifest_requests_total": observability.manifest_requests_total,
            "feature_requests_total": observability.feature_requests_total,
            "feature_not_modified_total": observability.feature_not_modified_total,
            "layer_loads_total": observability.layer_loads_total,
            "layer_load_failures_total": observability.layer_load_failures_total,
        }
    }))
}

/// The layer manifest, in manifest order. Layers that failed to load are
/// simply absent until the loader succeeds.
pub async fn get_layers(State(state): State<AppState>) -> impl IntoResponse {
    state.observability.record_manifest_request();

    let infos: Vec<LayerInfo> = {
        let layers = state.layers.read().await;
        state
            .configs
            .iter()
            .filter_map(|config| layers.get(&config.id).map(|loaded| loaded.info.clone()))
            .collect()
    };

    (
        [(header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=5"))],
        Json(infos),
    )
}

/// Serve pre-serialized FeatureCollection GeoJSON: no clone of the feature
/// set, no re-serialization.
pub async fn get_layer_features(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.observability.record_feature_request();

    let loaded = {
        let layers = state.layers.read().await;
        layers
            .get(&id)
            .map(|loaded| (loaded.etag.clone(), Arc::clone(&loaded.features_json)))
    };

    let Some((etag, json)) = loaded else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "unknown layer", "id": id})),
        )
            .into_response();
    };

    if if_none_match_matches(&headers, &etag) {
        state.observability.record_feature_not_modified();
        return not_modified_response("public, max-age=60", Some(etag.as_str()));
    }

    json_bytes_response((*json).clone(), "public, max-age=60", Some(etag.as_str()))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let (layer_count, feature_count) = {
        let layers = state.layers.read().await;
        (
            layers.len(),
            layers.values().map(|l| l.info.feature_count).sum::<usize>(),
        )
    };
    let observability = state.observability.snapshot();

    let body = render_prometheus_metrics(layer_count, feature_count, observability);

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(
    layer_count: usize,
    feature_count: usize,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "# HELP meridian_layers_loaded Current number of loaded vector layers."
    );
    let _ = writeln!(body, "# TYPE meridian_layers_loaded gauge");
    let _ = writeln!(body, "meridian_layers_loaded {layer_count}");

    let _ = writeln!(
        body,
        "# HELP meridian_features Current number of features across loaded layers."
    );
    let _ = writeln!(body, "# TYPE meridian_features gauge");
    let _ = writeln!(body, "meridian_features {feature_count}");

    let _ = writeln!(
        body,
        "# HELP meridian_manifest_requests_total Total layer-manifest API requests."
    );
    let _ = writeln!(body, "# TYPE meridian_manifest_requests_total counter");
    let _ = writeln!(
        body,
        "meridian_manifest_requests_total {}",
        observability.manifest_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP meridian_feature_requests_total Total layer-features API requests."
    );
    let _ = writeln!(body, "# TYPE meridian_feature_requests_total counter");
    let _ = writeln!(
        body,
        "meridian_feature_requests_total {}",
        observability.feature_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP meridian_feature_not_modified_total Feature requests answered 304 via ETag."
    );
    let _ = writeln!(body, "# TYPE meridian_feature_not_modified_total counter");
    let _ = writeln!(
        body,
        "meridian_feature_not_modified_total {}",
        observability.feature_not_modified_total
    );

    let _ = writeln!(
        body,
        "# HELP meridian_layer_loads_total Successful layer loads and refreshes."
    );
    let _ = writeln!(body, "# TYPE meridian_layer_loads_total counter");
    let _ = writeln!(
        body,
        "meridian_layer_loads_total {}",
        observability.layer_loads_total
    );

    let _ = writeln!(
        body,
        "# HELP meridian_layer_load_failures_total Failed layer loads and refreshes."
    );
    let _ = writeln!(body, "# TYPE meridian_layer_load_failures_total counter");
    let _ = writeln!(
        body,
        "meridian_layer_load_failures_total {}",
        observability.layer_load_failures_total
    );

    body
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}
