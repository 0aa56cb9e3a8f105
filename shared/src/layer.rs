use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::style::Style;

/// Where a layer's GeoJSON payload comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSource {
    File { path: String },
    Url { url: String },
}

fn default_visible() -> bool {
    true
}

/// One entry in the layer manifest the server is configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub id: String,
    pub title: String,
    pub source: LayerSource,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Layers without an explicit style get a deterministic fallback derived
    /// from the layer id.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

/// A manifest entry enriched with load state, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub id: String,
    pub title: String,
    pub visible: bool,
    pub style: Style,
    pub feature_count: usize,
    pub loaded_at: DateTime<Utc>,
}
