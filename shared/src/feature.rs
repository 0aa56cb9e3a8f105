use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::geometry::Geometry;

/// Attribute map of a feature. Key order is the source order (`serde_json`
/// with `preserve_order`), so display rows come out the way the data was
/// authored.
pub type Attributes = Map<String, Value>;

/// Stable feature identifier. GeoJSON allows either form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Text(String),
    Number(serde_json::Number),
}

/// A single discrete map entity with geometry and attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureId>,
    #[serde(default, deserialize_with = "attributes_or_empty")]
    pub properties: Attributes,
    pub geometry: Geometry,
}

/// Tolerate `"properties": null`, which some producers emit for bare
/// geometries.
fn attributes_or_empty<'de, D>(deserializer: D) -> Result<Attributes, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Attributes>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            properties: Attributes::new(),
            geometry,
        }
    }

    pub fn with_id(mut self, id: FeatureId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }
}
