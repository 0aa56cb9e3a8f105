use meridian_shared::{Bounds, Feature, Rgba, Style};

use crate::spatial::SpatialGrid;

/// Handle to a layer registered with a `MapEngine`. Also the draw-order
/// position: higher ids were added later and draw on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub(crate) usize);

/// An ordered set of features with a shared style and a visibility toggle.
pub struct VectorLayer {
    pub id: String,
    pub title: String,
    pub style: Style,
    visible: bool,
    features: Vec<Feature>,
    grid: SpatialGrid,
}

impl VectorLayer {
    pub fn new(id: &str, title: &str, style: Style) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            style,
            visible: true,
            features: Vec::new(),
            grid: SpatialGrid::build(&[]),
        }
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.set_features(features);
        self
    }

    /// Replace the layer's features and rebuild the spatial index.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.grid = SpatialGrid::build(&features);
        self.features = features;
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// World bounds of the layer content, `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        self.grid.world_bounds()
    }

    /// Fill color for one of this layer's features.
    pub fn fill_for(&self, feature: &Feature) -> Rgba {
        self.style.fill_for(&feature.properties)
    }

    /// First feature, in insertion order, whose geometry covers the world
    /// point within `tolerance` world units. Visibility is not consulted.
    pub(crate) fn feature_at(&self, wx: f64, wy: f64, tolerance: f64) -> Option<&Feature> {
        self.grid
            .candidates_at(wx, wy, tolerance)
            .into_iter()
            .map(|idx| &self.features[idx])
            .find(|feature| feature.geometry.covers(wx, wy, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use meridian_shared::{Feature, Geometry, Style};
    use serde_json::json;

    use super::VectorLayer;

    fn square(x: f64, y: f64, size: f64, name: &str) -> Feature {
        Feature::new(Geometry::Polygon {
            coordinates: vec![vec![
                [x, y],
                [x + size, y],
                [x + size, y + size],
                [x, y + size],
                [x, y],
            ]],
        })
        .with_attribute("name", json!(name))
    }

    fn layer() -> VectorLayer {
        VectorLayer::new("counties", "Counties", Style::fallback("counties")).with_features(vec![
            square(0.0, 0.0, 10.0, "alpha"),
            square(5.0, 5.0, 10.0, "beta"),
        ])
    }

    #[test]
    fn feature_at_returns_the_first_covering_feature() {
        let layer = layer();
        let hit = layer.feature_at(6.0, 6.0, 0.0).expect("overlap hit");
        assert_eq!(hit.properties["name"], json!("alpha"));

        let hit = layer.feature_at(12.0, 12.0, 0.0).expect("only beta here");
        assert_eq!(hit.properties["name"], json!("beta"));
    }

    #[test]
    fn feature_at_misses_empty_space() {
        assert!(layer().feature_at(40.0, 40.0, 3.0).is_none());
    }

    #[test]
    fn hidden_layers_still_hit_test() {
        let mut layer = layer();
        layer.set_visible(false);
        assert!(layer.feature_at(6.0, 6.0, 0.0).is_some());
    }

    #[test]
    fn replacing_features_rebuilds_the_index() {
        let mut layer = layer();
        layer.set_features(vec![square(100.0, 100.0, 5.0, "gamma")]);

        assert!(layer.feature_at(6.0, 6.0, 0.0).is_none());
        assert!(layer.feature_at(102.0, 102.0, 0.0).is_some());
    }
}
