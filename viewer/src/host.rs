use meridian_shared::{Feature, mercator};

use crate::layer::{LayerId, VectorLayer};
use crate::overlay::HighlightOverlay;
use crate::viewport::Viewport;

/// The narrow interface the inspector drives. `MapEngine` is the in-process
/// implementation; tests and embedders may substitute their own.
pub trait MapHost {
    /// First feature of the given layers whose rendered geometry covers the
    /// pixel, within `tolerance_px`. The layer list is ordered topmost
    /// first and decides ties; the search stops at the first hit.
    ///
    /// Visibility is not consulted: a hidden layer in the set is still
    /// hit-testable, matching the checkbox/inspector split in the UI.
    fn hit_test(&self, pixel: [f64; 2], layers: &[LayerId], tolerance_px: f64) -> Option<Feature>;

    /// Projected map coordinate to geographic (lon, lat) degrees.
    fn to_geographic(&self, coordinate: [f64; 2]) -> [f64; 2];

    fn overlay_clear(&mut self);

    fn overlay_add(&mut self, feature: Feature);
}

/// Owns the viewport, the layer stack, and the highlight overlay.
pub struct MapEngine {
    pub viewport: Viewport,
    layers: Vec<VectorLayer>,
    overlay: HighlightOverlay,
}

impl MapEngine {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            layers: Vec::new(),
            overlay: HighlightOverlay::new(),
        }
    }

    /// Register a layer above all existing ones.
    pub fn add_layer(&mut self, layer: VectorLayer) -> LayerId {
        self.layers.push(layer);
        LayerId(self.layers.len() - 1)
    }

    pub fn layer(&self, id: LayerId) -> Option<&VectorLayer> {
        self.layers.get(id.0)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut VectorLayer> {
        self.layers.get_mut(id.0)
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.layers.get_mut(id.0) {
            layer.set_visible(visible);
        }
    }

    pub fn overlay(&self) -> &HighlightOverlay {
        &self.overlay
    }
}

impl MapHost for MapEngine {
    fn hit_test(&self, pixel: [f64; 2], layers: &[LayerId], tolerance_px: f64) -> Option<Feature> {
        let (wx, wy) = self.viewport.screen_to_world(pixel[0], pixel[1]);
        let tolerance = tolerance_px / self.viewport.scale;
        layers
            .iter()
            .filter_map(|id| self.layers.get(id.0))
            .find_map(|layer| layer.feature_at(wx, wy, tolerance).cloned())
    }

    fn to_geographic(&self, coordinate: [f64; 2]) -> [f64; 2] {
        mercator::to_lon_lat(coordinate[0], coordinate[1])
    }

    fn overlay_clear(&mut self) {
        self.overlay.clear();
    }

    fn overlay_add(&mut self, feature: Feature) {
        self.overlay.add(feature);
    }
}
