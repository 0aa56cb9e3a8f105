use meridian_shared::Feature;

/// Dedicated overlay for the highlighted feature copy. Holds at most one
/// feature at any time; the inspector is its only writer.
#[derive(Debug, Default)]
pub struct HighlightOverlay {
    feature: Option<Feature>,
}

impl HighlightOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.feature = None;
    }

    /// Insert a feature, replacing whatever was there.
    pub fn add(&mut self, feature: Feature) {
        self.feature = Some(feature);
    }

    pub fn feature(&self) -> Option<&Feature> {
        self.feature.as_ref()
    }

    pub fn len(&self) -> usize {
        usize::from(self.feature.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.feature.is_none()
    }
}

#[cfg(test)]
mod tests {
    use meridian_shared::{Feature, Geometry};

    use super::HighlightOverlay;

    fn point(x: f64) -> Feature {
        Feature::new(Geometry::Point {
            coordinates: [x, 0.0],
        })
    }

    #[test]
    fn holds_at_most_one_feature() {
        let mut overlay = HighlightOverlay::new();
        overlay.add(point(1.0));
        overlay.add(point(2.0));

        assert_eq!(overlay.len(), 1);
        assert_eq!(
            overlay.feature().map(|f| &f.geometry),
            Some(&Geometry::Point {
                coordinates: [2.0, 0.0]
            })
        );
    }

    #[test]
    fn clear_empties_and_is_idempotent() {
        let mut overlay = HighlightOverlay::new();
        overlay.add(point(1.0));
        overlay.clear();
        overlay.clear();
        assert!(overlay.is_empty());
        assert_eq!(overlay.len(), 0);
    }
}
