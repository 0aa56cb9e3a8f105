use meridian_shared::Feature;
use serde::Serialize;
use serde_json::Value;

use crate::display::DisplaySurface;
use crate::host::MapHost;
use crate::layer::LayerId;

/// Pixel tolerance for click picking, keeping small and point-like features
/// clickable.
pub const PICK_TOLERANCE_PX: f64 = 3.0;

/// One escaped key/value row, ready for direct embedding in markup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRow {
    pub key: String,
    pub value: String,
}

/// What the display surface should show for the current selection. The
/// empty-state and no-attributes cases are distinct markers, not empty row
/// lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayList {
    /// Nothing is selected.
    Empty,
    /// A feature is selected but has no displayable attributes.
    NoAttributes,
    Rows { rows: Vec<AttributeRow> },
}

/// The selection state machine: `Idle` while nothing is selected, `Selected`
/// while a pick has hit. Owns the selection; drives the overlay and display
/// through the injected collaborators.
#[derive(Debug, Default)]
pub struct Inspector {
    selection: Option<Feature>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&Feature> {
        self.selection.as_ref()
    }

    /// Hit-test the inspectable layers under the pixel and replace the
    /// selection with the result. A miss clears the selection.
    pub fn pick(
        &mut self,
        host: &impl MapHost,
        pixel: [f64; 2],
        layers: &[LayerId],
    ) -> Option<&Feature> {
        self.selection = host.hit_test(pixel, layers, PICK_TOLERANCE_PX);
        self.selection.as_ref()
    }

    /// Build the attribute display list for a feature. Attributes with null
    /// values are dropped; every key and value is escaped before it lands
    /// in a row.
    pub fn render(feature: Option<&Feature>) -> DisplayList {
        let Some(feature) = feature else {
            return DisplayList::Empty;
        };

        let rows: Vec<AttributeRow> = feature
            .properties
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| AttributeRow {
                key: escape_markup(key),
                value: escape_markup(&attribute_text(value)),
            })
            .collect();

        if rows.is_empty() {
            DisplayList::NoAttributes
        } else {
            DisplayList::Rows { rows }
        }
    }

    /// Replace the overlay contents with an independent copy of `feature`,
    /// or just empty it. The copy keeps the source's identifier when it has
    /// one. This is the overlay's only writer.
    pub fn highlight(host: &mut impl MapHost, feature: Option<&Feature>) {
        host.overlay_clear();
        if let Some(feature) = feature {
            host.overlay_add(feature.clone());
        }
    }

    /// Back to idle: no selection, empty-state display, empty overlay.
    /// Idempotent.
    pub fn clear(&mut self, host: &mut impl MapHost, display: &mut impl DisplaySurface) {
        self.selection = None;
        display.show_attributes(&DisplayList::Empty);
        host.overlay_clear();
    }

    /// Format a projected coordinate as geographic `"lon, lat"` with five
    /// decimals. `None` in, `None` out.
    pub fn report_location(host: &impl MapHost, coordinate: Option<[f64; 2]>) -> Option<String> {
        let [lon, lat] = host.to_geographic(coordinate?);
        Some(format!("{lon:.5}, {lat:.5}"))
    }
}

/// Scalars keep their natural form; structured values serialize to canonical
/// JSON text.
fn attribute_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Escape the five markup-significant characters with character references.
/// Total: any input produces a valid output string.
pub fn escape_markup(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use meridian_shared::{Feature, FeatureId, Geometry, mercator};
    use serde_json::json;

    use super::{AttributeRow, DisplayList, Inspector, escape_markup};
    use crate::host::MapHost;

    /// Minimal scripted host: one feature under every pixel, or none.
    struct ScriptedHost {
        feature: Option<Feature>,
        overlay: Vec<Feature>,
    }

    impl ScriptedHost {
        fn with(feature: Option<Feature>) -> Self {
            Self {
                feature,
                overlay: Vec::new(),
            }
        }
    }

    impl MapHost for ScriptedHost {
        fn hit_test(
            &self,
            _pixel: [f64; 2],
            _layers: &[crate::layer::LayerId],
            _tolerance_px: f64,
        ) -> Option<Feature> {
            self.feature.clone()
        }

        fn to_geographic(&self, coordinate: [f64; 2]) -> [f64; 2] {
            mercator::to_lon_lat(coordinate[0], coordinate[1])
        }

        fn overlay_clear(&mut self) {
            self.overlay.clear();
        }

        fn overlay_add(&mut self, feature: Feature) {
            self.overlay.push(feature);
        }
    }

    fn cook_county() -> Feature {
        Feature::new(Geometry::Point {
            coordinates: [0.0, 0.0],
        })
        .with_id(FeatureId::Text("17031".into()))
        .with_attribute("name", json!("Cook"))
        .with_attribute("unemployment_rate", json!(6.2))
    }

    #[test]
    fn render_none_is_the_empty_state_marker() {
        assert_eq!(Inspector::render(None), DisplayList::Empty);
    }

    #[test]
    fn render_keeps_attribute_order_and_drops_nulls() {
        let feature = cook_county().with_attribute("fips_note", json!(null));
        let list = Inspector::render(Some(&feature));

        assert_eq!(
            list,
            DisplayList::Rows {
                rows: vec![
                    AttributeRow {
                        key: "name".into(),
                        value: "Cook".into()
                    },
                    AttributeRow {
                        key: "unemployment_rate".into(),
                        value: "6.2".into()
                    },
                ]
            }
        );
    }

    #[test]
    fn render_distinguishes_attribute_less_features_from_no_selection() {
        let bare = Feature::new(Geometry::Point {
            coordinates: [0.0, 0.0],
        });
        assert_eq!(Inspector::render(Some(&bare)), DisplayList::NoAttributes);

        let all_null = bare.with_attribute("note", json!(null));
        assert_eq!(
            Inspector::render(Some(&all_null)),
            DisplayList::NoAttributes
        );
    }

    #[test]
    fn render_serializes_structured_values_canonically() {
        let feature = cook_county().with_attribute("extras", json!({"seat": "Chicago"}));
        let DisplayList::Rows { rows } = Inspector::render(Some(&feature)) else {
            panic!("expected rows");
        };

        let extras = rows.iter().find(|row| row.key == "extras").expect("row");
        assert_eq!(extras.value, r#"{&quot;seat&quot;:&quot;Chicago&quot;}"#);
    }

    #[test]
    fn escaping_handles_the_five_characters_and_is_total() {
        assert_eq!(escape_markup("5 > 3"), "5 &gt; 3");
        assert_eq!(escape_markup("O'Brien"), "O&#39;Brien");
        assert_eq!(
            escape_markup(r#"<img src="x" onerror='alert(1)'>&"#),
            "&lt;img src=&quot;x&quot; onerror=&#39;alert(1)&#39;&gt;&amp;"
        );
        assert_eq!(escape_markup(""), "");
        assert_eq!(escape_markup("plain text"), "plain text");
    }

    #[test]
    fn pick_hit_selects_and_miss_clears() {
        let mut inspector = Inspector::new();
        let host = ScriptedHost::with(Some(cook_county()));
        assert!(inspector.pick(&host, [10.0, 10.0], &[]).is_some());
        assert!(inspector.selection().is_some());

        let host = ScriptedHost::with(None);
        assert!(inspector.pick(&host, [10.0, 10.0], &[]).is_none());
        assert!(inspector.selection().is_none());
    }

    #[test]
    fn highlight_keeps_exactly_one_copy_in_the_overlay() {
        let mut host = ScriptedHost::with(None);
        let first = cook_county();
        let second = Feature::new(Geometry::Point {
            coordinates: [5.0, 5.0],
        })
        .with_attribute("name", json!("Lake"));

        Inspector::highlight(&mut host, Some(&first));
        Inspector::highlight(&mut host, Some(&second));

        assert_eq!(host.overlay.len(), 1);
        assert_eq!(host.overlay[0].properties["name"], json!("Lake"));

        Inspector::highlight(&mut host, None);
        assert!(host.overlay.is_empty());
    }

    #[test]
    fn highlight_copy_preserves_the_identifier_and_is_independent() {
        let mut host = ScriptedHost::with(None);
        let source = cook_county();

        Inspector::highlight(&mut host, Some(&source));
        let copy = &mut host.overlay[0];
        assert_eq!(copy.id, Some(FeatureId::Text("17031".into())));

        copy.properties.insert("name".into(), json!("Mutated"));
        assert_eq!(source.properties["name"], json!("Cook"));

        let anonymous = Feature::new(Geometry::Point {
            coordinates: [1.0, 1.0],
        });
        Inspector::highlight(&mut host, Some(&anonymous));
        assert_eq!(host.overlay[0].id, None);
    }

    #[test]
    fn report_location_formats_five_decimals() {
        let host = ScriptedHost::with(None);
        let coordinate = mercator::from_lon_lat(-87.6298, 41.8781);
        assert_eq!(
            Inspector::report_location(&host, Some(coordinate)),
            Some("-87.62980, 41.87810".to_string())
        );
        assert_eq!(Inspector::report_location(&host, None), None);
    }
}
