use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::feature::Attributes;

/// An RGBA color: 0-255 channels, 0.0-1.0 alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// CSS color string for canvas/DOM embedders.
    pub fn css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// Deterministic layer color via CRC32 hash of the layer id.
/// Returns (r, g, b) from first 3 bytes of hash.
pub fn layer_color(id: &str) -> (u8, u8, u8) {
    let hash = crc32fast::hash(id.as_bytes());
    let bytes = hash.to_be_bytes();
    (bytes[0], bytes[1], bytes[2])
}

/// A graduated fill step: applies when the keyed value exceeds `over`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethBreak {
    pub over: f64,
    pub color: Rgba,
}

/// How a layer fills feature interiors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fill {
    Uniform { color: Rgba },
    /// Shade by a numeric attribute: start from `base`, then the last break
    /// whose threshold the value exceeds wins. Non-numeric and missing
    /// values count as 0.
    Choropleth {
        attribute: String,
        base: Rgba,
        breaks: Vec<ChoroplethBreak>,
    },
}

/// Declarative stroke and fill for a vector layer. Resolving a style against
/// a feature is a pure lookup; rendering belongs to the embedder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke: Rgba,
    pub stroke_width: f64,
    pub fill: Fill,
}

impl Style {
    /// Style for layers the manifest leaves unstyled: id-derived stroke with
    /// a translucent fill of the same hue.
    pub fn fallback(layer_id: &str) -> Self {
        let (r, g, b) = layer_color(layer_id);
        Self {
            stroke: Rgba::new(r, g, b, 0.65),
            stroke_width: 1.0,
            fill: Fill::Uniform {
                color: Rgba::new(r, g, b, 0.22),
            },
        }
    }

    pub fn fill_for(&self, attributes: &Attributes) -> Rgba {
        match &self.fill {
            Fill::Uniform { color } => *color,
            Fill::Choropleth {
                attribute,
                base,
                breaks,
            } => {
                let value = attributes
                    .get(attribute)
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                let mut fill = *base;
                for step in breaks {
                    if value > step.over {
                        fill = step.color;
                    }
                }
                fill
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ChoroplethBreak, Fill, Rgba, Style, layer_color};
    use crate::feature::Attributes;

    fn rate_style() -> Style {
        Style {
            stroke: Rgba::new(17, 24, 39, 1.0),
            stroke_width: 0.6,
            fill: Fill::Choropleth {
                attribute: "unemployment_rate".into(),
                base: Rgba::new(16, 185, 129, 0.45),
                breaks: vec![
                    ChoroplethBreak {
                        over: 5.0,
                        color: Rgba::new(250, 204, 21, 0.55),
                    },
                    ChoroplethBreak {
                        over: 10.0,
                        color: Rgba::new(239, 68, 68, 0.55),
                    },
                ],
            },
        }
    }

    fn attributes(value: serde_json::Value) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("unemployment_rate".into(), value);
        attributes
    }

    #[test]
    fn choropleth_picks_the_last_exceeded_break() {
        let style = rate_style();
        assert_eq!(
            style.fill_for(&attributes(json!(3.1))),
            Rgba::new(16, 185, 129, 0.45)
        );
        assert_eq!(
            style.fill_for(&attributes(json!(6.2))),
            Rgba::new(250, 204, 21, 0.55)
        );
        assert_eq!(
            style.fill_for(&attributes(json!(12.0))),
            Rgba::new(239, 68, 68, 0.55)
        );
    }

    #[test]
    fn choropleth_treats_non_numeric_values_as_zero() {
        let style = rate_style();
        let base = Rgba::new(16, 185, 129, 0.45);
        assert_eq!(style.fill_for(&attributes(json!("n/a"))), base);
        assert_eq!(style.fill_for(&Attributes::new()), base);
    }

    #[test]
    fn uniform_fill_ignores_attributes() {
        let style = Style::fallback("counties");
        assert_eq!(
            style.fill_for(&attributes(json!(99.0))),
            style.fill_for(&Attributes::new())
        );
    }

    #[test]
    fn layer_color_is_deterministic() {
        assert_eq!(layer_color("counties"), layer_color("counties"));
        assert_ne!(layer_color("counties"), layer_color("rates"));
    }

    #[test]
    fn css_form_matches_canvas_expectations() {
        assert_eq!(Rgba::new(123, 58, 245, 0.15).css(), "rgba(123,58,245,0.15)");
    }
}
