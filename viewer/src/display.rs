use std::fmt::Write as _;

use crate::inspector::DisplayList;

/// Sink for everything the inspector wants shown. Injected into the session
/// so embedders bring their own rendering technology.
pub trait DisplaySurface {
    fn show_attributes(&mut self, list: &DisplayList);

    /// Plain-text coordinate readout.
    fn show_location(&mut self, text: &str);

    /// The "no click yet" / cleared placeholder.
    fn clear_location(&mut self);

    /// Pointer-cursor feedback while hovering a hittable feature.
    fn set_pointer(&mut self, over_feature: bool);
}

const EMPTY_STATE_HTML: &str =
    r#"<div class="empty-state">Click a map feature to view its attributes.</div>"#;
const NO_ATTRIBUTES_HTML: &str = r#"<div class="empty-state">No attributes to display.</div>"#;
const LOCATION_PLACEHOLDER: &str = "\u{2014}";

/// Renders the display list into table markup. Row keys and values arrive
/// already escaped; this stage only adds structure.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlPanel {
    pub attributes_html: String,
    pub location_text: String,
    pub pointer: bool,
}

impl Default for HtmlPanel {
    fn default() -> Self {
        Self {
            attributes_html: EMPTY_STATE_HTML.to_string(),
            location_text: LOCATION_PLACEHOLDER.to_string(),
            pointer: false,
        }
    }
}

impl HtmlPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySurface for HtmlPanel {
    fn show_attributes(&mut self, list: &DisplayList) {
        self.attributes_html = match list {
            DisplayList::Empty => EMPTY_STATE_HTML.to_string(),
            DisplayList::NoAttributes => NO_ATTRIBUTES_HTML.to_string(),
            DisplayList::Rows { rows } => {
                let mut table = String::from("<table>");
                for row in rows {
                    let _ = write!(table, "<tr><th>{}</th><td>{}</td></tr>", row.key, row.value);
                }
                table.push_str("</table>");
                table
            }
        };
    }

    fn show_location(&mut self, text: &str) {
        self.location_text = text.to_string();
    }

    fn clear_location(&mut self) {
        self.location_text = LOCATION_PLACEHOLDER.to_string();
    }

    fn set_pointer(&mut self, over_feature: bool) {
        self.pointer = over_feature;
    }
}
