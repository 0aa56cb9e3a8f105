pub mod display;
pub mod host;
pub mod inspector;
pub mod layer;
pub mod overlay;
pub mod session;
pub mod spatial;
pub mod viewport;

pub use display::{DisplaySurface, HtmlPanel};
pub use host::{MapEngine, MapHost};
pub use inspector::{AttributeRow, DisplayList, Inspector, escape_markup};
pub use layer::{LayerId, VectorLayer};
pub use overlay::HighlightOverlay;
pub use session::{MapSession, PointerEvent};
pub use viewport::Viewport;
