pub mod feature;
pub mod geometry;
pub mod layer;
pub mod mercator;
pub mod style;

pub use feature::*;
pub use geometry::*;
pub use layer::*;
pub use style::{Fill, Rgba, Style, layer_color};
