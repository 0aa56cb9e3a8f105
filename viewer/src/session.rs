use meridian_shared::mercator;

use crate::display::DisplaySurface;
use crate::host::{MapEngine, MapHost};
use crate::inspector::{DisplayList, Inspector};
use crate::layer::{LayerId, VectorLayer};
use crate::viewport::Viewport;

/// Discrete input events delivered by the embedding UI, one at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved { pixel: [f64; 2] },
    /// Single click with its pixel location and projected map coordinate.
    Clicked {
        pixel: [f64; 2],
        coordinate: [f64; 2],
    },
}

/// Geographic center of the contiguous United States.
const INITIAL_CENTER: (f64, f64) = (-98.5795, 39.8283);

/// Event-driven facade over the engine, the inspector, and the display
/// surface. Every handler runs to completion synchronously; the session is
/// the only writer of the selection and the overlay.
pub struct MapSession<D: DisplaySurface> {
    engine: MapEngine,
    inspector: Inspector,
    display: D,
    boundary: LayerId,
    data: LayerId,
    /// Hit-test order for picking: topmost first, highlight overlay excluded.
    inspectable: [LayerId; 2],
}

impl<D: DisplaySurface> MapSession<D> {
    /// A session over the boundary and data layers, centered on the
    /// contiguous United States. The data layer draws above the boundary
    /// layer, so it also wins pick ties.
    pub fn new(boundary: VectorLayer, data: VectorLayer, mut display: D, canvas: (f64, f64)) -> Self {
        let [cx, cy] = mercator::from_lon_lat(INITIAL_CENTER.0, INITIAL_CENTER.1);
        let mut engine = MapEngine::new(Viewport::centered_on(cx, cy, canvas.0, canvas.1));

        let boundary = engine.add_layer(boundary);
        let data = engine.add_layer(data);

        display.show_attributes(&DisplayList::Empty);
        display.clear_location();

        Self {
            engine,
            inspector: Inspector::new(),
            display,
            boundary,
            data,
            inspectable: [data, boundary],
        }
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Moved { pixel } => self.pointer_moved(pixel),
            PointerEvent::Clicked { pixel, coordinate } => self.clicked(pixel, coordinate),
        }
    }

    /// Hover feedback only: no tolerance, no selection change.
    fn pointer_moved(&mut self, pixel: [f64; 2]) {
        let hit = self.engine.hit_test(pixel, &self.inspectable, 0.0);
        self.display.set_pointer(hit.is_some());
    }

    fn clicked(&mut self, pixel: [f64; 2], coordinate: [f64; 2]) {
        if let Some(text) = Inspector::report_location(&self.engine, Some(coordinate)) {
            self.display.show_location(&text);
        }

        let picked = self
            .inspector
            .pick(&self.engine, pixel, &self.inspectable)
            .cloned();
        self.display.show_attributes(&Inspector::render(picked.as_ref()));
        Inspector::highlight(&mut self.engine, picked.as_ref());
    }

    /// The clear-selection button.
    pub fn clear_selection(&mut self) {
        self.display.clear_location();
        self.inspector.clear(&mut self.engine, &mut self.display);
    }

    /// Checkbox wiring. Visibility does not affect picking: a hidden layer
    /// stays inspectable.
    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) {
        self.engine.set_layer_visible(id, visible);
    }

    pub fn boundary_layer(&self) -> LayerId {
        self.boundary
    }

    pub fn data_layer(&self) -> LayerId {
        self.data
    }

    pub fn engine(&self) -> &MapEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MapEngine {
        &mut self.engine
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn selection(&self) -> Option<&meridian_shared::Feature> {
        self.inspector.selection()
    }
}
