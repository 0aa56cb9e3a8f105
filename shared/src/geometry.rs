use serde::{Deserialize, Serialize};

/// A single `[x, y]` position in projected world coordinates.
pub type Position = [f64; 2];

/// GeoJSON geometry. The `type`/`coordinates` wire form is handled by serde;
/// nothing here parses text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

/// Axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn expand(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(mut self, other: Bounds) -> Bounds {
        self.expand(other.min_x, other.min_y);
        self.expand(other.max_x, other.max_y);
        self
    }

    /// Grown by `margin` on every side.
    pub fn inflated(&self, margin: f64) -> Bounds {
        Bounds {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl Geometry {
    /// Bounding box over all positions, or `None` for a degenerate geometry
    /// with no positions at all.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        self.for_each_position(|[x, y]| match &mut bounds {
            Some(b) => b.expand(x, y),
            slot => *slot = Some(Bounds::point(x, y)),
        });
        bounds
    }

    /// Whether the point lies on the geometry, or within `tolerance` world
    /// units of its rendered elements. Tolerance makes point-like and thin
    /// features clickable.
    pub fn covers(&self, x: f64, y: f64, tolerance: f64) -> bool {
        let tolerance_sq = tolerance * tolerance;
        match self {
            Geometry::Point { coordinates } => {
                point_distance_sq(x, y, *coordinates) <= tolerance_sq
            }
            Geometry::MultiPoint { coordinates } => coordinates
                .iter()
                .any(|p| point_distance_sq(x, y, *p) <= tolerance_sq),
            Geometry::LineString { coordinates } => {
                polyline_distance_sq(coordinates, x, y) <= tolerance_sq
            }
            Geometry::MultiLineString { coordinates } => coordinates
                .iter()
                .any(|line| polyline_distance_sq(line, x, y) <= tolerance_sq),
            Geometry::Polygon { coordinates } => {
                polygon_covers(coordinates, x, y, tolerance_sq)
            }
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .any(|rings| polygon_covers(rings, x, y, tolerance_sq)),
        }
    }

    fn for_each_position(&self, mut visit: impl FnMut(Position)) {
        match self {
            Geometry::Point { coordinates } => visit(*coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.iter().copied().for_each(visit);
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                for line in coordinates {
                    for position in line {
                        visit(*position);
                    }
                }
            }
            Geometry::MultiPolygon { coordinates } => {
                for rings in coordinates {
                    for ring in rings {
                        for position in ring {
                            visit(*position);
                        }
                    }
                }
            }
        }
    }
}

fn point_distance_sq(x: f64, y: f64, [px, py]: Position) -> f64 {
    let dx = x - px;
    let dy = y - py;
    dx * dx + dy * dy
}

fn segment_distance_sq(x: f64, y: f64, [ax, ay]: Position, [bx, by]: Position) -> f64 {
    let dx = bx - ax;
    let dy = by - ay;
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq <= f64::EPSILON {
        0.0
    } else {
        (((x - ax) * dx + (y - ay) * dy) / length_sq).clamp(0.0, 1.0)
    };
    point_distance_sq(x, y, [ax + t * dx, ay + t * dy])
}

fn polyline_distance_sq(line: &[Position], x: f64, y: f64) -> f64 {
    match line {
        [] => f64::INFINITY,
        [only] => point_distance_sq(x, y, *only),
        _ => line
            .windows(2)
            .map(|pair| segment_distance_sq(x, y, pair[0], pair[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Even-odd ray cast against a single ring.
fn ring_contains(ring: &[Position], x: f64, y: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Even-odd over all rings, so holes subtract. A point within `tolerance` of
/// any ring edge also counts, keeping thin slivers and borders clickable.
fn polygon_covers(rings: &[Vec<Position>], x: f64, y: f64, tolerance_sq: f64) -> bool {
    let mut inside = false;
    for ring in rings {
        if ring_contains(ring, x, y) {
            inside = !inside;
        }
    }
    if inside {
        return true;
    }
    tolerance_sq > 0.0
        && rings
            .iter()
            .any(|ring| polyline_distance_sq(ring, x, y) <= tolerance_sq)
}
