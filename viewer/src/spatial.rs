use meridian_shared::{Bounds, Feature};

const GRID_COLS: usize = 50;
const GRID_ROWS: usize = 50;

/// A flat 2D spatial grid over world space for O(1) hit-test candidate
/// lookup. Rebuilt only when the owning layer's features are replaced.
pub struct SpatialGrid {
    cells: Vec<Vec<usize>>,
    boxes: Vec<Option<Bounds>>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl SpatialGrid {
    pub fn build(features: &[Feature]) -> Self {
        let boxes: Vec<Option<Bounds>> = features
            .iter()
            .map(|feature| feature.geometry.bounds())
            .collect();

        let Some(world) = boxes
            .iter()
            .flatten()
            .copied()
            .reduce(Bounds::union)
        else {
            return Self {
                cells: Vec::new(),
                boxes,
                min_x: 0.0,
                min_y: 0.0,
                cell_w: 1.0,
                cell_h: 1.0,
            };
        };

        // Small padding avoids edge issues for features on the outer border.
        let world = world.inflated(1.0);
        let min_x = world.min_x;
        let min_y = world.min_y;
        let cell_w = world.width() / GRID_COLS as f64;
        let cell_h = world.height() / GRID_ROWS as f64;

        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];
        for (idx, bounds) in boxes.iter().enumerate() {
            let Some(bounds) = bounds else { continue };

            // Insert into all overlapping grid cells
            let col_start = ((bounds.min_x - min_x) / cell_w).floor().max(0.0) as usize;
            let col_end = ((bounds.max_x - min_x) / cell_w).ceil().min(GRID_COLS as f64) as usize;
            let row_start = ((bounds.min_y - min_y) / cell_h).floor().max(0.0) as usize;
            let row_end = ((bounds.max_y - min_y) / cell_h).ceil().min(GRID_ROWS as f64) as usize;

            for row in row_start..row_end {
                for col in col_start..col_end {
                    cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        Self {
            cells,
            boxes,
            min_x,
            min_y,
            cell_w,
            cell_h,
        }
    }

    /// Returns the world-coordinate bounding box of all features, or `None`
    /// if the grid is empty.
    pub fn world_bounds(&self) -> Option<Bounds> {
        if self.cells.is_empty() {
            return None;
        }
        Some(Bounds {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.min_x + self.cell_w * GRID_COLS as f64,
            max_y: self.min_y + self.cell_h * GRID_ROWS as f64,
        })
    }

    /// Feature indices, in insertion order, whose bounding box inflated by
    /// `margin` contains the point. Exact geometry tests are the caller's
    /// job.
    pub fn candidates_at(&self, wx: f64, wy: f64, margin: f64) -> Vec<usize> {
        if self.cells.is_empty() {
            return Vec::new();
        }

        let col_start = self.clamp_col((wx - margin - self.min_x) / self.cell_w);
        let col_end = self.clamp_col((wx + margin - self.min_x) / self.cell_w);
        let row_start = self.clamp_row((wy - margin - self.min_y) / self.cell_h);
        let row_end = self.clamp_row((wy + margin - self.min_y) / self.cell_h);

        let mut candidates = Vec::new();
        for row in row_start..=row_end {
            for col in col_start..=col_end {
                for &idx in &self.cells[row * GRID_COLS + col] {
                    if !candidates.contains(&idx) {
                        candidates.push(idx);
                    }
                }
            }
        }

        candidates.sort_unstable();
        candidates.retain(|&idx| {
            self.boxes[idx]
                .map(|bounds| bounds.inflated(margin).contains(wx, wy))
                .unwrap_or(false)
        });
        candidates
    }

    fn clamp_col(&self, raw: f64) -> usize {
        (raw.floor().max(0.0) as usize).min(GRID_COLS - 1)
    }

    fn clamp_row(&self, raw: f64) -> usize {
        (raw.floor().max(0.0) as usize).min(GRID_ROWS - 1)
    }
}
