//! Fixed-size latitude/longitude buckets for hotspot density.
//!
//! A cell is the coordinate scaled by `cells_per_degree` and truncated toward
//! zero, so at 100 cells per degree each bucket spans 0.01°.

use std::collections::HashMap;

use geo::Point;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GridCell {
    pub lat: i32,
    pub lon: i32,
}

impl GridCell {
    pub fn containing(point: Point, cells_per_degree: f64) -> Self {
        Self {
            lat: (point.y() * cells_per_degree).trunc() as i32,
            lon: (point.x() * cells_per_degree).trunc() as i32,
        }
    }
}

/// Point counts per grid cell
#[derive(Clone, Debug)]
pub struct DensityGrid {
    cells_per_degree: f64,
    counts: HashMap<GridCell, usize>,
    // First-seen order, so ties between cells resolve the same way every run
    order: Vec<GridCell>,
}

impl DensityGrid {
    /// Create an empty grid whose cells are `resolution_deg` degrees wide
    pub fn new(resolution_deg: f64) -> Self {
        Self {
            cells_per_degree: 1.0 / resolution_deg,
            counts: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn insert(&mut self, point: Point) {
        let cell = GridCell::containing(point, self.cells_per_degree);
        let count = self.counts.entry(cell).or_insert_with(|| {
            self.order.push(cell);
            0
        });
        *count += 1;
    }

    pub fn occupied_cells(&self) -> usize {
        self.counts.len()
    }

    /// Cell holding the most points
    pub fn densest(&self) -> Option<(GridCell, usize)> {
        self.order
            .iter()
            .map(|cell| (*cell, self.counts[cell]))
            .fold(None, |best, (cell, count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((cell, count)),
            })
    }
}

impl Extend<Point> for DensityGrid {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, iter: I) {
        for point in iter {
            self.insert(point);
        }
    }
}
