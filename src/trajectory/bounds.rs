use std::ops::Range;

use crate::trajectory::table::PositionTable;

/// Padding added on each side of the data range
pub const BOUNDS_MARGIN: f64 = 2.0;

/// Axis limits of a view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl AxisBounds {
    pub fn width(&self) -> f64 {
        self.x.1 - self.x.0
    }

    pub fn height(&self) -> f64 {
        self.y.1 - self.y.0
    }

    pub fn center(&self) -> (f64, f64) {
        (0.5 * (self.x.0 + self.x.1), 0.5 * (self.y.0 + self.y.1))
    }
}

/// `(min - 2, max + 2)` over every x column and every y column in `rows`.
/// `None` when the window is empty or the table has no particles.
pub fn axis_bounds(table: &PositionTable, rows: Range<usize>) -> Option<AxisBounds> {
    if rows.is_empty() || table.particle_count() == 0 {
        return None;
    }

    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for row in rows {
        for p in table.row_positions(row) {
            x = (x.0.min(p.x), x.1.max(p.x));
            y = (y.0.min(p.y), y.1.max(p.y));
        }
    }

    Some(AxisBounds {
        x: (x.0 - BOUNDS_MARGIN, x.1 + BOUNDS_MARGIN),
        y: (y.0 - BOUNDS_MARGIN, y.1 + BOUNDS_MARGIN),
    })
}
