//! What an animation frame shows, independent of how it is drawn
//!
//! Shared by the bevy window and the headless PNG export.

use crate::configuration::config::ColliderConfig;
use crate::simulation::states::NVec2;
use crate::trajectory::bounds::AxisBounds;
use crate::trajectory::table::PositionTable;
use crate::visualization::palette::{OUTLINE_BLACK, OUTLINE_GREEN};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub frame: usize, // row shown
    pub t: f64, // simulated time of the row
    pub positions: Vec<NVec2>, // one per particle
    pub label: String, // time label
}

/// Row `frame` of the table, wrapping around at the end
pub fn frame_state(table: &PositionTable, frame: usize, dt: f64) -> FrameState {
    let frame = if table.is_empty() { 0 } else { frame % table.len() };
    let t = frame as f64 * dt;
    FrameState {
        frame,
        t,
        positions: if table.is_empty() { Vec::new() } else { table.row_positions(frame) },
        label: time_label(t),
    }
}

pub fn time_label(t: f64) -> String {
    format!("t = {t:.3} s")
}

/// Static world geometry as drawable primitives
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Segment {
        from: NVec2,
        to: NVec2,
        color: (u8, u8, u8),
    },
    Circle {
        center: NVec2,
        radius: f64,
        color: (u8, u8, u8),
    },
}

/// Planes become a segment across the view, circles stay circles.
/// Inner circle colliders are green, the rest black.
pub fn world_outlines(colliders: &[ColliderConfig], bounds: &AxisBounds) -> Vec<Outline> {
    colliders
        .iter()
        .filter_map(|c| match *c {
            ColliderConfig::Plane { normal, distance } => plane_segment(normal, distance, bounds),
            ColliderConfig::InnerCircle { center, radius } => Some(Outline::Circle {
                center: NVec2::new(center[0], center[1]),
                radius,
                color: OUTLINE_GREEN,
            }),
            ColliderConfig::OuterCircle { center, radius } => Some(Outline::Circle {
                center: NVec2::new(center[0], center[1]),
                radius,
                color: OUTLINE_BLACK,
            }),
        })
        .collect()
}

fn plane_segment(normal: [f64; 2], distance: f64, bounds: &AxisBounds) -> Option<Outline> {
    let n = NVec2::new(normal[0], normal[1]);
    let len = n.norm();
    if len == 0.0 {
        return None;
    }
    let n = n / len;

    // n.x * x + n.y * y = distance
    let (from, to) = if n.y.abs() > 1e-9 {
        let y_at = |x: f64| (distance - n.x * x) / n.y;
        (
            NVec2::new(bounds.x.0, y_at(bounds.x.0)),
            NVec2::new(bounds.x.1, y_at(bounds.x.1)),
        )
    } else {
        let x = distance / n.x;
        (NVec2::new(x, bounds.y.0), NVec2::new(x, bounds.y.1))
    };

    Some(Outline::Segment {
        from,
        to,
        color: OUTLINE_BLACK,
    })
}

/// Closed polyline approximating a circle, first point repeated at the end
pub fn circle_points(center: NVec2, radius: f64, segments: usize) -> Vec<(f64, f64)> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / segments as f64;
            (center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

/// Bounds of a set of points and circles, padded by `margin`
pub fn extent(points: &[NVec2], circles: &[(NVec2, f64)], margin: f64) -> Option<AxisBounds> {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);

    for p in points {
        x = (x.0.min(p.x), x.1.max(p.x));
        y = (y.0.min(p.y), y.1.max(p.y));
    }
    for (c, r) in circles {
        x = (x.0.min(c.x - r), x.1.max(c.x + r));
        y = (y.0.min(c.y - r), y.1.max(c.y + r));
    }

    if !x.0.is_finite() || !y.0.is_finite() {
        return None;
    }
    Some(AxisBounds {
        x: (x.0 - margin, x.1 + margin),
        y: (y.0 - margin, y.1 + margin),
    })
}
