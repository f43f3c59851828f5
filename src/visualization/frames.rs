//! Headless animation export: one PNG per frame, drawn with plotters

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::*;
use tracing::info;

use crate::configuration::config::ColliderConfig;
use crate::trajectory::bounds::{axis_bounds, AxisBounds};
use crate::trajectory::table::PositionTable;
use crate::visualization::palette::{color_at, PARTICLE_ALPHA};
use crate::visualization::replay::{circle_points, frame_state, world_outlines, FrameState, Outline};

const CIRCLE_SEGMENTS: usize = 48;

#[derive(Debug, Clone)]
pub struct FrameExport {
    pub dir: PathBuf, // output directory
    pub every: usize, // keep every n-th frame
    pub dt: f64, // seconds per row
    pub radius: f64, // drawn particle radius
    pub size: (u32, u32), // image size in pixels
}

pub fn frame_path(dir: &Path, frame: usize) -> PathBuf {
    dir.join(format!("frame_{frame:06}.png"))
}

/// Render every `opts.every`-th row of the table, returns the number of files
pub fn export_frames(table: &PositionTable, colliders: &[ColliderConfig], opts: &FrameExport) -> Result<usize> {
    let bounds = axis_bounds(table, table.full()).context("table has no particles to draw")?;
    let outlines = world_outlines(colliders, &bounds);

    std::fs::create_dir_all(&opts.dir).with_context(|| format!("creating {}", opts.dir.display()))?;

    let every = opts.every.max(1);
    let mut written = 0;
    for frame in (0..table.len()).step_by(every) {
        let state = frame_state(table, frame, opts.dt);
        let path = frame_path(&opts.dir, frame);
        render_frame(&state, &bounds, &outlines, opts.radius, opts.size, &path)
            .with_context(|| format!("rendering {}", path.display()))?;
        written += 1;
    }

    info!(dir = %opts.dir.display(), frames = written, "exported frames");
    Ok(written)
}

pub fn render_frame(
    state: &FrameState,
    bounds: &AxisBounds,
    outlines: &[Outline],
    radius: f64,
    size: (u32, u32),
    path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(bounds.x.0..bounds.x.1, bounds.y.0..bounds.y.1)?;
    chart.configure_mesh().disable_mesh().draw()?;

    for outline in outlines {
        match outline {
            Outline::Segment { from, to, color } => {
                let (r, g, b) = *color;
                chart.draw_series(LineSeries::new(
                    [(from.x, from.y), (to.x, to.y)],
                    RGBColor(r, g, b).stroke_width(2),
                ))?;
            }
            Outline::Circle { center, radius, color } => {
                let (r, g, b) = *color;
                chart.draw_series(LineSeries::new(
                    circle_points(*center, *radius, CIRCLE_SEGMENTS),
                    RGBColor(r, g, b).stroke_width(2),
                ))?;
            }
        }
    }

    chart.draw_series(state.positions.iter().enumerate().map(|(i, p)| {
        let (r, g, b) = color_at(i);
        Polygon::new(
            circle_points(*p, radius, CIRCLE_SEGMENTS),
            RGBColor(r, g, b).mix(PARTICLE_ALPHA).filled(),
        )
    }))?;

    root.draw(&Text::new(
        state.label.clone(),
        (60, 20),
        ("sans-serif", 20).into_font(),
    ))?;

    root.present()?;
    Ok(())
}
