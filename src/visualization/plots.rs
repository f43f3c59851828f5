//! Static time-series charts of a positions table
//!
//! - one PNG per particle group: a row per particle, X and Y against time
//! - `first_particles.png`: the first particle of every group, with X, Y and
//!   their distance to the last value of the window on a symmetric log scale

use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::*;
use tracing::{info, warn};

use crate::configuration::config::PlotConfig;
use crate::trajectory::grouping::{first_particles, group_particles, uniform_groups, GroupSpec, ParticleGroup};
use crate::trajectory::table::PositionTable;
use crate::visualization::palette::color_at;

/// Width of the linear region around zero of the symlog scale
pub const SYMLOG_LINTHRESH: f64 = 1e-2;

pub const FIRST_PARTICLES_FILE: &str = "first_particles.png";

const ROW_HEIGHT: u32 = 200;
const COLUMN_WIDTH: u32 = 500;
const TITLE_HEIGHT: u32 = 60;

/// `t = row * dt` for every row of the window
pub fn time_axis(rows: Range<usize>, dt: f64) -> Vec<f64> {
    rows.map(|r| r as f64 * dt).collect()
}

/// `|v - v_last|` for every value
pub fn deviation_from_final(values: &[f64]) -> Vec<f64> {
    match values.last() {
        Some(&last) => values.iter().map(|v| (v - last).abs()).collect(),
        None => Vec::new(),
    }
}

/// Symmetric log: linear within `±linthresh`, one unit per decade beyond
pub fn symlog(v: f64, linthresh: f64) -> f64 {
    let a = v.abs();
    if a <= linthresh {
        v / linthresh
    } else {
        v.signum() * (1.0 + (a / linthresh).log10())
    }
}

/// Inverse of [`symlog`]
pub fn symlog_inv(s: f64, linthresh: f64) -> f64 {
    let a = s.abs();
    if a <= 1.0 {
        s * linthresh
    } else {
        s.signum() * linthresh * 10f64.powf(a - 1.0)
    }
}

/// `min..max` of the values, widened when flat so the chart has a height
pub fn value_range(values: &[f64]) -> Range<f64> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo < 1e-12 {
        let pad = (lo.abs() * 0.05).max(0.5);
        return (lo - pad)..(hi + pad);
    }
    lo..hi
}

fn rgb(i: usize) -> RGBColor {
    let (r, g, b) = color_at(i);
    RGBColor(r, g, b)
}

/// File a group chart is written to
pub fn group_chart_path(dir: &Path, group: &str) -> PathBuf {
    dir.join(format!("{group}.png"))
}

/// One line chart in a cell of a figure
struct Panel<'a> {
    time: &'a [f64],
    values: &'a [f64],
    color: RGBColor,
    caption: Option<&'a str>,
    y_desc: Option<&'a str>,
    x_desc: Option<&'a str>,
    symlog: bool,
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, plotters::coord::Shift>, panel: Panel) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let values: Vec<f64> = if panel.symlog {
        panel.values.iter().map(|&v| symlog(v, SYMLOG_LINTHRESH)).collect()
    } else {
        panel.values.to_vec()
    };
    let t_range = value_range(panel.time);
    let v_range = value_range(&values);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(8)
        .x_label_area_size(if panel.x_desc.is_some() { 40 } else { 25 })
        .y_label_area_size(if panel.y_desc.is_some() { 80 } else { 55 });
    if let Some(caption) = panel.caption {
        builder.caption(caption, ("sans-serif", 20));
    }
    let mut chart = builder
        .build_cartesian_2d(t_range, v_range)
        .map_err(|e| anyhow::anyhow!("building chart: {e}"))?;

    let symlog_labels = |v: &f64| format!("{:.0e}", symlog_inv(*v, SYMLOG_LINTHRESH));
    let plain_labels = |v: &f64| format!("{v:.2}");
    let time_labels = |v: &f64| format!("{v:.1}");

    let mut mesh = chart.configure_mesh();
    mesh.light_line_style(RGBColor(230, 230, 230)).x_label_formatter(&time_labels);
    if panel.symlog {
        mesh.y_label_formatter(&symlog_labels);
    } else {
        mesh.y_label_formatter(&plain_labels);
    }
    if let Some(desc) = panel.y_desc {
        mesh.y_desc(desc);
    }
    if let Some(desc) = panel.x_desc {
        mesh.x_desc(desc);
    }
    mesh.draw().map_err(|e| anyhow::anyhow!("drawing mesh: {e}"))?;

    chart
        .draw_series(LineSeries::new(
            panel.time.iter().copied().zip(values.iter().copied()),
            panel.color.stroke_width(2),
        ))
        .map_err(|e| anyhow::anyhow!("drawing series: {e}"))?;
    Ok(())
}

/// One figure per group: a row per particle, X and Y against time
pub fn render_group(
    table: &PositionTable,
    group: &ParticleGroup,
    rows: Range<usize>,
    dt: f64,
    path: &Path,
) -> Result<()> {
    let n = group.particles.len();
    if n == 0 {
        warn!(group = %group.name, "group has no particles, skipping chart");
        return Ok(());
    }
    let time = time_axis(rows.clone(), dt);

    let size = (2 * COLUMN_WIDTH, ROW_HEIGHT * n as u32 + TITLE_HEIGHT);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&group.name, ("sans-serif", 32))?;
    let cells = root.split_evenly((n, 2));

    for (row, &particle) in group.particles.iter().enumerate() {
        let last = row + 1 == n;
        let x_label = format!("P{} X", row + 1);
        let y_label = format!("P{} Y", row + 1);
        let xs = table.xs(particle, rows.clone());
        let ys = table.ys(particle, rows.clone());

        for (col, (values, label)) in [(&xs, &x_label), (&ys, &y_label)].into_iter().enumerate() {
            draw_panel(
                &cells[row * 2 + col],
                Panel {
                    time: &time,
                    values,
                    color: rgb(row),
                    caption: None,
                    y_desc: Some(label.as_str()),
                    x_desc: last.then_some("Time [s]"),
                    symlog: false,
                },
            )?;
        }
    }

    root.present()?;
    Ok(())
}

/// First particle of every group: X, Y, |ΔX| and |ΔY| against time
pub fn render_first_particles(
    table: &PositionTable,
    firsts: &[(String, usize)],
    rows: Range<usize>,
    dt: f64,
    path: &Path,
) -> Result<()> {
    let n = firsts.len();
    if n == 0 {
        warn!("no non-empty groups, skipping first particles chart");
        return Ok(());
    }
    let time = time_axis(rows.clone(), dt);

    let size = (4 * COLUMN_WIDTH, ROW_HEIGHT * n as u32 + TITLE_HEIGHT);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("First particle of each group", ("sans-serif", 32))?;
    let cells = root.split_evenly((n, 4));

    let titles = ["X", "Y", "ΔX", "ΔY"];
    for (row, (name, particle)) in firsts.iter().enumerate() {
        let last = row + 1 == n;
        let xs = table.xs(*particle, rows.clone());
        let ys = table.ys(*particle, rows.clone());
        let dxs = deviation_from_final(&xs);
        let dys = deviation_from_final(&ys);

        let columns = [(&xs, false), (&ys, false), (&dxs, true), (&dys, true)];
        for (col, (values, symlog)) in columns.into_iter().enumerate() {
            draw_panel(
                &cells[row * 4 + col],
                Panel {
                    time: &time,
                    values,
                    color: rgb(row),
                    caption: (row == 0).then_some(titles[col]),
                    y_desc: (col == 0).then_some(name.as_str()),
                    x_desc: (last && col < 2).then_some("Time [s]"),
                    symlog,
                },
            )?;
        }
    }

    root.present()?;
    Ok(())
}

/// Render every group chart and the first particles chart into
/// `cfg.output_dir`. `specs` overrides the count table of `cfg`.
pub fn render_all(table: &PositionTable, cfg: &PlotConfig, specs: Option<Vec<GroupSpec>>) -> Result<Vec<PathBuf>> {
    let specs = match specs {
        Some(s) => s,
        None if !cfg.groups.is_empty() => cfg.groups.clone(),
        None => uniform_groups(table.particle_count(), cfg.group_size),
    };
    let groups = group_particles(&specs, table.particle_count())?;

    let rows = table.window(cfg.window.start, cfg.window.end);
    anyhow::ensure!(
        !rows.is_empty(),
        "row window {}..{} is empty for a table of {} rows",
        cfg.window.start,
        cfg.window.end,
        table.len()
    );

    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating {}", cfg.output_dir.display()))?;

    let mut written = Vec::new();
    for group in &groups {
        let path = group_chart_path(&cfg.output_dir, &group.name);
        render_group(table, group, rows.clone(), cfg.dt, &path)
            .with_context(|| format!("rendering {}", path.display()))?;
        if !group.particles.is_empty() {
            info!(path = %path.display(), particles = group.particles.len(), "wrote group chart");
            written.push(path);
        }
    }

    let firsts = first_particles(&groups);
    let path = cfg.output_dir.join(FIRST_PARTICLES_FILE);
    render_first_particles(table, &firsts, rows, cfg.dt, &path)
        .with_context(|| format!("rendering {}", path.display()))?;
    if !firsts.is_empty() {
        info!(path = %path.display(), groups = firsts.len(), "wrote first particles chart");
        written.push(path);
    }

    Ok(written)
}
