//! Headless run that records particle positions into a positions table

use std::io::Write;

use tracing::info;

use crate::simulation::engine::Simulation;
use crate::simulation::params::Parameters;
use crate::trajectory::writer::PositionWriter;
use crate::trajectory::TableError;

/// Write the current state as the first row (numbered `t / dt`), then
/// step `params.steps` times and write one row per step. Returns the number of rows written.
pub fn record<W: Write>(
    sim: &mut Simulation,
    params: &Parameters,
    out: &mut PositionWriter<W>,
) -> Result<usize, TableError> {
    // a resumed simulation carries on its step numbering
    let first = if params.dt > 0.0 { (sim.t / params.dt).round() as u64 } else { 0 };
    out.write_row(first, sim.positions())?;

    for i in 1..=params.steps {
        sim.step(params.dt);
        out.write_row(first + i as u64, sim.positions())?;

        if params.log_every > 0 && i % params.log_every == 0 {
            info!(step = i, t = sim.t, "step completed");
        }
    }

    out.flush()?;
    Ok(params.steps + 1)
}
