//! Save and restore the full simulation state as JSON
//!
//! Colliders are stored through their [`ColliderConfig`], bodies as-is
//! (positions, previous positions, constraints, material).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::configuration::config::ColliderConfig;
use crate::simulation::engine::Simulation;
use crate::simulation::scenario::build_collider;
use crate::simulation::states::{NVec2, SoftBody};
use crate::simulation::SimError;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SimulationSnapshot {
    pub t: f64,
    pub gravity: NVec2,
    pub colliders: Vec<ColliderConfig>,
    pub bodies: Vec<SoftBody>,
}

impl SimulationSnapshot {
    pub fn capture(sim: &Simulation) -> Self {
        Self {
            t: sim.t,
            gravity: sim.gravity,
            colliders: sim.colliders.configs(),
            bodies: sim.bodies.clone(),
        }
    }

    pub fn restore(&self) -> Result<Simulation, SimError> {
        let mut sim = Simulation::new(self.gravity);
        sim.t = self.t;
        for c in &self.colliders {
            c.validate().map_err(|e| SimError::Collider(e.to_string()))?;
            sim.colliders.push(build_collider(c));
        }
        sim.bodies = self.bodies.clone();
        for (b, body) in sim.bodies.iter_mut().enumerate() {
            let len = body.particles.len();
            for c in &body.constraints {
                if let Some(&index) = [c.a, c.b].iter().find(|&&i| i >= len) {
                    return Err(SimError::ConstraintOutOfRange { body: b, index, len });
                }
            }
            // inverse masses are derived, never read back
            for p in body.particles.iter_mut() {
                p.inv_m = if p.m > 0.0 && !p.pinned { p.m.recip() } else { 0.0 };
            }
        }
        Ok(sim)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), SimError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self, SimError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

pub fn save_simulation(sim: &Simulation, path: &Path) -> Result<(), SimError> {
    info!(path = %path.display(), t = sim.t, "saving simulation");
    let mut writer = BufWriter::new(File::create(path)?);
    SimulationSnapshot::capture(sim).write_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn load_simulation(path: &Path) -> Result<Simulation, SimError> {
    info!(path = %path.display(), "loading simulation");
    let reader = BufReader::new(File::open(path)?);
    SimulationSnapshot::read_from(reader)?.restore()
}
