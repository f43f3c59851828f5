//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - numerical parameters (`Parameters`)
//! - the world (`Simulation` with bodies and colliders at t = 0)
//! - one label per body, used to name particle groups in plots
//!
//! The scenario is inserted into Bevy as a `Resource` by the live viewer and
//! stepped headlessly by the recorder

use bevy::prelude::Resource;
use tracing::info;

use crate::configuration::config::{BodyConfig, ColliderConfig, ScenarioConfig, ShapeKind};
use crate::simulation::colliders::{InnerCircleCollider, OuterCircleCollider, PlaneCollider, WorldCollider};
use crate::simulation::engine::Simulation;
use crate::simulation::factory::{self, BodyParams};
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec2, SoftBody};
use crate::simulation::SimError;
use crate::trajectory::grouping::GroupSpec;

/// Runtime bundle built from a [`ScenarioConfig`]
#[derive(Resource)]
pub struct Scenario {
    pub parameters: Parameters,
    pub simulation: Simulation,
    pub labels: Vec<String>, // one per body
}

impl Scenario {
    pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Self, SimError> {
        let e_cfg = &cfg.engine;
        let parameters = Parameters {
            dt: e_cfg.dt,
            steps: e_cfg.steps,
            log_every: e_cfg.log_every,
        };

        let mut simulation = Simulation::new(NVec2::new(e_cfg.gravity[0], e_cfg.gravity[1]));
        for c in &cfg.colliders {
            simulation.colliders.push(build_collider(c));
        }

        let mut labels = Vec::with_capacity(cfg.bodies.len());
        for (i, bc) in cfg.bodies.iter().enumerate() {
            simulation.add_body(build_body(bc)?);
            labels.push(bc.label.clone().unwrap_or_else(|| format!("Body {}", i + 1)));
        }

        info!(
            bodies = simulation.bodies.len(),
            particles = simulation.particle_count(),
            colliders = simulation.colliders.len(),
            "built scenario"
        );

        Ok(Self {
            parameters,
            simulation,
            labels,
        })
    }

    /// Count table matching the recorded column order, one group per body
    pub fn group_specs(&self) -> Vec<GroupSpec> {
        self.labels
            .iter()
            .zip(self.simulation.bodies.iter())
            .map(|(name, body)| GroupSpec {
                name: name.clone(),
                count: body.particles.len(),
            })
            .collect()
    }
}

pub fn build_collider(cfg: &ColliderConfig) -> Box<dyn WorldCollider + Send + Sync> {
    match *cfg {
        ColliderConfig::Plane { normal, distance } => {
            Box::new(PlaneCollider::new(NVec2::new(normal[0], normal[1]), distance))
        }
        ColliderConfig::InnerCircle { center, radius } => {
            Box::new(InnerCircleCollider::new(NVec2::new(center[0], center[1]), radius))
        }
        ColliderConfig::OuterCircle { center, radius } => {
            Box::new(OuterCircleCollider::new(NVec2::new(center[0], center[1]), radius))
        }
    }
}

pub fn build_body(cfg: &BodyConfig) -> Result<SoftBody, SimError> {
    let params = BodyParams {
        mass: cfg.mass,
        radius: cfg.radius,
        stiffness: cfg.stiffness,
        damping: cfg.damping,
        friction: cfg.friction,
        restitution: cfg.restitution,
    };

    let center = cfg.center.map(|c| NVec2::new(c[0], c[1])).unwrap_or_else(NVec2::zeros);
    let mut body = match cfg.shape {
        ShapeKind::Square => factory::square(center, cfg.half_size, &params),
        ShapeKind::Triangle => factory::triangle(center, cfg.half_size, &params),
        ShapeKind::Polygon => {
            let vertices: Vec<NVec2> = cfg.vertices.iter().map(|v| NVec2::new(v[0], v[1])).collect();
            factory::polygon(&vertices, cfg.spacing, &params)?
        }
    };

    let len = body.particles.len();
    for &index in &cfg.pinned {
        let p = body
            .particles
            .get_mut(index)
            .ok_or(SimError::PinnedOutOfRange { index, len })?;
        p.pinned = true;
    }

    Ok(body)
}
