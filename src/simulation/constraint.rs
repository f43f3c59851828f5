//! Distance constraints between two particles of the same soft body
//!
//! Constraints refer to particles by index into their body's particle list,
//! so a body can be cloned or serialized without fixing up references.

use serde::{Deserialize, Serialize};

use crate::simulation::states::Particle;

pub const DEFAULT_STIFFNESS: f64 = 0.5;
pub const DEFAULT_DAMPING: f64 = 0.1;

/// Separations below this are treated as coincident particles
const MIN_SEPARATION: f64 = 1e-8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    pub a: usize, // first particle index
    pub b: usize, // second particle index
    pub rest_length: f64, // distance the constraint restores
    pub stiffness: f64, // share of the stretch corrected per step
    pub damping: f64, // share of the relative axial velocity removed per step
}

impl Constraint {
    /// Constraint whose rest length is the current distance between `a` and `b`
    pub fn new(particles: &[Particle], a: usize, b: usize, stiffness: f64, damping: f64) -> Self {
        let rest_length = (particles[b].x - particles[a].x).norm();
        Self {
            a,
            b,
            rest_length,
            stiffness,
            damping,
        }
    }

    pub fn with_defaults(particles: &[Particle], a: usize, b: usize) -> Self {
        Self::new(particles, a, b, DEFAULT_STIFFNESS, DEFAULT_DAMPING)
    }

    /// Queue corrections on both particles pulling them back to `rest_length`.
    /// The corrections are applied by `Particle::update`.
    pub fn apply(&self, particles: &mut [Particle]) {
        let (pa, pb) = (&particles[self.a], &particles[self.b]);

        let delta = pb.x - pa.x;
        let dist = delta.norm();
        if dist < MIN_SEPARATION {
            return;
        }
        let n = delta / dist;

        // positive when stretched or separating
        let stretch = dist - self.rest_length;
        let rel_v = (pb.velocity() - pa.velocity()).dot(&n);

        let corr = n * (0.5 * (self.stiffness * stretch + self.damping * rel_v));

        if !particles[self.a].pinned {
            particles[self.a].correct(corr);
        }
        if !particles[self.b].pinned {
            particles[self.b].correct(-corr);
        }
    }

    /// Current length of the constraint
    pub fn length(&self, particles: &[Particle]) -> f64 {
        (particles[self.b].x - particles[self.a].x).norm()
    }
}
