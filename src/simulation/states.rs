//! Core state types for the soft-body simulation.
//!
//! Defines the position-Verlet `Particle` and the `SoftBody` that groups
//! particles with the distance constraints holding them together.
//!
//! Velocities are implicit: a particle moves by `x - x_prev` every step.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::simulation::constraint::Constraint;

pub type NVec2 = Vector2<f64>;

/// Default particle radius, also used as the drawn radius in the viewer
pub const DEFAULT_RADIUS: f64 = 1.0;
pub const DEFAULT_FRICTION: f64 = 0.5;
pub const DEFAULT_RESTITUTION: f64 = 0.5;

fn zero() -> NVec2 {
    NVec2::zeros()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub x: NVec2, // position
    pub x_prev: NVec2, // position at the previous step
    #[serde(skip, default = "zero")]
    pub f: NVec2, // force accumulator
    #[serde(skip, default = "zero")]
    pub corr: NVec2, // positional correction accumulator
    pub m: f64, // mass
    pub inv_m: f64, // inverse mass, 0 for immovable particles
    pub radius: f64, // collision radius
    pub pinned: bool, // pinned particles never move
}

impl Particle {
    /// Particle at rest at `x` with mass `m`
    pub fn new(x: NVec2, m: f64) -> Self {
        let inv_m = if m > 0.0 { m.recip() } else { 0.0 };
        Self {
            x,
            x_prev: x,
            f: NVec2::zeros(),
            corr: NVec2::zeros(),
            m,
            inv_m,
            radius: DEFAULT_RADIUS,
            pinned: false,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn apply_force(&mut self, f: NVec2) {
        self.f += f;
    }

    /// Queue a positional correction, applied on the next `update`
    pub fn correct(&mut self, d: NVec2) {
        self.corr += d;
    }

    /// Move the particle; the old position becomes the previous one
    pub fn set_position(&mut self, x: NVec2) {
        self.x_prev = self.x;
        self.x = x;
    }

    pub fn set_prev_position(&mut self, x_prev: NVec2) {
        self.x_prev = x_prev;
    }

    /// Displacement over the last step
    pub fn velocity(&self) -> NVec2 {
        self.x - self.x_prev
    }

    /// Advance one step with position Verlet:
    /// x_n+1 = x_n + (x_n - x_n-1) + a dt^2 + correction
    pub fn update(&mut self, dt: f64) {
        if self.pinned {
            self.x_prev = self.x;
        } else {
            let a = self.f * self.inv_m;
            let next = self.x + (self.x - self.x_prev) + a * (dt * dt) + self.corr;
            self.x_prev = self.x;
            self.x = next;
        }

        // reset accumulators
        self.f = NVec2::zeros();
        self.corr = NVec2::zeros();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftBody {
    pub particles: Vec<Particle>,
    pub constraints: Vec<Constraint>,
    pub friction: f64, // tangential friction coefficient
    pub restitution: f64, // elasticity in body-body contacts
}

impl SoftBody {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            constraints: Vec::new(),
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        }
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_material(mut self, friction: f64, restitution: f64) -> Self {
        self.friction = friction;
        self.restitution = restitution;
        self
    }

    /// Add the same force to every particle
    pub fn apply_force(&mut self, f: NVec2) {
        for p in self.particles.iter_mut() {
            p.apply_force(f);
        }
    }

    /// Add `g * m` to every particle
    pub fn apply_gravity(&mut self, g: NVec2) {
        for p in self.particles.iter_mut() {
            p.apply_force(g * p.m);
        }
    }

    /// Apply constraints, then integrate every particle
    pub fn update(&mut self, dt: f64) {
        for c in &self.constraints {
            c.apply(&mut self.particles);
        }
        for p in self.particles.iter_mut() {
            p.update(dt);
        }
    }

    /// Mean particle position
    pub fn centroid(&self) -> NVec2 {
        if self.particles.is_empty() {
            return NVec2::zeros();
        }
        let sum = self.particles.iter().fold(NVec2::zeros(), |acc, p| acc + p.x);
        sum / self.particles.len() as f64
    }
}
