//! The soft-body world: gravity, bodies and world colliders
//!
//! One `step` runs, in order:
//! 1. gravity on every particle,
//! 2. body update (constraints, then Verlet integration),
//! 3. world collisions,
//! 4. particle-particle collisions between different bodies.

use tracing::debug;

use crate::simulation::colliders::{ColliderSet, WorldCollider};
use crate::simulation::states::{NVec2, Particle, SoftBody};

/// Tangents shorter than this carry no friction
const MIN_TANGENT: f64 = 1e-6;

pub struct Simulation {
    pub gravity: NVec2, // gravitational acceleration
    pub bodies: Vec<SoftBody>,
    pub colliders: ColliderSet,
    pub t: f64, // time
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(NVec2::zeros())
    }
}

impl Simulation {
    pub fn new(gravity: NVec2) -> Self {
        Self {
            gravity,
            bodies: Vec::new(),
            colliders: ColliderSet::new(),
            t: 0.0,
        }
    }

    pub fn set_gravity(&mut self, gravity: NVec2) {
        self.gravity = gravity;
    }

    pub fn add_body(&mut self, body: SoftBody) {
        self.bodies.push(body);
    }

    pub fn add_collider<T>(&mut self, collider: T)
    where
        T: WorldCollider + Send + Sync + 'static,
    {
        self.colliders.push(Box::new(collider));
    }

    /// Remove all bodies and colliders
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.colliders.clear();
    }

    pub fn particle_count(&self) -> usize {
        self.bodies.iter().map(|b| b.particles.len()).sum()
    }

    /// All particle positions in body order, then particle order
    pub fn positions(&self) -> impl Iterator<Item = NVec2> + '_ {
        self.bodies.iter().flat_map(|b| b.particles.iter().map(|p| p.x))
    }

    /// Advance the world by `dt`
    pub fn step(&mut self, dt: f64) {
        for body in self.bodies.iter_mut() {
            body.apply_gravity(self.gravity);
        }

        for body in self.bodies.iter_mut() {
            body.update(dt);
        }

        let world_hits = self.collisions_world();
        let body_hits = self.collisions_bodies();
        if world_hits + body_hits > 0 {
            debug!(t = self.t, world_hits, body_hits, "resolved contacts");
        }

        self.t += dt;
    }

    fn collisions_world(&mut self) -> usize {
        let colliders = &self.colliders;
        let mut hits = 0;
        for body in self.bodies.iter_mut() {
            for p in body.particles.iter_mut() {
                hits += colliders.resolve(p);
            }
        }
        hits
    }

    /// Particle-particle contacts between different bodies
    fn collisions_bodies(&mut self) -> usize {
        let n = self.bodies.len();
        let mut hits = 0;

        for i in 0..n {
            // split so bodies i and j can be borrowed mutably together
            let (head, tail) = self.bodies.split_at_mut(i + 1);
            let body1 = &mut head[i];

            for body2 in tail.iter_mut() {
                // mean friction, least elastic restitution
                let mu = 0.5 * (body1.friction + body2.friction);
                let restitution = body1.restitution.min(body2.restitution);

                for p1 in body1.particles.iter_mut() {
                    for p2 in body2.particles.iter_mut() {
                        if resolve_contact(p1, p2, mu, restitution) {
                            hits += 1;
                        }
                    }
                }
            }
        }
        hits
    }
}

/// Separate two overlapping particles and rewrite their Verlet velocities.
/// Returns whether the particles were in contact.
pub fn resolve_contact(p1: &mut Particle, p2: &mut Particle, mu: f64, restitution: f64) -> bool {
    let delta = p1.x - p2.x;
    let dist = delta.norm();
    let min_dist = p1.radius + p2.radius;

    if dist <= 0.0 || dist >= min_dist {
        return false;
    }

    // inverse-mass weights, pinned particles take no share
    let inv1 = if p1.pinned { 0.0 } else { p1.inv_m };
    let inv2 = if p2.pinned { 0.0 } else { p2.inv_m };
    let inv_sum = inv1 + inv2;
    if inv_sum <= 0.0 {
        return false;
    }
    let w1 = inv1 / inv_sum;
    let w2 = inv2 / inv_sum;

    let n = delta / dist; // contact normal, from p2 to p1
    let overlap = min_dist - dist;

    // positional correction
    p1.x += n * (overlap * w1);
    p2.x -= n * (overlap * w2);

    let mut v1 = p1.velocity();
    let mut v2 = p2.velocity();
    let rel_v = v1 - v2;

    // normal impulse, only when approaching
    let vn = rel_v.dot(&n);
    let jn = -(1.0 + restitution) * vn;
    if vn < 0.0 {
        v1 += n * (jn * w1);
        v2 -= n * (jn * w2);
    }

    // friction, bounded by the normal impulse even when separating
    let tangent = rel_v - n * vn;
    let t_len = tangent.norm();
    if t_len > MIN_TANGENT {
        let t = tangent / t_len;
        let vt = rel_v.dot(&t);
        let max_friction = mu * jn.abs();
        let jt = vt.clamp(-max_friction, max_friction);

        v1 -= t * (jt * w1);
        v2 += t * (jt * w2);
    }

    p1.set_prev_position(p1.x - v1);
    p2.set_prev_position(p2.x - v2);
    true
}
