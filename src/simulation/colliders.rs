//! World colliders: static geometry particles are projected out of
//!
//! Defines the [`WorldCollider`] trait, the plane and circle colliders, and
//! [`ColliderSet`], the collection the simulation resolves every step.

use crate::configuration::config::ColliderConfig;
use crate::simulation::states::{NVec2, Particle};

/// Below this distance from a circle center the push direction is undefined
const CENTER_EPS: f64 = 1e-12;

/// Trait for static world geometry
/// Implementations move `p` out of the forbidden region and report whether
/// a collision happened
pub trait WorldCollider {
    fn collide(&self, p: &mut Particle) -> bool;

    /// Configuration this collider was built from, used for snapshots and
    /// for drawing the world in the viewer
    fn to_config(&self) -> ColliderConfig;
}

/// Collection of world colliders, resolved in insertion order
#[derive(Default)]
pub struct ColliderSet {
    terms: Vec<Box<dyn WorldCollider + Send + Sync>>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a collider
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: WorldCollider + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn push(&mut self, term: Box<dyn WorldCollider + Send + Sync>) {
        self.terms.push(term);
    }

    /// Resolve `p` against every collider, returns the number of contacts
    pub fn resolve(&self, p: &mut Particle) -> usize {
        if p.pinned {
            return 0;
        }
        let mut hits = 0;
        for term in &self.terms {
            if term.collide(p) {
                hits += 1;
            }
        }
        hits
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn configs(&self) -> Vec<ColliderConfig> {
        self.terms.iter().map(|t| t.to_config()).collect()
    }
}

/// Half-plane `x·normal >= distance`
#[derive(Debug, Clone)]
pub struct PlaneCollider {
    pub normal: NVec2, // unit normal pointing to the free side
    pub distance: f64, // plane offset along the normal
}

impl PlaneCollider {
    /// `normal` is normalized here; callers must not pass a zero vector
    pub fn new(normal: NVec2, distance: f64) -> Self {
        Self {
            normal: normal.normalize(),
            distance,
        }
    }
}

impl WorldCollider for PlaneCollider {
    fn collide(&self, p: &mut Particle) -> bool {
        let dist = p.x.dot(&self.normal) - self.distance;
        if dist > p.radius {
            return false;
        }

        let penetration = dist - p.radius;
        if penetration < 0.0 {
            p.set_position(p.x - self.normal * penetration);
            return true;
        }
        false
    }

    fn to_config(&self) -> ColliderConfig {
        ColliderConfig::Plane {
            normal: [self.normal.x, self.normal.y],
            distance: self.distance,
        }
    }
}

/// Keeps particles inside a circle
#[derive(Debug, Clone)]
pub struct InnerCircleCollider {
    pub center: NVec2,
    pub radius: f64,
}

impl InnerCircleCollider {
    pub fn new(center: NVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl WorldCollider for InnerCircleCollider {
    fn collide(&self, p: &mut Particle) -> bool {
        let to_p = p.x - self.center;
        let dist = to_p.norm();
        let max_dist = (self.radius - p.radius).max(0.0);

        if dist > max_dist {
            let n = to_p / dist;
            p.set_position(self.center + n * max_dist);
            return true;
        }
        false
    }

    fn to_config(&self) -> ColliderConfig {
        ColliderConfig::InnerCircle {
            center: [self.center.x, self.center.y],
            radius: self.radius,
        }
    }
}

/// Keeps particles outside a circle
#[derive(Debug, Clone)]
pub struct OuterCircleCollider {
    pub center: NVec2,
    pub radius: f64,
}

impl OuterCircleCollider {
    pub fn new(center: NVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl WorldCollider for OuterCircleCollider {
    fn collide(&self, p: &mut Particle) -> bool {
        let to_p = p.x - self.center;
        let dist = to_p.norm();
        let min_dist = self.radius + p.radius;

        if dist < min_dist {
            // a particle sitting on the center is pushed straight up
            let n = if dist < CENTER_EPS { NVec2::new(0.0, 1.0) } else { to_p / dist };
            p.set_position(self.center + n * min_dist);
            return true;
        }
        false
    }

    fn to_config(&self) -> ColliderConfig {
        ColliderConfig::OuterCircle {
            center: [self.center.x, self.center.y],
            radius: self.radius,
        }
    }
}
