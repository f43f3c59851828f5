//! Soft-body builders
//!
//! - [`square`] and [`triangle`]: small hand-wired bodies, edges plus
//!   diagonals so they keep their shape
//! - [`polygon`]: meshes a convex polygon. The border is subdivided every
//!   `spacing` units, then the interior is filled ring by ring: each border
//!   point is pushed inward along its corner bisector, and the new ring is
//!   stitched to the previous one with constraints.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use crate::simulation::constraint::{Constraint, DEFAULT_DAMPING, DEFAULT_STIFFNESS};
use crate::simulation::states::{NVec2, Particle, SoftBody, DEFAULT_FRICTION, DEFAULT_RADIUS, DEFAULT_RESTITUTION};
use crate::simulation::SimError;

/// Corners sharper than this are closed with a chord instead of an inner point
const MAX_CORNER_ANGLE: f64 = 120.0 * PI / 180.0;

/// Upper bound on inward rings, guards against rings that never collapse
const MAX_RINGS: usize = 256;

/// Material and particle properties shared by every particle of a body
#[derive(Debug, Clone)]
pub struct BodyParams {
    pub mass: f64, // per particle
    pub radius: f64, // per particle
    pub stiffness: f64,
    pub damping: f64,
    pub friction: f64,
    pub restitution: f64,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            radius: DEFAULT_RADIUS,
            stiffness: DEFAULT_STIFFNESS,
            damping: DEFAULT_DAMPING,
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

impl BodyParams {
    fn particle(&self, x: NVec2) -> Particle {
        Particle::new(x, self.mass).with_radius(self.radius)
    }

    fn body(&self, particles: Vec<Particle>, edges: &[(usize, usize)]) -> SoftBody {
        let constraints = edges
            .iter()
            .map(|&(a, b)| Constraint::new(&particles, a, b, self.stiffness, self.damping))
            .collect();
        SoftBody::new(particles)
            .with_constraints(constraints)
            .with_material(self.friction, self.restitution)
    }
}

/// Square of side `2 * half` around `center`.
/// Particle order: bottom-left, bottom-right, top-right, top-left.
pub fn square(center: NVec2, half: f64, params: &BodyParams) -> SoftBody {
    let corners = [
        NVec2::new(center.x - half, center.y - half),
        NVec2::new(center.x + half, center.y - half),
        NVec2::new(center.x + half, center.y + half),
        NVec2::new(center.x - half, center.y + half),
    ];
    let particles = corners.iter().map(|&c| params.particle(c)).collect();

    // edges, then diagonals
    let edges = [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (1, 3)];
    params.body(particles, &edges)
}

/// Triangle around `center`: bottom-left, bottom-right, top
pub fn triangle(center: NVec2, half: f64, params: &BodyParams) -> SoftBody {
    let corners = [
        NVec2::new(center.x - half, center.y - half),
        NVec2::new(center.x + half, center.y - half),
        NVec2::new(center.x, center.y + half),
    ];
    let particles = corners.iter().map(|&c| params.particle(c)).collect();

    let edges = [(0, 1), (0, 2), (1, 2)];
    params.body(particles, &edges)
}

/// Mesh a convex polygon into a soft body
pub fn polygon(vertices: &[NVec2], spacing: f64, params: &BodyParams) -> Result<SoftBody, SimError> {
    if vertices.len() < 3 {
        return Err(SimError::DegeneratePolygon(vertices.len()));
    }
    if !(spacing > 0.0) {
        return Err(SimError::InvalidSpacing(spacing));
    }

    let mut mesh = Mesh::new(0.25 * spacing);

    // 1) subdivided border
    let mut segments = Vec::with_capacity(vertices.len());
    for (i, &p1) in vertices.iter().enumerate() {
        let p2 = vertices[(i + 1) % vertices.len()];
        let n = ((p2 - p1).norm() / spacing).floor().max(1.0) as usize;
        let seg = divide_segment(p1, p2, n);
        for w in seg.windows(2) {
            mesh.edge(w[0], w[1]);
        }
        segments.push(seg);
    }

    // 2) interior rings
    let ring: Vec<NVec2> = segments
        .iter()
        .flat_map(|seg| seg[..seg.len() - 1].iter().copied())
        .collect();
    mesh.fill(ring, spacing);

    let particles: Vec<Particle> = mesh.points.iter().map(|&p| params.particle(p)).collect();
    let edges: Vec<(usize, usize)> = mesh.edges.into_iter().collect();
    Ok(params.body(particles, &edges))
}

/// `n + 1` evenly spaced points from `p1` to `p2`, endpoints included
pub fn divide_segment(p1: NVec2, p2: NVec2, n: usize) -> Vec<NVec2> {
    if p1 == p2 {
        return vec![p1];
    }
    let n = n.max(1);
    (0..=n)
        .map(|i| {
            let t = i as f64 / n as f64;
            p1 + (p2 - p1) * t
        })
        .collect()
}

/// Signed area test, true for clockwise vertex order
pub fn is_clockwise(poly: &[NVec2]) -> bool {
    let n = poly.len();
    let mut shoelace = 0.0;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        shoelace += a.x * b.y - b.x * a.y;
    }
    shoelace < 0.0
}

/// Point-in-polygon for convex polygons: every edge cross product has the same sign
pub fn point_in_convex_polygon(p: NVec2, poly: &[NVec2]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0.0;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let edge = b - a;
        let ap = p - a;
        let c = edge.x * ap.y - edge.y * ap.x;
        if c.abs() > 1e-9 {
            if sign == 0.0 {
                sign = c;
            } else if sign * c < 0.0 {
                return false;
            }
        }
    }
    true
}

/// Points de-duplicated within `eps`, and the undirected edges between them
struct Mesh {
    points: Vec<NVec2>,
    edges: BTreeSet<(usize, usize)>,
    eps: f64,
}

impl Mesh {
    fn new(eps: f64) -> Self {
        Self {
            points: Vec::new(),
            edges: BTreeSet::new(),
            eps,
        }
    }

    fn id(&mut self, p: NVec2) -> usize {
        let eps = self.eps;
        if let Some(i) = self
            .points
            .iter()
            .position(|q| (q.x - p.x).abs() <= eps && (q.y - p.y).abs() <= eps)
        {
            return i;
        }
        self.points.push(p);
        self.points.len() - 1
    }

    fn edge(&mut self, a: NVec2, b: NVec2) {
        let ia = self.id(a);
        let ib = self.id(b);
        if ia != ib {
            self.edges.insert((ia.min(ib), ia.max(ib)));
        }
    }

    fn fill(&mut self, mut ring: Vec<NVec2>, spacing: f64) {
        let mut rings = 0;
        while ring.len() > 3 && rings < MAX_RINGS {
            rings += 1;
            let n = ring.len();
            let clockwise = is_clockwise(&ring);

            let mut next_ring = Vec::new();
            let mut next_src = Vec::new();

            for i in 0..n {
                let a = ring[(i + n - 1) % n];
                let b = ring[i];
                let c = ring[(i + 1) % n];

                let ab = (a - b).normalize();
                let bc = (c - b).normalize();
                let angle = ab.dot(&bc).clamp(-1.0, 1.0).acos();

                if angle < MAX_CORNER_ANGLE {
                    self.edge(a, c);
                    continue;
                }

                let mut bisector = ab + bc;
                if bisector.norm() < 1e-6 {
                    // straight border: use the inward normal
                    bisector = NVec2::new(-ab.y, ab.x);
                    if !clockwise {
                        bisector = -bisector;
                    }
                }

                let p_in = b + bisector.normalize() * spacing;
                if point_in_convex_polygon(p_in, &ring) {
                    next_ring.push(p_in);
                    next_src.push(i);
                }
            }

            if next_ring.len() < 3 {
                break;
            }

            // stitch the new ring to the old one
            let nn = next_ring.len();
            for k in 0..nn {
                let src = next_src[k];
                let a1 = ring[(src + n - 1) % n];
                let a2 = ring[src];
                let a3 = ring[(src + 1) % n];
                let b1 = next_ring[(k + nn - 1) % nn];
                let b2 = next_ring[k];
                let b3 = next_ring[(k + 1) % nn];

                self.edge(a1, b1);
                self.edge(a2, b1);
                self.edge(a2, b2);
                self.edge(a3, b2);
                self.edge(b1, b2);
                self.edge(b2, b3);
            }

            // next ring, without points merged by de-duplication
            let mut seen = Vec::new();
            ring = Vec::new();
            for p in next_ring {
                let id = self.id(p);
                if !seen.contains(&id) {
                    seen.push(id);
                    ring.push(self.points[id]);
                }
            }
        }
    }
}
