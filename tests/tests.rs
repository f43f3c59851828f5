use softsim::simulation::colliders::{ColliderSet, InnerCircleCollider, OuterCircleCollider, PlaneCollider, WorldCollider};
use softsim::simulation::constraint::Constraint;
use softsim::simulation::engine::{resolve_contact, Simulation};
use softsim::simulation::factory::{self, divide_segment, is_clockwise, point_in_convex_polygon, BodyParams};
use softsim::simulation::params::Parameters;
use softsim::simulation::recorder::record;
use softsim::simulation::scenario::{build_body, Scenario};
use softsim::simulation::snapshot::{load_simulation, save_simulation, SimulationSnapshot};
use softsim::simulation::states::{NVec2, Particle, SoftBody};
use softsim::simulation::SimError;

use softsim::configuration::config::{resolve_config_path, ColliderConfig, ConfigError, PlotConfig, ScenarioConfig, ShapeKind};
use softsim::trajectory::table::{Layout, PositionTable};
use softsim::trajectory::writer::PositionWriter;

use std::path::Path;

const EPS: f64 = 1e-9;

/// Body made of a single particle, used to test the engine without constraints
pub fn single_particle(x: f64, y: f64) -> SoftBody {
    SoftBody::new(vec![Particle::new(NVec2::new(x, y), 1.0)])
}

/// Two particles on the x axis, `dist` apart
pub fn pair(dist: f64) -> Vec<Particle> {
    vec![
        Particle::new(NVec2::new(0.0, 0.0), 1.0),
        Particle::new(NVec2::new(dist, 0.0), 1.0),
    ]
}

pub fn spring(rest_length: f64, stiffness: f64, damping: f64) -> Constraint {
    Constraint {
        a: 0,
        b: 1,
        rest_length,
        stiffness,
        damping,
    }
}

pub fn test_params(steps: usize) -> Parameters {
    Parameters {
        dt: 0.01,
        steps,
        log_every: 0,
    }
}

fn close(a: NVec2, b: NVec2) -> bool {
    (a - b).norm() < EPS
}

// ==================================================================================
// Particle tests
// ==================================================================================

#[test]
fn particle_force_moves_by_a_dt_squared() {
    let mut p = Particle::new(NVec2::zeros(), 2.0);
    p.apply_force(NVec2::new(2.0, 4.0));
    p.update(1.0);

    assert!(close(p.x, NVec2::new(1.0, 2.0)), "got {:?}", p.x);
    assert!(close(p.x_prev, NVec2::zeros()));
}

#[test]
fn particle_keeps_its_velocity() {
    let mut p = Particle::new(NVec2::zeros(), 1.0);
    p.correct(NVec2::new(1.0, 0.0));
    p.update(1.0);
    assert!(close(p.x, NVec2::new(1.0, 0.0)));

    // accumulators were reset, only inertia is left
    p.update(1.0);
    assert!(close(p.x, NVec2::new(2.0, 0.0)), "got {:?}", p.x);
    assert!(close(p.velocity(), NVec2::new(1.0, 0.0)));
}

#[test]
fn pinned_particle_does_not_move() {
    let mut p = Particle::new(NVec2::new(3.0, 3.0), 1.0).pinned(true);
    p.apply_force(NVec2::new(100.0, -50.0));
    p.correct(NVec2::new(1.0, 1.0));
    p.update(0.1);

    assert!(close(p.x, NVec2::new(3.0, 3.0)));
    assert!(close(p.x_prev, p.x));
}

#[test]
fn massless_particle_ignores_forces() {
    let mut p = Particle::new(NVec2::zeros(), 0.0);
    assert_eq!(p.inv_m, 0.0);
    p.apply_force(NVec2::new(10.0, 10.0));
    p.update(1.0);
    assert!(close(p.x, NVec2::zeros()));
}

#[test]
fn set_position_records_previous() {
    let mut p = Particle::new(NVec2::new(1.0, 1.0), 1.0);
    p.set_position(NVec2::new(2.0, 3.0));
    assert!(close(p.x_prev, NVec2::new(1.0, 1.0)));
    assert!(close(p.velocity(), NVec2::new(1.0, 2.0)));
}

// ==================================================================================
// Constraint tests
// ==================================================================================

#[test]
fn constraint_rest_length_is_initial_distance() {
    let particles = vec![
        Particle::new(NVec2::new(0.0, 0.0), 1.0),
        Particle::new(NVec2::new(3.0, 4.0), 1.0),
    ];
    let c = Constraint::with_defaults(&particles, 0, 1);
    assert!((c.rest_length - 5.0).abs() < EPS);
    assert!((c.length(&particles) - 5.0).abs() < EPS);
}

#[test]
fn constraint_at_rest_does_nothing() {
    let mut particles = pair(5.0);
    let c = Constraint::new(&particles, 0, 1, 0.9, 0.1);
    c.apply(&mut particles);

    assert!(close(particles[0].corr, NVec2::zeros()));
    assert!(close(particles[1].corr, NVec2::zeros()));
}

#[test]
fn stretched_constraint_pulls_together() {
    let mut particles = pair(10.0);
    spring(5.0, 1.0, 0.0).apply(&mut particles);

    assert!(close(particles[0].corr, NVec2::new(2.5, 0.0)));
    assert!(close(particles[1].corr, NVec2::new(-2.5, 0.0)));

    for p in particles.iter_mut() {
        p.update(1.0);
    }
    assert!(((particles[1].x - particles[0].x).norm() - 5.0).abs() < EPS);
}

#[test]
fn compressed_constraint_pushes_apart() {
    let mut particles = pair(2.0);
    spring(5.0, 1.0, 0.0).apply(&mut particles);
    for p in particles.iter_mut() {
        p.update(1.0);
    }

    assert!(close(particles[0].x, NVec2::new(-1.5, 0.0)));
    assert!(close(particles[1].x, NVec2::new(3.5, 0.0)));
}

#[test]
fn constraint_skips_pinned_particle() {
    let mut particles = pair(10.0);
    particles[0].pinned = true;
    spring(5.0, 1.0, 0.0).apply(&mut particles);
    for p in particles.iter_mut() {
        p.update(1.0);
    }

    assert!(close(particles[0].x, NVec2::zeros()));
    assert!(close(particles[1].x, NVec2::new(7.5, 0.0)));
}

#[test]
fn constraint_damps_separation() {
    let mut particles = pair(5.0);
    // first particle moving away from the second
    particles[0].set_prev_position(NVec2::new(1.0, 0.0));
    spring(5.0, 0.0, 1.0).apply(&mut particles);

    assert!(close(particles[0].corr, NVec2::new(0.5, 0.0)), "got {:?}", particles[0].corr);
    assert!(close(particles[1].corr, NVec2::new(-0.5, 0.0)));
}

#[test]
fn constraint_on_coincident_particles_is_noop() {
    let mut particles = pair(0.0);
    spring(1.0, 1.0, 1.0).apply(&mut particles);
    assert!(close(particles[0].corr, NVec2::zeros()));
}

// ==================================================================================
// Collider tests
// ==================================================================================

#[test]
fn plane_pushes_particle_above() {
    let plane = PlaneCollider::new(NVec2::new(0.0, 2.0), 0.0);
    assert!(close(plane.normal, NVec2::new(0.0, 1.0)));

    let mut p = Particle::new(NVec2::new(0.0, 0.5), 1.0);
    assert!(plane.collide(&mut p));
    assert!(close(p.x, NVec2::new(0.0, 1.0)));

    let mut free = Particle::new(NVec2::new(0.0, 5.0), 1.0);
    assert!(!plane.collide(&mut free));
    assert!(close(free.x, NVec2::new(0.0, 5.0)));
}

#[test]
fn inner_circle_keeps_particle_inside() {
    let circle = InnerCircleCollider::new(NVec2::zeros(), 5.0);
    let mut p = Particle::new(NVec2::new(10.0, 0.0), 1.0);
    assert!(circle.collide(&mut p));
    assert!(close(p.x, NVec2::new(4.0, 0.0)));

    let mut inside = Particle::new(NVec2::new(1.0, 1.0), 1.0);
    assert!(!circle.collide(&mut inside));
}

#[test]
fn outer_circle_keeps_particle_outside() {
    let circle = OuterCircleCollider::new(NVec2::zeros(), 5.0);
    let mut p = Particle::new(NVec2::new(1.0, 0.0), 1.0);
    assert!(circle.collide(&mut p));
    assert!(close(p.x, NVec2::new(6.0, 0.0)));

    let mut centered = Particle::new(NVec2::zeros(), 1.0);
    assert!(circle.collide(&mut centered));
    assert!(close(centered.x, NVec2::new(0.0, 6.0)));
}

#[test]
fn collider_set_skips_pinned_particles() {
    let set = ColliderSet::new()
        .with(PlaneCollider::new(NVec2::new(0.0, 1.0), 0.0))
        .with(InnerCircleCollider::new(NVec2::zeros(), 5.0));
    assert_eq!(set.len(), 2);

    let mut pinned = Particle::new(NVec2::new(0.0, -3.0), 1.0).pinned(true);
    assert_eq!(set.resolve(&mut pinned), 0);
    assert!(close(pinned.x, NVec2::new(0.0, -3.0)));

    let mut p = Particle::new(NVec2::new(0.0, -3.0), 1.0);
    assert_eq!(set.resolve(&mut p), 1);
    assert!(p.x.y >= 1.0 - EPS);
}

#[test]
fn collider_configs_round_trip() {
    let set = ColliderSet::new()
        .with(PlaneCollider::new(NVec2::new(0.0, 1.0), -10.0))
        .with(OuterCircleCollider::new(NVec2::new(0.0, -10.0), 5.0));

    assert_eq!(
        set.configs(),
        vec![
            ColliderConfig::Plane {
                normal: [0.0, 1.0],
                distance: -10.0
            },
            ColliderConfig::OuterCircle {
                center: [0.0, -10.0],
                radius: 5.0
            },
        ]
    );
}

// ==================================================================================
// Simulation tests
// ==================================================================================

#[test]
fn gravity_step() {
    let mut sim = Simulation::new(NVec2::new(0.0, -10.0));
    sim.add_body(single_particle(0.0, 0.0));
    sim.step(1.0);

    let p = sim.bodies[0].particles[0].x;
    assert!(close(p, NVec2::new(0.0, -10.0)), "got {:?}", p);
    assert!((sim.t - 1.0).abs() < EPS);
}

#[test]
fn plane_holds_falling_particle() {
    let mut sim = Simulation::new(NVec2::new(0.0, -10.0));
    sim.add_body(single_particle(0.0, 5.0));
    sim.add_collider(PlaneCollider::new(NVec2::new(0.0, 1.0), 0.0));

    for _ in 0..1000 {
        sim.step(0.01);
        let p = &sim.bodies[0].particles[0];
        assert!(p.x.y >= p.radius - EPS, "fell through at t = {}: {:?}", sim.t, p.x);
    }
}

#[test]
fn inner_circle_holds_falling_particle() {
    let mut sim = Simulation::new(NVec2::new(0.0, -10.0));
    sim.add_body(single_particle(0.0, 0.0));
    sim.add_collider(InnerCircleCollider::new(NVec2::zeros(), 5.0));

    for _ in 0..1000 {
        sim.step(0.01);
        assert!(sim.bodies[0].particles[0].x.norm() <= 4.0 + EPS);
    }
}

#[test]
fn overlapping_bodies_are_separated() {
    let mut sim = Simulation::default();
    sim.add_body(single_particle(0.0, 0.0));
    sim.add_body(single_particle(1.5, 0.0));
    sim.step(0.01);

    let a = sim.bodies[0].particles[0].x;
    let b = sim.bodies[1].particles[0].x;
    assert!((b - a).norm() >= 2.0 - EPS, "still overlapping: {:?} {:?}", a, b);
    // equal masses share the correction
    assert!(close(a, NVec2::new(-0.25, 0.0)));
    assert!(close(b, NVec2::new(1.75, 0.0)));
}

#[test]
fn contact_with_pinned_particle_moves_only_the_free_one() {
    let mut p1 = Particle::new(NVec2::new(0.0, 0.0), 1.0);
    let mut p2 = Particle::new(NVec2::new(1.0, 0.0), 1.0).pinned(true);

    assert!(resolve_contact(&mut p1, &mut p2, 0.5, 0.5));
    assert!(close(p1.x, NVec2::new(-1.0, 0.0)));
    assert!(close(p2.x, NVec2::new(1.0, 0.0)));
}

#[test]
fn approaching_contact_bounces() {
    let mut p1 = Particle::new(NVec2::new(0.0, 0.0), 1.0);
    let mut p2 = Particle::new(NVec2::new(1.9, 0.0), 1.0);
    // p1 moving right, p2 moving left
    p1.set_prev_position(NVec2::new(-0.5, 0.0));
    p2.set_prev_position(NVec2::new(2.4, 0.0));

    assert!(resolve_contact(&mut p1, &mut p2, 0.0, 1.0));
    assert!(p1.velocity().x < 0.0, "p1 should move left, got {:?}", p1.velocity());
    assert!(p2.velocity().x > 0.0, "p2 should move right, got {:?}", p2.velocity());
}

#[test]
fn separating_contact_still_has_friction() {
    let mut p1 = Particle::new(NVec2::new(0.0, 0.0), 1.0);
    let mut p2 = Particle::new(NVec2::new(1.0, 0.0), 1.0);
    // p1 sliding up past p2
    p1.set_prev_position(NVec2::new(0.0, -0.2));

    assert!(resolve_contact(&mut p1, &mut p2, 0.5, 1.0));
    // normal velocity is left alone, the tangential one is shared
    assert!(close(p1.velocity(), NVec2::new(-0.5, 0.1)), "got {:?}", p1.velocity());
    assert!(close(p2.velocity(), NVec2::new(0.5, 0.1)), "got {:?}", p2.velocity());
}

#[test]
fn separated_particles_do_not_touch() {
    let mut p1 = Particle::new(NVec2::new(0.0, 0.0), 1.0);
    let mut p2 = Particle::new(NVec2::new(3.0, 0.0), 1.0);
    assert!(!resolve_contact(&mut p1, &mut p2, 0.5, 0.5));
}

#[test]
fn clear_removes_everything() {
    let mut sim = Simulation::default();
    sim.add_body(single_particle(0.0, 0.0));
    sim.add_collider(PlaneCollider::new(NVec2::new(0.0, 1.0), 0.0));
    assert_eq!(sim.particle_count(), 1);

    sim.clear();
    assert_eq!(sim.particle_count(), 0);
    assert!(sim.colliders.is_empty());
}

#[test]
fn square_keeps_its_shape_on_the_floor() {
    let mut sim = Simulation::new(NVec2::new(0.0, -10.0));
    sim.add_body(factory::square(NVec2::new(0.0, 5.0), 1.0, &BodyParams::default()));
    sim.add_collider(PlaneCollider::new(NVec2::new(0.0, 1.0), 0.0));

    for _ in 0..500 {
        sim.step(0.01);
    }

    let body = &sim.bodies[0];
    for c in &body.constraints {
        let err = (c.length(&body.particles) - c.rest_length).abs();
        assert!(err < 0.5 * c.rest_length, "constraint {}-{} collapsed", c.a, c.b);
    }
    assert!(body.centroid().y > 0.0);
}

// ==================================================================================
// Factory tests
// ==================================================================================

#[test]
fn square_factory() {
    let body = factory::square(NVec2::zeros(), 1.0, &BodyParams::default());
    assert_eq!(body.particles.len(), 4);
    assert_eq!(body.constraints.len(), 6);
    assert!(close(body.particles[0].x, NVec2::new(-1.0, -1.0)));
    assert!(close(body.particles[2].x, NVec2::new(1.0, 1.0)));

    let diagonals = body
        .constraints
        .iter()
        .filter(|c| (c.rest_length - 8f64.sqrt()).abs() < EPS)
        .count();
    assert_eq!(diagonals, 2);
}

#[test]
fn triangle_factory() {
    let body = factory::triangle(NVec2::zeros(), 1.0, &BodyParams::default());
    assert_eq!(body.particles.len(), 3);
    assert_eq!(body.constraints.len(), 3);
}

#[test]
fn polygon_factory_rejects_bad_input() {
    let params = BodyParams::default();
    let line = [NVec2::zeros(), NVec2::new(1.0, 0.0)];
    assert!(matches!(factory::polygon(&line, 1.0, &params), Err(SimError::DegeneratePolygon(2))));

    let tri = [NVec2::zeros(), NVec2::new(1.0, 0.0), NVec2::new(0.0, 1.0)];
    assert!(matches!(factory::polygon(&tri, 0.0, &params), Err(SimError::InvalidSpacing(_))));
}

#[test]
fn polygon_factory_meshes_inside_the_outline() {
    let outline = [
        NVec2::new(0.0, 0.0),
        NVec2::new(4.0, 0.0),
        NVec2::new(4.0, 4.0),
        NVec2::new(0.0, 4.0),
    ];
    let body = factory::polygon(&outline, 1.0, &BodyParams::default()).unwrap();

    // 16 border points, plus the interior
    assert!(body.particles.len() >= 16, "only {} particles", body.particles.len());
    for p in &body.particles {
        assert!(point_in_convex_polygon(p.x, &outline), "{:?} outside", p.x);
    }
    for c in &body.constraints {
        assert!(c.a < body.particles.len() && c.b < body.particles.len());
        assert_ne!(c.a, c.b);
        assert!(c.rest_length > 0.0);
    }
}

#[test]
fn segment_division_and_orientation() {
    let seg = divide_segment(NVec2::zeros(), NVec2::new(4.0, 0.0), 4);
    assert_eq!(seg.len(), 5);
    assert!(close(seg[2], NVec2::new(2.0, 0.0)));

    let ccw = [NVec2::zeros(), NVec2::new(1.0, 0.0), NVec2::new(1.0, 1.0), NVec2::new(0.0, 1.0)];
    let cw: Vec<NVec2> = ccw.iter().rev().copied().collect();
    assert!(!is_clockwise(&ccw));
    assert!(is_clockwise(&cw));
}

// ==================================================================================
// Recorder and snapshot tests
// ==================================================================================

#[test]
fn recorder_writes_initial_row_and_one_row_per_step() {
    let mut sim = Simulation::new(NVec2::new(0.0, -10.0));
    sim.add_body(factory::square(NVec2::new(2.0, 3.0), 1.0, &BodyParams::default()));

    let mut out = PositionWriter::new(Vec::new());
    let rows = record(&mut sim, &test_params(10), &mut out).unwrap();
    assert_eq!(rows, 11);
    assert_eq!(out.rows(), 11);

    let bytes = out.into_inner().unwrap();
    let table = PositionTable::from_reader(bytes.as_slice()).unwrap();
    assert_eq!(table.layout(), Layout::Indexed);
    assert_eq!(table.len(), 11);
    assert_eq!(table.particle_count(), 4);
    assert_eq!(table.step(10), 10.0);
    assert!(close(table.position(0, 0), NVec2::new(1.0, 2.0)));
    assert!(close(table.position(10, 3), sim.bodies[0].particles[3].x));
}

#[test]
fn recorder_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visuals").join("positions.csv");

    let mut sim = Simulation::default();
    sim.add_body(single_particle(0.0, 0.0));
    let mut out = PositionWriter::create(&path).unwrap();
    record(&mut sim, &test_params(3), &mut out).unwrap();
    drop(out);

    let table = PositionTable::load(&path).unwrap();
    assert_eq!(table.len(), 4);
}

#[test]
fn snapshot_round_trip_continues_identically() {
    let mut sim = Simulation::new(NVec2::new(0.0, -10.0));
    sim.add_body(factory::square(NVec2::new(0.0, 5.0), 1.0, &BodyParams::default()));
    sim.add_collider(PlaneCollider::new(NVec2::new(0.0, 1.0), 0.0));
    sim.add_collider(InnerCircleCollider::new(NVec2::zeros(), 20.0));
    for _ in 0..5 {
        sim.step(0.01);
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    save_simulation(&sim, &path).unwrap();
    let mut restored = load_simulation(&path).unwrap();

    assert!((restored.t - sim.t).abs() < EPS);
    assert_eq!(restored.colliders.configs(), sim.colliders.configs());
    assert_eq!(restored.bodies[0].constraints.len(), 6);

    for _ in 0..5 {
        sim.step(0.01);
        restored.step(0.01);
    }
    for (a, b) in sim.positions().zip(restored.positions()) {
        assert!(close(a, b), "{:?} != {:?}", a, b);
    }
}

#[test]
fn snapshot_with_invalid_collider_is_rejected() {
    let snapshot = SimulationSnapshot {
        t: 0.0,
        gravity: NVec2::zeros(),
        colliders: vec![ColliderConfig::Plane {
            normal: [0.0, 0.0],
            distance: 0.0,
        }],
        bodies: Vec::new(),
    };
    assert!(matches!(snapshot.restore(), Err(SimError::Collider(_))));
}

#[test]
fn snapshot_with_dangling_constraint_is_rejected() {
    let body = single_particle(0.0, 0.0).with_constraints(vec![Constraint {
        a: 0,
        b: 7,
        rest_length: 1.0,
        stiffness: 0.5,
        damping: 0.1,
    }]);
    let snapshot = SimulationSnapshot {
        t: 0.0,
        gravity: NVec2::zeros(),
        colliders: Vec::new(),
        bodies: vec![single_particle(5.0, 5.0), body],
    };
    assert!(matches!(
        snapshot.restore(),
        Err(SimError::ConstraintOutOfRange { body: 1, index: 7, len: 1 })
    ));
}

#[test]
fn snapshot_recomputes_inverse_masses() {
    let mut body = SoftBody::new(vec![
        Particle::new(NVec2::zeros(), 2.0),
        Particle::new(NVec2::new(1.0, 0.0), 0.0),
        Particle::new(NVec2::new(2.0, 0.0), 4.0).pinned(true),
    ]);
    for p in body.particles.iter_mut() {
        p.inv_m = 5.0;
    }
    let snapshot = SimulationSnapshot {
        t: 0.0,
        gravity: NVec2::zeros(),
        colliders: Vec::new(),
        bodies: vec![body],
    };

    let sim = snapshot.restore().unwrap();
    let inv: Vec<f64> = sim.bodies[0].particles.iter().map(|p| p.inv_m).collect();
    assert_eq!(inv, vec![0.5, 0.0, 0.0]);
}

#[test]
fn recording_a_resumed_simulation_continues_step_numbers() {
    let mut sim = Simulation::new(NVec2::new(0.0, -10.0));
    sim.add_body(single_particle(0.0, 0.0));
    for _ in 0..5 {
        sim.step(0.01);
    }

    let mut out = PositionWriter::new(Vec::new());
    record(&mut sim, &test_params(3), &mut out).unwrap();
    let table = PositionTable::from_reader(out.into_inner().unwrap().as_slice()).unwrap();

    let steps: Vec<f64> = table.full().map(|r| table.step(r)).collect();
    assert_eq!(steps, vec![5.0, 6.0, 7.0, 8.0]);
}

// ==================================================================================
// Configuration and scenario tests
// ==================================================================================

const SCENARIO_YAML: &str = r#"
engine:
  dt: 0.01
  steps: 50
colliders:
  - type: plane
    normal: [0.0, 1.0]
    distance: 0.0
  - type: inner_circle
    center: [0.0, 0.0]
    radius: 30.0
bodies:
  - shape: square
    center: [0.0, 5.0]
    stiffness: 0.9
  - shape: triangle
    center: [6.0, 5.0]
    half_size: 2.0
    label: tri
"#;

#[test]
fn scenario_yaml_parses_with_defaults() {
    let cfg = ScenarioConfig::from_yaml_str(SCENARIO_YAML).unwrap();
    assert_eq!(cfg.engine.gravity, [0.0, -10.0]);
    assert_eq!(cfg.engine.log_every, 100);
    assert_eq!(cfg.output.positions, Path::new("visuals/positions.csv"));
    assert_eq!(cfg.colliders.len(), 2);
    assert_eq!(cfg.bodies[0].shape, ShapeKind::Square);
    assert_eq!(cfg.bodies[0].half_size, 1.0);
    assert_eq!(cfg.bodies[1].label.as_deref(), Some("tri"));
}

#[test]
fn scenario_build_and_record() {
    let cfg = ScenarioConfig::from_yaml_str(SCENARIO_YAML).unwrap();
    let mut scenario = Scenario::build_scenario(&cfg).unwrap();
    assert_eq!(scenario.simulation.particle_count(), 7);
    assert_eq!(scenario.labels, vec!["Body 1".to_string(), "tri".to_string()]);

    let specs = scenario.group_specs();
    assert_eq!(specs[0].count, 4);
    assert_eq!(specs[1].count, 3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("positions.csv");
    let mut out = PositionWriter::create(&path).unwrap();
    record(&mut scenario.simulation, &scenario.parameters, &mut out).unwrap();
    drop(out);

    let table = PositionTable::load(&path).unwrap();
    assert_eq!(table.len(), 51);
    assert_eq!(table.particle_count(), 7);
    for row in table.full() {
        for p in table.row_positions(row) {
            assert!(p.y >= 1.0 - EPS, "row {row}: {:?} below the floor", p);
        }
    }
}

#[test]
fn invalid_scenarios_are_rejected() {
    let zero_dt = "engine: { dt: 0.0, steps: 1 }";
    assert!(matches!(ScenarioConfig::from_yaml_str(zero_dt), Err(ConfigError::Invalid(_))));

    let zero_normal = r#"
engine: { dt: 0.01, steps: 1 }
colliders:
  - { type: plane, normal: [0.0, 0.0], distance: 0.0 }
"#;
    assert!(matches!(ScenarioConfig::from_yaml_str(zero_normal), Err(ConfigError::Invalid(_))));

    let stiff = r#"
engine: { dt: 0.01, steps: 1 }
bodies:
  - { shape: square, center: [0.0, 0.0], stiffness: 1.5 }
"#;
    assert!(matches!(ScenarioConfig::from_yaml_str(stiff), Err(ConfigError::Invalid(_))));

    let no_center = r#"
engine: { dt: 0.01, steps: 1 }
bodies:
  - { shape: square }
"#;
    assert!(matches!(ScenarioConfig::from_yaml_str(no_center), Err(ConfigError::Invalid(_))));

    let negative_radius = r#"
engine: { dt: 0.01, steps: 1 }
colliders:
  - { type: outer_circle, center: [0.0, 0.0], radius: -1.0 }
"#;
    assert!(matches!(ScenarioConfig::from_yaml_str(negative_radius), Err(ConfigError::Invalid(_))));

    let unknown = r#"
engine: { dt: 0.01, steps: 1 }
colliders:
  - { type: box, center: [0.0, 0.0] }
"#;
    assert!(matches!(ScenarioConfig::from_yaml_str(unknown), Err(ConfigError::Yaml(_))));
}

#[test]
fn pinned_index_out_of_range() {
    let cfg = ScenarioConfig::from_yaml_str(
        r#"
engine: { dt: 0.01, steps: 1 }
bodies:
  - { shape: triangle, center: [0.0, 0.0], pinned: [0, 3] }
"#,
    )
    .unwrap();
    assert!(matches!(
        build_body(&cfg.bodies[0]),
        Err(SimError::PinnedOutOfRange { index: 3, len: 3 })
    ));
}

#[test]
fn missing_scenario_file_is_io_error() {
    let err = ScenarioConfig::load(Path::new("does/not/exist.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn shipped_scenarios_build() {
    for name in ["constraints_animation.yaml", "colliders.yaml", "polygon.yaml"] {
        let path = resolve_config_path(Path::new(name), "scenarios");
        let cfg = ScenarioConfig::load(&path).unwrap_or_else(|e| panic!("{name}: {e}"));
        Scenario::build_scenario(&cfg).unwrap_or_else(|e| panic!("{name}: {e}"));
    }

    let path = resolve_config_path(Path::new("constraints_animation.yaml"), "scenarios");
    let cfg = ScenarioConfig::load(&path).unwrap();
    let scenario = Scenario::build_scenario(&cfg).unwrap();
    assert_eq!(scenario.simulation.particle_count(), 12);
    assert_eq!(scenario.labels[0], "Square1 s=0.9, d=0.1");
}

#[test]
fn plot_config_defaults_and_validation() {
    let cfg = PlotConfig::from_yaml_str("{}").unwrap();
    assert_eq!(cfg.dt, 0.01);
    assert_eq!(cfg.window.start, 400);
    assert_eq!(cfg.window.end, 1500);
    assert_eq!(cfg.group_size, 4);
    assert!(cfg.groups.is_empty());

    let reversed = "window: { start: 10, end: 5 }";
    assert!(matches!(PlotConfig::from_yaml_str(reversed), Err(ConfigError::Invalid(_))));

    let path = resolve_config_path(Path::new("squares.yaml"), "plots");
    let squares = PlotConfig::load(&path).unwrap();
    assert_eq!(squares.groups.len(), 9);
    assert!(squares.groups.iter().all(|g| g.count == 4));

    // one group per stiffness / damping pair
    for s in ["0.9", "0.5", "0.2"] {
        for d in ["0.1", "0.5", "0.8"] {
            let name = format!("Square1 s={s}, d={d}");
            assert!(squares.groups.iter().any(|g| g.name == name), "missing {name}");
        }
    }
}
