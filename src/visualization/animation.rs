//! Bevy 2D viewers: replay of a positions table and a live simulation

use bevy::prelude::*;
use bevy::sprite::{Anchor, MaterialMesh2dBundle, Mesh2dHandle};
use bevy::window::WindowResolution;

use anyhow::{Context, Result};

use crate::configuration::config::ColliderConfig;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::NVec2;
use crate::trajectory::bounds::{axis_bounds, AxisBounds, BOUNDS_MARGIN};
use crate::trajectory::table::PositionTable;
use crate::visualization::palette::{color_at, PARTICLE_ALPHA};
use crate::visualization::replay::{extent, frame_state, time_label, world_outlines, Outline};

#[derive(Component)]
struct ParticleIndex(pub usize);

#[derive(Component)]
struct TimeText;

const WINDOW_WIDTH: f32 = 1280.0;
const WINDOW_HEIGHT: f32 = 720.0;
/// Share of the window the bounds are fitted into
const FILL: f32 = 0.9;
const TEXT_SIZE: f32 = 24.0;
const TEXT_MARGIN: f32 = 20.0;

/// World -> screen mapping that fits a set of axis bounds into the window
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub scale: f32, // pixels per world unit
    pub center: (f64, f64), // world point at the window center
}

impl View {
    pub fn fit(bounds: &AxisBounds) -> Self {
        let sx = WINDOW_WIDTH * FILL / bounds.width().max(1e-9) as f32;
        let sy = WINDOW_HEIGHT * FILL / bounds.height().max(1e-9) as f32;
        Self {
            scale: sx.min(sy),
            center: bounds.center(),
        }
    }

    pub fn to_screen(&self, p: NVec2) -> Vec2 {
        Vec2::new(
            (p.x - self.center.0) as f32 * self.scale,
            (p.y - self.center.1) as f32 * self.scale,
        )
    }
}

fn bevy_color((r, g, b): (u8, u8, u8)) -> Color {
    Color::srgb_u8(r, g, b)
}

fn particle_color(i: usize) -> Color {
    let (r, g, b) = color_at(i);
    Color::srgba_u8(r, g, b, (PARTICLE_ALPHA * 255.0).round() as u8)
}

fn window_plugin(title: &str) -> WindowPlugin {
    WindowPlugin {
        primary_window: Some(Window {
            title: title.to_string(),
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn spawn_circle(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    at: Vec2,
    radius_screen: f32,
    color: Color,
    index: usize,
) {
    commands.spawn((
        MaterialMesh2dBundle {
            mesh: Mesh2dHandle(meshes.add(Circle::new(radius_screen))),
            material: materials.add(ColorMaterial::from(color)),
            transform: Transform::from_xyz(at.x, at.y, 0.0),
            ..Default::default()
        },
        ParticleIndex(index),
    ));
}

fn draw_outlines(gizmos: &mut Gizmos, outlines: &[Outline], view: &View) {
    for outline in outlines {
        match outline {
            Outline::Segment { from, to, color } => {
                gizmos.line_2d(view.to_screen(*from), view.to_screen(*to), bevy_color(*color));
            }
            Outline::Circle { center, radius, color } => {
                gizmos.circle_2d(view.to_screen(*center), *radius as f32 * view.scale, bevy_color(*color));
            }
        }
    }
}

// ========================================================================================
// Replay of a positions table
// ========================================================================================

/// Bevy resource driving the replay of a positions table
#[derive(Resource)]
pub struct Replay {
    pub table: PositionTable,
    pub dt: f64, // seconds per row, also the wall time between frames
    pub radius: f64, // drawn particle radius
    pub outlines: Vec<Outline>,
    pub view: View,
    frame: usize,
    timer: Timer,
}

impl Replay {
    /// The view fits the full-table axis bounds
    pub fn new(table: PositionTable, dt: f64, radius: f64, colliders: &[ColliderConfig]) -> Result<Self> {
        anyhow::ensure!(dt > 0.0, "dt must be > 0, got {dt}");
        let bounds = axis_bounds(&table, table.full()).context("table has no particles to animate")?;
        let outlines = world_outlines(colliders, &bounds);
        Ok(Self {
            table,
            dt,
            radius,
            outlines,
            view: View::fit(&bounds),
            frame: 0,
            timer: Timer::from_seconds(dt as f32, TimerMode::Repeating),
        })
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Move forward `n` frames, looping at the end of the table
    pub fn advance(&mut self, n: usize) {
        if !self.table.is_empty() {
            self.frame = (self.frame + n) % self.table.len();
        }
    }
}

pub fn run_replay(replay: Replay) {
    info!(
        "run_replay: {} frames of {} particles",
        replay.table.len(),
        replay.table.particle_count()
    );

    App::new()
        .insert_resource(ClearColor(Color::WHITE))
        .insert_resource(replay)
        .add_plugins(DefaultPlugins.set(window_plugin("softsim replay")))
        .add_systems(Startup, setup_replay_system)
        .add_systems(Update, (advance_frame_system, sync_replay_system, draw_replay_world_system).chain())
        .run();
}

fn setup_replay_system(
    mut commands: Commands,
    replay: Res<Replay>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2dBundle::default());

    let state = frame_state(&replay.table, 0, replay.dt);
    let radius_screen = replay.radius as f32 * replay.view.scale;
    for (i, p) in state.positions.iter().enumerate() {
        spawn_circle(
            &mut commands,
            &mut meshes,
            &mut materials,
            replay.view.to_screen(*p),
            radius_screen,
            particle_color(i),
            i,
        );
    }

    spawn_time_text(&mut commands, state.label);
}

fn spawn_time_text(commands: &mut Commands, label: String) {
    commands.spawn((
        Text2dBundle {
            text: Text::from_section(
                label,
                TextStyle {
                    font_size: TEXT_SIZE,
                    color: Color::BLACK,
                    ..Default::default()
                },
            ),
            text_anchor: Anchor::TopLeft,
            transform: Transform::from_xyz(
                -WINDOW_WIDTH / 2.0 + TEXT_MARGIN,
                WINDOW_HEIGHT / 2.0 - TEXT_MARGIN,
                1.0,
            ),
            ..Default::default()
        },
        TimeText,
    ));
}

fn advance_frame_system(time: Res<Time>, mut replay: ResMut<Replay>) {
    replay.timer.tick(time.delta());
    let n = replay.timer.times_finished_this_tick() as usize;
    replay.advance(n);
}

fn sync_replay_system(
    replay: Res<Replay>,
    mut particles: Query<(&ParticleIndex, &mut Transform)>,
    mut texts: Query<&mut Text, With<TimeText>>,
) {
    let state = frame_state(&replay.table, replay.frame, replay.dt);

    for (ParticleIndex(i), mut transform) in &mut particles {
        if let Some(p) = state.positions.get(*i) {
            let s = replay.view.to_screen(*p);
            transform.translation.x = s.x;
            transform.translation.y = s.y;
        }
    }
    for mut text in &mut texts {
        text.sections[0].value = state.label.clone();
    }
}

fn draw_replay_world_system(mut gizmos: Gizmos, replay: Res<Replay>) {
    draw_outlines(&mut gizmos, &replay.outlines, &replay.view);
}

// ========================================================================================
// Live simulation
// ========================================================================================

/// View and outlines of a live scenario, fixed at startup
#[derive(Resource)]
struct LiveView {
    view: View,
    outlines: Vec<Outline>,
}

pub fn run_live(scenario: Scenario) {
    info!(
        "run_live: starting Bevy 2D viewer with {} particles",
        scenario.simulation.particle_count()
    );

    let colliders = scenario.simulation.colliders.configs();
    let positions: Vec<NVec2> = scenario.simulation.positions().collect();
    let circles: Vec<(NVec2, f64)> = colliders
        .iter()
        .filter_map(|c| match *c {
            ColliderConfig::InnerCircle { center, radius } | ColliderConfig::OuterCircle { center, radius } => {
                Some((NVec2::new(center[0], center[1]), radius))
            }
            ColliderConfig::Plane { .. } => None,
        })
        .collect();
    let bounds = extent(&positions, &circles, BOUNDS_MARGIN).unwrap_or(AxisBounds {
        x: (-10.0, 10.0),
        y: (-10.0, 10.0),
    });
    let live_view = LiveView {
        view: View::fit(&bounds),
        outlines: world_outlines(&colliders, &bounds),
    };

    App::new()
        .insert_resource(ClearColor(Color::WHITE))
        .insert_resource(scenario)
        .insert_resource(live_view)
        .add_plugins(DefaultPlugins.set(window_plugin("softsim live")))
        .add_systems(Startup, setup_live_system)
        .add_systems(Update, (physics_step_system, sync_live_system, draw_live_world_system).chain())
        .run();
}

fn setup_live_system(
    mut commands: Commands,
    scenario: Res<Scenario>,
    live: Res<LiveView>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2dBundle::default());

    // one colour per body
    let mut index = 0;
    for (b, body) in scenario.simulation.bodies.iter().enumerate() {
        for p in &body.particles {
            spawn_circle(
                &mut commands,
                &mut meshes,
                &mut materials,
                live.view.to_screen(p.x),
                p.radius as f32 * live.view.scale,
                particle_color(b),
                index,
            );
            index += 1;
        }
    }

    spawn_time_text(&mut commands, time_label(scenario.simulation.t));
}

fn physics_step_system(mut scenario: ResMut<Scenario>) {
    let Scenario {
        simulation,
        parameters,
        ..
    } = &mut *scenario;

    simulation.step(parameters.dt);
}

fn sync_live_system(
    scenario: Res<Scenario>,
    live: Res<LiveView>,
    mut particles: Query<(&ParticleIndex, &mut Transform)>,
    mut texts: Query<&mut Text, With<TimeText>>,
) {
    let positions: Vec<NVec2> = scenario.simulation.positions().collect();
    for (ParticleIndex(i), mut transform) in &mut particles {
        if let Some(p) = positions.get(*i) {
            let s = live.view.to_screen(*p);
            transform.translation.x = s.x;
            transform.translation.y = s.y;
        }
    }
    for mut text in &mut texts {
        text.sections[0].value = time_label(scenario.simulation.t);
    }
}

fn draw_live_world_system(mut gizmos: Gizmos, scenario: Res<Scenario>, live: Res<LiveView>) {
    draw_outlines(&mut gizmos, &live.outlines, &live.view);

    // constraints
    for body in &scenario.simulation.bodies {
        for c in &body.constraints {
            let a = live.view.to_screen(body.particles[c.a].x);
            let b = live.view.to_screen(body.particles[c.b].x);
            gizmos.line_2d(a, b, Color::srgb(0.4, 0.4, 0.4));
        }
    }
}
