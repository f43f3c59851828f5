//! Configuration types for loading scenarios and plot settings from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]   – step size, step count, gravity, progress logging
//! - [`OutputConfig`]   – where the positions table is written
//! - [`ColliderConfig`] – static world geometry
//! - [`BodyConfig`]     – one soft body (shape, material, pinned particles)
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! Three squares dropped on a floor:
//!
//! ```yaml
//! engine:
//!   dt: 0.01                # fixed step size
//!   steps: 2000             # recorded steps (row 0 is the initial state)
//!   gravity: [0.0, -10.0]
//!   log_every: 100
//!
//! output:
//!   positions: visuals/positions.csv
//!
//! colliders:
//!   - type: plane
//!     normal: [0.0, 1.0]
//!     distance: -10.0
//!   - type: outer_circle
//!     center: [0.0, -10.0]
//!     radius: 5.0
//!
//! bodies:
//!   - shape: square
//!     center: [30.0, 10.0]
//!     stiffness: 0.9
//!     damping: 0.1
//!   - shape: polygon
//!     vertices: [[0, 0], [6, 0], [6, 4], [0, 4]]
//!     spacing: 1.0
//!     label: slab
//! ```
//!
//! [`PlotConfig`] holds the chart settings (time step, row window and the
//! group count table) and lives in its own YAML file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trajectory::grouping::GroupSpec;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn invalid<T>(msg: impl Into<String>) -> Result<T, ConfigError> {
    Err(ConfigError::Invalid(msg.into()))
}

fn default_gravity() -> [f64; 2] { [0.0, -10.0] }
fn default_log_every() -> usize { 100 }
fn default_positions() -> PathBuf { PathBuf::from("visuals/positions.csv") }
fn default_half_size() -> f64 { 1.0 }
fn default_spacing() -> f64 { 1.0 }
fn default_mass() -> f64 { 1.0 }
fn default_radius() -> f64 { crate::simulation::states::DEFAULT_RADIUS }
fn default_stiffness() -> f64 { crate::simulation::constraint::DEFAULT_STIFFNESS }
fn default_damping() -> f64 { crate::simulation::constraint::DEFAULT_DAMPING }
fn default_friction() -> f64 { crate::simulation::states::DEFAULT_FRICTION }
fn default_restitution() -> f64 { crate::simulation::states::DEFAULT_RESTITUTION }
fn default_dt() -> f64 { 0.01 }
fn default_window_start() -> usize { 400 }
fn default_window_end() -> usize { 1500 }
fn default_group_size() -> usize { 4 }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }

/// Fixed-step engine settings
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub dt: f64, // time step size
    pub steps: usize, // number of steps to run
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 2], // gravitational acceleration
    #[serde(default = "default_log_every")]
    pub log_every: usize, // progress log interval in steps, 0 = silent
}

/// Where recorded data goes
#[derive(Deserialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_positions")]
    pub positions: PathBuf, // positions table (CSV)
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { positions: default_positions() }
    }
}

/// Static world geometry
/// `type: plane`, `type: inner_circle` or `type: outer_circle`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColliderConfig {
    /// Particles stay on the side the normal points to, `x·n >= distance`
    Plane { normal: [f64; 2], distance: f64 },
    /// Particles stay inside the circle
    InnerCircle { center: [f64; 2], radius: f64 },
    /// Particles stay outside the circle
    OuterCircle { center: [f64; 2], radius: f64 },
}

impl ColliderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            ColliderConfig::Plane { normal, .. } => {
                if normal[0] == 0.0 && normal[1] == 0.0 {
                    return invalid("plane collider normal must be non-zero");
                }
            }
            ColliderConfig::InnerCircle { radius, .. } | ColliderConfig::OuterCircle { radius, .. } => {
                if *radius < 0.0 {
                    return invalid(format!("circle collider radius must be >= 0, got {radius}"));
                }
            }
        }
        Ok(())
    }
}

/// Body shapes the factory can build
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Square,
    Triangle,
    Polygon,
}

/// Configuration for a single soft body
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub shape: ShapeKind,
    #[serde(default)]
    pub center: Option<[f64; 2]>, // square / triangle center
    #[serde(default = "default_half_size")]
    pub half_size: f64, // square / triangle half extent
    #[serde(default)]
    pub vertices: Vec<[f64; 2]>, // polygon outline
    #[serde(default = "default_spacing")]
    pub spacing: f64, // polygon mesh spacing
    #[serde(default = "default_mass")]
    pub mass: f64, // per particle
    #[serde(default = "default_radius")]
    pub radius: f64, // per particle
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_friction")]
    pub friction: f64,
    #[serde(default = "default_restitution")]
    pub restitution: f64,
    #[serde(default)]
    pub pinned: Vec<usize>, // indices of particles that never move
    #[serde(default)]
    pub label: Option<String>, // group name in plots
}

impl BodyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.shape {
            ShapeKind::Square | ShapeKind::Triangle => {
                if self.center.is_none() {
                    return invalid(format!("{:?} body needs a center", self.shape));
                }
                if self.half_size <= 0.0 {
                    return invalid(format!("half_size must be > 0, got {}", self.half_size));
                }
            }
            ShapeKind::Polygon => {
                if self.vertices.len() < 3 {
                    return invalid(format!("polygon body needs at least 3 vertices, got {}", self.vertices.len()));
                }
                if self.spacing <= 0.0 {
                    return invalid(format!("spacing must be > 0, got {}", self.spacing));
                }
            }
        }
        for (name, v) in [("stiffness", self.stiffness), ("damping", self.damping)] {
            if !(0.0..=1.0).contains(&v) {
                return invalid(format!("{name} must be within [0, 1], got {v}"));
            }
        }
        if self.mass < 0.0 {
            return invalid(format!("mass must be >= 0, got {}", self.mass));
        }
        if self.radius < 0.0 {
            return invalid(format!("radius must be >= 0, got {}", self.radius));
        }
        Ok(())
    }
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub colliders: Vec<ColliderConfig>,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Self::from_reader(s.as_bytes())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_reader(open(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.engine.dt > 0.0) {
            return invalid(format!("engine.dt must be > 0, got {}", self.engine.dt));
        }
        for c in &self.colliders {
            c.validate()?;
        }
        for b in &self.bodies {
            b.validate()?;
        }
        Ok(())
    }
}

/// Visible row window `[start, end)`
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct WindowConfig {
    #[serde(default = "default_window_start")]
    pub start: usize,
    #[serde(default = "default_window_end")]
    pub end: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: default_window_start(),
            end: default_window_end(),
        }
    }
}

/// Chart settings
///
/// ```yaml
/// dt: 0.01
/// window: { start: 400, end: 1500 }
/// output_dir: visuals
/// groups:
///   - { name: "Square1 s=0.9, d=0.1", count: 4 }
///   - { name: "Square1 s=0.5, d=0.5", count: 4 }
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct PlotConfig {
    #[serde(default = "default_dt")]
    pub dt: f64, // seconds per row
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub groups: Vec<GroupSpec>, // count table, empty = uniform groups
    #[serde(default = "default_group_size")]
    pub group_size: usize, // size of the uniform groups
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            window: WindowConfig::default(),
            groups: Vec::new(),
            group_size: default_group_size(),
            output_dir: default_output_dir(),
        }
    }
}

impl PlotConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let cfg: PlotConfig = serde_yaml::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Self::from_reader(s.as_bytes())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_reader(open(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt > 0.0) {
            return invalid(format!("dt must be > 0, got {}", self.dt));
        }
        if self.window.start >= self.window.end {
            return invalid(format!(
                "window start ({}) must be below window end ({})",
                self.window.start, self.window.end
            ));
        }
        if self.group_size == 0 {
            return invalid("group_size must be > 0");
        }
        Ok(())
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Use `name` as given when it exists, otherwise look it up under `<crate>/<dir>/`
pub fn resolve_config_path(name: &Path, dir: &str) -> PathBuf {
    if name.exists() {
        return name.to_path_buf();
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(dir).join(name)
}
