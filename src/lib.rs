pub mod simulation;
pub mod configuration;
pub mod trajectory;
pub mod visualization;

pub use simulation::states::{Particle, SoftBody, NVec2};
pub use simulation::constraint::Constraint;
pub use simulation::colliders::{WorldCollider, ColliderSet, PlaneCollider, InnerCircleCollider, OuterCircleCollider};
pub use simulation::engine::Simulation;
pub use simulation::params::Parameters;
pub use simulation::scenario::Scenario;
pub use simulation::recorder::record;
pub use simulation::snapshot::{save_simulation, load_simulation};
pub use simulation::SimError;

pub use configuration::config::{EngineConfig, ColliderConfig, BodyConfig, ScenarioConfig, PlotConfig, ConfigError};

pub use trajectory::table::PositionTable;
pub use trajectory::writer::PositionWriter;
pub use trajectory::grouping::{GroupSpec, ParticleGroup, group_particles, first_particles};
pub use trajectory::bounds::{AxisBounds, axis_bounds};
pub use trajectory::TableError;

pub use visualization::animation::{run_live, run_replay, Replay};
pub use visualization::frames::{export_frames, FrameExport};
pub use visualization::plots::render_all;
