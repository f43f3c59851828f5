pub mod states;
pub mod params;
pub mod constraint;
pub mod colliders;
pub mod engine;
pub mod factory;
pub mod scenario;
pub mod recorder;
pub mod snapshot;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    #[error("mesh spacing must be positive, got {0}")]
    InvalidSpacing(f64),

    #[error("pinned particle {index} out of range for a body of {len} particles")]
    PinnedOutOfRange { index: usize, len: usize },

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot format error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("invalid collider in snapshot: {0}")]
    Collider(String),

    #[error("body {body}: constraint refers to particle {index}, body has {len} particles")]
    ConstraintOutOfRange { body: usize, index: usize, len: usize },
}
