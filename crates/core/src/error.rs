//! Error types for the harness.
//!
//! Per-trial failures (`no_route`, `exceed_max_hop`) are not errors: they are
//! reported through [`crate::FailureReason`]. The enums here cover invalid
//! configuration and broken scheduler invariants only.

use thiserror::Error;

/// Invalid sweep or geometry configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("density must be finite and non-negative, got {0}")]
    InvalidDensity(f64),

    #[error("jump range must be finite and positive, got {0}")]
    InvalidJumpRange(f64),

    #[error("jump sweep {start}..{end} step {step} is empty or malformed")]
    InvalidSweep { start: f64, end: f64, step: f64 },

    #[error("trial count per jump range must be at least 1")]
    ZeroTrials,

    #[error("max hop count must be at least 1")]
    ZeroMaxHop,

    #[error("field size must be finite and positive, got {0}")]
    InvalidFieldSize(f64),

    #[error("field padding must be finite and non-negative, got {0}")]
    InvalidFieldPadding(f64),

    #[error("field side {side} at density {density} would hold {points} points, above the supported maximum")]
    FieldTooLarge { side: f64, density: f64, points: f64 },

    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,
}

/// Invalid point-field generation parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("field side length must be finite and positive, got {0}")]
    InvalidSide(f64),

    #[error("density must be finite and non-negative, got {0}")]
    InvalidDensity(f64),

    #[error("field of side {side} at density {density} needs {count} points, above the supported maximum")]
    TooManyPoints { side: f64, density: f64, count: f64 },
}

/// Rejected insert into the reorder buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("id {id} was already emitted (next expected {next_expected})")]
    Stale { id: u64, next_expected: u64 },

    #[error("id {0} is already buffered")]
    Duplicate(u64),
}

/// Failure of the job harness itself.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    #[error("problem id {found} breaks the submission sequence (expected {expected})")]
    OutOfSequence { expected: u64, found: u64 },

    #[error("workers exited with {missing} result(s) outstanding")]
    WorkerLost { missing: u64 },

    #[error(transparent)]
    Reorder(#[from] ReorderError),
}
