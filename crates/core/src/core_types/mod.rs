//! Core types and utilities

pub mod cancel;
pub mod config;
pub mod problem;
pub mod vec3;

pub use cancel::CancelToken;
pub use config::{
    default_worker_count, FieldGeometry, JumpRangeSweep, SweepConfig, BUBBLE_DENSITY,
    DEFAULT_JUMP_END, DEFAULT_JUMP_START, DEFAULT_JUMP_STEP, DEFAULT_MAX_HOP,
    DEFAULT_QUEUE_CAPACITY, FIELD_PADDING, FIELD_SIZE,
};
pub use problem::{FailureReason, JobOutcome, JobResult, Problem};
pub use vec3::Vec3;
