//! Jump Route Simulation Core Library
//!
//! Monte-Carlo study of how far a "jump" must reach before a random 3D point
//! field becomes traversable. Each trial scatters points uniformly in a cube,
//! then runs a greedy goal-directed depth-first search from a fixed start to a
//! fixed goal, hopping only between points closer than the jump range.
//!
//! ## Sweeps
//!
//! A sweep runs many independent trials across a range of jump distances on a
//! fixed-size worker pool and reports every result in submission order, so
//! the output is identical whatever the worker count.
//!
//! ```no_run
//! use jump_sim_core::{run_sweep, SweepConfig};
//!
//! let config = SweepConfig {
//!     seed: Some(7),
//!     ..SweepConfig::default()
//! };
//! run_sweep(config, |result| println!("{result}")).unwrap();
//! ```

// Core types and configuration
pub mod core_types;
pub mod error;

// Point field and route search
pub mod field;
pub mod search;

// Parallel job harness
pub mod simulation;

// Re-export core types
pub use core_types::{
    CancelToken, FailureReason, FieldGeometry, JobOutcome, JobResult, JumpRangeSweep, Problem,
    SweepConfig, Vec3,
};
pub use error::{ConfigError, FieldError, ReorderError, SchedulerError};

// Re-export field and search types
pub use field::{sphere_density, PointField, PointId};
pub use search::{Route, RouteSearch, SearchOutcome, SearchReport, SearchStats};

// Re-export harness types
pub use simulation::{
    run_sweep, JobScheduler, JumpRangeSummary, RunSummary, Sequenced, SimulationJob, SweepRunner,
    SweepStats,
};
