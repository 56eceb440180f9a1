//! Job harness: one trial per job, run on a worker pool, emitted in order
//!
//! - [`job`] turns a [`crate::Problem`] into a seeded field plus a search
//! - [`scheduler`] runs jobs in parallel and restores submission order
//! - [`reorder`] holds results that finish early
//! - [`sweep`] wires a [`crate::SweepConfig`] to the scheduler
//! - [`stats`] aggregates the ordered results per jump range

pub mod job;
pub mod reorder;
pub mod scheduler;
pub mod stats;
pub mod sweep;

pub use job::{job_seed, SimulationJob};
pub use reorder::{ReorderBuffer, Sequenced};
pub use scheduler::{JobScheduler, RunSummary};
pub use stats::{JumpRangeSummary, SweepStats};
pub use sweep::{run_sweep, SweepRunner};
