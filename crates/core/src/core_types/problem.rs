//! Problem and result records exchanged between callers and the job harness.
//!
//! A [`Problem`] describes one trial: a jump range, a density and a hop budget.
//! A [`JobResult`] reports how that trial ended. The `id` carried by both is the
//! correlation key the scheduler uses to emit results in submission order.

use crate::simulation::reorder::Sequenced;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One trial of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Submission id, contiguous and strictly increasing within a run
    pub id: u64,
    /// Maximum distance a single hop may cover
    pub jump_range: f64,
    /// Expected number of field points per cubic unit
    pub density: f64,
    /// Iterations allowed before the trial is declared failed
    pub max_hop: usize,
}

impl Problem {
    pub fn new(id: u64, jump_range: f64, density: f64, max_hop: usize) -> Self {
        Self {
            id,
            jump_range,
            density,
            max_hop,
        }
    }
}

impl Sequenced for Problem {
    fn sequence_id(&self) -> u64 {
        self.id
    }
}

/// Why a trial did not reach the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Backtracking exhausted every candidate reachable from the start
    NoRoute,
    /// The hop counter passed the configured ceiling
    ExceedMaxHop,
    /// The run was cancelled while this trial was in flight
    Cancelled,
}

impl FailureReason {
    /// Stable label used in reports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoRoute => "no_route",
            Self::ExceedMaxHop => "exceed_max_hop",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    /// A route was found
    Reached {
        /// Link traversals from start to goal, including the final hop
        hops: usize,
        /// Sum of Euclidean hop lengths along the route
        total_distance: f64,
    },
    /// No route was found
    Failed {
        /// Why the search stopped
        reason: FailureReason,
    },
}

/// Outcome of one [`Problem`], produced exactly once per problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Id of the problem this result answers
    pub id: u64,
    pub density: f64,
    pub jump_range: f64,
    pub outcome: JobOutcome,
}

impl JobResult {
    /// Successful result for `problem`.
    pub fn reached(problem: &Problem, hops: usize, total_distance: f64) -> Self {
        Self {
            id: problem.id,
            density: problem.density,
            jump_range: problem.jump_range,
            outcome: JobOutcome::Reached {
                hops,
                total_distance,
            },
        }
    }

    /// Failed result for `problem`.
    pub fn failed(problem: &Problem, reason: FailureReason) -> Self {
        Self {
            id: problem.id,
            density: problem.density,
            jump_range: problem.jump_range,
            outcome: JobOutcome::Failed { reason },
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, JobOutcome::Reached { .. })
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self.outcome {
            JobOutcome::Failed { reason } => Some(reason),
            JobOutcome::Reached { .. } => None,
        }
    }

    pub fn hop_count(&self) -> Option<usize> {
        match self.outcome {
            JobOutcome::Reached { hops, .. } => Some(hops),
            JobOutcome::Failed { .. } => None,
        }
    }

    pub fn total_distance(&self) -> Option<f64> {
        match self.outcome {
            JobOutcome::Reached { total_distance, .. } => Some(total_distance),
            JobOutcome::Failed { .. } => None,
        }
    }

    /// Straight-line distance over travelled distance, for successful trials.
    ///
    /// `straight_line` is the start-to-goal separation (the field size).
    pub fn efficiency(&self, straight_line: f64) -> Option<f64> {
        self.total_distance()
            .filter(|d| *d > 0.0)
            .map(|d| straight_line / d)
    }
}

impl Sequenced for JobResult {
    fn sequence_id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failure_reason() {
            None => write!(f, "{{id={}, succ=true}}", self.id),
            Some(reason) => write!(f, "{{id={}, succ=false, because={reason}}}", self.id),
        }
    }
}
