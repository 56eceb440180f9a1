//! Per-jump-range aggregation of in-order results

use crate::core_types::problem::{FailureReason, JobResult};
use serde::Serialize;

/// Aggregate over every trial sharing one jump range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JumpRangeSummary {
    pub jump_range: f64,
    pub density: f64,
    pub trials: usize,
    pub successes: usize,
    pub exceeded_max_hop: usize,
    pub cancelled: usize,
    /// Mean hop count over successful trials
    pub mean_hops: Option<f64>,
    /// Mean efficiency over successful trials
    pub mean_efficiency: Option<f64>,
}

impl JumpRangeSummary {
    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.successes as f64 / self.trials as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Group {
    jump_range: f64,
    density: f64,
    trials: usize,
    successes: usize,
    exceeded_max_hop: usize,
    cancelled: usize,
    hop_sum: f64,
    efficiency_sum: f64,
}

impl Group {
    fn open(result: &JobResult) -> Self {
        Self {
            jump_range: result.jump_range,
            density: result.density,
            trials: 0,
            successes: 0,
            exceeded_max_hop: 0,
            cancelled: 0,
            hop_sum: 0.0,
            efficiency_sum: 0.0,
        }
    }

    fn summary(&self) -> JumpRangeSummary {
        let mean = |sum: f64| (self.successes > 0).then(|| sum / self.successes as f64);
        JumpRangeSummary {
            jump_range: self.jump_range,
            density: self.density,
            trials: self.trials,
            successes: self.successes,
            exceeded_max_hop: self.exceeded_max_hop,
            cancelled: self.cancelled,
            mean_hops: mean(self.hop_sum),
            mean_efficiency: mean(self.efficiency_sum),
        }
    }
}

/// Streaming aggregator fed with results in id order
///
/// Trials of one jump range carry consecutive ids, so a group is complete
/// as soon as a result with a different jump range arrives.
#[derive(Debug, Clone)]
pub struct SweepStats {
    straight_line: f64,
    current: Option<Group>,
    groups_flushed: usize,
}

impl SweepStats {
    /// `straight_line` is the start-to-goal separation used for efficiency.
    pub fn new(straight_line: f64) -> Self {
        Self {
            straight_line,
            current: None,
            groups_flushed: 0,
        }
    }

    /// Add one result; returns the previous group if this result closed it.
    pub fn push(&mut self, result: &JobResult) -> Option<JumpRangeSummary> {
        let closes_group = self
            .current
            .as_ref()
            .is_some_and(|group| group.jump_range != result.jump_range);
        let flushed = if closes_group {
            self.take_summary()
        } else {
            None
        };

        let straight_line = self.straight_line;
        let group = self.current.get_or_insert_with(|| Group::open(result));
        group.trials += 1;
        if let (Some(hops), Some(efficiency)) =
            (result.hop_count(), result.efficiency(straight_line))
        {
            group.successes += 1;
            group.hop_sum += hops as f64;
            group.efficiency_sum += efficiency;
        } else {
            match result.failure_reason() {
                Some(FailureReason::ExceedMaxHop) => group.exceeded_max_hop += 1,
                Some(FailureReason::Cancelled) => group.cancelled += 1,
                _ => {}
            }
        }
        flushed
    }

    /// Close the last open group.
    pub fn finish(&mut self) -> Option<JumpRangeSummary> {
        self.take_summary()
    }

    /// Number of groups flushed so far.
    pub fn groups_flushed(&self) -> usize {
        self.groups_flushed
    }

    fn take_summary(&mut self) -> Option<JumpRangeSummary> {
        let group = self.current.take()?;
        self.groups_flushed += 1;
        Some(group.summary())
    }
}
