//! A full jump-range sweep on the job scheduler

use crate::core_types::cancel::CancelToken;
use crate::core_types::config::SweepConfig;
use crate::core_types::problem::{FailureReason, JobResult, Problem};
use crate::error::{ConfigError, SchedulerError};
use crate::field::expected_point_count;
use crate::simulation::job::SimulationJob;
use crate::simulation::scheduler::{JobScheduler, RunSummary};
use tracing::{error, info};

/// Validated sweep bound to a scheduler and a resolved base seed
#[derive(Debug, Clone)]
pub struct SweepRunner {
    config: SweepConfig,
    seed: u64,
    scheduler: JobScheduler,
}

impl SweepRunner {
    /// Validate `config` and resolve its seed and worker count.
    pub fn new(config: SweepConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let scheduler = JobScheduler::new(config.worker_count(), config.queue_capacity)?;
        Ok(Self {
            config,
            seed,
            scheduler,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Base seed in effect, reported so a run can be replayed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.scheduler.cancel_token()
    }

    /// Run every problem of the sweep, passing results to `sink` in id order.
    pub fn run<S>(&self, sink: S) -> Result<RunSummary, SchedulerError>
    where
        S: FnMut(JobResult),
    {
        info!(
            "Sweep: {} jump range(s) x {} trial(s) = {} problem(s), density={}, points/field={}, seed={}",
            self.config.sweep.value_count(),
            self.config.sweep.trials,
            self.config.problem_count(),
            self.config.density,
            expected_point_count(self.config.geometry.side(), self.config.density),
            self.seed
        );

        let geometry = self.config.geometry;
        let seed = self.seed;
        let summary = self.scheduler.run(
            self.config.problems(),
            |problem: Problem, cancel: &CancelToken| {
                SimulationJob::new(problem, geometry, seed)
                    .run(cancel)
                    .unwrap_or_else(|e| {
                        error!("Field generation failed for id={}: {}", problem.id, e);
                        JobResult::failed(&problem, FailureReason::NoRoute)
                    })
            },
            sink,
        )?;

        info!(
            "Sweep finished: emitted={}, peak_buffered={}, cancelled={}",
            summary.emitted, summary.peak_buffered, summary.cancelled
        );
        Ok(summary)
    }
}

/// Validate `config` and run it to completion.
pub fn run_sweep<S>(config: SweepConfig, sink: S) -> Result<RunSummary, SchedulerError>
where
    S: FnMut(JobResult),
{
    SweepRunner::new(config)?.run(sink)
}
