//! Parallel job execution with in-order result delivery
//!
//! # Pipeline
//!
//! ```text
//! problems ──▶ [problem queue] ──▶ worker 0..n ──▶ [result queue] ──▶ reorder ──▶ sink
//!     ▲                                                                   │
//!     └──────────────────────── calling thread ───────────────────────────┘
//! ```
//!
//! Workers run on a dedicated rayon pool. The calling thread both feeds the
//! problem queue and drains the result queue: each step it waits for
//! whichever of the two is ready, so it blocks only when the problem queue
//! is full and no result has arrived. Both queues are bounded; any capacity
//! of at least one is correct.

use crate::core_types::cancel::CancelToken;
use crate::error::{ConfigError, SchedulerError};
use crate::simulation::reorder::{ReorderBuffer, Sequenced};
use crossbeam_channel::{bounded, Receiver, RecvError, Select, Sender};
use tracing::{debug, info, warn};

/// Totals for one [`JobScheduler::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Problems handed to workers
    pub submitted: u64,
    /// Results delivered to the sink
    pub emitted: u64,
    /// Largest number of results held back waiting for an earlier id
    pub peak_buffered: usize,
    /// Whether production stopped early on cancellation
    pub cancelled: bool,
}

/// Fixed-size worker pool that emits results in submission order
#[derive(Debug, Clone)]
pub struct JobScheduler {
    workers: usize,
    queue_capacity: usize,
    cancel: CancelToken,
}

enum Step<T> {
    Sent,
    Received(Result<T, RecvError>),
    WorkersGone,
}

impl JobScheduler {
    pub fn new(workers: usize, queue_capacity: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(Self {
            workers,
            queue_capacity,
            cancel: CancelToken::new(),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Token that stops the run when cancelled.
    ///
    /// After cancellation no further problems are dispatched; searches in
    /// flight stop at their next hop and still report a result, so every
    /// submitted problem is answered exactly once.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run every problem through `runner` and pass the results to `sink` in
    /// submission order.
    ///
    /// Problem ids must be contiguous: each id is one more than the previous.
    /// The first id may be anything. A worker that panics is re-raised once
    /// the remaining workers have finished.
    pub fn run<P, T, I, F, S>(
        &self,
        problems: I,
        runner: F,
        mut sink: S,
    ) -> Result<RunSummary, SchedulerError>
    where
        P: Sequenced + Send,
        T: Sequenced + Send,
        I: IntoIterator<Item = P>,
        F: Fn(P, &CancelToken) -> T + Sync,
        S: FnMut(T),
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("jump-worker-{i}"))
            .build()?;

        let (job_tx, job_rx) = bounded::<P>(self.queue_capacity);
        let (result_tx, result_rx) = bounded::<T>(self.queue_capacity);
        info!("Worker count: {}", self.workers);

        let runner = &runner;
        let cancel = &self.cancel;
        pool.in_place_scope(|scope| {
            for _ in 0..self.workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move |_| {
                    for problem in &job_rx {
                        let result = runner(problem, cancel);
                        if result_tx.send(result).is_err() {
                            break;
                        }
                    }
                    debug!("Worker {:?} exiting", rayon::current_thread_index());
                });
            }
            // Workers hold the only receivers and senders from here on
            drop(job_rx);
            drop(result_tx);

            self.coordinate(problems.into_iter(), job_tx, result_rx, &mut sink)
        })
    }

    // Owns both queue ends so any return closes them and releases the workers
    #[allow(clippy::needless_pass_by_value)]
    fn coordinate<P, T, I, S>(
        &self,
        mut problems: I,
        job_tx: Sender<P>,
        result_rx: Receiver<T>,
        sink: &mut S,
    ) -> Result<RunSummary, SchedulerError>
    where
        P: Sequenced,
        T: Sequenced,
        I: Iterator<Item = P>,
        S: FnMut(T),
    {
        let mut pending = problems.next();
        let first_id = pending.as_ref().map_or(0, Sequenced::sequence_id);
        let mut reorder = ReorderBuffer::new(first_id);
        let mut job_tx = Some(job_tx);
        let mut summary = RunSummary::default();

        loop {
            if job_tx.is_some() && self.cancel.is_cancelled() {
                warn!(
                    "Cancellation requested after {} problem(s) were dispatched",
                    summary.submitted
                );
                summary.cancelled = true;
                pending = None;
            }
            if pending.is_none() {
                // Closing the queue lets workers exit once it drains
                job_tx = None;
            }

            let step = match (&job_tx, pending.take()) {
                (Some(tx), Some(problem)) => {
                    let mut select = Select::new();
                    let send_index = select.send(tx);
                    select.recv(&result_rx);
                    let operation = select.select();
                    if operation.index() == send_index {
                        match operation.send(tx, problem) {
                            Ok(()) => Step::Sent,
                            Err(_) => Step::WorkersGone,
                        }
                    } else {
                        pending = Some(problem);
                        Step::Received(operation.recv(&result_rx))
                    }
                }
                (_, leftover) => {
                    pending = leftover;
                    Step::Received(result_rx.recv())
                }
            };

            match step {
                Step::Sent => {
                    summary.submitted += 1;
                    pending = problems.next();
                    if let Some(problem) = &pending {
                        let expected = first_id + summary.submitted;
                        let found = problem.sequence_id();
                        if found != expected {
                            return Err(SchedulerError::OutOfSequence { expected, found });
                        }
                    }
                }
                Step::Received(Ok(result)) => {
                    let id = result.sequence_id();
                    reorder.push(result)?;
                    for ready in reorder.drain_ready() {
                        sink(ready);
                        summary.emitted += 1;
                    }
                    debug!(
                        "Done: id={}, next_id={}, buffered={}",
                        id,
                        reorder.next_expected(),
                        reorder.len()
                    );
                }
                Step::Received(Err(RecvError)) | Step::WorkersGone => break,
            }
        }

        summary.peak_buffered = reorder.peak();
        let missing = summary.submitted - summary.emitted;
        if missing > 0 {
            return Err(SchedulerError::WorkerLost { missing });
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::problem::{FailureReason, JobResult, Problem};

    fn problems(n: u64) -> impl Iterator<Item = Problem> {
        (0..n).map(|id| Problem::new(id, 10.0, 0.0, 10))
    }

    fn echo(problem: Problem, _cancel: &CancelToken) -> JobResult {
        JobResult::failed(&problem, FailureReason::NoRoute)
    }

    #[test]
    fn test_rejects_zero_sizes() {
        assert!(matches!(
            JobScheduler::new(0, 4),
            Err(ConfigError::ZeroWorkers)
        ));
        assert!(matches!(
            JobScheduler::new(2, 0),
            Err(ConfigError::ZeroQueueCapacity)
        ));
    }

    #[test]
    fn test_single_worker_in_order() {
        let scheduler = JobScheduler::new(1, 1).unwrap();
        let mut seen = Vec::new();
        let summary = scheduler
            .run(problems(20), echo, |r| seen.push(r.id))
            .unwrap();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert_eq!(summary.submitted, 20);
        assert_eq!(summary.emitted, 20);
        assert!(!summary.cancelled);
    }

    #[test]
    fn test_empty_stream() {
        let scheduler = JobScheduler::new(3, 2).unwrap();
        let mut seen = Vec::new();
        let summary = scheduler
            .run(problems(0), echo, |r| seen.push(r.id))
            .unwrap();
        assert!(seen.is_empty());
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn test_first_id_need_not_be_zero() {
        let scheduler = JobScheduler::new(2, 2).unwrap();
        let mut seen = Vec::new();
        scheduler
            .run(
                (100..110).map(|id| Problem::new(id, 10.0, 0.0, 10)),
                echo,
                |r| seen.push(r.id),
            )
            .unwrap();
        assert_eq!(seen, (100..110).collect::<Vec<_>>());
    }

    #[test]
    fn test_out_of_sequence_is_rejected() {
        let scheduler = JobScheduler::new(2, 2).unwrap();
        let ids = [0, 1, 3, 4];
        let result = scheduler.run(
            ids.into_iter().map(|id| Problem::new(id, 10.0, 0.0, 10)),
            echo,
            |_| {},
        );
        assert!(matches!(
            result,
            Err(SchedulerError::OutOfSequence {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_slow_early_jobs_are_held_back() {
        let scheduler = JobScheduler::new(4, 2).unwrap();
        let mut seen = Vec::new();
        let summary = scheduler
            .run(
                problems(40),
                |problem: Problem, cancel: &CancelToken| {
                    let delay = 8 - (problem.id % 8);
                    std::thread::sleep(std::time::Duration::from_millis(delay));
                    echo(problem, cancel)
                },
                |r| seen.push(r.id),
            )
            .unwrap();
        assert_eq!(seen, (0..40).collect::<Vec<_>>());
        assert_eq!(summary.emitted, 40);
    }

    #[test]
    fn test_cancel_before_run_dispatches_nothing() {
        let scheduler = JobScheduler::new(2, 2).unwrap();
        scheduler.cancel_token().cancel();
        let mut seen = Vec::new();
        let summary = scheduler
            .run(problems(50), echo, |r| seen.push(r.id))
            .unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.submitted, 0);
        assert!(seen.is_empty());
    }
}
