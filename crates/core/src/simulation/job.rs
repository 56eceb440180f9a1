//! One trial of the sweep as a unit of work
//!
//! A job owns the field it searches: the field is generated from the job's
//! own seed, so concurrently running jobs never share visited flags.

use crate::core_types::cancel::CancelToken;
use crate::core_types::config::FieldGeometry;
use crate::core_types::problem::{JobResult, Problem};
use crate::core_types::vec3::Vec3;
use crate::error::FieldError;
use crate::field::PointField;
use crate::search::{RouteSearch, SearchOutcome, SearchReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// A [`Problem`] bound to field geometry and a seed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationJob {
    pub problem: Problem,
    pub geometry: FieldGeometry,
    pub seed: u64,
}

impl SimulationJob {
    /// Job for `problem` with a seed derived from `base_seed` and the problem id.
    ///
    /// Derivation depends only on the id, so a sweep replays identically
    /// whatever the worker count or completion order.
    pub fn new(problem: Problem, geometry: FieldGeometry, base_seed: u64) -> Self {
        Self {
            problem,
            geometry,
            seed: job_seed(base_seed, problem.id),
        }
    }

    /// Fixed start at `(-field_size/2, 0, 0)`.
    pub fn start(&self) -> Vec3 {
        Vec3::new(-self.geometry.field_size / 2.0, 0.0, 0.0)
    }

    /// Fixed goal at `(+field_size/2, 0, 0)`.
    pub fn goal(&self) -> Vec3 {
        Vec3::new(self.geometry.field_size / 2.0, 0.0, 0.0)
    }

    /// Generate this job's field.
    pub fn generate_field(&self) -> Result<PointField, FieldError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        PointField::generate(self.geometry.side(), self.problem.density, &mut rng)
    }

    /// Generate a fresh field and search it.
    pub fn run(&self, cancel: &CancelToken) -> Result<JobResult, FieldError> {
        debug!("Start search id={}", self.problem.id);
        let mut field = self.generate_field()?;
        Ok(self.run_on(&mut field, cancel))
    }

    /// Search a caller-owned field, resetting its visited flags first.
    ///
    /// Lets a caller reuse one field across jump ranges at the same density.
    pub fn run_on(&self, field: &mut PointField, cancel: &CancelToken) -> JobResult {
        field.reset_visited();
        let report = self.search().with_cancel(cancel.clone()).run(field);
        self.package(&report, field.len())
    }

    fn search(&self) -> RouteSearch {
        RouteSearch::new(
            self.start(),
            self.goal(),
            self.problem.jump_range,
            self.problem.max_hop,
        )
    }

    fn package(&self, report: &SearchReport, field_len: usize) -> JobResult {
        let stats = &report.stats;
        match &report.outcome {
            SearchOutcome::Reached(route) => {
                debug!(
                    "Search id={} reached goal: hops={}, distance={:.2}, points={}, iterations={}, backtracks={}",
                    self.problem.id,
                    route.hops(),
                    route.total_distance,
                    field_len,
                    stats.iterations,
                    stats.backtracks
                );
                JobResult::reached(&self.problem, route.hops(), route.total_distance)
            }
            SearchOutcome::Failed(reason) => {
                debug!(
                    "Search id={} failed: {}, points={}, iterations={}, expansions={}",
                    self.problem.id, reason, field_len, stats.iterations, stats.expansions
                );
                JobResult::failed(&self.problem, *reason)
            }
        }
    }
}

/// Per-job seed. `seed_from_u64` scrambles its input, so adjacent ids still
/// produce unrelated streams.
pub fn job_seed(base_seed: u64, id: u64) -> u64 {
    base_seed.wrapping_add(id)
}
