//! Greedy depth-first route search with backtracking
//!
//! The search walks from the start towards the goal through field points no
//! more than one jump apart. From every point it tries the unexplored
//! neighbour closest to the goal first, and backs up to the previous point
//! when a point runs out of neighbours.
//!
//! # Visited marking
//!
//! A point consumed anywhere in the run is excluded for the rest of the run,
//! including on branches reached after backtracking. The search is therefore
//! incomplete: a connected instance can still end in `no_route` when greedy
//! choices use up the points an alternative ordering would have needed. The
//! success-rate curves produced by a sweep are defined relative to this policy.

use crate::core_types::cancel::CancelToken;
use crate::core_types::problem::FailureReason;
use crate::core_types::vec3::{distance_sq, within_sq, Vec3};
use crate::field::{PointField, PointId};

/// One step of the path under construction
///
/// Nodes live in an arena owned by the search. The arena only ever holds the
/// live path: the current node is always the last entry, and an exhausted node
/// is dropped from the arena when the search backs up to its parent.
#[derive(Debug, Clone)]
struct SearchNode {
    position: Vec3,
    parent: Option<usize>,
    /// Untried neighbours, best first
    candidates: Vec<PointId>,
    cursor: usize,
}

impl SearchNode {
    /// Next candidate that is still unvisited, discarding any visited ones.
    fn next_unvisited(&mut self, field: &PointField) -> Option<PointId> {
        while let Some(&id) = self.candidates.get(self.cursor) {
            self.cursor += 1;
            if !field.is_visited(id) {
                return Some(id);
            }
        }
        None
    }
}

/// A route from start to goal
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Start, every intermediate field point, then the goal
    pub waypoints: Vec<Vec3>,
    pub total_distance: f64,
}

impl Route {
    fn from_waypoints(waypoints: Vec<Vec3>) -> Self {
        let total_distance = waypoints
            .windows(2)
            .fold(0.0, |acc, pair| acc + (pair[1] - pair[0]).norm());
        Self {
            waypoints,
            total_distance,
        }
    }

    /// Number of link traversals, including the final hop into the goal.
    pub fn hops(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }
}

/// How a search ended
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Reached(Route),
    Failed(FailureReason),
}

/// Counters collected during one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Loop iterations, the quantity bounded by the hop budget
    pub iterations: usize,
    /// Field points consumed
    pub expansions: usize,
    pub backtracks: usize,
    /// Deepest path reached, in nodes after the start
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

/// Parameters of a single search
#[derive(Debug, Clone)]
pub struct RouteSearch {
    start: Vec3,
    goal: Vec3,
    jump_range: f64,
    max_hop: usize,
    cancel: Option<CancelToken>,
}

impl RouteSearch {
    pub fn new(start: Vec3, goal: Vec3, jump_range: f64, max_hop: usize) -> Self {
        Self {
            start,
            goal,
            jump_range,
            max_hop,
            cancel: None,
        }
    }

    /// Abort with [`FailureReason::Cancelled`] once `token` is set.
    ///
    /// The token is checked on every hop-count increment.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn goal(&self) -> Vec3 {
        self.goal
    }

    /// Run the search, consuming visited flags in `field`.
    ///
    /// The field must be fresh or reset; flags already set are honoured.
    pub fn run(&self, field: &mut PointField) -> SearchReport {
        let mut stats = SearchStats::default();
        let radius_sq = self.jump_range * self.jump_range;

        if within_sq(&self.start, &self.goal, radius_sq) {
            return SearchReport {
                outcome: SearchOutcome::Reached(Route::from_waypoints(vec![self.start, self.goal])),
                stats,
            };
        }

        let mut nodes = vec![SearchNode {
            position: self.start,
            parent: None,
            candidates: field.within(&self.start, self.jump_range),
            cursor: 0,
        }];
        let mut current = 0;

        loop {
            stats.iterations += 1;

            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Self::failed(FailureReason::Cancelled, stats);
            }
            if stats.iterations > self.max_hop {
                return Self::failed(FailureReason::ExceedMaxHop, stats);
            }

            let Some(next) = nodes[current].next_unvisited(field) else {
                match nodes[current].parent {
                    None => return Self::failed(FailureReason::NoRoute, stats),
                    Some(parent) => {
                        debug_assert_eq!(current + 1, nodes.len());
                        nodes.truncate(current);
                        current = parent;
                        stats.backtracks += 1;
                        continue;
                    }
                }
            };

            field.mark_visited(next);
            let position = field.position(next);
            let candidates = self.goalward_candidates(field, &position);

            nodes.push(SearchNode {
                position,
                parent: Some(current),
                candidates,
                cursor: 0,
            });
            current = nodes.len() - 1;
            stats.expansions += 1;
            stats.max_depth = stats.max_depth.max(current);

            if within_sq(&position, &self.goal, radius_sq) {
                let route = self.trace(&nodes, current);
                return SearchReport {
                    outcome: SearchOutcome::Reached(route),
                    stats,
                };
            }
        }
    }

    /// Neighbours of `position` ordered by squared distance to the goal.
    fn goalward_candidates(&self, field: &PointField, position: &Vec3) -> Vec<PointId> {
        let mut keyed: Vec<(f64, PointId)> = field
            .within(position, self.jump_range)
            .into_iter()
            .map(|id| (distance_sq(&field.position(id), &self.goal), id))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, id)| id).collect()
    }

    /// Follow parent links from `tip` back to the start, then append the goal.
    fn trace(&self, nodes: &[SearchNode], tip: usize) -> Route {
        let mut waypoints = Vec::with_capacity(tip + 2);
        let mut cursor = Some(tip);
        while let Some(index) = cursor {
            waypoints.push(nodes[index].position);
            cursor = nodes[index].parent;
        }
        waypoints.reverse();
        waypoints.push(self.goal);
        Route::from_waypoints(waypoints)
    }

    fn failed(reason: FailureReason, stats: SearchStats) -> SearchReport {
        SearchReport {
            outcome: SearchOutcome::Failed(reason),
            stats,
        }
    }
}
