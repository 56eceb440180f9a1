//! Sweep configuration and reference constants
//!
//! The defaults reproduce the reference sweep: a 1000-unit corridor padded by
//! 80 units on every side, density 0.002375, jump ranges 6.8..75 in steps of
//! 0.05 and a hop budget of 100000.

use crate::core_types::problem::Problem;
use crate::error::ConfigError;
use crate::field::MAX_POINTS;
use serde::{Deserialize, Serialize};

/// Reference field density in points per cubic unit
pub const BUBBLE_DENSITY: f64 = 0.002375;
/// Start-to-goal separation along the x axis
pub const FIELD_SIZE: f64 = 1000.0;
/// Extra depth generated on every side of the travel corridor
pub const FIELD_PADDING: f64 = 80.0;
/// Hop budget for a single problem
pub const DEFAULT_MAX_HOP: usize = 100_000;
/// Capacity of the problem and result queues
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

pub const DEFAULT_JUMP_START: f64 = 6.8;
pub const DEFAULT_JUMP_END: f64 = 75.0;
pub const DEFAULT_JUMP_STEP: f64 = 0.05;

/// Dimensions of the generated field around the travel corridor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldGeometry {
    /// Start-to-goal separation; start sits at `-field_size/2` on x, goal at `+field_size/2`
    pub field_size: f64,
    /// Padding added on each side so corridor edges still see candidates
    pub field_padding: f64,
}

impl Default for FieldGeometry {
    fn default() -> Self {
        Self {
            field_size: FIELD_SIZE,
            field_padding: FIELD_PADDING,
        }
    }
}

impl FieldGeometry {
    pub fn new(field_size: f64, field_padding: f64) -> Result<Self, ConfigError> {
        let geometry = Self {
            field_size,
            field_padding,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Side length of the generated cube: `field_size + 2 * field_padding`.
    pub fn side(&self) -> f64 {
        self.field_size + 2.0 * self.field_padding
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.field_size.is_finite() || self.field_size <= 0.0 {
            return Err(ConfigError::InvalidFieldSize(self.field_size));
        }
        if !self.field_padding.is_finite() || self.field_padding < 0.0 {
            return Err(ConfigError::InvalidFieldPadding(self.field_padding));
        }
        Ok(())
    }
}

/// Jump-range values to sweep and the number of trials per value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpRangeSweep {
    /// First jump range (inclusive)
    pub start: f64,
    /// Upper bound (exclusive)
    pub end: f64,
    pub step: f64,
    /// Independent trials per jump range
    pub trials: usize,
}

impl Default for JumpRangeSweep {
    fn default() -> Self {
        Self {
            start: DEFAULT_JUMP_START,
            end: DEFAULT_JUMP_END,
            step: DEFAULT_JUMP_STEP,
            trials: 1,
        }
    }
}

impl JumpRangeSweep {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let malformed = !self.start.is_finite()
            || !self.end.is_finite()
            || !self.step.is_finite()
            || self.start <= 0.0
            || self.step <= 0.0
            || self.end <= self.start;
        if malformed {
            return Err(ConfigError::InvalidSweep {
                start: self.start,
                end: self.end,
                step: self.step,
            });
        }
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        Ok(())
    }

    /// Number of distinct jump-range values.
    pub fn value_count(&self) -> usize {
        self.values().count()
    }

    /// Jump-range values `start + i * step` strictly below `end`.
    ///
    /// Indexed rather than accumulated, so long sweeps do not drift.
    pub fn values(&self) -> impl Iterator<Item = f64> {
        let Self { start, end, step, .. } = *self;
        let usable = step > 0.0 && step.is_finite();
        (0u64..)
            .map(move |i| start + i as f64 * step)
            .take_while(move |v| usable && *v < end)
    }

    /// Problems for the whole sweep, ids contiguous from 0.
    ///
    /// Each jump range gets `trials` consecutive ids.
    pub fn problems(&self, density: f64, max_hop: usize) -> impl Iterator<Item = Problem> {
        let trials = self.trials;
        self.values()
            .flat_map(move |jump_range| std::iter::repeat(jump_range).take(trials))
            .zip(0u64..)
            .map(move |(jump_range, id)| Problem::new(id, jump_range, density, max_hop))
    }
}

/// Everything needed to run a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub geometry: FieldGeometry,
    pub density: f64,
    pub sweep: JumpRangeSweep,
    pub max_hop: usize,
    /// Base seed; each job derives its own seed from this and its id
    pub seed: Option<u64>,
    /// Worker count; `None` picks [`default_worker_count`]
    pub workers: Option<usize>,
    pub queue_capacity: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            geometry: FieldGeometry::default(),
            density: BUBBLE_DENSITY,
            sweep: JumpRangeSweep::default(),
            max_hop: DEFAULT_MAX_HOP,
            seed: None,
            workers: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;
        self.sweep.validate()?;
        if !self.density.is_finite() || self.density < 0.0 {
            return Err(ConfigError::InvalidDensity(self.density));
        }
        let side = self.geometry.side();
        let points = (side * side * side * self.density).floor();
        if points > MAX_POINTS {
            return Err(ConfigError::FieldTooLarge {
                side,
                density: self.density,
                points,
            });
        }
        if self.max_hop == 0 {
            return Err(ConfigError::ZeroMaxHop);
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }

    /// Resolved worker count.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count)
    }

    /// Total number of problems the sweep submits.
    pub fn problem_count(&self) -> usize {
        self.sweep.value_count() * self.sweep.trials
    }

    pub fn problems(&self) -> impl Iterator<Item = Problem> {
        self.sweep.problems(self.density, self.max_hop)
    }
}

/// Available parallelism minus two, never below one.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map_or(1, std::num::NonZeroUsize::get)
        .saturating_sub(2)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_side() {
        let geometry = FieldGeometry::default();
        assert_eq!(geometry.side(), 1160.0);
        assert!(FieldGeometry::new(0.0, 10.0).is_err());
        assert!(FieldGeometry::new(100.0, -1.0).is_err());
    }

    #[test]
    fn test_reference_sweep_values() {
        let sweep = JumpRangeSweep::default();
        let values: Vec<f64> = sweep.values().collect();
        assert_eq!(values[0], 6.8);
        assert!(values.iter().all(|v| *v < 75.0));
        // (75 - 6.8) / 0.05 = 1364 steps
        assert_eq!(values.len(), 1364);
        assert!((values[1363] - 74.95).abs() < 1e-9);
    }

    #[test]
    fn test_problems_are_contiguous_with_trials() {
        let sweep = JumpRangeSweep {
            start: 10.0,
            end: 11.0,
            step: 0.5,
            trials: 3,
        };
        let problems: Vec<Problem> = sweep.problems(0.01, 50).collect();
        assert_eq!(problems.len(), 6);
        for (i, p) in problems.iter().enumerate() {
            assert_eq!(p.id, i as u64);
            assert_eq!(p.max_hop, 50);
            assert_eq!(p.density, 0.01);
        }
        assert_eq!(problems[2].jump_range, 10.0);
        assert_eq!(problems[3].jump_range, 10.5);
    }

    #[test]
    fn test_validation() {
        assert!(SweepConfig::default().validate().is_ok());

        let config = SweepConfig {
            density: -0.1,
            ..SweepConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidDensity(-0.1)));

        let config = SweepConfig {
            max_hop: 0,
            ..SweepConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxHop));

        let config = SweepConfig {
            workers: Some(0),
            ..SweepConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWorkers));

        let mut config = SweepConfig::default();
        config.sweep.step = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSweep { .. })
        ));

        config.sweep.step = 0.05;
        config.sweep.trials = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTrials));
    }

    #[test]
    fn test_default_worker_count_floor() {
        assert!(default_worker_count() >= 1);
    }
}
