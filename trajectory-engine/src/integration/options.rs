// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Run options for the position Verlet integrator

use super::collector::{SnapshotPolicy, StepIndexSet};
use super::validate_timestep_value;
use crate::error::{IntegrationError, Result};

/// Default fractional energy change below which a run is considered converged
pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 1e-6;

/// Largest number of sub-steps a single step may be split into
pub const MAX_SUBSTEPS: usize = 1_000_000;

/// Velocities fed to the early-termination energy check
///
/// The position Verlet recurrence never updates the velocities it was
/// started with. Checking the supplied velocities therefore compares a
/// constant against itself, which converges on the first step whenever the
/// velocities are non-zero and never when they are all zero.
/// [`VelocitySource::FiniteDifference`] estimates the velocity from the
/// position history instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VelocitySource {
    /// The velocities supplied with the initial state, unchanged
    #[default]
    Supplied,
    /// Backward difference `(x - x_prev) / h` of the position history
    FiniteDifference,
}

/// How position history is carried through sub-steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstepHistory {
    /// The whole run, bootstrap included, uses the sub-step size, so the
    /// two-state history chains exactly across sub-step boundaries.
    #[default]
    Chained,
    /// The bootstrap uses the full step and the previous position is reset
    /// to the new position after every sub-step. This drops the velocity
    /// carried by the history; kept for output compatibility.
    Reseeded,
}

/// Energy-based stopping rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyTermination {
    /// Stop once the fractional energy change between steps falls below this
    pub accuracy_threshold: f64,
    /// Which velocities the energy is computed from
    pub velocity_source: VelocitySource,
}

impl EarlyTermination {
    /// Rule with the given threshold and supplied velocities
    pub fn new(accuracy_threshold: f64) -> Self {
        EarlyTermination {
            accuracy_threshold,
            velocity_source: VelocitySource::Supplied,
        }
    }

    /// Select the velocity source
    pub fn with_velocity_source(mut self, source: VelocitySource) -> Self {
        self.velocity_source = source;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.accuracy_threshold >= 0.0 && self.accuracy_threshold.is_finite()) {
            return Err(IntegrationError::invalid(
                "accuracy_threshold",
                self.accuracy_threshold,
                "must be non-negative and finite",
            ));
        }
        Ok(())
    }
}

impl Default for EarlyTermination {
    fn default() -> Self {
        EarlyTermination::new(DEFAULT_ACCURACY_THRESHOLD)
    }
}

/// Configuration of a position Verlet run
///
/// # Example
///
/// ```
/// use trajectory_engine::integration::{SubstepHistory, VerletOptions};
///
/// let options = VerletOptions::new()
///     .with_checkpoints(vec![0, 50, 99])
///     .with_max_dt(0.005)
///     .with_substep_history(SubstepHistory::Reseeded);
/// assert_eq!(options.max_dt, Some(0.005));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VerletOptions {
    /// Which trajectory entries to retain (default: all)
    pub collect: SnapshotPolicy,
    /// Optional energy-based stopping rule (default: off)
    pub early_termination: Option<EarlyTermination>,
    /// Largest stable step; longer steps are split into equal sub-steps
    pub max_dt: Option<f64>,
    /// History handling across sub-steps
    pub substep_history: SubstepHistory,
}

impl VerletOptions {
    /// Default options: collect every entry, no sub-stepping, no early stop
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain every trajectory entry
    pub fn collect_all(mut self) -> Self {
        self.collect = SnapshotPolicy::All;
        self
    }

    /// Retain only the listed trajectory entries
    pub fn with_checkpoints(mut self, indices: impl Into<StepIndexSet>) -> Self {
        self.collect = SnapshotPolicy::Steps(indices.into());
        self
    }

    /// Enable early termination with the given threshold
    pub fn with_early_termination(mut self, accuracy_threshold: f64) -> Self {
        self.early_termination = Some(EarlyTermination::new(accuracy_threshold));
        self
    }

    /// Enable early termination with a fully specified rule
    pub fn with_early_termination_rule(mut self, rule: EarlyTermination) -> Self {
        self.early_termination = Some(rule);
        self
    }

    /// Split steps longer than `max_dt`
    pub fn with_max_dt(mut self, max_dt: f64) -> Self {
        self.max_dt = Some(max_dt);
        self
    }

    /// Select how history crosses sub-step boundaries
    pub fn with_substep_history(mut self, history: SubstepHistory) -> Self {
        self.substep_history = history;
        self
    }

    /// Number of sub-steps and their size for a step of `dt`
    ///
    /// A split into more than [`MAX_SUBSTEPS`] pieces is rejected.
    pub fn substeps(&self, dt: f64) -> Result<(usize, f64)> {
        match self.max_dt {
            Some(max_dt) if dt > max_dt => {
                let ratio = (dt / max_dt).ceil();
                if !ratio.is_finite() || ratio > MAX_SUBSTEPS as f64 {
                    return Err(IntegrationError::invalid(
                        "max_dt",
                        max_dt.to_string(),
                        "splits each step into too many sub-steps",
                    ));
                }
                let n = ratio as usize;
                Ok((n, dt / n as f64))
            }
            _ => Ok((1, dt)),
        }
    }

    /// Validate the options for a run of `steps` steps of size `dt`
    pub fn validate(&self, dt: f64, steps: usize) -> Result<()> {
        if let Some(max_dt) = self.max_dt {
            validate_timestep_value("max_dt", max_dt)?;
            self.substeps(dt)?;
        }
        if let Some(rule) = &self.early_termination {
            rule.validate()?;
        }
        self.collect.validate(steps)
    }
}
