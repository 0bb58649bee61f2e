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
//! Position (Störmer) Verlet integrator
//!
//! The position form of Verlet integration advances positions from the
//! current and previous positions alone:
//!
//! ```text
//! x(t + h) = 2·x(t) - x(t - h) + a(t)·h²
//! ```
//!
//! Velocity never appears in the recurrence. The history entry one step
//! before the start is bootstrapped from a second-order Taylor expansion:
//!
//! ```text
//! x(-h) = x(0) - v(0)·h + ½·a(0)·h²
//! ```
//!
//! # Sub-stepping
//!
//! With `max_dt` set and `dt > max_dt`, each step is split into
//! `ceil(dt / max_dt)` equal sub-steps. See [`SubstepHistory`] for how the
//! history is carried across them.
//!
//! # Early termination
//!
//! When enabled, the kinetic-energy proxy is evaluated after each full
//! step. If its fractional change from the previous step is below the
//! threshold the run stops; the step that converged is not recorded.
//!
//! # Checkpoints
//!
//! Checkpoint index `k` selects the positions right after step `k`
//! (0-based) has executed. The initial state is only part of the
//! trajectory when every step is collected.
//!
//! # References
//!
//! - Verlet, L. (1967). Computer "Experiments" on Classical Fluids. I. Thermodynamical
//!   Properties of Lennard-Jones Molecules. Physical Review, 159(1), 98-103.
//! - Hairer, E., Lubich, C., & Wanner, G. (2003). Geometric numerical integration
//!   illustrated by the Störmer–Verlet method. Acta Numerica, 12, 399-450.

use super::collector::TrajectoryCollector;
use super::options::{SubstepHistory, VelocitySource, VerletOptions};
use super::{
    calculate_energy, relative_energy_change, validate_masses, validate_steps,
    validate_timestep_value, warn_on_timestep, IntegrationRun, Integrator,
};
use crate::error::Result;
use crate::field::{acceleration, AccelerationField, UniformGravity};
use crate::state::{MassVector, ParticleArray, ParticleState};

/// Position Verlet integrator
///
/// # Example
///
/// ```
/// use trajectory_engine::integration::{Integrator, VerletIntegrator, VerletOptions};
/// use trajectory_engine::state::{ParticleArray, ParticleState};
///
/// let integrator = VerletIntegrator::new(0.01)
///     .unwrap()
///     .with_options(VerletOptions::new().with_checkpoints(vec![0, 50]));
/// let state = ParticleState::at_rest(ParticleArray::from_rows(&[[0.0, 10.0]]));
/// let run = integrator.integrate(state, 100).unwrap();
/// assert_eq!(run.trajectory.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct VerletIntegrator<F = UniformGravity> {
    timestep: f64,
    field: F,
    masses: Option<MassVector>,
    options: VerletOptions,
}

impl VerletIntegrator<UniformGravity> {
    /// Integrator under standard downward gravity
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error if `timestep` is not positive and finite
    pub fn new(timestep: f64) -> Result<Self> {
        Self::with_field(timestep, UniformGravity::default())
    }
}

impl<F: AccelerationField> VerletIntegrator<F> {
    /// Integrator driven by an arbitrary acceleration field
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error if `timestep` is not positive and finite
    pub fn with_field(timestep: f64, field: F) -> Result<Self> {
        validate_timestep_value("dt", timestep)?;
        Ok(VerletIntegrator {
            timestep,
            field,
            masses: None,
            options: VerletOptions::default(),
        })
    }

    /// Pass these masses to every field evaluation
    pub fn with_masses(mut self, masses: MassVector) -> Self {
        self.masses = Some(masses);
        self
    }

    /// Replace the run options
    pub fn with_options(mut self, options: VerletOptions) -> Self {
        self.options = options;
        self
    }

    /// Run options
    pub fn options(&self) -> &VerletOptions {
        &self.options
    }

    /// Acceleration field
    pub fn field(&self) -> &F {
        &self.field
    }

    fn accelerations(&self, positions: &ParticleArray) -> Result<ParticleArray> {
        acceleration(positions, self.masses.as_ref(), &self.field)
    }
}

/// x - v·h + ½·a·h²
fn bootstrap_previous(
    positions: &ParticleArray,
    velocities: &ParticleArray,
    accelerations: &ParticleArray,
    h: f64,
) -> ParticleArray {
    let half_h_sq = 0.5 * h * h;
    positions
        .iter()
        .zip(velocities.iter())
        .zip(accelerations.iter())
        .map(|((x, v), a)| *x - *v * h + *a * half_h_sq)
        .collect()
}

/// 2·x - x_prev + a·h²
fn verlet_step(
    positions: &ParticleArray,
    previous: &ParticleArray,
    accelerations: &ParticleArray,
    h_sq: f64,
) -> ParticleArray {
    positions
        .iter()
        .zip(previous.iter())
        .zip(accelerations.iter())
        .map(|((x, p), a)| *x * 2.0 - *p + *a * h_sq)
        .collect()
}

/// (x - x_prev) / h
fn backward_difference(positions: &ParticleArray, previous: &ParticleArray, h: f64) -> ParticleArray {
    positions
        .iter()
        .zip(previous.iter())
        .map(|(x, p)| (*x - *p) * (1.0 / h))
        .collect()
}

impl<F: AccelerationField> Integrator for VerletIntegrator<F> {
    fn name(&self) -> &str {
        "Position Verlet"
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn integrate(&self, state: ParticleState, steps: usize) -> Result<IntegrationRun> {
        let dt = self.timestep;
        validate_timestep_value("dt", dt)?;
        validate_steps(steps)?;
        self.options.validate(dt, steps)?;
        validate_masses(self.masses.as_ref(), state.positions())?;
        warn_on_timestep(self);

        let (substeps, h) = self.options.substeps(dt)?;
        let h_sq = h * h;
        let reseed = substeps > 1 && self.options.substep_history == SubstepHistory::Reseeded;
        // Reseeded runs bootstrap with the full step, not the sub-step.
        let bootstrap_h = if reseed { dt } else { h };

        log::debug!(
            "{}: {} particles, dt = {}, {} steps, {} sub-step(s) of {}",
            self.name(),
            state.len(),
            dt,
            steps,
            substeps,
            h
        );
        if substeps > 1 {
            log::trace!("splitting dt = {} into {} sub-steps ({:?})", dt, substeps, self.options.substep_history);
        }

        let (mut positions, velocities) = state.into_parts();
        let initial_acc = self.accelerations(&positions)?;
        let mut previous = bootstrap_previous(&positions, &velocities, &initial_acc, bootstrap_h);

        let mut collector = TrajectoryCollector::new(self.options.collect.clone(), steps);
        collector.record_initial(&positions);

        let mut previous_energy = calculate_energy(&velocities);
        let mut stopped_early_at = None;
        let mut warned_invalid = false;

        for step in 0..steps {
            for _ in 0..substeps {
                let acc = self.accelerations(&positions)?;
                let next = verlet_step(&positions, &previous, &acc, h_sq);
                if reseed {
                    previous = next.clone();
                    positions = next;
                } else {
                    previous = std::mem::replace(&mut positions, next);
                }
            }

            if !warned_invalid && !positions.is_valid() {
                log::warn!("{}: non-finite positions after step {}", self.name(), step + 1);
                warned_invalid = true;
            }

            if let Some(rule) = &self.options.early_termination {
                let energy = match rule.velocity_source {
                    VelocitySource::Supplied => calculate_energy(&velocities),
                    VelocitySource::FiniteDifference => {
                        calculate_energy(&backward_difference(&positions, &previous, h))
                    }
                };
                let converged = relative_energy_change(previous_energy, energy)
                    .map_or(false, |change| change < rule.accuracy_threshold);
                if converged {
                    log::info!("early termination at step {}", step + 1);
                    stopped_early_at = Some(step + 1);
                    break;
                }
                previous_energy = energy;
            }

            collector.record_step(step, &positions);
        }

        let final_velocities = backward_difference(&positions, &previous, h);
        Ok(IntegrationRun {
            trajectory: collector.finish(),
            final_state: ParticleState::new(positions, final_velocities)?,
            stopped_early_at,
        })
    }
}
