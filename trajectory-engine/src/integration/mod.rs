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
//! Explicit time-stepping integrators
//!
//! Two second-order schemes advance an ensemble of particles through a
//! prescribed [`AccelerationField`]:
//!
//! - **Position (Störmer) Verlet**: carries the current and previous
//!   positions and never stores velocity. Supports fixed sub-stepping,
//!   energy-based early termination and selective snapshot collection.
//! - **Velocity Verlet**: carries positions and velocities together and
//!   evaluates the field once per step.
//!
//! # Choosing an Integrator
//!
//! - **Position Verlet**: cheapest per step, time-reversible, but velocity
//!   is only available as a finite difference of positions.
//! - **Velocity Verlet**: same order and cost, with velocities available at
//!   every step. Preferred when energies are needed along the run.
//!
//! # Timestep Guidelines
//!
//! - Too small: Numerical precision issues and wasted computation
//! - Too large: Instability and inaccuracy. Set a `max_dt` on the position
//!   Verlet integrator to split large steps into stable sub-steps.

use crate::error::{IntegrationError, Result};
use crate::field::{AccelerationField, UniformGravity};
use crate::state::{MassVector, ParticleArray, ParticleState};

mod collector;
mod ensemble;
mod options;
mod velocity_verlet;
mod verlet;

pub use collector::{SnapshotPolicy, StepIndexSet, Trajectory, TrajectoryCollector};
pub use ensemble::run_ensemble;
pub use options::{
    EarlyTermination, SubstepHistory, VelocitySource, VerletOptions, DEFAULT_ACCURACY_THRESHOLD,
    MAX_SUBSTEPS,
};
pub use velocity_verlet::VelocityVerletIntegrator;
pub use verlet::VerletIntegrator;

/// Kinetic-energy proxy used as a convergence signal
///
/// E = ½ Σ |v|², summed over all particles and axes without mass
/// weighting.
pub fn calculate_energy(velocities: &ParticleArray) -> f64 {
    0.5 * velocities.iter().map(|v| v.norm_squared()).sum::<f64>()
}

/// Mass-weighted kinetic energy: KE = ½ Σ m·v²
///
/// Unit masses are assumed when `masses` is `None`. Masses whose leading
/// dimension differs from the particle count give
/// [`IntegrationError::ShapeMismatch`].
pub fn calculate_kinetic_energy(
    velocities: &ParticleArray,
    masses: Option<&MassVector>,
) -> Result<f64> {
    if let Some(m) = masses {
        m.validate_against(velocities)?;
    }
    Ok(velocities
        .iter()
        .enumerate()
        .map(|(i, v)| match masses {
            Some(m) => 0.5 * (m.mass(i, 0) * v.x() * v.x() + m.mass(i, 1) * v.y() * v.y()),
            None => 0.5 * v.norm_squared(),
        })
        .sum())
}

/// Kinetic plus potential energy of a state in `field`
///
/// Masses are checked against the particle count first. Returns
/// `Ok(None)` when the field does not expose a potential.
pub fn total_energy<F>(
    field: &F,
    state: &ParticleState,
    masses: Option<&MassVector>,
) -> Result<Option<f64>>
where
    F: AccelerationField + ?Sized,
{
    if let Some(m) = masses {
        m.validate_against(state.positions())?;
    }
    let Some(potential) = field.potential_energy(state.positions(), masses) else {
        return Ok(None);
    };
    Ok(Some(calculate_kinetic_energy(state.velocities(), masses)? + potential))
}

/// Fractional change |Δ| / |previous| between two energy readings
///
/// Returns `None` when `previous` is zero, since the fractional change is
/// undefined there.
pub fn relative_energy_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some(((current - previous) / previous).abs())
}

/// Outcome of one integration run
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationRun {
    /// Retained position snapshots
    pub trajectory: Trajectory,
    /// State after the last executed step
    pub final_state: ParticleState,
    /// Step (1-based) at which early termination fired, if it did
    pub stopped_early_at: Option<usize>,
}

impl IntegrationRun {
    /// True if the run ended before its nominal step count
    pub fn stopped_early(&self) -> bool {
        self.stopped_early_at.is_some()
    }
}

/// Trait for numerical integration methods
///
/// An integrator owns its timestep and acceleration field. Each call to
/// [`Integrator::integrate`] consumes an initial state and returns the
/// trajectory together with the final state; runs share no mutable state.
pub trait Integrator: Send + Sync {
    /// Get the name of this integrator
    fn name(&self) -> &str;

    /// Get the timestep used by this integrator
    fn timestep(&self) -> f64;

    /// Validate the timestep for stability
    ///
    /// Returns warnings if the timestep might cause numerical issues.
    /// Extremely small timesteps may lead to precision loss, while large
    /// timesteps may cause instability.
    fn validate_timestep(&self) -> std::result::Result<(), String> {
        let dt = self.timestep();

        if dt <= 0.0 || !dt.is_finite() {
            return Err(format!("Invalid timestep: {}. Must be positive and finite.", dt));
        }

        if dt < 1e-9 {
            return Err(format!(
                "Warning: Timestep {} is extremely small and may cause precision loss with f64. \
                Consider using larger timestep or higher precision types.",
                dt
            ));
        }

        if dt > 1.0 {
            return Err(format!(
                "Warning: Timestep {} is large and may cause instability. \
                Consider using smaller timesteps for better accuracy.",
                dt
            ));
        }

        Ok(())
    }

    /// Advance `state` by `steps` timesteps
    ///
    /// # Errors
    ///
    /// [`IntegrationError::InvalidParameter`] for a zero step count or an
    /// invalid configuration, [`IntegrationError::ShapeMismatch`] when
    /// masses or field output disagree with the positions. All checks run
    /// before the first acceleration evaluation.
    fn integrate(&self, state: ParticleState, steps: usize) -> Result<IntegrationRun>;
}

/// Position Verlet run under default gravity
///
/// # Example
///
/// ```
/// use trajectory_engine::integration::{verlet_integration, VerletOptions};
/// use trajectory_engine::state::ParticleArray;
///
/// let positions = ParticleArray::from_rows(&[[6.0, 4.5], [2.7, 6.1]]);
/// let velocities = ParticleArray::from_rows(&[[5.0, 10.0], [5.0, -5.0]]);
/// let run = verlet_integration(positions, velocities, 0.01, 100, VerletOptions::new()).unwrap();
/// assert_eq!(run.trajectory.len(), 101);
/// ```
pub fn verlet_integration(
    positions: ParticleArray,
    velocities: ParticleArray,
    dt: f64,
    steps: usize,
    options: VerletOptions,
) -> Result<IntegrationRun> {
    let state = ParticleState::new(positions, velocities)?;
    VerletIntegrator::new(dt)?
        .with_options(options)
        .integrate(state, steps)
}

/// Velocity Verlet run under default gravity
///
/// Returns `steps + 1` snapshots, starting with the initial positions.
pub fn velocity_verlet(
    positions: ParticleArray,
    velocities: ParticleArray,
    dt: f64,
    steps: usize,
) -> Result<IntegrationRun> {
    let state = ParticleState::new(positions, velocities)?;
    VelocityVerletIntegrator::with_field(dt, UniformGravity::default())?.integrate(state, steps)
}

pub(crate) fn validate_timestep_value(name: &'static str, dt: f64) -> Result<()> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(IntegrationError::invalid(name, dt, "must be positive and finite"))
    }
}

pub(crate) fn validate_steps(steps: usize) -> Result<()> {
    if steps == 0 {
        return Err(IntegrationError::invalid("steps", steps, "must be positive"));
    }
    Ok(())
}

pub(crate) fn validate_masses(masses: Option<&MassVector>, positions: &ParticleArray) -> Result<()> {
    if let Some(masses) = masses {
        masses.validate_against(positions)?;
        if !masses.is_valid() {
            return Err(IntegrationError::invalid(
                "masses",
                format!("{:?}", masses.shape()),
                "every mass must be positive and finite",
            ));
        }
    }
    Ok(())
}

pub(crate) fn warn_on_timestep<I: Integrator + ?Sized>(integrator: &I) {
    if let Err(warning) = integrator.validate_timestep() {
        log::warn!("{}: {}", integrator.name(), warning);
    }
}
