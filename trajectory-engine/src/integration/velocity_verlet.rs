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
//! Velocity Verlet for particle ensembles
//!
//! Positions and velocities advance together. Each step reuses the
//! acceleration left over from the previous one, so the field is called
//! once per step plus once up front:
//!
//! ```text
//! x' = x + v*dt + a*dt²/2
//! a' = field(x')
//! v' = v + (a + a')*dt/2
//! ```
//!
//! Every step is recorded, so a run of `n` steps yields `n + 1` position
//! snapshots. Unlike the position form, the velocities in the final state
//! come straight from the update rather than from a finite difference.

use super::collector::{SnapshotPolicy, TrajectoryCollector};
use super::{
    validate_masses, validate_steps, validate_timestep_value, warn_on_timestep, IntegrationRun,
    Integrator,
};
use crate::error::Result;
use crate::field::{acceleration, AccelerationField, UniformGravity};
use crate::state::{MassVector, ParticleState};

/// Velocity Verlet integrator for particle ensembles
///
/// The integrator takes ownership of the initial state, advances it in
/// place and hands the final state back in the [`IntegrationRun`].
///
/// # Example
///
/// ```
/// use trajectory_engine::integration::{Integrator, VelocityVerletIntegrator};
/// use trajectory_engine::state::{ParticleArray, ParticleState};
///
/// let integrator = VelocityVerletIntegrator::new(0.005).unwrap();
/// assert_eq!(integrator.timestep(), 0.005);
///
/// let state = ParticleState::new(
///     ParticleArray::from_rows(&[[0.0, 10.0], [0.0, 20.0]]),
///     ParticleArray::from_rows(&[[5.0, 0.0], [-5.0, 0.0]]),
/// ).unwrap();
/// let run = integrator.integrate(state, 60).unwrap();
/// assert_eq!(run.trajectory.len(), 61);
/// ```
#[derive(Debug, Clone)]
pub struct VelocityVerletIntegrator<F = UniformGravity> {
    timestep: f64,
    field: F,
    masses: Option<MassVector>,
}

impl VelocityVerletIntegrator<UniformGravity> {
    /// Create a new velocity Verlet integrator under standard gravity
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error if `timestep` is not positive and finite
    pub fn new(timestep: f64) -> Result<Self> {
        Self::with_field(timestep, UniformGravity::default())
    }
}

impl<F: AccelerationField> VelocityVerletIntegrator<F> {
    /// Create a new velocity Verlet integrator driven by `field`
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error if `timestep` is not positive and finite
    pub fn with_field(timestep: f64, field: F) -> Result<Self> {
        validate_timestep_value("dt", timestep)?;
        Ok(VelocityVerletIntegrator {
            timestep,
            field,
            masses: None,
        })
    }

    /// Pass these masses to every field evaluation
    pub fn with_masses(mut self, masses: MassVector) -> Self {
        self.masses = Some(masses);
        self
    }

    /// Acceleration field
    pub fn field(&self) -> &F {
        &self.field
    }

    /// Masses handed to the field, if any
    pub fn masses(&self) -> Option<&MassVector> {
        self.masses.as_ref()
    }
}

impl<F: AccelerationField> Integrator for VelocityVerletIntegrator<F> {
    fn name(&self) -> &str {
        "Velocity Verlet"
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn integrate(&self, state: ParticleState, steps: usize) -> Result<IntegrationRun> {
        let dt = self.timestep;
        let half_dt = 0.5 * dt;
        let half_dt_sq = 0.5 * dt * dt;

        validate_timestep_value("dt", dt)?;
        validate_steps(steps)?;
        validate_masses(self.masses.as_ref(), state.positions())?;
        warn_on_timestep(self);

        log::debug!(
            "{}: {} particles, dt = {}, {} steps",
            self.name(),
            state.len(),
            dt,
            steps
        );

        let (mut positions, mut velocities) = state.into_parts();
        let mut accelerations = acceleration(&positions, self.masses.as_ref(), &self.field)?;

        let mut collector = TrajectoryCollector::new(SnapshotPolicy::All, steps);
        collector.record_initial(&positions);
        let mut warned_invalid = false;

        for step in 0..steps {
            // Drift with the current acceleration
            for ((x, v), a) in positions
                .iter_mut()
                .zip(velocities.iter())
                .zip(accelerations.iter())
            {
                *x += *v * dt + *a * half_dt_sq;
            }

            let new_accelerations = acceleration(&positions, self.masses.as_ref(), &self.field)?;

            // Kick with the mean of old and new accelerations
            for ((v, a_old), a_new) in velocities
                .iter_mut()
                .zip(accelerations.iter())
                .zip(new_accelerations.iter())
            {
                *v += (*a_old + *a_new) * half_dt;
            }

            accelerations = new_accelerations;

            if !warned_invalid && !(positions.is_valid() && velocities.is_valid()) {
                log::warn!("{}: non-finite state after step {}", self.name(), step + 1);
                warned_invalid = true;
            }

            collector.record_step(step, &positions);
        }

        Ok(IntegrationRun {
            trajectory: collector.finish(),
            final_state: ParticleState::new(positions, velocities)?,
            stopped_early_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::HarmonicField;
    use crate::state::{ParticleArray, Vec2};

    fn single(x: f64, y: f64, vx: f64, vy: f64) -> ParticleState {
        ParticleState::new(
            ParticleArray::from_rows(&[[x, y]]),
            ParticleArray::from_rows(&[[vx, vy]]),
        )
        .unwrap()
    }

    #[test]
    fn test_verlet_creation() {
        let integrator = VelocityVerletIntegrator::new(0.01).unwrap();
        assert_eq!(integrator.timestep(), 0.01);
        assert_eq!(integrator.name(), "Velocity Verlet");
        assert!(integrator.masses().is_none());
    }

    #[test]
    fn test_verlet_invalid_timestep() {
        assert!(VelocityVerletIntegrator::new(0.0).unwrap_err().is_invalid_parameter());
        assert!(VelocityVerletIntegrator::new(-0.01).unwrap_err().is_invalid_parameter());
        assert!(VelocityVerletIntegrator::new(f64::NAN).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_verlet_timestep_validation() {
        let integrator = VelocityVerletIntegrator::new(0.01).unwrap();
        assert!(integrator.validate_timestep().is_ok());

        let small_integrator = VelocityVerletIntegrator::new(1e-10).unwrap();
        assert!(small_integrator.validate_timestep().is_err());

        let large_integrator = VelocityVerletIntegrator::new(2.0).unwrap();
        assert!(large_integrator.validate_timestep().is_err());
    }

    #[test]
    fn test_verlet_zero_steps() {
        let integrator = VelocityVerletIntegrator::new(0.01).unwrap();
        let err = integrator.integrate(single(0.0, 0.0, 0.0, 0.0), 0).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_verlet_free_motion() {
        // No forces: velocity should remain constant
        let integrator = VelocityVerletIntegrator::with_field(0.1, UniformGravity::zero()).unwrap();
        let run = integrator.integrate(single(0.0, 0.0, 1.0, 2.0), 1).unwrap();

        let pos = run.final_state.positions()[0];
        assert!((pos.x() - 0.1).abs() < 1e-10); // x = 0 + 1*0.1
        assert!((pos.y() - 0.2).abs() < 1e-10); // y = 0 + 2*0.1

        let vel = run.final_state.velocities()[0];
        assert_eq!(vel, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_verlet_constant_acceleration() {
        let gravity = UniformGravity::new(10.0).unwrap();
        let integrator = VelocityVerletIntegrator::with_field(0.1, gravity).unwrap();
        let run = integrator.integrate(single(0.0, 0.0, 0.0, 0.0), 1).unwrap();

        // y = 0 + 0*0.1 - 0.5*10*0.01 = -0.05
        let pos = run.final_state.positions()[0];
        assert!((pos.y() + 0.05).abs() < 1e-10);

        // v = 0 - 10*0.1 = -1.0, exact for a constant field
        let vel = run.final_state.velocities()[0];
        assert!((vel.y() + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_trajectory_starts_with_initial_positions() {
        let integrator = VelocityVerletIntegrator::new(0.01).unwrap();
        let run = integrator.integrate(single(0.0, 10.0, 5.0, 0.0), 100).unwrap();
        assert_eq!(run.trajectory.len(), 101);
        assert_eq!(run.trajectory[0][0], Vec2::new(0.0, 10.0));
        assert_eq!(run.trajectory.last(), Some(run.final_state.positions()));
    }

    #[test]
    fn test_one_field_evaluation_per_step() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = AtomicUsize::new(0);
        let field = |p: &ParticleArray, _: Option<&MassVector>| {
            calls.fetch_add(1, Ordering::Relaxed);
            ParticleArray::zeros(p.len())
        };
        let integrator = VelocityVerletIntegrator::with_field(0.01, &field).unwrap();
        integrator.integrate(single(0.0, 0.0, 1.0, 0.0), 10).unwrap();
        // One evaluation to seed a(0), then one per step.
        assert_eq!(calls.load(Ordering::Relaxed), 11);
    }

    #[test]
    fn test_masses_reach_the_field() {
        let field = HarmonicField::new(4.0);
        let integrator = VelocityVerletIntegrator::with_field(0.001, field)
            .unwrap()
            .with_masses(MassVector::per_particle(vec![4.0]));
        let run = integrator.integrate(single(1.0, 0.0, 0.0, 0.0), 1).unwrap();
        // a = -k x / m = -1, so x ≈ 1 - 0.5 * 1e-6
        let x = run.final_state.positions()[0].x();
        assert!((x - (1.0 - 0.5e-6)).abs() < 1e-12);
    }
}
