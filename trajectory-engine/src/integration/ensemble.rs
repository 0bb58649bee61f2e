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
//! Independent runs over many ensembles
//!
//! Each ensemble run owns its arrays and shares nothing with the others, so
//! runs are distributed across Rayon's thread pool when the `parallel`
//! feature is enabled. A single run is never split: the acceleration field
//! may couple every particle of an ensemble and is evaluated as one unit.

use super::{IntegrationRun, Integrator};
use crate::error::Result;
use crate::state::ParticleState;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Integrate every state in `states` for `steps` steps
///
/// Results are returned in input order. A failing run does not affect the
/// others.
///
/// # Example
///
/// ```
/// use trajectory_engine::integration::{run_ensemble, VelocityVerletIntegrator};
/// use trajectory_engine::state::{ParticleArray, ParticleState};
///
/// let integrator = VelocityVerletIntegrator::new(0.01).unwrap();
/// let states: Vec<ParticleState> = (0..4)
///     .map(|i| ParticleState::at_rest(ParticleArray::from_rows(&[[i as f64, 10.0]])))
///     .collect();
/// let runs = run_ensemble(&integrator, states, 10);
/// assert_eq!(runs.len(), 4);
/// ```
pub fn run_ensemble<I>(integrator: &I, states: Vec<ParticleState>, steps: usize) -> Vec<Result<IntegrationRun>>
where
    I: Integrator + ?Sized,
{
    log::debug!(
        "{}: running {} independent ensemble(s) for {} steps",
        integrator.name(),
        states.len(),
        steps
    );

    #[cfg(feature = "parallel")]
    {
        states
            .into_par_iter()
            .map(|state| integrator.integrate(state, steps))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        states
            .into_iter()
            .map(|state| integrator.integrate(state, steps))
            .collect()
    }
}
