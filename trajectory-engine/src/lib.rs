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
//! # Trajectory Engine
//!
//! Discrete-time trajectories of small 2D particle ensembles under a
//! prescribed acceleration field, computed with explicit Verlet-family
//! integrators.
//!
//! ## Features
//!
//! - **Position Verlet**: two-state recurrence with Taylor bootstrap,
//!   fixed sub-stepping and energy-based early termination
//! - **Velocity Verlet**: symplectic position/velocity update with one
//!   field evaluation per step
//! - **Pluggable fields**: uniform gravity, harmonic springs, or any closure
//! - **Selective collection**: keep every snapshot or only chosen steps
//! - **Parallelization**: Optional Rayon integration for independent ensemble runs
//!
//! ## Example
//!
//! ```rust
//! use trajectory_engine::integration::{Integrator, VelocityVerletIntegrator};
//! use trajectory_engine::state::{ParticleArray, ParticleState};
//!
//! let state = ParticleState::new(
//!     ParticleArray::from_rows(&[[0.0, 10.0], [0.0, 20.0]]),
//!     ParticleArray::from_rows(&[[5.0, 0.0], [-5.0, 0.0]]),
//! ).unwrap();
//!
//! let integrator = VelocityVerletIntegrator::new(0.01).unwrap();
//! let run = integrator.integrate(state, 100).unwrap();
//! assert_eq!(run.trajectory.len(), 101);
//! ```

#![warn(missing_docs)]

/// Error taxonomy
pub mod error;

/// Particle state arrays
pub mod state;

/// Acceleration fields
pub mod field;

/// Numerical integration methods
pub mod integration;

pub use error::{IntegrationError, Result};
pub use field::{acceleration, AccelerationField, HarmonicField, UniformGravity};
pub use integration::{
    calculate_energy, velocity_verlet, verlet_integration, IntegrationRun, Integrator, Trajectory,
    VelocityVerletIntegrator, VerletIntegrator, VerletOptions,
};
pub use state::{MassVector, ParticleArray, ParticleState, Vec2};
