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
//! Edge case tests for integrators
//!
//! Tests boundary conditions, invalid parameters and unusual scenarios

use trajectory_engine::field::{acceleration, UniformGravity};
use trajectory_engine::integration::{
    velocity_verlet, verlet_integration, Integrator, StepIndexSet, VelocityVerletIntegrator,
    VerletIntegrator, VerletOptions,
};
use trajectory_engine::state::{MassVector, ParticleArray, ParticleState, Shape};
use trajectory_engine::IntegrationError;

fn pair() -> (ParticleArray, ParticleArray) {
    (
        ParticleArray::from_rows(&[[6.0, 4.5], [2.7, 6.1]]),
        ParticleArray::from_rows(&[[5.0, 10.0], [5.0, -5.0]]),
    )
}

#[test]
fn test_verlet_zero_timestep() {
    let (p, v) = pair();
    let err = verlet_integration(p, v, 0.0, 100, VerletOptions::new()).unwrap_err();
    assert!(err.is_invalid_parameter());
}

#[test]
fn test_verlet_negative_timestep() {
    let (p, v) = pair();
    let err = verlet_integration(p, v, -0.01, 100, VerletOptions::new()).unwrap_err();
    assert!(err.is_invalid_parameter());
}

#[test]
fn test_velocity_verlet_zero_timestep() {
    let (p, v) = pair();
    assert!(velocity_verlet(p, v, 0.0, 100).unwrap_err().is_invalid_parameter());
}

#[test]
fn test_velocity_verlet_negative_timestep() {
    let (p, v) = pair();
    assert!(velocity_verlet(p, v, -0.01, 100).unwrap_err().is_invalid_parameter());
}

#[test]
fn test_zero_steps_rejected() {
    let (p, v) = pair();
    assert!(verlet_integration(p.clone(), v.clone(), 0.01, 0, VerletOptions::new())
        .unwrap_err()
        .is_invalid_parameter());
    assert!(velocity_verlet(p, v, 0.01, 0).unwrap_err().is_invalid_parameter());
}

#[test]
fn test_non_finite_timestep_rejected() {
    for dt in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(VerletIntegrator::new(dt).is_err());
        assert!(VelocityVerletIntegrator::new(dt).is_err());
    }
}

#[test]
fn test_mass_shape_mismatch() {
    let positions = ParticleArray::from_rows(&[[0.0, 0.0], [1.0, 1.0]]);
    let masses = MassVector::from_shape(3, 1, vec![1.0, 2.0, 3.0]).unwrap();

    let err = acceleration(&positions, Some(&masses), &UniformGravity::default()).unwrap_err();
    assert_eq!(
        err,
        IntegrationError::ShapeMismatch {
            what: "masses",
            expected: Shape::new(2, 2),
            found: Shape::new(3, 1),
        }
    );
}

#[test]
fn test_mass_shape_mismatch_propagates_from_integrators() {
    let (p, v) = pair();
    let state = ParticleState::new(p, v).unwrap();
    let masses = MassVector::from_shape(3, 1, vec![1.0; 3]).unwrap();

    let verlet = VerletIntegrator::new(0.01).unwrap().with_masses(masses.clone());
    assert!(verlet.integrate(state.clone(), 10).unwrap_err().is_shape_mismatch());

    let velocity = VelocityVerletIntegrator::new(0.01).unwrap().with_masses(masses);
    assert!(velocity.integrate(state, 10).unwrap_err().is_shape_mismatch());
}

#[test]
fn test_velocity_length_mismatch() {
    let positions = ParticleArray::zeros(2);
    let velocities = ParticleArray::zeros(3);
    assert!(velocity_verlet(positions, velocities, 0.01, 10)
        .unwrap_err()
        .is_shape_mismatch());
}

#[test]
fn test_return_all_counts_initial_state() {
    let (p, v) = pair();
    let run = verlet_integration(p, v, 0.01, 100, VerletOptions::new().collect_all()).unwrap();
    assert_eq!(run.trajectory.len(), 101);
    assert!(run.stopped_early_at.is_none());
}

#[test]
fn test_checkpoints_every_hundred_steps() {
    let (p, v) = pair();
    let steps = 1000;
    let options = VerletOptions::new().with_checkpoints(StepIndexSet::every(100, steps));
    let run = verlet_integration(p.clone(), v.clone(), 0.01, steps, options).unwrap();
    assert_eq!(run.trajectory.len(), 10);
    assert_ne!(run.trajectory[0], p);

    let full = verlet_integration(p, v, 0.01, steps, VerletOptions::new()).unwrap();
    for (i, snapshot) in run.trajectory.iter().enumerate() {
        assert_eq!(snapshot, &full.trajectory[i * 100 + 1]);
    }
}

#[test]
fn test_final_checkpoint_matches_final_state() {
    let (p, v) = pair();
    let options = VerletOptions::new().with_checkpoints(vec![0, 99]);
    let run = verlet_integration(p, v, 0.01, 100, options).unwrap();
    assert_eq!(run.trajectory.len(), 2);
    assert_eq!(&run.trajectory[1], run.final_state.positions());
}

#[test]
fn test_checkpoint_at_step_count_rejected() {
    let (p, v) = pair();
    let options = VerletOptions::new().with_checkpoints(vec![0, 100]);
    let err = verlet_integration(p, v, 0.01, 100, options).unwrap_err();
    assert!(err.is_invalid_parameter());
}

#[test]
fn test_invalid_options_rejected() {
    let (p, v) = pair();
    let bad_threshold = VerletOptions::new().with_early_termination(f64::NAN);
    assert!(verlet_integration(p.clone(), v.clone(), 0.01, 10, bad_threshold).is_err());

    let bad_max_dt = VerletOptions::new().with_max_dt(-0.01);
    assert!(verlet_integration(p.clone(), v.clone(), 0.01, 10, bad_max_dt).is_err());

    let tiny_max_dt = VerletOptions::new().with_max_dt(f64::MIN_POSITIVE);
    let err = verlet_integration(p, v, 0.01, 10, tiny_max_dt).unwrap_err();
    assert!(err.is_invalid_parameter());
}

#[test]
fn test_empty_ensemble() {
    let empty = ParticleState::at_rest(ParticleArray::zeros(0));
    let run = VelocityVerletIntegrator::new(0.01)
        .unwrap()
        .integrate(empty.clone(), 5)
        .unwrap();
    assert_eq!(run.trajectory.len(), 6);
    assert!(run.trajectory.iter().all(ParticleArray::is_empty));

    let run = VerletIntegrator::new(0.01).unwrap().integrate(empty, 5).unwrap();
    assert!(run.final_state.is_empty());
}

#[test]
fn test_large_timestep_still_runs() {
    let integrator = VerletIntegrator::new(2.0).unwrap();
    assert!(integrator.validate_timestep().is_err());

    let run = integrator
        .integrate(ParticleState::at_rest(ParticleArray::zeros(1)), 3)
        .unwrap();
    assert_eq!(run.trajectory.len(), 4);
}

#[test]
fn test_early_termination_with_checkpoints_truncates() {
    let (p, v) = pair();
    let options = VerletOptions::new()
        .with_checkpoints(vec![0, 50, 99])
        .with_early_termination(1e-6);
    let run = verlet_integration(p, v, 0.01, 100, options).unwrap();
    assert_eq!(run.stopped_early_at, Some(1));
    assert!(run.trajectory.is_empty());
}
