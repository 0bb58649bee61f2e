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
//! Two particles under gravity
//!
//! Runs both integrators from the same initial conditions and prints the
//! final positions plus a few checkpoints of the position Verlet run.

use trajectory_engine::integration::{
    velocity_verlet, verlet_integration, StepIndexSet, VerletOptions,
};
use trajectory_engine::state::ParticleArray;
use trajectory_engine::Result;

fn main() -> Result<()> {
    println!("Trajectory Engine - Two Particles");
    println!("=================================\n");

    let positions = ParticleArray::from_rows(&[[6.0, 4.5], [2.7, 6.1]]);
    let velocities = ParticleArray::from_rows(&[[5.0, 10.0], [5.0, -5.0]]);
    let dt = 0.01;
    let steps = 100;

    let options = VerletOptions::new().with_checkpoints(StepIndexSet::every(25, steps));
    let checkpoints = verlet_integration(positions.clone(), velocities.clone(), dt, steps, options)?;

    println!("Position Verlet checkpoints:");
    for (k, snapshot) in checkpoints.trajectory.iter().enumerate() {
        println!("  checkpoint {}: {:?}", k, snapshot.to_rows());
    }

    let run = velocity_verlet(positions, velocities, dt, steps)?;
    println!("\nVelocity Verlet after {} steps:", steps);
    for (i, p) in run.final_state.positions().iter().enumerate() {
        println!("  particle {}: ({:.4}, {:.4})", i + 1, p.x(), p.y());
    }

    Ok(())
}
