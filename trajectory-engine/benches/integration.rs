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
//! Benchmarks comparing integrator performance
//!
//! These benchmarks measure:
//! - Raw throughput for different ensemble sizes
//! - Cost of sub-stepping and selective snapshot collection
//! - Independent ensemble runs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use trajectory_engine::field::HarmonicField;
use trajectory_engine::integration::{
    run_ensemble, Integrator, StepIndexSet, VelocityVerletIntegrator, VerletIntegrator,
    VerletOptions,
};
use trajectory_engine::state::{ParticleArray, ParticleState, Vec2};

// Create an ensemble of displaced oscillators
fn setup_oscillators(particle_count: usize) -> ParticleState {
    // Vary initial displacement slightly to avoid perfect symmetry
    let positions = (0..particle_count)
        .map(|i| Vec2::new(1.0 + (i as f64) * 0.01, 0.5))
        .collect::<ParticleArray>();
    ParticleState::at_rest(positions)
}

fn bench_integrator_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrator_throughput");
    let steps = 100;

    for particle_count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements((*particle_count * steps) as u64));

        group.bench_with_input(
            BenchmarkId::new("position_verlet", particle_count),
            particle_count,
            |b, &particle_count| {
                let integrator = VerletIntegrator::with_field(0.01, HarmonicField::new(100.0)).unwrap();
                let state = setup_oscillators(particle_count);
                b.iter(|| integrator.integrate(black_box(state.clone()), steps).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("velocity_verlet", particle_count),
            particle_count,
            |b, &particle_count| {
                let integrator =
                    VelocityVerletIntegrator::with_field(0.01, HarmonicField::new(100.0)).unwrap();
                let state = setup_oscillators(particle_count);
                b.iter(|| integrator.integrate(black_box(state.clone()), steps).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_verlet_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("verlet_options");
    let steps = 1000;
    let state = setup_oscillators(10);

    group.bench_function("collect_all", |b| {
        let integrator = VerletIntegrator::with_field(0.01, HarmonicField::new(100.0)).unwrap();
        b.iter(|| integrator.integrate(black_box(state.clone()), steps).unwrap());
    });

    group.bench_function("checkpoints", |b| {
        let integrator = VerletIntegrator::with_field(0.01, HarmonicField::new(100.0))
            .unwrap()
            .with_options(VerletOptions::new().with_checkpoints(StepIndexSet::every(100, steps)));
        b.iter(|| integrator.integrate(black_box(state.clone()), steps).unwrap());
    });

    group.bench_function("substeps_4", |b| {
        let integrator = VerletIntegrator::with_field(0.04, HarmonicField::new(100.0))
            .unwrap()
            .with_options(VerletOptions::new().with_max_dt(0.01));
        b.iter(|| integrator.integrate(black_box(state.clone()), steps).unwrap());
    });

    group.finish();
}

fn bench_ensemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("ensemble");
    group.sample_size(20);

    let integrator = VelocityVerletIntegrator::with_field(0.001, HarmonicField::new(100.0)).unwrap();
    let states: Vec<ParticleState> = (0..64).map(|_| setup_oscillators(16)).collect();

    group.bench_function("64_runs", |b| {
        b.iter(|| run_ensemble(&integrator, black_box(states.clone()), 500));
    });

    group.finish();
}

criterion_group!(benches, bench_integrator_throughput, bench_verlet_options, bench_ensemble);
criterion_main!(benches);
