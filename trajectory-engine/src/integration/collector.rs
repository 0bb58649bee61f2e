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
//! Trajectory collection
//!
//! A run offers the initial state and then the state after every executed
//! step. [`SnapshotPolicy::All`] keeps all of them, so entry `k` of the
//! trajectory is the state after `k` steps. [`SnapshotPolicy::Steps`]
//! addresses executed steps only: index `k` selects the state right after
//! step `k` (0-based) has run, so `steps - 1` selects the final state.
//! Snapshots are cloned at collection time, so later updates to the live
//! position array never reach them.

use crate::error::{IntegrationError, Result};
use crate::state::{ParticleArray, Vec2};
use std::collections::{BTreeSet, HashMap};

/// Ordered list of executed steps whose resulting state is retained
///
/// Order and duplicates are preserved: the collected trajectory has one
/// snapshot per requested index, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepIndexSet {
    indices: Vec<usize>,
}

impl StepIndexSet {
    /// Wrap an explicit list of indices
    pub fn new(indices: Vec<usize>) -> Self {
        StepIndexSet { indices }
    }

    /// Every `stride`-th step in `[0, steps)`
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero
    pub fn every(stride: usize, steps: usize) -> Self {
        assert!(stride > 0, "Stride must be positive");
        StepIndexSet::new((0..steps).step_by(stride).collect())
    }

    /// Requested indices in request order
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of requested snapshots
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when nothing is requested
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Check that every index lies in `[0, steps)`
    pub fn validate(&self, steps: usize) -> Result<()> {
        match self.indices.iter().find(|&&i| i >= steps) {
            Some(&index) => Err(IntegrationError::invalid(
                "time_points",
                index,
                "step index must lie in [0, steps)",
            )),
            None => Ok(()),
        }
    }
}

impl From<Vec<usize>> for StepIndexSet {
    fn from(indices: Vec<usize>) -> Self {
        StepIndexSet::new(indices)
    }
}

impl FromIterator<usize> for StepIndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        StepIndexSet::new(iter.into_iter().collect())
    }
}

/// Which trajectory entries a run retains
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SnapshotPolicy {
    /// The initial state and the state after every step
    #[default]
    All,
    /// Only the states after the listed 0-based steps
    Steps(StepIndexSet),
}

impl SnapshotPolicy {
    /// Validate the policy for a run of `steps` steps
    pub fn validate(&self, steps: usize) -> Result<()> {
        match self {
            SnapshotPolicy::All => Ok(()),
            SnapshotPolicy::Steps(set) => set.validate(steps),
        }
    }
}

/// Ordered sequence of retained position snapshots
///
/// Immutable once returned by an integrator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    snapshots: Vec<ParticleArray>,
}

impl Trajectory {
    /// Number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when no snapshot was retained
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot at `index`
    pub fn get(&self, index: usize) -> Option<&ParticleArray> {
        self.snapshots.get(index)
    }

    /// First snapshot
    pub fn first(&self) -> Option<&ParticleArray> {
        self.snapshots.first()
    }

    /// Last snapshot
    pub fn last(&self) -> Option<&ParticleArray> {
        self.snapshots.last()
    }

    /// Iterate over snapshots in order
    pub fn iter(&self) -> std::slice::Iter<'_, ParticleArray> {
        self.snapshots.iter()
    }

    /// Snapshots as a slice
    pub fn as_slice(&self) -> &[ParticleArray] {
        &self.snapshots
    }

    /// Path of one particle across all snapshots
    ///
    /// Snapshots that do not contain `particle` are skipped.
    pub fn particle_path(&self, particle: usize) -> Vec<Vec2> {
        self.snapshots
            .iter()
            .filter_map(|s| s.as_slice().get(particle).copied())
            .collect()
    }

    /// Unwrap into the underlying snapshots
    pub fn into_inner(self) -> Vec<ParticleArray> {
        self.snapshots
    }
}

impl std::ops::Index<usize> for Trajectory {
    type Output = ParticleArray;

    fn index(&self, index: usize) -> &ParticleArray {
        &self.snapshots[index]
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a ParticleArray;
    type IntoIter = std::slice::Iter<'a, ParticleArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

/// Accumulates snapshots for one run according to a [`SnapshotPolicy`]
///
/// The initial state comes first, then steps in increasing order. States
/// the policy does not ask for are never cloned.
#[derive(Debug)]
pub struct TrajectoryCollector {
    policy: SnapshotPolicy,
    all: Vec<ParticleArray>,
    wanted: BTreeSet<usize>,
    taken: HashMap<usize, ParticleArray>,
}

impl TrajectoryCollector {
    /// Collector for `policy`, sized for a run of `steps` steps
    pub fn new(policy: SnapshotPolicy, steps: usize) -> Self {
        let (all, wanted) = match &policy {
            SnapshotPolicy::All => (Vec::with_capacity(steps + 1), BTreeSet::new()),
            SnapshotPolicy::Steps(set) => (Vec::new(), set.indices().iter().copied().collect()),
        };
        TrajectoryCollector {
            policy,
            all,
            wanted,
            taken: HashMap::new(),
        }
    }

    /// Whether the state after step `step` (0-based) will be retained
    pub fn wants(&self, step: usize) -> bool {
        match self.policy {
            SnapshotPolicy::All => true,
            SnapshotPolicy::Steps(_) => self.wanted.contains(&step),
        }
    }

    /// Offer the state before the first step
    ///
    /// Only [`SnapshotPolicy::All`] keeps it.
    pub fn record_initial(&mut self, positions: &ParticleArray) {
        if let SnapshotPolicy::All = self.policy {
            self.all.push(positions.clone());
        }
    }

    /// Offer the state right after step `step` (0-based) has executed
    pub fn record_step(&mut self, step: usize, positions: &ParticleArray) {
        match self.policy {
            SnapshotPolicy::All => self.all.push(positions.clone()),
            SnapshotPolicy::Steps(_) => {
                if self.wanted.contains(&step) {
                    self.taken.insert(step, positions.clone());
                }
            }
        }
    }

    /// Finish the run and build the trajectory
    ///
    /// Requested steps that were never executed (because the run stopped
    /// early) are dropped, so the trajectory is truncated rather than
    /// failing.
    pub fn finish(self) -> Trajectory {
        let snapshots = match self.policy {
            SnapshotPolicy::All => self.all,
            SnapshotPolicy::Steps(set) => {
                let snapshots: Vec<ParticleArray> = set
                    .indices()
                    .iter()
                    .filter_map(|i| self.taken.get(i).cloned())
                    .collect();
                let dropped = set.len() - snapshots.len();
                if dropped > 0 {
                    log::warn!(
                        "{} requested snapshot(s) beyond the executed steps were dropped",
                        dropped
                    );
                }
                snapshots
            }
        };
        Trajectory { snapshots }
    }
}
