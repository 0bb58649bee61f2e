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
//! Particle state arrays
//!
//! Positions, velocities and accelerations of an ensemble of N particles
//! are stored as `(N, 2)` arrays of [`Vec2`] rows. The shape of a run's
//! arrays never changes once the run has started.

use crate::error::{IntegrationError, Result};
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

/// Number of spatial axes carried by every particle
pub const DIMENSIONS: usize = 2;

/// Row/column shape of a two-dimensional numeric array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Leading dimension (one row per particle)
    pub rows: usize,
    /// Trailing dimension
    pub cols: usize,
}

impl Shape {
    /// Create a shape from its two dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Shape { rows, cols }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

/// 2D vector with double-precision components
///
/// # Examples
///
/// ```
/// use trajectory_engine::state::Vec2;
///
/// let v = Vec2::new(3.0, 4.0);
/// assert_eq!(v.magnitude(), 5.0);
/// assert_eq!((v * 2.0).y(), 8.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    x: f64,
    y: f64,
}

impl Vec2 {
    /// Create a vector from its components
    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// The zero vector
    pub fn zero() -> Self {
        Vec2::new(0.0, 0.0)
    }

    /// Horizontal component
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical component
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Set the horizontal component
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    /// Set the vertical component
    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    /// Component along `axis` (0 = x, 1 = y)
    ///
    /// # Panics
    ///
    /// Panics if `axis` is not 0 or 1
    pub fn component(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => panic!("axis {} out of range for a 2D vector", axis),
        }
    }

    /// Squared Euclidean norm
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Check if both components are finite (not NaN or infinite)
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Get the vector as an array
    pub fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Create a vector from an array
    pub fn from_array(arr: [f64; 2]) -> Self {
        Vec2::new(arr[0], arr[1])
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// Owned `(N, 2)` array holding one [`Vec2`] row per particle
///
/// Used for positions, velocities and accelerations alike. Cloning an
/// array produces an independent snapshot; nothing is shared between
/// clones.
///
/// # Examples
///
/// ```
/// use trajectory_engine::state::{ParticleArray, Shape};
///
/// let positions = ParticleArray::from_rows(&[[6.0, 4.5], [2.7, 6.1]]);
/// assert_eq!(positions.shape(), Shape::new(2, 2));
/// assert_eq!(positions[1].x(), 2.7);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleArray {
    rows: Vec<Vec2>,
}

impl ParticleArray {
    /// Wrap a vector of rows
    pub fn new(rows: Vec<Vec2>) -> Self {
        ParticleArray { rows }
    }

    /// Build an array from raw `[x, y]` rows
    pub fn from_rows(rows: &[[f64; 2]]) -> Self {
        ParticleArray::new(rows.iter().copied().map(Vec2::from_array).collect())
    }

    /// Array of `n` zero rows
    pub fn zeros(n: usize) -> Self {
        ParticleArray::new(vec![Vec2::zero(); n])
    }

    /// Number of particles (rows)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the array holds no particles
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Shape of the array, always `(N, 2)`
    pub fn shape(&self) -> Shape {
        Shape::new(self.rows.len(), DIMENSIONS)
    }

    /// Iterate over rows
    pub fn iter(&self) -> std::slice::Iter<'_, Vec2> {
        self.rows.iter()
    }

    /// Iterate mutably over rows
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Vec2> {
        self.rows.iter_mut()
    }

    /// Rows as a slice
    pub fn as_slice(&self) -> &[Vec2] {
        &self.rows
    }

    /// Rows as raw `[x, y]` arrays
    pub fn to_rows(&self) -> Vec<[f64; 2]> {
        self.rows.iter().map(Vec2::as_array).collect()
    }

    /// Check that every component is finite
    pub fn is_valid(&self) -> bool {
        self.rows.iter().all(Vec2::is_valid)
    }

    /// Largest per-row Euclidean distance to `other`
    ///
    /// Returns `f64::INFINITY` if the arrays differ in length.
    pub fn max_distance(&self, other: &ParticleArray) -> f64 {
        if self.len() != other.len() {
            return f64::INFINITY;
        }
        self.rows
            .iter()
            .zip(other.rows.iter())
            .map(|(a, b)| (*a - *b).magnitude())
            .fold(0.0, f64::max)
    }

    /// Unwrap into the underlying rows
    pub fn into_inner(self) -> Vec<Vec2> {
        self.rows
    }
}

impl Index<usize> for ParticleArray {
    type Output = Vec2;

    fn index(&self, index: usize) -> &Vec2 {
        &self.rows[index]
    }
}

impl IndexMut<usize> for ParticleArray {
    fn index_mut(&mut self, index: usize) -> &mut Vec2 {
        &mut self.rows[index]
    }
}

impl From<Vec<Vec2>> for ParticleArray {
    fn from(rows: Vec<Vec2>) -> Self {
        ParticleArray::new(rows)
    }
}

impl FromIterator<Vec2> for ParticleArray {
    fn from_iter<I: IntoIterator<Item = Vec2>>(iter: I) -> Self {
        ParticleArray::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ParticleArray {
    type Item = &'a Vec2;
    type IntoIter = std::slice::Iter<'a, Vec2>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Per-particle masses
///
/// Either one scalar per particle (shape `(N, 1)`) or one value per particle
/// and axis (shape `(N, 2)`). A mass vector is compatible with a position
/// array when its leading dimension equals the number of particles.
#[derive(Debug, Clone, PartialEq)]
pub struct MassVector {
    values: Vec<f64>,
    shape: Shape,
}

impl MassVector {
    /// One scalar mass per particle
    pub fn per_particle(values: Vec<f64>) -> Self {
        let shape = Shape::new(values.len(), 1);
        MassVector { values, shape }
    }

    /// One mass per particle and axis
    pub fn per_axis(values: &[[f64; 2]]) -> Self {
        let shape = Shape::new(values.len(), DIMENSIONS);
        MassVector {
            values: values.iter().flat_map(|row| row.iter().copied()).collect(),
            shape,
        }
    }

    /// Build a mass vector from row-major data and an explicit shape
    ///
    /// Fails with a shape mismatch if `cols` is neither 1 nor 2 or if the
    /// data length disagrees with `rows * cols`.
    pub fn from_shape(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self> {
        if cols != 1 && cols != DIMENSIONS {
            return Err(IntegrationError::ShapeMismatch {
                what: "mass columns",
                expected: Shape::new(rows, DIMENSIONS),
                found: Shape::new(rows, cols),
            });
        }
        if values.len() != rows * cols {
            return Err(IntegrationError::ShapeMismatch {
                what: "mass data",
                expected: Shape::new(rows, cols),
                found: Shape::new(values.len(), 1),
            });
        }
        Ok(MassVector {
            values,
            shape: Shape::new(rows, cols),
        })
    }

    /// Shape of the mass array
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of particles covered
    pub fn len(&self) -> usize {
        self.shape.rows
    }

    /// True when no particle is covered
    pub fn is_empty(&self) -> bool {
        self.shape.rows == 0
    }

    /// Mass of particle `index` along `axis`, broadcasting `(N, 1)` masses
    pub fn mass(&self, index: usize, axis: usize) -> f64 {
        if self.shape.cols == 1 {
            self.values[index]
        } else {
            self.values[index * self.shape.cols + axis]
        }
    }

    /// Check the mass array against a position array
    pub fn validate_against(&self, positions: &ParticleArray) -> Result<()> {
        if self.shape.rows != positions.len() {
            return Err(IntegrationError::ShapeMismatch {
                what: "masses",
                expected: positions.shape(),
                found: self.shape,
            });
        }
        Ok(())
    }

    /// Check that every mass is finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.values.iter().all(|m| m.is_finite() && *m > 0.0)
    }
}

/// Positions and velocities of one ensemble
///
/// Integrators take a state by value and hand back the final state, so the
/// caller never observes arrays being mutated behind its back.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    positions: ParticleArray,
    velocities: ParticleArray,
}

impl ParticleState {
    /// Pair positions with velocities
    ///
    /// Fails with a shape mismatch if the arrays differ in length.
    pub fn new(positions: ParticleArray, velocities: ParticleArray) -> Result<Self> {
        if positions.len() != velocities.len() {
            return Err(IntegrationError::ShapeMismatch {
                what: "velocities",
                expected: positions.shape(),
                found: velocities.shape(),
            });
        }
        Ok(ParticleState {
            positions,
            velocities,
        })
    }

    /// Particles at rest at the given positions
    pub fn at_rest(positions: ParticleArray) -> Self {
        let velocities = ParticleArray::zeros(positions.len());
        ParticleState {
            positions,
            velocities,
        }
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when the ensemble is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Current positions
    pub fn positions(&self) -> &ParticleArray {
        &self.positions
    }

    /// Current velocities
    pub fn velocities(&self) -> &ParticleArray {
        &self.velocities
    }

    /// Split into `(positions, velocities)`
    pub fn into_parts(self) -> (ParticleArray, ParticleArray) {
        (self.positions, self.velocities)
    }
}
