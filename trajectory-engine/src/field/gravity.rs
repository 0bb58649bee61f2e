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
//! Uniform gravitational field
//!
//! Every particle accelerates downward along the vertical (second) axis
//! with the same magnitude, independent of its mass. The horizontal axis
//! is left untouched.
//!
//! The gravity magnitude lives in exactly one place: the field value the
//! integrator is constructed with. [`STANDARD_GRAVITY`] is only the
//! default for that value.

use super::AccelerationField;
use crate::error::{IntegrationError, Result};
use crate::state::{MassVector, ParticleArray, Vec2};

/// Standard gravitational acceleration near the Earth's surface (m/s²)
///
/// Stored as a magnitude; the field applies it as `-g` on the vertical axis.
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Constant downward acceleration along the vertical axis
///
/// # Example
///
/// ```rust
/// use trajectory_engine::field::{AccelerationField, UniformGravity};
/// use trajectory_engine::state::ParticleArray;
///
/// let moon = UniformGravity::new(1.62).unwrap();
/// let acc = moon.evaluate(&ParticleArray::zeros(1), None);
/// assert_eq!(acc[0].y(), -1.62);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformGravity {
    g: f64,
}

impl UniformGravity {
    /// Create a field with the given gravity magnitude
    ///
    /// A magnitude of zero gives a force-free field. Negative magnitudes
    /// point the field upward.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::InvalidParameter`] if `g` is not finite.
    pub fn new(g: f64) -> Result<Self> {
        if !g.is_finite() {
            return Err(IntegrationError::invalid("g", g, "must be finite"));
        }
        Ok(UniformGravity { g })
    }

    /// Field with no acceleration at all
    pub fn zero() -> Self {
        UniformGravity { g: 0.0 }
    }

    /// Gravity magnitude
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Acceleration vector applied to every particle
    pub fn vector(&self) -> Vec2 {
        Vec2::new(0.0, -self.g)
    }
}

impl Default for UniformGravity {
    fn default() -> Self {
        UniformGravity { g: STANDARD_GRAVITY }
    }
}

impl AccelerationField for UniformGravity {
    fn evaluate(&self, positions: &ParticleArray, _masses: Option<&MassVector>) -> ParticleArray {
        let acc = self.vector();
        positions.iter().map(|_| acc).collect()
    }

    fn name(&self) -> &str {
        "uniform_gravity"
    }

    /// U = Σ m·g·y, with unit masses when none are given
    fn potential_energy(&self, positions: &ParticleArray, masses: Option<&MassVector>) -> Option<f64> {
        if let Some(m) = masses {
            m.validate_against(positions).ok()?;
        }
        let energy = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let m = masses.map_or(1.0, |m| m.mass(i, 1));
                m * self.g * p.y()
            })
            .sum();
        Some(energy)
    }
}
