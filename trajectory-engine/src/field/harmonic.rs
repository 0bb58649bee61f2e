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
//! Harmonic restoring field
//!
//! Each particle is tied to a common anchor point by an isotropic spring:
//!
//! **a = -k (x - c) / m**
//!
//! Particles do not interact with each other. With unit masses the motion
//! along each axis is a simple harmonic oscillation with angular frequency
//! `sqrt(k)`, which makes the field a convenient conservative test case.

use super::AccelerationField;
use crate::error::{IntegrationError, Result};
use crate::state::{MassVector, ParticleArray, Vec2};

/// Isotropic spring pulling every particle toward a fixed anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicField {
    stiffness: f64,
    center: Vec2,
}

impl HarmonicField {
    /// Spring of stiffness `stiffness` anchored at the origin
    ///
    /// # Panics
    ///
    /// Panics if `stiffness` is negative or not finite
    pub fn new(stiffness: f64) -> Self {
        assert!(
            stiffness >= 0.0 && stiffness.is_finite(),
            "Stiffness must be non-negative and finite"
        );
        HarmonicField {
            stiffness,
            center: Vec2::zero(),
        }
    }

    /// Fallible constructor with an explicit anchor point
    pub fn try_with_center(stiffness: f64, center: Vec2) -> Result<Self> {
        if !(stiffness >= 0.0 && stiffness.is_finite()) {
            return Err(IntegrationError::invalid(
                "stiffness",
                stiffness,
                "must be non-negative and finite",
            ));
        }
        if !center.is_valid() {
            return Err(IntegrationError::invalid(
                "center",
                format!("{:?}", center.as_array()),
                "must be finite",
            ));
        }
        Ok(HarmonicField { stiffness, center })
    }

    /// Spring constant
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Anchor point
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Angular frequency for a particle of mass `mass`
    pub fn angular_frequency(&self, mass: f64) -> f64 {
        (self.stiffness / mass).sqrt()
    }
}

impl AccelerationField for HarmonicField {
    fn evaluate(&self, positions: &ParticleArray, masses: Option<&MassVector>) -> ParticleArray {
        positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let d = *p - self.center;
                let (mx, my) = masses.map_or((1.0, 1.0), |m| (m.mass(i, 0), m.mass(i, 1)));
                Vec2::new(-self.stiffness * d.x() / mx, -self.stiffness * d.y() / my)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "harmonic"
    }

    /// U = Σ ½·k·|x - c|²
    fn potential_energy(&self, positions: &ParticleArray, _masses: Option<&MassVector>) -> Option<f64> {
        let energy = positions
            .iter()
            .map(|p| 0.5 * self.stiffness * (*p - self.center).norm_squared())
            .sum();
        Some(energy)
    }
}
