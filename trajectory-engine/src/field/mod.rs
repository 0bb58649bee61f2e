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
//! Acceleration fields
//!
//! An acceleration field maps the positions of every particle (and,
//! optionally, their masses) to one acceleration per particle. The
//! integrators only ever see this capability, so the default uniform
//! gravity is just one implementation among others.
//!
//! Any closure with the right signature is a field:
//!
//! ```
//! use trajectory_engine::field::{acceleration, AccelerationField};
//! use trajectory_engine::state::{MassVector, ParticleArray, Vec2};
//!
//! let drag_to_origin = |positions: &ParticleArray, _masses: Option<&MassVector>| {
//!     positions.iter().map(|p| -*p).collect::<ParticleArray>()
//! };
//!
//! let positions = ParticleArray::from_rows(&[[1.0, 2.0]]);
//! let acc = acceleration(&positions, None, &drag_to_origin).unwrap();
//! assert_eq!(acc[0], Vec2::new(-1.0, -2.0));
//! ```

use crate::error::{IntegrationError, Result};
use crate::state::{MassVector, ParticleArray};

pub mod gravity;
pub mod harmonic;

pub use gravity::{UniformGravity, STANDARD_GRAVITY};
pub use harmonic::HarmonicField;

/// Capability shared by every acceleration field
///
/// Implementations must be side-effect free: the same positions and masses
/// always produce the same accelerations, and inputs are never mutated.
/// A single evaluation covers the whole ensemble and is never split across
/// threads, since fields are allowed to couple particles.
pub trait AccelerationField: Send + Sync {
    /// Compute one acceleration per particle
    ///
    /// The returned array must have as many rows as `positions`.
    fn evaluate(&self, positions: &ParticleArray, masses: Option<&MassVector>) -> ParticleArray;

    /// Get a descriptive name for this field
    fn name(&self) -> &str {
        "custom"
    }

    /// Potential energy of the configuration, if the field is conservative
    /// and knows its potential
    ///
    /// Implementations return `None` rather than panic when `masses` does
    /// not cover every particle. [`total_energy`](crate::integration::total_energy)
    /// reports that case as a shape mismatch.
    fn potential_energy(&self, _positions: &ParticleArray, _masses: Option<&MassVector>) -> Option<f64> {
        None
    }
}

impl<F> AccelerationField for F
where
    F: Fn(&ParticleArray, Option<&MassVector>) -> ParticleArray + Send + Sync,
{
    fn evaluate(&self, positions: &ParticleArray, masses: Option<&MassVector>) -> ParticleArray {
        self(positions, masses)
    }
}

/// Evaluate `field` after checking shapes
///
/// Masses, when given, are validated against `positions` before the field
/// runs. The field's output is then checked to hold one row per particle.
///
/// # Errors
///
/// [`IntegrationError::ShapeMismatch`] if the masses or the returned
/// accelerations do not match the position array.
pub fn acceleration<F>(
    positions: &ParticleArray,
    masses: Option<&MassVector>,
    field: &F,
) -> Result<ParticleArray>
where
    F: AccelerationField + ?Sized,
{
    if let Some(masses) = masses {
        masses.validate_against(positions)?;
    }

    let accelerations = field.evaluate(positions, masses);
    if accelerations.len() != positions.len() {
        return Err(IntegrationError::ShapeMismatch {
            what: "accelerations",
            expected: positions.shape(),
            found: accelerations.shape(),
        });
    }
    Ok(accelerations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Shape, Vec2};

    #[test]
    fn test_default_field_is_downward_gravity() {
        let positions = ParticleArray::from_rows(&[[6.0, 4.5], [2.7, 6.1]]);
        let acc = acceleration(&positions, None, &UniformGravity::default()).unwrap();
        for a in acc.iter() {
            assert_eq!(a.x(), 0.0);
            assert_eq!(a.y(), -STANDARD_GRAVITY);
        }
    }

    #[test]
    fn test_closure_receives_masses() {
        let field = |positions: &ParticleArray, masses: Option<&MassVector>| {
            let masses = masses.expect("masses should be forwarded");
            (0..positions.len())
                .map(|i| Vec2::new(1.0 / masses.mass(i, 0), 0.0))
                .collect::<ParticleArray>()
        };
        let positions = ParticleArray::zeros(2);
        let masses = MassVector::per_particle(vec![2.0, 4.0]);
        let acc = acceleration(&positions, Some(&masses), &field).unwrap();
        assert_eq!(acc[0].x(), 0.5);
        assert_eq!(acc[1].x(), 0.25);
    }

    #[test]
    fn test_mass_shape_mismatch_fails_before_evaluation() {
        let field = |_: &ParticleArray, _: Option<&MassVector>| -> ParticleArray {
            panic!("field must not run when masses are malformed")
        };
        let positions = ParticleArray::from_rows(&[[0.0, 0.0], [1.0, 1.0]]);
        let masses = MassVector::from_shape(3, 1, vec![1.0, 1.0, 1.0]).unwrap();

        let err = acceleration(&positions, Some(&masses), &field).unwrap_err();
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
    fn test_field_returning_wrong_length_is_rejected() {
        let field = |_: &ParticleArray, _: Option<&MassVector>| ParticleArray::zeros(1);
        let positions = ParticleArray::zeros(3);
        let err = acceleration(&positions, None, &field).unwrap_err();
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let positions = ParticleArray::from_rows(&[[1.0, 2.0]]);
        let before = positions.clone();
        let _ = acceleration(&positions, None, &HarmonicField::new(3.0)).unwrap();
        assert_eq!(positions, before);
    }

    #[test]
    fn test_trait_object_dispatch() {
        let fields: Vec<Box<dyn AccelerationField>> =
            vec![Box::new(UniformGravity::default()), Box::new(HarmonicField::new(1.0))];
        let positions = ParticleArray::from_rows(&[[1.0, 0.0]]);
        let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["uniform_gravity", "harmonic"]);
        for field in &fields {
            assert!(acceleration(&positions, None, field.as_ref()).is_ok());
        }
    }
}
