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
//! Error types for trajectory integration
//!
//! Both failure kinds are programmer errors: they are raised before any
//! numeric work is done and are never retried.

use crate::state::Shape;
use thiserror::Error;

/// Errors produced by acceleration evaluation and the integrators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// A scalar run parameter (timestep, step count, threshold...) is out of range
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
        /// Offending value, rendered for display
        value: String,
        /// Constraint that was violated
        reason: &'static str,
    },

    /// Two arrays that must agree in shape do not
    #[error("shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Which array was rejected
        what: &'static str,
        /// Shape required by the position array
        expected: Shape,
        /// Shape actually supplied
        found: Shape,
    },
}

impl IntegrationError {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: &'static str) -> Self {
        IntegrationError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// True for [`IntegrationError::InvalidParameter`]
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, IntegrationError::InvalidParameter { .. })
    }

    /// True for [`IntegrationError::ShapeMismatch`]
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, IntegrationError::ShapeMismatch { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, IntegrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = IntegrationError::invalid("dt", -0.5, "must be positive and finite");
        assert!(err.is_invalid_parameter());
        assert_eq!(
            err.to_string(),
            "invalid parameter `dt` = -0.5: must be positive and finite"
        );
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = IntegrationError::ShapeMismatch {
            what: "masses",
            expected: Shape::new(2, 2),
            found: Shape::new(3, 1),
        };
        assert!(err.is_shape_mismatch());
        assert_eq!(
            err.to_string(),
            "shape mismatch for masses: expected (2, 2), found (3, 1)"
        );
    }
}
