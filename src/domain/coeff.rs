//! Finite betting coefficient.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error returned when a coefficient is NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("coefficient must be finite, got {0}")]
pub struct InvalidCoefficient(pub f64);

/// Betting odds value. Always finite.
///
/// Deserialization goes through [`Coeff::new`], so a table built from
/// decoded input can never hold a NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "f64", into = "f64")]
#[schema(value_type = f64)]
pub struct Coeff(f64);

impl Coeff {
    /// Creates a coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoefficient`] if `value` is NaN or infinite.
    pub fn new(value: f64) -> Result<Self, InvalidCoefficient> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(InvalidCoefficient(value))
        }
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Coeff {
    type Error = InvalidCoefficient;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Coeff> for f64 {
    fn from(coeff: Coeff) -> Self {
        coeff.0
    }
}

impl fmt::Display for Coeff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
