//! The prediction kernel: an odd-sized square matrix of rationals summing to
//! 1, with a zero center coefficient so the prediction never depends on the
//! pixel being predicted.

use crate::error::KernelError;
use serde::{Deserialize, Serialize};

/// A `side x side` kernel of rational coefficients sharing a common
/// denominator, stored row-major.
///
/// A shared denominator keeps [`crate::predictor::predict`] exact-integer:
/// every coefficient is `numerators[i] / denominator`, so the weighted sum
/// over a neighbourhood is a single integer division away from the rounded
/// prediction, with no floating-point tie-breaking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kernel {
    side: usize,
    denominator: i64,
    numerators: Vec<i64>,
}

impl Kernel {
    /// Builds and validates a kernel. `numerators.len()` must equal `side * side`.
    pub fn new(side: usize, denominator: i64, numerators: Vec<i64>) -> Result<Self, KernelError> {
        let expected = side * side;
        if numerators.len() != expected {
            return Err(KernelError::LengthMismatch { expected, actual: numerators.len() });
        }
        if side % 2 == 0 {
            return Err(KernelError::EvenSide(side));
        }
        if denominator <= 0 {
            return Err(KernelError::NonPositiveDenominator(denominator));
        }
        let center = (side * side) / 2;
        if numerators[center] != 0 {
            return Err(KernelError::NonZeroCenter);
        }
        let sum: i64 = numerators.iter().sum();
        if sum != denominator {
            return Err(KernelError::DoesNotSumToOne { numerator: sum, denominator });
        }
        Ok(Self { side, denominator, numerators })
    }

    /// The default 4-neighbour average: center 0, the four edge-adjacent
    /// cells weighted `1/4` each.
    #[must_use]
    pub fn default_four_neighbour() -> Self {
        #[rustfmt::skip]
        let numerators = vec![
            0, 1, 0,
            1, 0, 1,
            0, 1, 0,
        ];
        Self::new(3, 4, numerators).expect("default kernel is valid by construction")
    }

    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    /// `r = (K-1)/2`.
    #[must_use]
    pub fn radius(&self) -> usize {
        (self.side - 1) / 2
    }

    #[must_use]
    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    #[must_use]
    pub fn numerator_at(&self, row: usize, col: usize) -> i64 {
        self.numerators[row * self.side + col]
    }
}
