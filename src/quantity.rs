pub mod cost;
pub mod energy;
pub mod rate;

use serde::{Deserialize, Serialize};

/// Scalar tagged with its physical dimensions: power, time and money.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::From,
    derive_more::Sum,
)]
#[must_use]
pub struct Quantity<const POWER: isize, const TIME: isize, const COST: isize>(pub f64);

impl<const POWER: isize, const TIME: isize, const COST: isize> Quantity<POWER, TIME, COST> {
    pub const ZERO: Self = Self(0.0);

    /// Round half to even at the given number of decimal places.
    pub fn round_to(self, decimals: i32) -> Self {
        let scale = 10.0_f64.powi(decimals);
        Self((self.0 * scale).round_ties_even() / scale)
    }
}
