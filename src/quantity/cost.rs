use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Euros.
pub type Cost = Quantity<0, 0, 1>;

impl Cost {
    /// Round to whole cents the way the exported tables do.
    pub fn round_to_cents(self) -> Self {
        self.round_to(2)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} €", self.0)
    }
}

impl Debug for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}€", self.0)
    }
}
