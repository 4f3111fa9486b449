use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::core::{price::PriceTable, session::ChargingSession};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub postal_code: String,
    pub city: String,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            line1: "Unknown".to_owned(),
            postal_code: "00000".to_owned(),
            city: "Unknown".to_owned(),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {} {}", self.line1, self.postal_code, self.city)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub first_name: String,
    pub last_name: String,
}

impl Default for Owner {
    fn default() -> Self {
        Self { first_name: "Unknown".to_owned(), last_name: "Unknown".to_owned() }
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Everything a report needs from the two providers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Session export column keys in their original order.
    #[serde(default)]
    pub columns: Vec<String>,

    pub sessions: Vec<ChargingSession>,
    pub prices: PriceTable,
    pub address: Address,
    pub owner: Owner,
}
