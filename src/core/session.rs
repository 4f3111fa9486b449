use std::collections::BTreeMap;

use bon::Builder;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{core::interval::Interval, quantity::energy::KilowattHours};

/// Single charging event as reported by the wallbox.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Builder)]
pub struct ChargingSession {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub energy: KilowattHours,

    /// Chip or vehicle tag, `id_chip_name` in the wallbox export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub identifier: Option<String>,

    /// Remaining export columns, kept as text.
    #[serde(default)]
    #[builder(default)]
    pub extra: BTreeMap<String, String>,
}

impl ChargingSession {
    pub const fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}
