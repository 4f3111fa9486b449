use average::Mean;
use bon::Builder;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{
    core::interval::Interval,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// Hourly price window with the household consumption billed in it.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Builder)]
pub struct PriceInterval {
    pub from: DateTime<Local>,
    pub to: DateTime<Local>,
    pub unit_price: KilowattHourRate,

    #[builder(default)]
    pub consumption: KilowattHours,

    #[builder(default)]
    pub cost: Cost,
}

impl PriceInterval {
    pub const fn interval(&self) -> Interval {
        Interval::new(self.from, self.to)
    }
}

/// Price intervals in the order they were received.
///
/// Neither sorting nor the absence of gaps is assumed.
#[must_use]
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::IntoIterator,
)]
#[serde(transparent)]
pub struct PriceTable(#[into_iterator(owned, ref)] Vec<PriceInterval>);

impl PriceTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Price intervals sharing at least an edge with the given interval.
    pub fn overlapping(&self, interval: Interval) -> impl Iterator<Item = &PriceInterval> {
        self.0.iter().filter(move |price| price.interval().touches(interval))
    }

    /// Unweighted mean unit price across the overlapping intervals.
    ///
    /// Each overlapping hour counts once regardless of how much of it the interval covers.
    /// Returns [`None`] when nothing overlaps.
    pub fn mean_rate(&self, interval: Interval) -> Option<KilowattHourRate> {
        let estimate: Mean = self.overlapping(interval).map(|price| price.unit_price.0).collect();
        if estimate.is_empty() { None } else { Some(estimate.mean().into()) }
    }
}
