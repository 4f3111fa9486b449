use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Local};

#[derive(Copy, Clone, Eq, PartialEq)]
#[must_use]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Local>,

    /// Exclusive.
    pub end: DateTime<Local>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self { start, end }
    }

    /// Check whether the intervals share at least one instant, counting both edges in.
    ///
    /// Hourly billing windows that merely touch a session still count,
    /// so `10:00..11:00` and `09:00..10:00` do overlap.
    #[must_use]
    pub fn touches(self, other: Self) -> bool {
        (self.start <= other.end) && (self.end >= other.start)
    }
}
