use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

use crate::{core::session::ChargingSession, prelude::*};

/// Selects the sessions of one chip or vehicle within a time range.
#[must_use]
#[derive(Clone, Debug)]
pub struct SessionFilter {
    /// Lowercase needle.
    identifier: String,

    /// Earliest allowed session start, inclusive.
    since: DateTime<Local>,

    /// Latest allowed session end, inclusive.
    until: DateTime<Local>,
}

impl SessionFilter {
    pub fn new(identifier: &str, since: DateTime<Local>, until: DateTime<Local>) -> Self {
        Self { identifier: identifier.to_lowercase(), since, until }
    }

    /// Build the filter from calendar dates, each bound taken at local midnight.
    pub fn from_dates(identifier: &str, since: NaiveDate, until: NaiveDate) -> Result<Self> {
        Ok(Self::new(identifier, local_midnight(since)?, local_midnight(until)?))
    }

    #[must_use]
    pub fn matches(&self, session: &ChargingSession) -> bool {
        session
            .identifier
            .as_deref()
            .is_some_and(|identifier| identifier.to_lowercase().contains(&self.identifier))
            && (session.start >= self.since)
            && (session.end <= self.until)
    }

    /// Keep the matching sessions in their original order.
    pub fn apply<'a>(
        &self,
        sessions: impl IntoIterator<Item = &'a ChargingSession>,
    ) -> Vec<&'a ChargingSession> {
        sessions.into_iter().filter(|session| self.matches(session)).collect()
    }
}

fn local_midnight(date: NaiveDate) -> Result<DateTime<Local>> {
    Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .with_context(|| format!("midnight of {date} does not exist in the local time zone"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::quantity::energy::KilowattHours;

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn session(identifier: Option<&str>, day: u32, start_hour: u32, end_hour: u32) -> ChargingSession {
        ChargingSession::builder()
            .start(at(day, start_hour))
            .end(at(day, end_hour))
            .energy(KilowattHours::from(5.0))
            .maybe_identifier(identifier)
            .build()
    }

    fn january() -> Result<SessionFilter> {
        SessionFilter::from_dates(
            "volvo",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_matches_case_insensitive() -> Result {
        let filter = january()?;
        assert!(filter.matches(&session(Some("VolvoXC40"), 1, 10, 11)));
        assert!(filter.matches(&session(Some("my VOLVO"), 2, 10, 11)));
        assert!(!filter.matches(&session(Some("Tesla"), 2, 10, 11)));
        Ok(())
    }

    #[test]
    fn test_missing_identifier_never_matches() -> Result {
        let filter = SessionFilter::from_dates(
            "",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )?;
        assert!(!filter.matches(&session(None, 2, 10, 11)));
        assert!(filter.matches(&session(Some("anything"), 2, 10, 11)));
        Ok(())
    }

    #[test]
    fn test_date_bounds() -> Result {
        let filter = january()?;
        let boundary = ChargingSession::builder()
            .start(at(1, 0))
            .end(at(31, 0))
            .energy(KilowattHours::from(1.0))
            .identifier("Volvo")
            .build();
        assert!(filter.matches(&boundary));

        // The end date is taken at midnight, so sessions on that day fall outside.
        assert!(!filter.matches(&session(Some("Volvo"), 31, 10, 11)));
        Ok(())
    }

    #[test]
    fn test_apply_stable_and_idempotent() -> Result {
        let filter = january()?;
        let sessions = vec![
            session(Some("Volvo A"), 3, 10, 11),
            session(Some("Tesla"), 2, 10, 11),
            session(Some("volvo B"), 1, 10, 11),
            session(None, 4, 10, 11),
            session(Some("VOLVO C"), 5, 10, 11),
        ];
        let once = filter.apply(&sessions);
        let identifiers: Vec<_> =
            once.iter().map(|session| session.identifier.as_deref().unwrap()).collect();
        assert_eq!(identifiers, ["Volvo A", "volvo B", "VOLVO C"]);

        let twice = filter.apply(once.iter().copied());
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_apply_no_match() -> Result {
        let filter = SessionFilter::from_dates(
            "tesla",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )?;
        assert!(filter.apply(&[session(Some("VolvoXC40"), 1, 10, 11)]).is_empty());
        Ok(())
    }
}
