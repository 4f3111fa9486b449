pub mod csv;
pub mod pdf;
pub mod xlsx;

use std::{
    fs,
    path::{Path, PathBuf},
};

use bon::Builder;
use chrono::{DateTime, Local, NaiveDate};

use crate::{
    core::{
        billing::{PricedSession, Summary},
        dataset::{Address, Owner},
    },
    prelude::*,
};

/// Session start as printed in the documents.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Footnote for the rows priced at zero for lack of a price window.
pub const UNMATCHED_NOTE: &str = "no matching price window found, priced at zero";

/// Everything the report documents show.
#[derive(Builder)]
pub struct Report<'a> {
    pub sessions: &'a [PricedSession],
    pub summary: Summary,
    pub address: &'a Address,
    pub owner: &'a Owner,
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl Report<'_> {
    /// Label and value pairs of the summary block: the period and the totals, then the parties.
    pub fn summary_fields(&self) -> [(&'static str, String); 6] {
        [
            ("Start Date:", self.since.to_string()),
            ("End Date:", self.until.to_string()),
            ("Total Energy Consumed (kWh):", format!("{:.2} kWh", self.summary.total_energy.0)),
            ("Total Cost (EUR):", format!("{:.2} EUR", self.summary.total_cost.0)),
            ("Address:", self.address.to_string()),
            ("Owner:", self.owner.to_string()),
        ]
    }
}

#[must_use]
pub fn timestamped_name(generated_at: DateTime<Local>, extension: &str) -> String {
    format!("charging_report_{}.{extension}", generated_at.format("%Y%m%d_%H%M%S"))
}

/// Write the document into the directory, named after the current time.
#[instrument(skip(contents), fields(directory = %directory.display()))]
pub fn write_timestamped(directory: &Path, extension: &str, contents: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(directory)
        .with_context(|| format!("failed to create `{}`", directory.display()))?;
    let path = directory.join(timestamped_name(Local::now(), extension));
    fs::write(&path, contents).with_context(|| format!("failed to write `{}`", path.display()))?;
    info!(path = %path.display(), "written");
    Ok(path)
}

#[cfg(test)]
pub mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::{
        core::{
            billing::{Summation, price_sessions, summarize},
            price::{PriceInterval, PriceTable},
            session::ChargingSession,
        },
        quantity::{energy::KilowattHours, rate::KilowattHourRate},
    };

    pub fn priced_sessions() -> Vec<PricedSession> {
        let start = Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let prices = PriceTable::from(vec![
            PriceInterval::builder()
                .from(start)
                .to(start + TimeDelta::hours(1))
                .unit_price(KilowattHourRate::from(0.30))
                .build(),
            PriceInterval::builder()
                .from(start + TimeDelta::hours(1))
                .to(start + TimeDelta::hours(2))
                .unit_price(KilowattHourRate::from(0.40))
                .build(),
        ]);
        let sessions = [
            ChargingSession::builder()
                .start(start)
                .end(start + TimeDelta::minutes(90))
                .energy(KilowattHours::from(10.0))
                .identifier("VolvoXC40")
                .extra([("charger".to_owned(), "Garage, left".to_owned())].into())
                .build(),
            ChargingSession::builder()
                .start(start + TimeDelta::days(1))
                .end(start + TimeDelta::days(1) + TimeDelta::hours(1))
                .energy(KilowattHours::from(2.5))
                .identifier("VolvoXC40")
                .build(),
        ];
        price_sessions(&prices, &sessions)
    }

    pub fn address() -> Address {
        Address {
            line1: "Main Street 1".to_owned(),
            postal_code: "12345".to_owned(),
            city: "Springfield".to_owned(),
        }
    }

    pub fn owner() -> Owner {
        Owner { first_name: "Ada".to_owned(), last_name: "Lovelace".to_owned() }
    }

    pub fn with_report<R>(f: impl FnOnce(&Report<'_>) -> R) -> R {
        let sessions = priced_sessions();
        let (address, owner) = (address(), owner());
        let report = Report::builder()
            .sessions(&sessions)
            .summary(summarize(&sessions, Summation::Rounded))
            .address(&address)
            .owner(&owner)
            .since(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .until(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
            .build();
        f(&report)
    }

    #[test]
    fn test_timestamped_name() {
        let generated_at = Local.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(timestamped_name(generated_at, "pdf"), "charging_report_20240203_040506.pdf");
    }

    #[test]
    fn test_summary_fields() {
        let fields = with_report(|report| report.summary_fields());
        assert_eq!(fields[2].0, "Total Energy Consumed (kWh):");
        assert_eq!(
            fields.map(|(_, value)| value),
            [
                "2024-01-01",
                "2024-01-31",
                "12.50 kWh",
                "3.50 EUR",
                "Main Street 1, 12345 Springfield",
                "Ada Lovelace",
            ],
        );
    }

    #[test]
    fn test_write_timestamped() -> Result {
        let directory = tempfile::tempdir()?;
        let path = write_timestamped(&directory.path().join("reports"), "xlsx", b"hello")?;
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("charging_report_"));
        assert_eq!(fs::read_to_string(path)?, "hello");
        Ok(())
    }
}
