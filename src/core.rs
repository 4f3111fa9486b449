pub mod billing;
pub mod cache;
pub mod dataset;
pub mod filter;
pub mod interval;
pub mod price;
pub mod session;

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};

    use crate::{
        core::{
            billing::{Summary, Summation, price_sessions, summarize},
            filter::SessionFilter,
            price::{PriceInterval, PriceTable},
            session::ChargingSession,
        },
        prelude::*,
        quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
    };

    fn fixture() -> (Vec<ChargingSession>, PriceTable) {
        let at = |hour, minute| Local.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap();
        let sessions = vec![
            ChargingSession::builder()
                .start(at(10, 0))
                .end(at(11, 30))
                .energy(KilowattHours::from(10.0))
                .identifier("VolvoXC40")
                .build(),
        ];
        let prices = PriceTable::from(vec![
            PriceInterval::builder()
                .from(at(10, 0))
                .to(at(11, 0))
                .unit_price(KilowattHourRate::from(0.30))
                .build(),
            PriceInterval::builder()
                .from(at(11, 0))
                .to(at(12, 0))
                .unit_price(KilowattHourRate::from(0.40))
                .build(),
        ]);
        (sessions, prices)
    }

    fn filter(identifier: &str) -> Result<SessionFilter> {
        SessionFilter::from_dates(
            identifier,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
    }

    #[test]
    fn test_filter_price_summarize() -> Result {
        let (sessions, prices) = fixture();
        let priced = price_sessions(&prices, filter("volvo")?.apply(&sessions));
        let summary = summarize(&priced, Summation::Rounded);
        assert_eq!(summary.n_sessions, 1);
        assert_eq!(summary.n_unmatched, 0);
        assert_eq!(summary.total_energy, KilowattHours::from(10.0));
        approx::assert_abs_diff_eq!(summary.total_cost.0, 3.50, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_filter_nothing_selected() -> Result {
        let (sessions, prices) = fixture();
        let priced = price_sessions(&prices, filter("tesla")?.apply(&sessions));
        assert!(priced.is_empty());
        let summary = summarize(&priced, Summation::Rounded);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.total_cost, Cost::ZERO);
        Ok(())
    }
}
