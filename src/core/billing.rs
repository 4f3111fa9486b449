use crate::{
    core::{price::PriceTable, session::ChargingSession},
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// How the summary adds up the session costs.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Summation {
    /// Sum the per-session costs after rounding them to cents, as printed in the tables.
    #[default]
    Rounded,

    /// Sum the exact per-session costs and round nothing but the displayed total.
    Unrounded,
}

/// Charging session with its effective price attached.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct PricedSession {
    pub session: ChargingSession,

    /// Unrounded effective unit price.
    pub rate: KilowattHourRate,

    /// Energy times rate, rounded to cents.
    pub cost: Cost,

    /// Whether any price interval overlapped the session.
    pub is_matched: bool,
}

impl PricedSession {
    pub fn exact_cost(&self) -> Cost {
        self.session.energy * self.rate
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub n_sessions: usize,
    pub n_unmatched: usize,
    pub total_energy: KilowattHours,
    pub total_cost: Cost,
}

/// Effective unit price of the session: the plain mean of all overlapping hourly prices.
///
/// Zero when no price window covers the session.
pub fn effective_rate(prices: &PriceTable, session: &ChargingSession) -> KilowattHourRate {
    prices.mean_rate(session.interval()).unwrap_or_else(|| {
        warn!(
            start = %session.start,
            end = %session.end,
            "no matching price window found for the session",
        );
        KilowattHourRate::ZERO
    })
}

pub fn price_session(prices: &PriceTable, session: &ChargingSession) -> PricedSession {
    let rate = effective_rate(prices, session);
    PricedSession {
        session: session.clone(),
        rate,
        cost: (session.energy * rate).round_to_cents(),
        is_matched: prices.overlapping(session.interval()).next().is_some(),
    }
}

#[instrument(skip_all, fields(n_prices = prices.len()))]
pub fn price_sessions<'a>(
    prices: &PriceTable,
    sessions: impl IntoIterator<Item = &'a ChargingSession>,
) -> Vec<PricedSession> {
    sessions.into_iter().map(|session| price_session(prices, session)).collect()
}

pub fn summarize(priced_sessions: &[PricedSession], summation: Summation) -> Summary {
    let total_cost = match summation {
        Summation::Rounded => priced_sessions.iter().map(|priced| priced.cost).sum(),
        Summation::Unrounded => priced_sessions.iter().map(PricedSession::exact_cost).sum(),
    };
    Summary {
        n_sessions: priced_sessions.len(),
        n_unmatched: priced_sessions.iter().filter(|priced| !priced.is_matched).count(),
        total_energy: priced_sessions.iter().map(|priced| priced.session.energy).sum(),
        total_cost,
    }
}
