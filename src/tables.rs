use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::billing::PricedSession,
    report::{Report, TIMESTAMP_FORMAT},
};

pub fn build_summary_table(report: &Report<'_>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.add_row(vec![Cell::new("Start Date"), Cell::new(report.since)]);
    table.add_row(vec![Cell::new("End Date"), Cell::new(report.until)]);
    table.add_row(vec![
        Cell::new("Total Energy Consumed"),
        Cell::new(report.summary.total_energy).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Total Cost"),
        Cell::new(format!("{:.2} EUR", report.summary.total_cost.0))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Address"), Cell::new(report.address)]);
    table.add_row(vec![Cell::new("Owner"), Cell::new(report.owner)]);
    if report.summary.n_unmatched != 0 {
        table.add_row(vec![
            Cell::new("Unpriced sessions"),
            Cell::new(report.summary.n_unmatched).fg(Color::Red),
        ]);
    }
    table
}

/// Session rows with the energy, the effective rate and the cost.
///
/// Rows without a price window get their rate marked with an asterisk.
pub fn build_sessions_table(sessions: &[PricedSession]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Date", "Energy (kWh)", "Cost per kWh (EUR)", "Total Cost (EUR)"]);
    for priced in sessions {
        let rate = format!("{:.4}", priced.rate.0);
        table.add_row(vec![
            Cell::new(priced.session.start.format(TIMESTAMP_FORMAT)).add_attribute(Attribute::Dim),
            Cell::new(format!("{:.2}", priced.session.energy.0))
                .set_alignment(CellAlignment::Right),
            if priced.is_matched {
                Cell::new(rate).set_alignment(CellAlignment::Right)
            } else {
                Cell::new(format!("{rate} *")).set_alignment(CellAlignment::Right).fg(Color::Red)
            },
            Cell::new(format!("{:.2}", priced.cost.0)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
