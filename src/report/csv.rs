use std::{collections::BTreeSet, fmt::Write, fs, path::Path};

use itertools::Itertools;

use crate::{
    core::{billing::PricedSession, session::ChargingSession},
    prelude::*,
    report::TIMESTAMP_FORMAT,
};

const LEADING_COLUMNS: [&str; 4] = ["start", "end", "energy", "id_chip_name"];
const TRAILING_COLUMNS: [&str; 2] = ["Tibber Price [EUR/kWh]", "Total Cost [EUR]"];

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Session table in the export column order, followed by the prices rounded to cents.
///
/// Without the export columns at hand, the well-known columns lead and the passthrough ones
/// follow alphabetically.
#[must_use]
pub fn render(columns: &[String], sessions: &[PricedSession]) -> String {
    let columns: Vec<&str> = if columns.is_empty() {
        let extra_columns: BTreeSet<&str> = sessions
            .iter()
            .flat_map(|priced| priced.session.extra.keys().map(String::as_str))
            .filter(|key| !LEADING_COLUMNS.contains(key))
            .collect();
        LEADING_COLUMNS.into_iter().chain(extra_columns).collect()
    } else {
        columns.iter().map(String::as_str).collect()
    };

    let mut out = columns
        .iter()
        .copied()
        .chain(TRAILING_COLUMNS)
        .map(csv_escape)
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');

    for priced in sessions {
        let row = columns.iter().map(|column| render_cell(&priced.session, column)).join(",");
        let _ = writeln!(out, "{row},{:.2},{:.2}", priced.rate.0, priced.cost.0);
    }
    out
}

fn render_cell(session: &ChargingSession, column: &str) -> String {
    match column {
        "start" => session.start.format(TIMESTAMP_FORMAT).to_string(),
        "end" => session.end.format(TIMESTAMP_FORMAT).to_string(),
        "energy" => format!("{:.2}", session.energy.0),
        "id_chip_name" => csv_escape(session.identifier.as_deref().unwrap_or_default()),
        _ => session.extra.get(column).map(|value| csv_escape(value)).unwrap_or_default(),
    }
}

#[instrument(skip_all, fields(path = %path.display(), n_sessions = sessions.len()))]
pub fn write(path: &Path, columns: &[String], sessions: &[PricedSession]) -> Result {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    fs::write(path, render(columns, sessions))
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    info!("exported");
    Ok(())
}
