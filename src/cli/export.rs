use crate::{cli::ExportArgs, core::billing::price_sessions, prelude::*, report::csv};

#[instrument(skip_all)]
pub fn export(args: &ExportArgs) -> Result {
    let dataset = args.source.load()?;
    csv::write(
        &args.export.path,
        &dataset.columns,
        &price_sessions(&dataset.prices, &dataset.sessions),
    )
}
