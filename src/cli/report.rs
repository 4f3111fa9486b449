use crate::{
    cli::ReportArgs,
    core::{
        billing::{price_sessions, summarize},
        filter::SessionFilter,
    },
    prelude::*,
    report::{self, Report, csv, pdf, xlsx},
    tables::{build_sessions_table, build_summary_table},
};

#[instrument(
    skip_all,
    fields(identifier = args.identifier, since = %args.since, until = %args.until),
)]
pub fn report(args: &ReportArgs) -> Result {
    ensure!(args.since <= args.until, "the start date is after the end date");
    let dataset = args.source.load()?;

    csv::write(
        &args.export.path,
        &dataset.columns,
        &price_sessions(&dataset.prices, &dataset.sessions),
    )?;

    let filter = SessionFilter::from_dates(&args.identifier, args.since, args.until)?;
    let sessions = filter.apply(&dataset.sessions);
    info!(n_sessions = sessions.len(), n_total = dataset.sessions.len(), "filtered");

    let priced_sessions = price_sessions(&dataset.prices, sessions);
    let summary = summarize(&priced_sessions, args.summation);
    info!(
        total_energy = %summary.total_energy,
        total_cost = %summary.total_cost,
        n_unmatched = summary.n_unmatched,
        "summarized",
    );

    let report = Report::builder()
        .sessions(&priced_sessions)
        .summary(summary)
        .address(&dataset.address)
        .owner(&dataset.owner)
        .since(args.since)
        .until(args.until)
        .build();
    println!("{}", build_summary_table(&report));
    println!("{}", build_sessions_table(&priced_sessions));

    report::write_timestamped(&args.output_dir, "xlsx", &xlsx::render(&report)?)?;
    report::write_timestamped(&args.output_dir, "pdf", &pdf::render(&report)?)?;
    Ok(())
}
