use crate::infra::{now_naive, parse_date, parse_section, FixtureDataFeed, InMemoryCloseStore};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use revcycle::error::AppError;
use revcycle::workflows::close::{
    CloseError, MonthEndCloseService, ReportPackOutcome, ReportSection,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Close period year. Defaults to the current year.
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Close period month (1-12). Defaults to the current month.
    #[arg(long)]
    pub(crate) month: Option<u32>,
    /// Override the working date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Name recorded on the closing sign-off.
    #[arg(long, default_value = "demo.manager")]
    pub(crate) signed_by: String,
    /// Skip the report pack portion of the demo.
    #[arg(long)]
    pub(crate) skip_report: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CloseReportArgs {
    /// Close period year
    #[arg(long)]
    pub(crate) year: i32,
    /// Close period month (1-12)
    #[arg(long)]
    pub(crate) month: u32,
    /// Sections to include (repeatable). Defaults to the full catalogue.
    #[arg(long = "section", value_parser = parse_section)]
    pub(crate) sections: Vec<ReportSection>,
    /// Report date stamped on the artifact (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Also print the flat CSV export after the text artifact.
    #[arg(long)]
    pub(crate) csv: bool,
}

pub(crate) fn run_close_report(args: CloseReportArgs) -> Result<(), AppError> {
    let CloseReportArgs {
        year,
        month,
        sections,
        today,
        csv,
    } = args;

    let sections = if sections.is_empty() {
        ReportSection::ordered().to_vec()
    } else {
        sections
    };
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(InMemoryCloseStore::default());
    let feed = Arc::new(FixtureDataFeed::settled());
    let service = MonthEndCloseService::new(store, feed);

    let outcome = service.generate_report_pack(
        year,
        month,
        &sections,
        "cli.report",
        today,
        now_naive(),
    )?;

    print!("{}", outcome.pack.to_text());
    render_warnings(&outcome);

    if csv {
        println!();
        print!("{}", outcome.pack.to_csv()?);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        year,
        month,
        today,
        signed_by,
        skip_report,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());

    let store = Arc::new(InMemoryCloseStore::default());
    let feed = Arc::new(FixtureDataFeed::backlogged());
    let service = MonthEndCloseService::new(store, feed.clone());

    println!("Month-end close demo");

    let period = service.create_period(year, month)?;
    println!(
        "\nCreated close period {} ({})",
        period.period, period.status_label
    );

    let checklist = service.checklist_view(year, month, now_naive())?;
    println!("\nChecklist with the operational backlog still open:");
    render_checklist(&checklist.items);
    println!(
        "Gate satisfied: {}",
        if checklist.gate_satisfied { "yes" } else { "no" }
    );

    println!("\nA premature close is refused:");
    match service.close_month(year, month, &signed_by, None, today, now_naive()) {
        Err(err @ CloseError::ChecklistIncomplete { .. }) => println!("  {err}"),
        Err(err) => return Err(err.into()),
        Ok(_) => println!("  unexpected close success"),
    }

    feed.settle();
    let run = service.run_auto_checks(year, month, now_naive())?;
    println!("\nOperational subsystems caught up; auto-checks completed:");
    for name in &run.newly_completed {
        println!("  [auto] {name}");
    }

    for item in ["Review A/R aging", "Management sign-off review"] {
        service.toggle_item(year, month, item, true, &signed_by, now_naive())?;
        println!("  [manual] {item}");
    }

    if skip_report {
        service.toggle_item(year, month, "Download reports", true, &signed_by, now_naive())?;
        println!("  [manual] Download reports");
    } else {
        let outcome = service.generate_report_pack(
            year,
            month,
            &ReportSection::ordered(),
            "demo.reports",
            today,
            now_naive(),
        )?;
        println!(
            "\nReport pack assembled: {} pages, {} rows",
            outcome.pack.pages.len(),
            outcome.pack.row_count()
        );
        render_warnings(&outcome);
        println!("  [artifact] Download reports checked off by the assembler");
    }

    let refreshed = service.checklist_view(year, month, now_naive())?;
    println!(
        "\nGate satisfied: {}",
        if refreshed.gate_satisfied { "yes" } else { "no" }
    );

    let outcome = service.close_month(
        year,
        month,
        &signed_by,
        Some("Closed via CLI demo".to_string()),
        today,
        now_naive(),
    )?;
    println!(
        "\nPeriod {} closed on {} by {}",
        outcome.period.key,
        outcome
            .period
            .close_date
            .map(|date| date.to_string())
            .unwrap_or_default(),
        outcome.sign_off.signed_by
    );

    println!("\nThe closed period is locked:");
    match service.toggle_item(year, month, "Review A/R aging", false, &signed_by, now_naive()) {
        Err(err @ CloseError::PeriodClosed(_)) => println!("  {err}"),
        Err(err) => return Err(err.into()),
        Ok(_) => println!("  unexpected toggle success"),
    }
    match service.close_month(year, month, &signed_by, None, today, now_naive()) {
        Err(err @ CloseError::PeriodAlreadyClosed(_)) => println!("  {err}"),
        Err(err) => return Err(err.into()),
        Ok(_) => println!("  unexpected close success"),
    }

    Ok(())
}

fn render_checklist(items: &[revcycle::workflows::close::ChecklistItemView]) {
    for item in items {
        let marker = if item.is_completed { "x" } else { " " };
        let kind = if item.auto_checked { "auto" } else { "manual" };
        println!("  [{marker}] {} ({kind})", item.name);
    }
}

fn render_warnings(outcome: &ReportPackOutcome) {
    for warning in &outcome.warnings {
        println!("  warning: {warning}");
    }
}
