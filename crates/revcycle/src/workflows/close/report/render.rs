use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use super::sections::{ReportSection, SectionRow};
use crate::workflows::close::domain::PeriodKey;

/// The assembled month-end artifact: one page per rendered section, in
/// catalogue order. The internal layout is an implementation detail, not
/// a compatibility surface.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPack {
    pub period: PeriodKey,
    pub title: String,
    pub generated_on: NaiveDate,
    pub pages: Vec<ReportPage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportPage {
    pub number: usize,
    pub section: ReportSection,
    pub label: &'static str,
    pub rows: Vec<SectionRow>,
    pub body: String,
}

impl ReportPack {
    pub fn row_count(&self) -> usize {
        self.pages.iter().map(|page| page.rows.len()).sum()
    }

    /// Paginated plain-text rendering of the whole pack.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        writeln!(out, "{}", self.title).expect("write title");
        writeln!(out, "Generated on {}", format_date(self.generated_on)).expect("write date line");

        for page in &self.pages {
            writeln!(out).expect("write spacer");
            writeln!(out, "----- Page {} of {} -----", page.number, self.pages.len())
                .expect("write page rule");
            out.push_str(&page.body);
        }

        out
    }

    /// Flat CSV export of every rendered row, one record per row with its
    /// section label, for spreadsheet-bound consumers.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buffer);
            writer.write_record(["section", "client", "reference", "date", "status", "amount"])?;
            for page in &self.pages {
                for row in &page.rows {
                    writer.write_record([
                        page.label,
                        row.client.as_str(),
                        row.reference.as_str(),
                        format_date(row.date).as_str(),
                        row.status.as_str(),
                        format_amount(row.amount_cents).as_str(),
                    ])?;
                }
            }
            writer.flush().map_err(csv::Error::from)?;
        }
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

pub(crate) fn render_section_page(
    number: usize,
    section: ReportSection,
    period: PeriodKey,
    rows: Vec<SectionRow>,
) -> ReportPage {
    let mut body = String::new();
    writeln!(body, "== {} | {} ==", section.label(), period.month_label()).expect("write header");

    if rows.is_empty() {
        writeln!(body, "No records for this period.").expect("write empty note");
    } else {
        writeln!(
            body,
            "{:<28} {:<14} {:<12} {:<18} {:>14}",
            "Client", "Reference", "Date", "Status", "Amount"
        )
        .expect("write columns");

        let mut total_cents: i64 = 0;
        for row in &rows {
            total_cents += row.amount_cents;
            writeln!(
                body,
                "{:<28} {:<14} {:<12} {:<18} {:>14}",
                row.client,
                row.reference,
                format_date(row.date),
                row.status,
                format_amount(row.amount_cents)
            )
            .expect("write row");
        }

        writeln!(
            body,
            "{:<28} {:<14} {:<12} {:<18} {:>14}",
            "Total",
            "",
            "",
            "",
            format_amount(total_cents)
        )
        .expect("write total");
    }

    ReportPage {
        number,
        section,
        label: section.label(),
        rows,
        body,
    }
}

/// Locale-independent day/month/year rendering used across the artifact.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Currency rendering: thousands separators and two decimals, from an
/// integer cent amount.
pub(crate) fn format_amount(cents: i64) -> String {
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}.{fraction:02}")
    } else {
        format!("{grouped}.{fraction:02}")
    }
}
