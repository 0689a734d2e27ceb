use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed catalogue of report-pack sections. Catalogue order is the render
/// order regardless of how the caller orders the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    ArAging,
    ClaimsStatus,
    Denials,
    Payments,
    Productivity,
}

impl ReportSection {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::ArAging,
            Self::ClaimsStatus,
            Self::Denials,
            Self::Payments,
            Self::Productivity,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ArAging => "A/R Aging",
            Self::ClaimsStatus => "Claims Status",
            Self::Denials => "Denials",
            Self::Payments => "Payments",
            Self::Productivity => "Productivity",
        }
    }
}

/// Flat record shape shared by every section dataset: client, a claim or
/// payment reference, a date, a status, and an amount in integer cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRow {
    pub client: String,
    pub reference: String,
    pub date: NaiveDate,
    pub status: String,
    pub amount_cents: i64,
}
