use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

use super::store::StoreError;
use super::template::ItemTemplate;

/// Identity of one calendar month's close cycle. Month is validated on
/// construction so every other component can treat the key as well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Result<Self, CloseError> {
        if !(1..=12).contains(&month) || !(1900..=2999).contains(&year) {
            return Err(CloseError::PeriodOutOfRange { year, month });
        }
        Ok(Self { year, month })
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated period date")
    }

    pub fn last_day(self) -> NaiveDate {
        let next_month = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next_month.expect("validated period date") - chrono::Duration::days(1)
    }

    /// Human-facing month label, e.g. "January 2024".
    pub fn month_label(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Open,
    Closed,
}

impl PeriodStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
        }
    }
}

/// One calendar month's close cycle. `close_date` and `closed_by` are set
/// only by the close transaction; there is no transition out of Closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub key: PeriodKey,
    pub status: PeriodStatus,
    pub close_date: Option<NaiveDate>,
    pub closed_by: Option<String>,
}

impl Period {
    pub fn open(key: PeriodKey) -> Self {
        Self {
            key,
            status: PeriodStatus::Open,
            close_date: None,
            closed_by: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == PeriodStatus::Closed
    }
}

/// A checklist item instantiated from the standard template, carrying its
/// live completion state alongside the template definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistItemRecord {
    pub template: ItemTemplate,
    pub is_completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub completed_by: Option<String>,
}

impl ChecklistItemRecord {
    pub fn from_template(template: ItemTemplate) -> Self {
        Self {
            template,
            is_completed: false,
            completed_at: None,
            completed_by: None,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.template.auto_check.is_some()
    }

    pub(crate) fn mark_completed(&mut self, at: NaiveDateTime, by: &str) {
        self.is_completed = true;
        self.completed_at = Some(at);
        self.completed_by = Some(by.to_owned());
    }

    pub(crate) fn clear_completion(&mut self) {
        self.is_completed = false;
        self.completed_at = None;
        self.completed_by = None;
    }
}

/// Immutable audit entry appended when a period closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignOffRecord {
    pub period: PeriodKey,
    pub signed_by: String,
    pub signed_at: NaiveDateTime,
    pub notes: Option<String>,
}

/// Error taxonomy for the close workflow. NotFound and Conflict style
/// variants abort the requested operation; callers surface them verbatim.
#[derive(Debug, thiserror::Error)]
pub enum CloseError {
    #[error("no close period exists for {0}")]
    PeriodNotFound(PeriodKey),
    #[error("a close period already exists for {0}")]
    PeriodAlreadyExists(PeriodKey),
    #[error("period {0} is locked: the month has been closed")]
    PeriodClosed(PeriodKey),
    #[error("period {0} has already been closed")]
    PeriodAlreadyClosed(PeriodKey),
    #[error("no checklist item named '{name}' in period {period}")]
    ItemNotFound { period: PeriodKey, name: String },
    #[error("checklist item '{name}' is managed by auto-checks and cannot be toggled")]
    ItemIsAutoManaged { name: String },
    #[error("checklist for {period} is incomplete; remaining: {}", .remaining.join(", "))]
    ChecklistIncomplete {
        period: PeriodKey,
        remaining: Vec<String>,
    },
    #[error("{year}-{month} is not a valid close period (year 1900-2999, month 1-12)")]
    PeriodOutOfRange { year: i32, month: u32 },
    #[error("no report sections selected")]
    NoSectionsSelected,
    #[error(transparent)]
    Store(#[from] StoreError),
}
