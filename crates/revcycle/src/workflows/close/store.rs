use chrono::NaiveDate;

use super::domain::{ChecklistItemRecord, Period, PeriodKey, SignOffRecord};

/// Storage abstraction for periods, checklist items, and sign-offs so the
/// workflow components can be exercised in isolation.
///
/// Implementations back three logical tables: periods (unique per key),
/// checklist items (unique per key + item name), and append-only
/// sign-offs. Reads and writes are fallible network operations.
pub trait CloseStore: Send + Sync {
    /// Create a period together with its instantiated checklist in one
    /// logical operation. `Conflict` when a period already exists for the
    /// key; on conflict nothing is written.
    fn insert_period(
        &self,
        period: Period,
        items: Vec<ChecklistItemRecord>,
    ) -> Result<Period, StoreError>;

    fn fetch_period(&self, key: PeriodKey) -> Result<Option<Period>, StoreError>;

    /// Checklist records for the period, or `None` when no period exists
    /// for the key. Ordering is not guaranteed; callers sort.
    fn checklist(&self, key: PeriodKey) -> Result<Option<Vec<ChecklistItemRecord>>, StoreError>;

    /// Replace the stored state of one checklist item, identified by the
    /// template name inside `item`. `NotFound` when the period or the item
    /// is missing.
    fn update_item(&self, key: PeriodKey, item: ChecklistItemRecord) -> Result<(), StoreError>;

    /// The atomic close write: in one critical section, compare-and-swap
    /// the period status from Open to Closed, stamp `close_date` and
    /// `closed_by` from the sign-off, and append the sign-off record.
    /// Both writes land or neither does. `Conflict` when the period is
    /// already Closed (the losing racer of a concurrent close observes
    /// this), `NotFound` when the period is absent.
    fn finalize_close(
        &self,
        key: PeriodKey,
        close_date: NaiveDate,
        sign_off: SignOffRecord,
    ) -> Result<(Period, SignOffRecord), StoreError>;

    fn sign_offs(&self, key: PeriodKey) -> Result<Vec<SignOffRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("close store unavailable: {0}")]
    Unavailable(String),
}
