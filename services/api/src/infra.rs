use chrono::{NaiveDate, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use revcycle::workflows::close::{
    ChecklistItemRecord, CloseStore, FeedError, OperationalDataFeed, Period, PeriodKey,
    PeriodStatus, ReportSection, SectionRow, SignOffRecord, StoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug)]
struct PeriodSlot {
    period: Period,
    items: Vec<ChecklistItemRecord>,
    sign_offs: Vec<SignOffRecord>,
}

/// In-memory close store backing the service: three logical tables behind
/// one mutex so `finalize_close` can compare-and-swap the status and
/// append the sign-off in a single critical section.
#[derive(Default)]
pub(crate) struct InMemoryCloseStore {
    slots: Mutex<HashMap<PeriodKey, PeriodSlot>>,
}

impl CloseStore for InMemoryCloseStore {
    fn insert_period(
        &self,
        period: Period,
        items: Vec<ChecklistItemRecord>,
    ) -> Result<Period, StoreError> {
        let mut slots = self.slots.lock().expect("store mutex poisoned");
        if slots.contains_key(&period.key) {
            return Err(StoreError::Conflict);
        }
        slots.insert(
            period.key,
            PeriodSlot {
                period: period.clone(),
                items,
                sign_offs: Vec::new(),
            },
        );
        Ok(period)
    }

    fn fetch_period(&self, key: PeriodKey) -> Result<Option<Period>, StoreError> {
        let slots = self.slots.lock().expect("store mutex poisoned");
        Ok(slots.get(&key).map(|slot| slot.period.clone()))
    }

    fn checklist(&self, key: PeriodKey) -> Result<Option<Vec<ChecklistItemRecord>>, StoreError> {
        let slots = self.slots.lock().expect("store mutex poisoned");
        Ok(slots.get(&key).map(|slot| slot.items.clone()))
    }

    fn update_item(&self, key: PeriodKey, item: ChecklistItemRecord) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().expect("store mutex poisoned");
        let slot = slots.get_mut(&key).ok_or(StoreError::NotFound)?;
        let stored = slot
            .items
            .iter_mut()
            .find(|existing| existing.template.name == item.template.name)
            .ok_or(StoreError::NotFound)?;
        *stored = item;
        Ok(())
    }

    fn finalize_close(
        &self,
        key: PeriodKey,
        close_date: NaiveDate,
        sign_off: SignOffRecord,
    ) -> Result<(Period, SignOffRecord), StoreError> {
        let mut slots = self.slots.lock().expect("store mutex poisoned");
        let slot = slots.get_mut(&key).ok_or(StoreError::NotFound)?;
        if slot.period.status == PeriodStatus::Closed {
            return Err(StoreError::Conflict);
        }
        slot.period.status = PeriodStatus::Closed;
        slot.period.close_date = Some(close_date);
        slot.period.closed_by = Some(sign_off.signed_by.clone());
        slot.sign_offs.push(sign_off.clone());
        Ok((slot.period.clone(), sign_off))
    }

    fn sign_offs(&self, key: PeriodKey) -> Result<Vec<SignOffRecord>, StoreError> {
        let slots = self.slots.lock().expect("store mutex poisoned");
        Ok(slots
            .get(&key)
            .map(|slot| slot.sign_offs.clone())
            .unwrap_or_default())
    }
}

/// Deterministic stand-in for the claims/payments/denials subsystem.
/// Serves representative billing data for any requested month; counts can
/// be settled so demos can walk a month from backlog to clean.
pub(crate) struct FixtureDataFeed {
    unsubmitted: Mutex<u64>,
    unresolved: Mutex<u64>,
    unreconciled: Mutex<u64>,
}

impl FixtureDataFeed {
    /// A month mid-flight: work outstanding on every signal.
    pub(crate) fn backlogged() -> Self {
        Self {
            unsubmitted: Mutex::new(4),
            unresolved: Mutex::new(2),
            unreconciled: Mutex::new(3),
        }
    }

    /// A month ready to close.
    pub(crate) fn settled() -> Self {
        Self {
            unsubmitted: Mutex::new(0),
            unresolved: Mutex::new(0),
            unreconciled: Mutex::new(0),
        }
    }

    pub(crate) fn settle(&self) {
        *self.unsubmitted.lock().expect("feed mutex poisoned") = 0;
        *self.unresolved.lock().expect("feed mutex poisoned") = 0;
        *self.unreconciled.lock().expect("feed mutex poisoned") = 0;
    }
}

impl OperationalDataFeed for FixtureDataFeed {
    fn unsubmitted_claim_count(&self, _period: PeriodKey) -> Result<u64, FeedError> {
        Ok(*self.unsubmitted.lock().expect("feed mutex poisoned"))
    }

    fn unresolved_denial_count(&self, _period: PeriodKey) -> Result<u64, FeedError> {
        Ok(*self.unresolved.lock().expect("feed mutex poisoned"))
    }

    fn unreconciled_payment_count(&self, _period: PeriodKey) -> Result<u64, FeedError> {
        Ok(*self.unreconciled.lock().expect("feed mutex poisoned"))
    }

    fn section_rows(
        &self,
        period: PeriodKey,
        section: ReportSection,
    ) -> Result<Vec<SectionRow>, FeedError> {
        Ok(fixture_rows(period, section))
    }
}

fn fixture_rows(period: PeriodKey, section: ReportSection) -> Vec<SectionRow> {
    let mid = period
        .first_day()
        .checked_add_signed(chrono::Duration::days(14))
        .unwrap_or_else(|| period.first_day());

    match section {
        ReportSection::ArAging => vec![
            row("Cedar Family Clinic", "INV-2101", period.first_day(), "31-60 days", 412_500),
            row("Riverbend Orthopedics", "INV-2087", period.first_day(), "61-90 days", 189_045),
            row("Lakeside Pediatrics", "INV-2112", mid, "Current", 97_210),
        ],
        ReportSection::ClaimsStatus => vec![
            row("Cedar Family Clinic", "CLM-55620", mid, "Paid", 235_000),
            row("Harbor View Dermatology", "CLM-55634", mid, "Pending payer", 118_840),
            row("Lakeside Pediatrics", "CLM-55641", period.last_day(), "Submitted", 76_300),
        ],
        ReportSection::Denials => vec![
            row("Riverbend Orthopedics", "DEN-1408", mid, "Appealed", 54_200),
            row("Harbor View Dermatology", "DEN-1411", period.last_day(), "Corrected and resubmitted", 23_960),
        ],
        ReportSection::Payments => vec![
            row("Cedar Family Clinic", "PMT-88121", period.first_day(), "Posted", 125_000),
            row("Riverbend Orthopedics", "PMT-88137", mid, "Posted", 98_450),
            row("Lakeside Pediatrics", "PMT-88142", period.last_day(), "Partially applied", 20_000),
        ],
        ReportSection::Productivity => vec![
            row("Billing team", "CLAIMS-FILED", period.last_day(), "142 claims", 0),
            row("Billing team", "COLLECTED", period.last_day(), "Receipts posted", 243_450),
        ],
    }
}

fn row(client: &str, reference: &str, date: NaiveDate, status: &str, amount_cents: i64) -> SectionRow {
    SectionRow {
        client: client.to_string(),
        reference: reference.to_string(),
        date,
        status: status.to_string(),
        amount_cents,
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_section(raw: &str) -> Result<ReportSection, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ar_aging" | "ar-aging" | "aging" => Ok(ReportSection::ArAging),
        "claims_status" | "claims-status" | "claims" => Ok(ReportSection::ClaimsStatus),
        "denials" => Ok(ReportSection::Denials),
        "payments" => Ok(ReportSection::Payments),
        "productivity" => Ok(ReportSection::Productivity),
        other => Err(format!(
            "unknown report section '{other}' (expected ar_aging, claims_status, denials, payments, or productivity)"
        )),
    }
}

pub(crate) fn now_naive() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
