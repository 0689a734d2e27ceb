use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};

use crate::workflows::close::checklist::ChecklistEngine;
use crate::workflows::close::domain::{
    ChecklistItemRecord, Period, PeriodKey, PeriodStatus, SignOffRecord,
};
use crate::workflows::close::feed::{FeedError, OperationalDataFeed};
use crate::workflows::close::report::{ReportSection, SectionRow};
use crate::workflows::close::service::MonthEndCloseService;
use crate::workflows::close::store::{CloseStore, StoreError};
use crate::workflows::close::template::AutoCheckSignal;

pub(super) fn period_key(year: i32, month: u32) -> PeriodKey {
    PeriodKey::new(year, month).expect("valid period key")
}

pub(super) fn sample_key() -> PeriodKey {
    period_key(2024, 1)
}

pub(super) fn mid_month() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date")
}

pub(super) fn noon(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
}

#[derive(Debug)]
struct PeriodSlot {
    period: Period,
    items: Vec<ChecklistItemRecord>,
    sign_offs: Vec<SignOffRecord>,
}

/// In-memory store mirroring the three logical tables. `finalize_close`
/// performs the compare-and-swap and both writes under one lock.
#[derive(Default)]
pub(super) struct MemoryCloseStore {
    slots: Mutex<HashMap<PeriodKey, PeriodSlot>>,
}

impl MemoryCloseStore {
    pub(super) fn sign_off_count(&self, key: PeriodKey) -> usize {
        let slots = self.slots.lock().expect("store mutex poisoned");
        slots.get(&key).map_or(0, |slot| slot.sign_offs.len())
    }

    /// Test hook: drop every checklist item, e.g. to model a period whose
    /// template instantiation never ran.
    pub(super) fn wipe_checklist(&self, key: PeriodKey) {
        let mut slots = self.slots.lock().expect("store mutex poisoned");
        if let Some(slot) = slots.get_mut(&key) {
            slot.items.clear();
        }
    }

    /// Test hook: force an item back to incomplete behind the engine's
    /// back, to model a racing un-toggle between a caller's gate read and
    /// its close request.
    pub(super) fn force_incomplete(&self, key: PeriodKey, item_name: &str) {
        let mut slots = self.slots.lock().expect("store mutex poisoned");
        if let Some(slot) = slots.get_mut(&key) {
            if let Some(item) = slot
                .items
                .iter_mut()
                .find(|item| item.template.name == item_name)
            {
                item.clear_completion();
            }
        }
    }
}

impl CloseStore for MemoryCloseStore {
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

/// Store double that refuses every call, for unavailable-backend paths.
pub(super) struct UnavailableStore;

impl CloseStore for UnavailableStore {
    fn insert_period(
        &self,
        _period: Period,
        _items: Vec<ChecklistItemRecord>,
    ) -> Result<Period, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch_period(&self, _key: PeriodKey) -> Result<Option<Period>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn checklist(&self, _key: PeriodKey) -> Result<Option<Vec<ChecklistItemRecord>>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_item(&self, _key: PeriodKey, _item: ChecklistItemRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn finalize_close(
        &self,
        _key: PeriodKey,
        _close_date: NaiveDate,
        _sign_off: SignOffRecord,
    ) -> Result<(Period, SignOffRecord), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn sign_offs(&self, _key: PeriodKey) -> Result<Vec<SignOffRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Store wrapper that can be told to reject item updates, to simulate the
/// checklist side effect failing after an artifact was produced.
pub(super) struct FlakyItemStore {
    inner: MemoryCloseStore,
    reject_item_updates: AtomicBool,
}

impl FlakyItemStore {
    pub(super) fn new() -> Self {
        Self {
            inner: MemoryCloseStore::default(),
            reject_item_updates: AtomicBool::new(false),
        }
    }

    pub(super) fn reject_item_updates(&self, reject: bool) {
        self.reject_item_updates.store(reject, Ordering::SeqCst);
    }

    pub(super) fn inner(&self) -> &MemoryCloseStore {
        &self.inner
    }
}

impl CloseStore for FlakyItemStore {
    fn insert_period(
        &self,
        period: Period,
        items: Vec<ChecklistItemRecord>,
    ) -> Result<Period, StoreError> {
        self.inner.insert_period(period, items)
    }

    fn fetch_period(&self, key: PeriodKey) -> Result<Option<Period>, StoreError> {
        self.inner.fetch_period(key)
    }

    fn checklist(&self, key: PeriodKey) -> Result<Option<Vec<ChecklistItemRecord>>, StoreError> {
        self.inner.checklist(key)
    }

    fn update_item(&self, key: PeriodKey, item: ChecklistItemRecord) -> Result<(), StoreError> {
        if self.reject_item_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("item writes rejected".to_string()));
        }
        self.inner.update_item(key, item)
    }

    fn finalize_close(
        &self,
        key: PeriodKey,
        close_date: NaiveDate,
        sign_off: SignOffRecord,
    ) -> Result<(Period, SignOffRecord), StoreError> {
        self.inner.finalize_close(key, close_date, sign_off)
    }

    fn sign_offs(&self, key: PeriodKey) -> Result<Vec<SignOffRecord>, StoreError> {
        self.inner.sign_offs(key)
    }
}

#[derive(Debug, Clone)]
enum ScriptedCount {
    Count(u64),
    Fail,
}

#[derive(Debug, Clone)]
enum ScriptedSection {
    Rows(Vec<SectionRow>),
    Fail,
}

/// Scriptable operational feed. Defaults to a clean month: every count is
/// zero and every section dataset is empty.
#[derive(Default)]
pub(super) struct ScriptedFeed {
    counts: Mutex<HashMap<AutoCheckSignal, ScriptedCount>>,
    sections: Mutex<HashMap<ReportSection, ScriptedSection>>,
}

impl ScriptedFeed {
    pub(super) fn set_count(&self, signal: AutoCheckSignal, count: u64) {
        self.counts
            .lock()
            .expect("feed mutex poisoned")
            .insert(signal, ScriptedCount::Count(count));
    }

    pub(super) fn fail_count(&self, signal: AutoCheckSignal) {
        self.counts
            .lock()
            .expect("feed mutex poisoned")
            .insert(signal, ScriptedCount::Fail);
    }

    pub(super) fn set_rows(&self, section: ReportSection, rows: Vec<SectionRow>) {
        self.sections
            .lock()
            .expect("feed mutex poisoned")
            .insert(section, ScriptedSection::Rows(rows));
    }

    pub(super) fn fail_section(&self, section: ReportSection) {
        self.sections
            .lock()
            .expect("feed mutex poisoned")
            .insert(section, ScriptedSection::Fail);
    }

    fn count(&self, signal: AutoCheckSignal) -> Result<u64, FeedError> {
        match self
            .counts
            .lock()
            .expect("feed mutex poisoned")
            .get(&signal)
            .cloned()
        {
            Some(ScriptedCount::Count(count)) => Ok(count),
            Some(ScriptedCount::Fail) => {
                Err(FeedError::Unavailable("claims subsystem offline".to_string()))
            }
            None => Ok(0),
        }
    }
}

impl OperationalDataFeed for ScriptedFeed {
    fn unsubmitted_claim_count(&self, _period: PeriodKey) -> Result<u64, FeedError> {
        self.count(AutoCheckSignal::UnsubmittedClaims)
    }

    fn unresolved_denial_count(&self, _period: PeriodKey) -> Result<u64, FeedError> {
        self.count(AutoCheckSignal::UnresolvedDenials)
    }

    fn unreconciled_payment_count(&self, _period: PeriodKey) -> Result<u64, FeedError> {
        self.count(AutoCheckSignal::UnreconciledPayments)
    }

    fn section_rows(
        &self,
        _period: PeriodKey,
        section: ReportSection,
    ) -> Result<Vec<SectionRow>, FeedError> {
        match self
            .sections
            .lock()
            .expect("feed mutex poisoned")
            .get(&section)
            .cloned()
        {
            Some(ScriptedSection::Rows(rows)) => Ok(rows),
            Some(ScriptedSection::Fail) => {
                Err(FeedError::Timeout(10))
            }
            None => Ok(Vec::new()),
        }
    }
}

pub(super) fn payment_rows() -> Vec<SectionRow> {
    vec![
        SectionRow {
            client: "Cedar Family Clinic".to_string(),
            reference: "PMT-88121".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 9).expect("valid date"),
            status: "Posted".to_string(),
            amount_cents: 1_250_00,
        },
        SectionRow {
            client: "Riverbend Orthopedics".to_string(),
            reference: "PMT-88137".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 17).expect("valid date"),
            status: "Posted".to_string(),
            amount_cents: 98_450,
        },
        SectionRow {
            client: "Lakeside Pediatrics".to_string(),
            reference: "PMT-88142".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 24).expect("valid date"),
            status: "Partially applied".to_string(),
            amount_cents: 20_000,
        },
    ]
}

pub(super) type TestService = MonthEndCloseService<MemoryCloseStore, ScriptedFeed>;

pub(super) fn build_service() -> (Arc<TestService>, Arc<MemoryCloseStore>, Arc<ScriptedFeed>) {
    let store = Arc::new(MemoryCloseStore::default());
    let feed = Arc::new(ScriptedFeed::default());
    let service = Arc::new(MonthEndCloseService::new(store.clone(), feed.clone()));
    (service, store, feed)
}

pub(super) fn build_engine() -> (
    ChecklistEngine<MemoryCloseStore, ScriptedFeed>,
    Arc<MemoryCloseStore>,
    Arc<ScriptedFeed>,
) {
    let store = Arc::new(MemoryCloseStore::default());
    let feed = Arc::new(ScriptedFeed::default());
    let engine = ChecklistEngine::new(store.clone(), feed.clone());
    (engine, store, feed)
}

pub(super) fn seed_period(store: &Arc<MemoryCloseStore>, key: PeriodKey) -> Period {
    crate::workflows::close::lifecycle::PeriodLifecycleManager::new(store.clone())
        .create_period(key)
        .expect("period created")
}
