use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::checklist::{AutoCheckRun, ChecklistEngine, ChecklistItemView};
use super::closeout::{CloseOutcome, CloseTransaction};
use super::domain::{CloseError, Period, PeriodKey, PeriodStatus, SignOffRecord};
use super::feed::OperationalDataFeed;
use super::lifecycle::{close_readiness, CloseReadiness, PeriodLifecycleManager};
use super::report::{ReportPackAssembler, ReportPackOutcome, ReportSection};
use super::store::CloseStore;

/// Composition root for the month-end close workflow: wires the lifecycle
/// manager, checklist engine, close transaction, and report assembler
/// over one store and one operational feed.
pub struct MonthEndCloseService<S, F> {
    store: Arc<S>,
    periods: PeriodLifecycleManager<S>,
    checklist: Arc<ChecklistEngine<S, F>>,
    closer: CloseTransaction<S, F>,
    reports: ReportPackAssembler<S, F>,
}

/// Sanitized period representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodView {
    pub year: i32,
    pub month: u32,
    pub period: String,
    pub status: PeriodStatus,
    pub status_label: &'static str,
    pub close_date: Option<NaiveDate>,
    pub closed_by: Option<String>,
}

impl PeriodView {
    fn from_period(period: &Period) -> Self {
        Self {
            year: period.key.year(),
            month: period.key.month(),
            period: period.key.to_string(),
            status: period.status,
            status_label: period.status.label(),
            close_date: period.close_date,
            closed_by: period.closed_by.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodStatusView {
    #[serde(flatten)]
    pub period: PeriodView,
    #[serde(flatten)]
    pub readiness: CloseReadiness,
}

#[derive(Debug, Serialize)]
pub struct ChecklistView {
    pub period: String,
    pub items: Vec<ChecklistItemView>,
    pub gate_satisfied: bool,
    #[serde(flatten)]
    pub auto_check: AutoCheckRun,
}

impl<S, F> MonthEndCloseService<S, F>
where
    S: CloseStore + 'static,
    F: OperationalDataFeed + 'static,
{
    pub fn new(store: Arc<S>, feed: Arc<F>) -> Self {
        let checklist = Arc::new(ChecklistEngine::new(store.clone(), feed.clone()));
        Self {
            periods: PeriodLifecycleManager::new(store.clone()),
            closer: CloseTransaction::new(store.clone(), checklist.clone()),
            reports: ReportPackAssembler::new(feed, checklist.clone()),
            checklist,
            store,
        }
    }

    pub fn create_period(&self, year: i32, month: u32) -> Result<PeriodView, CloseError> {
        let key = PeriodKey::new(year, month)?;
        let period = self.periods.create_period(key)?;
        Ok(PeriodView::from_period(&period))
    }

    pub fn period_status(
        &self,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<PeriodStatusView, CloseError> {
        let key = PeriodKey::new(year, month)?;
        let period = self
            .periods
            .get_or_none(key)?
            .ok_or(CloseError::PeriodNotFound(key))?;
        let items = self.checklist.load_items(key)?;
        Ok(PeriodStatusView {
            period: PeriodView::from_period(&period),
            readiness: close_readiness(&period, &items, today),
        })
    }

    /// The checklist as seen when an operator opens the period view: auto
    /// checks run first (a no-op on Closed periods), then the refreshed
    /// item list is returned together with the gate state.
    pub fn checklist_view(
        &self,
        year: i32,
        month: u32,
        now: NaiveDateTime,
    ) -> Result<ChecklistView, CloseError> {
        let key = PeriodKey::new(year, month)?;
        let auto_check = self.checklist.apply_auto_checks(key, now)?;
        let items = self.checklist.load_items(key)?;
        let gate_satisfied = !items.is_empty() && items.iter().all(|item| item.is_completed);
        Ok(ChecklistView {
            period: key.to_string(),
            items: items.iter().map(|item| item.to_view()).collect(),
            gate_satisfied,
            auto_check,
        })
    }

    pub fn toggle_item(
        &self,
        year: i32,
        month: u32,
        item_name: &str,
        completed: bool,
        actor: &str,
        now: NaiveDateTime,
    ) -> Result<ChecklistItemView, CloseError> {
        let key = PeriodKey::new(year, month)?;
        let record = self
            .checklist
            .toggle_manual(key, item_name, completed, actor, now)?;
        Ok(record.to_view())
    }

    pub fn run_auto_checks(
        &self,
        year: i32,
        month: u32,
        now: NaiveDateTime,
    ) -> Result<AutoCheckRun, CloseError> {
        let key = PeriodKey::new(year, month)?;
        self.checklist.apply_auto_checks(key, now)
    }

    pub fn close_month(
        &self,
        year: i32,
        month: u32,
        signed_by: &str,
        notes: Option<String>,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<CloseOutcome, CloseError> {
        let key = PeriodKey::new(year, month)?;
        self.closer.close(key, signed_by, notes, today, now)
    }

    pub fn generate_report_pack(
        &self,
        year: i32,
        month: u32,
        sections: &[ReportSection],
        actor: &str,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<ReportPackOutcome, CloseError> {
        let key = PeriodKey::new(year, month)?;
        self.reports.assemble(key, sections, actor, today, now)
    }

    pub fn sign_offs(&self, year: i32, month: u32) -> Result<Vec<SignOffRecord>, CloseError> {
        let key = PeriodKey::new(year, month)?;
        Ok(self.store.sign_offs(key)?)
    }
}
