use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{ChecklistItemRecord, CloseError, Period, PeriodKey};
use super::store::{CloseStore, StoreError};
use super::template::ChecklistTemplate;

/// Owns period records: creation with standard checklist instantiation
/// and read access. The only status mutation lives in the close
/// transaction.
pub struct PeriodLifecycleManager<S> {
    store: Arc<S>,
    template: ChecklistTemplate,
}

impl<S> PeriodLifecycleManager<S>
where
    S: CloseStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            template: ChecklistTemplate::standard(),
        }
    }

    pub fn get_or_none(&self, key: PeriodKey) -> Result<Option<Period>, CloseError> {
        Ok(self.store.fetch_period(key)?)
    }

    /// Create the period in Open status and instantiate the standard
    /// checklist in the same logical operation.
    pub fn create_period(&self, key: PeriodKey) -> Result<Period, CloseError> {
        let period = Period::open(key);
        let items = self.template.instantiate();
        self.store
            .insert_period(period, items)
            .map_err(|err| match err {
                StoreError::Conflict => CloseError::PeriodAlreadyExists(key),
                other => CloseError::Store(other),
            })
    }

    /// Calendar days until the period's last day. Negative once the month
    /// has passed. Purely derived, never persisted.
    pub fn days_remaining(&self, period: &Period, today: NaiveDate) -> i64 {
        (period.key.last_day() - today).num_days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseUrgency {
    OnTrack,
    Monitor,
    AtRisk,
}

impl CloseUrgency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::Monitor => "Monitor",
            Self::AtRisk => "At Risk",
        }
    }
}

/// Derived close-progress snapshot callers use to drive urgency warnings.
#[derive(Debug, Clone, Serialize)]
pub struct CloseReadiness {
    pub completed_items: usize,
    pub total_items: usize,
    pub days_remaining: i64,
    pub urgency: CloseUrgency,
    pub urgency_label: &'static str,
    pub outstanding: Vec<String>,
}

pub fn close_readiness(
    period: &Period,
    items: &[ChecklistItemRecord],
    today: NaiveDate,
) -> CloseReadiness {
    let total_items = items.len();
    let completed_items = items.iter().filter(|item| item.is_completed).count();
    let outstanding: Vec<String> = items
        .iter()
        .filter(|item| !item.is_completed)
        .map(|item| item.template.name.to_owned())
        .collect();
    let days_remaining = (period.key.last_day() - today).num_days();

    let urgency = if period.is_closed() || outstanding.is_empty() {
        CloseUrgency::OnTrack
    } else if days_remaining <= 3 {
        CloseUrgency::AtRisk
    } else {
        CloseUrgency::Monitor
    };

    CloseReadiness {
        completed_items,
        total_items,
        days_remaining,
        urgency,
        urgency_label: urgency.label(),
        outstanding,
    }
}
