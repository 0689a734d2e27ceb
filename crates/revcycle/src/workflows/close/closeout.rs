use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::checklist::ChecklistEngine;
use super::domain::{CloseError, Period, PeriodKey, SignOffRecord};
use super::feed::OperationalDataFeed;
use super::store::{CloseStore, StoreError};

/// The atomic close: re-checks the gate against the latest committed
/// checklist state, then writes the sign-off and the status flip as one
/// all-or-nothing store operation.
pub struct CloseTransaction<S, F> {
    store: Arc<S>,
    checklist: Arc<ChecklistEngine<S, F>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloseOutcome {
    pub period: Period,
    pub sign_off: SignOffRecord,
}

impl<S, F> CloseTransaction<S, F>
where
    S: CloseStore,
    F: OperationalDataFeed,
{
    pub fn new(store: Arc<S>, checklist: Arc<ChecklistEngine<S, F>>) -> Self {
        Self { store, checklist }
    }

    /// Close the period. The gate is re-evaluated here rather than
    /// trusted from the caller's read, so a toggle racing the close
    /// request cannot slip an incomplete checklist past it.
    pub fn close(
        &self,
        key: PeriodKey,
        signed_by: &str,
        notes: Option<String>,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<CloseOutcome, CloseError> {
        let period = self
            .store
            .fetch_period(key)?
            .ok_or(CloseError::PeriodNotFound(key))?;
        if period.is_closed() {
            return Err(CloseError::PeriodAlreadyClosed(key));
        }

        if !self.checklist.is_gate_satisfied(key)? {
            return Err(CloseError::ChecklistIncomplete {
                period: key,
                remaining: self.checklist.incomplete_items(key)?,
            });
        }

        let sign_off = SignOffRecord {
            period: key,
            signed_by: signed_by.to_owned(),
            signed_at: now,
            notes,
        };

        let (period, sign_off) = self
            .store
            .finalize_close(key, today, sign_off)
            .map_err(|err| match err {
                // Losing racer of a concurrent close.
                StoreError::Conflict => CloseError::PeriodAlreadyClosed(key),
                StoreError::NotFound => CloseError::PeriodNotFound(key),
                other => CloseError::Store(other),
            })?;

        Ok(CloseOutcome { period, sign_off })
    }
}
