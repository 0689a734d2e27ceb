use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::domain::{ChecklistItemRecord, CloseError, Period, PeriodKey};
use super::feed::OperationalDataFeed;
use super::rules::{AutoCheckRuleSet, RuleVerdict};
use super::store::CloseStore;
use super::template::AutoCheckSignal;

/// Actor recorded on completions produced by the auto-check engine.
pub const SYSTEM_ACTOR: &str = "system";

/// Owns checklist state for a period: applies auto-check verdicts
/// idempotently, handles manual toggles, and computes the close gate.
pub struct ChecklistEngine<S, F> {
    store: Arc<S>,
    rules: AutoCheckRuleSet<F>,
}

/// What one auto-check pass actually did, so callers can surface newly
/// completed items and feed outages.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct AutoCheckRun {
    pub newly_completed: Vec<&'static str>,
    pub unknown_signals: Vec<AutoCheckSignal>,
}

/// Sanitized representation of a checklist item for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItemView {
    pub name: &'static str,
    pub description: &'static str,
    pub auto_checked: bool,
    pub sort_order: u16,
    pub is_completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub completed_by: Option<String>,
    pub status_label: &'static str,
}

impl ChecklistItemRecord {
    pub fn to_view(&self) -> ChecklistItemView {
        ChecklistItemView {
            name: self.template.name,
            description: self.template.description,
            auto_checked: self.template.auto_check.is_some(),
            sort_order: self.template.sort_order,
            is_completed: self.is_completed,
            completed_at: self.completed_at,
            completed_by: self.completed_by.clone(),
            status_label: if self.is_completed {
                "Complete"
            } else {
                "Outstanding"
            },
        }
    }
}

impl<S, F> ChecklistEngine<S, F>
where
    S: CloseStore,
    F: OperationalDataFeed,
{
    pub fn new(store: Arc<S>, feed: Arc<F>) -> Self {
        Self {
            store,
            rules: AutoCheckRuleSet::new(feed),
        }
    }

    /// Checklist records for the period, sorted by template sort order.
    pub fn load_items(&self, key: PeriodKey) -> Result<Vec<ChecklistItemRecord>, CloseError> {
        let mut items = self.require_items(key)?;
        items.sort_by_key(|item| item.template.sort_order);
        Ok(items)
    }

    /// Complete every auto-checkable item whose rule is currently
    /// satisfied. Monotonic: a completed item is never reverted, so a
    /// second pass with unchanged data is a no-op. An entire no-op when
    /// the period is Closed.
    pub fn apply_auto_checks(
        &self,
        key: PeriodKey,
        now: NaiveDateTime,
    ) -> Result<AutoCheckRun, CloseError> {
        let period = self.require_period(key)?;
        if period.is_closed() {
            return Ok(AutoCheckRun::default());
        }

        let verdicts = self.rules.evaluate(key);
        let mut run = AutoCheckRun {
            newly_completed: Vec::new(),
            unknown_signals: verdicts
                .iter()
                .filter(|(_, verdict)| **verdict == RuleVerdict::Unknown)
                .map(|(signal, _)| *signal)
                .collect(),
        };

        for item in self.load_items(key)? {
            if item.is_completed {
                continue;
            }
            let Some(signal) = item.template.auto_check else {
                continue;
            };
            if verdicts.get(&signal) == Some(&RuleVerdict::Satisfied) {
                let mut updated = item.clone();
                updated.mark_completed(now, SYSTEM_ACTOR);
                self.store.update_item(key, updated)?;
                run.newly_completed.push(item.template.name);
            }
        }

        Ok(run)
    }

    /// Flip a manual item's completion state. Auto-managed items and
    /// Closed periods are refused.
    pub fn toggle_manual(
        &self,
        key: PeriodKey,
        item_name: &str,
        completed: bool,
        actor: &str,
        now: NaiveDateTime,
    ) -> Result<ChecklistItemRecord, CloseError> {
        let period = self.require_period(key)?;
        if period.is_closed() {
            return Err(CloseError::PeriodClosed(key));
        }

        let mut item = self.require_item(key, item_name)?;
        if item.is_auto() {
            return Err(CloseError::ItemIsAutoManaged {
                name: item.template.name.to_owned(),
            });
        }

        if completed {
            item.mark_completed(now, actor);
        } else {
            item.clear_completion();
        }
        self.store.update_item(key, item.clone())?;
        Ok(item)
    }

    /// Artifact-driven completion used by the report assembler. Same
    /// semantics as a manual completion but attributable to an automated
    /// action. Idempotent: an already-completed item is a no-op even on a
    /// Closed period, so historical re-renders stay warning-free.
    pub fn mark_completed_by_artifact(
        &self,
        key: PeriodKey,
        item_name: &str,
        actor: &str,
        now: NaiveDateTime,
    ) -> Result<(), CloseError> {
        let period = self.require_period(key)?;
        let mut item = self.require_item(key, item_name)?;
        if item.is_completed {
            return Ok(());
        }
        if period.is_closed() {
            return Err(CloseError::PeriodClosed(key));
        }
        if item.is_auto() {
            return Err(CloseError::ItemIsAutoManaged {
                name: item.template.name.to_owned(),
            });
        }

        item.mark_completed(now, actor);
        self.store.update_item(key, item)?;
        Ok(())
    }

    /// True iff the item set is non-empty and every item is complete. An
    /// empty checklist gates as not satisfied, never vacuously true.
    pub fn is_gate_satisfied(&self, key: PeriodKey) -> Result<bool, CloseError> {
        let items = self.require_items(key)?;
        Ok(!items.is_empty() && items.iter().all(|item| item.is_completed))
    }

    /// Names of items still outstanding, in sort order, for error
    /// payloads that must tell the operator what remains.
    pub fn incomplete_items(&self, key: PeriodKey) -> Result<Vec<String>, CloseError> {
        Ok(self
            .load_items(key)?
            .into_iter()
            .filter(|item| !item.is_completed)
            .map(|item| item.template.name.to_owned())
            .collect())
    }

    fn require_period(&self, key: PeriodKey) -> Result<Period, CloseError> {
        self.store
            .fetch_period(key)?
            .ok_or(CloseError::PeriodNotFound(key))
    }

    fn require_items(&self, key: PeriodKey) -> Result<Vec<ChecklistItemRecord>, CloseError> {
        self.store
            .checklist(key)?
            .ok_or(CloseError::PeriodNotFound(key))
    }

    fn require_item(
        &self,
        key: PeriodKey,
        item_name: &str,
    ) -> Result<ChecklistItemRecord, CloseError> {
        self.require_items(key)?
            .into_iter()
            .find(|item| item.template.name == item_name)
            .ok_or_else(|| CloseError::ItemNotFound {
                period: key,
                name: item_name.to_owned(),
            })
    }
}
