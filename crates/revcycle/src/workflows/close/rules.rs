use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::domain::PeriodKey;
use super::feed::OperationalDataFeed;
use super::template::AutoCheckSignal;

/// Outcome of one auto-check predicate. `Unknown` means the operational
/// feed could not answer; it must never be collapsed into either concrete
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleVerdict {
    Satisfied,
    Unsatisfied,
    Unknown,
}

impl RuleVerdict {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Satisfied => "Satisfied",
            Self::Unsatisfied => "Unsatisfied",
            Self::Unknown => "Unknown",
        }
    }
}

/// Pure predicates over the operational feed. Each rule only reads, so
/// re-evaluating any number of times is safe and side-effect free.
pub struct AutoCheckRuleSet<F> {
    feed: Arc<F>,
}

impl<F> AutoCheckRuleSet<F>
where
    F: OperationalDataFeed,
{
    pub fn new(feed: Arc<F>) -> Self {
        Self { feed }
    }

    /// Evaluate every signal for the period. Signals are independent: a
    /// feed failure poisons only its own verdict.
    pub fn evaluate(&self, period: PeriodKey) -> BTreeMap<AutoCheckSignal, RuleVerdict> {
        AutoCheckSignal::ordered()
            .into_iter()
            .map(|signal| (signal, self.verdict(period, signal)))
            .collect()
    }

    fn verdict(&self, period: PeriodKey, signal: AutoCheckSignal) -> RuleVerdict {
        let count = match signal {
            AutoCheckSignal::UnsubmittedClaims => self.feed.unsubmitted_claim_count(period),
            AutoCheckSignal::UnresolvedDenials => self.feed.unresolved_denial_count(period),
            AutoCheckSignal::UnreconciledPayments => self.feed.unreconciled_payment_count(period),
        };

        match count {
            Ok(0) => RuleVerdict::Satisfied,
            Ok(_) => RuleVerdict::Unsatisfied,
            Err(_) => RuleVerdict::Unknown,
        }
    }
}
