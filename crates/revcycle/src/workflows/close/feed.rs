use super::domain::PeriodKey;
use super::report::{ReportSection, SectionRow};

/// Read-only gateway to the operational claims/payments/denials
/// subsystem. Every call is scoped to one period month and is a fallible
/// network operation; implementations own their timeouts and surface them
/// as `FeedError::Timeout` rather than blocking indefinitely.
pub trait OperationalDataFeed: Send + Sync {
    /// Claims with a service date on or before the period's month end that
    /// have not yet been submitted to a payer.
    fn unsubmitted_claim_count(&self, period: PeriodKey) -> Result<u64, FeedError>;

    /// Denied claims from the period lacking a recorded resolution.
    fn unresolved_denial_count(&self, period: PeriodKey) -> Result<u64, FeedError>;

    /// Payments posted in the period not reconciled against a claim.
    fn unreconciled_payment_count(&self, period: PeriodKey) -> Result<u64, FeedError>;

    /// Dataset for one report section, scoped to the period's month. An
    /// empty vec is a valid result, not an error.
    fn section_rows(
        &self,
        period: PeriodKey,
        section: ReportSection,
    ) -> Result<Vec<SectionRow>, FeedError>;
}

/// Data-feed failure. Callers must not interpret a failed read as any
/// concrete count or dataset state.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("operational data feed unavailable: {0}")]
    Unavailable(String),
    #[error("operational data feed timed out after {0}s")]
    Timeout(u64),
}
