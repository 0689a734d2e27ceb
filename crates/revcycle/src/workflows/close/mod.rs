//! Month-end close workflow: the recurring accounting-period lifecycle
//! that gates closing a month behind a checklist, records an immutable
//! sign-off when the month closes, and assembles the month-end report
//! pack.
//!
//! Storage and the operational claims/payments/denials data live behind
//! the [`store::CloseStore`] and [`feed::OperationalDataFeed`] ports;
//! everything here is exercised against in-memory implementations in
//! tests and the API service.

pub mod checklist;
pub mod closeout;
pub mod domain;
pub mod feed;
pub mod lifecycle;
pub mod report;
pub mod router;
pub mod rules;
pub mod service;
pub mod store;
pub mod template;

#[cfg(test)]
mod tests;

pub use checklist::{AutoCheckRun, ChecklistEngine, ChecklistItemView, SYSTEM_ACTOR};
pub use closeout::{CloseOutcome, CloseTransaction};
pub use domain::{
    ChecklistItemRecord, CloseError, Period, PeriodKey, PeriodStatus, SignOffRecord,
};
pub use feed::{FeedError, OperationalDataFeed};
pub use lifecycle::{close_readiness, CloseReadiness, CloseUrgency, PeriodLifecycleManager};
pub use report::{
    ReportPack, ReportPackAssembler, ReportPackOutcome, ReportPage, ReportSection, ReportWarning,
    SectionRow,
};
pub use router::close_router;
pub use rules::{AutoCheckRuleSet, RuleVerdict};
pub use service::{ChecklistView, MonthEndCloseService, PeriodStatusView, PeriodView};
pub use store::{CloseStore, StoreError};
pub use template::{AutoCheckSignal, ChecklistTemplate, ItemTemplate, REPORT_DOWNLOAD_ITEM};
