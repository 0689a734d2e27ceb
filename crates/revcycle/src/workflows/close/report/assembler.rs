use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::render::{render_section_page, ReportPack};
use super::sections::ReportSection;
use crate::workflows::close::checklist::ChecklistEngine;
use crate::workflows::close::domain::{CloseError, PeriodKey};
use crate::workflows::close::feed::OperationalDataFeed;
use crate::workflows::close::store::CloseStore;
use crate::workflows::close::template::REPORT_DOWNLOAD_ITEM;

/// Pulls the selected per-period datasets from the operational feed,
/// renders the multi-section artifact, and notifies the checklist engine
/// on success. A partial report beats no report: per-section failures
/// become warnings, never aborts.
pub struct ReportPackAssembler<S, F> {
    feed: Arc<F>,
    checklist: Arc<ChecklistEngine<S, F>>,
}

#[derive(Debug)]
pub struct ReportPackOutcome {
    pub pack: ReportPack,
    pub warnings: Vec<ReportWarning>,
}

/// Non-fatal problems encountered while assembling a pack, surfaced
/// alongside the successful artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    SectionUnavailable {
        section: ReportSection,
        detail: String,
    },
    ChecklistNotUpdated {
        detail: String,
    },
}

impl fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportWarning::SectionUnavailable { section, detail } => {
                write!(f, "section '{}' omitted: {}", section.label(), detail)
            }
            ReportWarning::ChecklistNotUpdated { detail } => {
                write!(f, "checklist was not updated: {}", detail)
            }
        }
    }
}

impl<S, F> ReportPackAssembler<S, F>
where
    S: CloseStore,
    F: OperationalDataFeed,
{
    pub fn new(feed: Arc<F>, checklist: Arc<ChecklistEngine<S, F>>) -> Self {
        Self { feed, checklist }
    }

    /// Assemble the pack for the period from the caller's section
    /// selection. Sections render in catalogue order regardless of
    /// request order; duplicates collapse. Empty datasets render as
    /// "no records" pages. After a successful render the
    /// "Download reports" checklist item is completed best-effort.
    pub fn assemble(
        &self,
        key: PeriodKey,
        selected: &[ReportSection],
        actor: &str,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<ReportPackOutcome, CloseError> {
        if selected.is_empty() {
            return Err(CloseError::NoSectionsSelected);
        }
        let wanted: BTreeSet<ReportSection> = selected.iter().copied().collect();

        let mut pages = Vec::new();
        let mut warnings = Vec::new();
        for section in ReportSection::ordered() {
            if !wanted.contains(&section) {
                continue;
            }
            match self.feed.section_rows(key, section) {
                Ok(rows) => {
                    pages.push(render_section_page(pages.len() + 1, section, key, rows));
                }
                Err(err) => warnings.push(ReportWarning::SectionUnavailable {
                    section,
                    detail: err.to_string(),
                }),
            }
        }

        let pack = ReportPack {
            period: key,
            title: format!("Month-End Report Pack, {}", key.month_label()),
            generated_on: today,
            pages,
        };

        // Best-effort: the artifact has already been produced, so a
        // checklist failure is a warning, not a rollback. No period for
        // the month means there is nothing to update.
        match self
            .checklist
            .mark_completed_by_artifact(key, REPORT_DOWNLOAD_ITEM, actor, now)
        {
            Ok(()) => {}
            Err(CloseError::PeriodNotFound(_)) => {}
            Err(err) => warnings.push(ReportWarning::ChecklistNotUpdated {
                detail: err.to_string(),
            }),
        }

        Ok(ReportPackOutcome { pack, warnings })
    }
}
