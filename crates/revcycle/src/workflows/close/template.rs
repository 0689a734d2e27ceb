use serde::Serialize;

use super::domain::ChecklistItemRecord;

/// Operational signal an auto-checkable item is tied to. Each signal maps
/// onto one aggregate count consumed from the claims/payments/denials
/// subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoCheckSignal {
    UnsubmittedClaims,
    UnresolvedDenials,
    UnreconciledPayments,
}

impl AutoCheckSignal {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::UnsubmittedClaims,
            Self::UnresolvedDenials,
            Self::UnreconciledPayments,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::UnsubmittedClaims => "Unsubmitted claims",
            Self::UnresolvedDenials => "Unresolved denials",
            Self::UnreconciledPayments => "Unreconciled payments",
        }
    }
}

/// Template definition of one required closing task.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub auto_check: Option<AutoCheckSignal>,
    pub sort_order: u16,
}

/// Name of the checklist item the report pack assembler completes as a
/// side effect of a successful render.
pub const REPORT_DOWNLOAD_ITEM: &str = "Download reports";

#[derive(Debug)]
pub struct ChecklistTemplate {
    items: Vec<ItemTemplate>,
}

impl ChecklistTemplate {
    pub fn standard() -> Self {
        Self {
            items: standard_item_templates(),
        }
    }

    pub fn items(&self) -> &[ItemTemplate] {
        &self.items
    }

    /// Instantiate the template into fresh, incomplete checklist records
    /// for a newly created period.
    pub fn instantiate(&self) -> Vec<ChecklistItemRecord> {
        self.items
            .iter()
            .cloned()
            .map(ChecklistItemRecord::from_template)
            .collect()
    }
}

fn standard_item_templates() -> Vec<ItemTemplate> {
    vec![
        ItemTemplate {
            name: "Submit outstanding claims",
            description: "Every claim with a service date inside the period has been submitted to its payer.",
            auto_check: Some(AutoCheckSignal::UnsubmittedClaims),
            sort_order: 10,
        },
        ItemTemplate {
            name: "Resolve denied claims",
            description: "Each denial received during the period carries a recorded resolution or appeal.",
            auto_check: Some(AutoCheckSignal::UnresolvedDenials),
            sort_order: 20,
        },
        ItemTemplate {
            name: "Reconcile posted payments",
            description: "All payments posted in the period are reconciled against their originating claims.",
            auto_check: Some(AutoCheckSignal::UnreconciledPayments),
            sort_order: 30,
        },
        ItemTemplate {
            name: "Review A/R aging",
            description: "A/R aging buckets reviewed and collection follow-ups assigned for balances over 90 days.",
            auto_check: None,
            sort_order: 40,
        },
        ItemTemplate {
            name: REPORT_DOWNLOAD_ITEM,
            description: "Month-end report pack generated and archived for the practice.",
            auto_check: None,
            sort_order: 50,
        },
        ItemTemplate {
            name: "Management sign-off review",
            description: "Billing manager has reviewed period totals and adjustments ahead of sign-off.",
            auto_check: None,
            sort_order: 60,
        },
    ]
}
