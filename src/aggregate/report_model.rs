use crate::inventory::{Account, CollectorResult, FailureKind, Region};
use serde::Serialize;

/// The aggregated inventory, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    /// Accounts in plan order.
    pub accounts: Vec<Account>,

    /// Regions in plan order.
    pub regions: Vec<Region>,

    /// How each (account, region) scan ended, in plan order.
    pub scans: Vec<PairStatus>,

    /// One section per collector, in registry order.
    pub sections: Vec<ReportSection>,
}

/// All results of one collector across the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub entries: Vec<SectionEntry>,
}

/// One collector's result for one (account, region).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionEntry {
    pub account: Account,
    pub region: Region,
    pub result: CollectorResult,
}

/// How the scan of one (account, region) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "kind", rename_all = "snake_case")]
pub enum ScanStatus {
    /// Every collector produced data.
    Complete,

    /// Every collector ran, and at least one failed for a reason other than a disabled feature.
    Partial,

    /// The task did not run its collectors.
    Failed(FailureKind),

    /// The task ran out of time.
    TimedOut,
}

impl ScanStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::Partial => "Partial",
            Self::Failed(FailureKind::Cancelled) => "Cancelled",
            Self::Failed(_) => "Failed",
            Self::TimedOut => "Timed out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairStatus {
    pub account: Account,
    pub region: Region,
    pub status: ScanStatus,

    /// Why the task failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ReportModel {
    /// Look up a section by collector name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}
