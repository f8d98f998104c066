use crate::inventory::FailureKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate counters for a run, computed once after every task settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Distinct accounts with at least one attempted task.
    pub accounts_scanned: usize,

    /// Distinct regions with at least one attempted task.
    pub regions_scanned: usize,

    pub tasks_total: usize,

    /// Tasks that were started, i.e. every task except the cancelled ones.
    pub tasks_attempted: usize,

    /// Tasks where every collector produced data.
    pub tasks_succeeded: usize,

    pub tasks_partially_failed: usize,
    pub tasks_failed: usize,
    pub tasks_timed_out: usize,
    pub tasks_cancelled: usize,

    /// Failed collector slots by kind, including slots filled in for failed or timed-out tasks.
    pub failures_by_kind: BTreeMap<FailureKind, usize>,

    pub generated_at: DateTime<Utc>,
}

impl RunSummary {
    /// Returns `true` if at least one task produced useful output.
    ///
    /// Partially failed tasks count: a partial inventory is still an inventory.
    #[must_use]
    pub const fn any_succeeded(&self) -> bool {
        self.tasks_succeeded + self.tasks_partially_failed > 0
    }

    /// Total failed collector slots across all kinds.
    #[must_use]
    pub fn total_failures(&self) -> usize {
        self.failures_by_kind.values().sum()
    }
}
