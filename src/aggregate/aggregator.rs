use super::{PairStatus, ReportModel, ReportSection, RunSummary, ScanStatus, SectionEntry};
use crate::collectors::Registry;
use crate::engine::{TaskOutcome, TaskReport, TaskState};
use crate::inventory::{CollectorFailure, CollectorResult, FailureKind};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

/// Merge settled task reports into the report model and the run summary.
///
/// The output depends only on the inputs: sections follow registry order and entries follow
/// plan order, whatever order the reports arrive in.
#[must_use]
pub fn aggregate(registry: &Registry, reports: &[TaskReport], generated_at: DateTime<Utc>) -> (ReportModel, RunSummary) {
    let mut ordered: Vec<&TaskReport> = reports.iter().collect();
    ordered.sort_by_key(|r| r.key.ordinal);

    let sections: Vec<_> = registry
        .iter()
        .map(|collector| ReportSection {
            name: collector.name(),
            title: collector.title(),
            description: collector.description(),
            entries: ordered
                .iter()
                .map(|report| SectionEntry {
                    account: report.key.account.clone(),
                    region: report.key.region.clone(),
                    result: slot(report, collector.name()),
                })
                .collect(),
        })
        .collect();

    let scans = ordered
        .iter()
        .map(|report| PairStatus {
            account: report.key.account.clone(),
            region: report.key.region.clone(),
            status: scan_status(report),
            message: match &report.state {
                TaskState::Failed(failure) => Some(failure.message.clone()),
                TaskState::TimedOut | TaskState::Succeeded => None,
            },
        })
        .collect();

    let summary = summarize(&ordered, &sections, generated_at);

    let model = ReportModel {
        accounts: unique(ordered.iter().map(|r| &r.key.account)),
        regions: unique(ordered.iter().map(|r| &r.key.region)),
        scans,
        sections,
    };

    (model, summary)
}

/// The result for one collector slot, filled from the task state when the collector did not report.
fn slot(report: &TaskReport, collector: &str) -> CollectorResult {
    if let Some((_, result)) = report.results.iter().find(|(name, _)| *name == collector) {
        return result.clone();
    }

    let failure = match &report.state {
        TaskState::Failed(failure) => failure.clone(),
        TaskState::TimedOut => CollectorFailure::new(FailureKind::Timeout, "the task timed out before this collector completed"),
        TaskState::Succeeded => CollectorFailure::unknown("the collector did not report a result"),
    };

    CollectorResult::Failed(failure)
}

fn scan_status(report: &TaskReport) -> ScanStatus {
    match (&report.state, report.outcome()) {
        (TaskState::Failed(failure), _) => ScanStatus::Failed(failure.kind),
        (TaskState::TimedOut, _) => ScanStatus::TimedOut,
        (TaskState::Succeeded, TaskOutcome::Succeeded) => ScanStatus::Complete,
        (TaskState::Succeeded, _) => ScanStatus::Partial,
    }
}

fn summarize(reports: &[&TaskReport], sections: &[ReportSection], generated_at: DateTime<Utc>) -> RunSummary {
    let mut summary = RunSummary {
        accounts_scanned: 0,
        regions_scanned: 0,
        tasks_total: reports.len(),
        tasks_attempted: 0,
        tasks_succeeded: 0,
        tasks_partially_failed: 0,
        tasks_failed: 0,
        tasks_timed_out: 0,
        tasks_cancelled: 0,
        failures_by_kind: BTreeMap::new(),
        generated_at,
    };

    let mut accounts = HashSet::new();
    let mut regions = HashSet::new();

    for report in reports {
        let outcome = report.outcome();
        match outcome {
            TaskOutcome::Succeeded => summary.tasks_succeeded += 1,
            TaskOutcome::PartiallyFailed => summary.tasks_partially_failed += 1,
            TaskOutcome::Failed => summary.tasks_failed += 1,
            TaskOutcome::TimedOut => summary.tasks_timed_out += 1,
            TaskOutcome::Cancelled => summary.tasks_cancelled += 1,
        }

        if outcome != TaskOutcome::Cancelled {
            summary.tasks_attempted += 1;
            let _ = accounts.insert(report.key.account.id.as_str());
            let _ = regions.insert(report.key.region.as_str());
        }
    }

    summary.accounts_scanned = accounts.len();
    summary.regions_scanned = regions.len();

    for failure in sections.iter().flat_map(|s| &s.entries).filter_map(|e| e.result.failure()) {
        *summary.failures_by_kind.entry(failure.kind).or_default() += 1;
    }

    summary
}

fn unique<'a, T: Clone + PartialEq + 'a>(items: impl Iterator<Item = &'a T>) -> Vec<T> {
    let mut result: Vec<T> = Vec::new();
    for item in items {
        if !result.contains(item) {
            result.push(item.clone());
        }
    }
    result
}
