use crate::inventory::{Account, CollectorFailure, CollectorResult, FailureKind, Region};

/// Identity of one scheduled task: an (account, region) pair and its position in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskKey {
    /// Position in plan order (accounts outer, regions inner).
    pub ordinal: usize,
    pub account: Account,
    pub region: Region,
}

/// Terminal state of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Credentials were resolved and every collector ran to completion.
    Succeeded,

    /// The task could not run its collectors: credential failure, cancellation or a driver crash.
    Failed(CollectorFailure),

    /// The task's budget elapsed before every collector finished.
    TimedOut,
}

/// How a settled task counts in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    /// Every collector produced data, or failed only because its feature is not in use.
    Succeeded,
    PartiallyFailed,
    Failed,
    TimedOut,
    Cancelled,
}

/// Everything one task produced.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub key: TaskKey,
    pub state: TaskState,

    /// Results of the collectors that completed, in registry order.
    pub results: Vec<(&'static str, CollectorResult)>,
}

impl TaskReport {
    #[must_use]
    pub const fn failed(key: TaskKey, failure: CollectorFailure) -> Self {
        Self {
            key,
            state: TaskState::Failed(failure),
            results: Vec::new(),
        }
    }

    #[must_use]
    pub fn cancelled(key: TaskKey) -> Self {
        Self::failed(key, CollectorFailure::new(FailureKind::Cancelled, "run cancelled before the task started"))
    }

    /// Classify the task for the summary.
    #[must_use]
    pub fn outcome(&self) -> TaskOutcome {
        match &self.state {
            TaskState::TimedOut => TaskOutcome::TimedOut,
            TaskState::Failed(failure) if failure.kind == FailureKind::Cancelled => TaskOutcome::Cancelled,
            TaskState::Failed(_) => TaskOutcome::Failed,
            TaskState::Succeeded => {
                let clean = self
                    .results
                    .iter()
                    .all(|(_, result)| result.failure().is_none_or(|failure| failure.kind.is_benign()));
                if clean {
                    TaskOutcome::Succeeded
                } else {
                    TaskOutcome::PartiallyFailed
                }
            }
        }
    }
}

/// The account × region cross product in plan order.
#[must_use]
pub fn plan(accounts: &[Account], regions: &[Region]) -> Vec<TaskKey> {
    accounts
        .iter()
        .flat_map(|account| regions.iter().map(move |region| (account, region)))
        .enumerate()
        .map(|(ordinal, (account, region))| TaskKey {
            ordinal,
            account: account.clone(),
            region: region.clone(),
        })
        .collect()
}
