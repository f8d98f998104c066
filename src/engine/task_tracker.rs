//! Task counters for progress reporting.

use super::progress::Progress;
use super::task::TaskOutcome;
use core::sync::atomic::{AtomicU64, Ordering};
use owo_colors::OwoColorize;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    planned: AtomicU64,
    running: AtomicU64,
    succeeded: AtomicU64,
    partial: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
}

impl Counters {
    fn settled(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
            + self.partial.load(Ordering::Relaxed)
            + self.failed.load(Ordering::Relaxed)
            + self.timed_out.load(Ordering::Relaxed)
            + self.cancelled.load(Ordering::Relaxed)
    }
}

/// Counts tasks as they move through the run and feeds the progress display.
#[derive(Clone)]
pub struct TaskTracker {
    counters: Arc<Counters>,
}

impl core::fmt::Debug for TaskTracker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskTracker").field("counters", &self.counters).finish()
    }
}

impl TaskTracker {
    /// Create a tracker for `planned` tasks and register it with the progress reporter.
    #[must_use]
    pub fn new(progress: &Arc<dyn Progress>, planned: usize, use_colors: bool) -> Self {
        let counters = Arc::new(Counters::default());
        counters.planned.store(planned as u64, Ordering::Relaxed);

        let counters_clone = Arc::clone(&counters);
        progress.set_determinate(Box::new(move || Self::progress_reporter_callback(&counters_clone, use_colors)));

        Self { counters }
    }

    pub fn task_started(&self) {
        let _ = self.counters.running.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a settled task. `was_running` is `false` for tasks that never started.
    pub fn task_finished(&self, outcome: TaskOutcome, was_running: bool) {
        if was_running {
            let _ = self.counters.running.fetch_sub(1, Ordering::Relaxed);
        }

        let counter = match outcome {
            TaskOutcome::Succeeded => &self.counters.succeeded,
            TaskOutcome::PartiallyFailed => &self.counters.partial,
            TaskOutcome::Failed => &self.counters.failed,
            TaskOutcome::TimedOut => &self.counters.timed_out,
            TaskOutcome::Cancelled => &self.counters.cancelled,
        };
        let _ = counter.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn running(&self) -> u64 {
        self.counters.running.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn settled(&self) -> u64 {
        self.counters.settled()
    }

    /// Compute current progress state from counters.
    ///
    /// Returns (`total`, `settled`, `message`).
    fn progress_reporter_callback(counters: &Counters, use_colors: bool) -> (u64, u64, String) {
        let planned = counters.planned.load(Ordering::Relaxed);
        let settled = counters.settled();

        let mut parts = vec![
            format!("{settled}/{planned} tasks"),
            format!("{} running", counters.running.load(Ordering::Relaxed)),
        ];

        let problems = [
            (counters.partial.load(Ordering::Relaxed), "partial"),
            (counters.failed.load(Ordering::Relaxed), "failed"),
            (counters.timed_out.load(Ordering::Relaxed), "timed out"),
        ];

        for (count, label) in problems {
            if count > 0 {
                let text = format!("{count} {label}");
                parts.push(if use_colors { format!("{}", text.yellow()) } else { text });
            }
        }

        (planned, settled, parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SilentProgress;

    fn tracker(planned: usize) -> TaskTracker {
        TaskTracker::new(&(Arc::new(SilentProgress) as Arc<dyn Progress>), planned, false)
    }

    #[test]
    fn test_counts() {
        let tracker = tracker(4);
        tracker.task_started();
        tracker.task_started();
        assert_eq!(tracker.running(), 2);

        tracker.task_finished(TaskOutcome::Succeeded, true);
        tracker.task_finished(TaskOutcome::TimedOut, true);
        tracker.task_finished(TaskOutcome::Cancelled, false);

        assert_eq!(tracker.running(), 0);
        assert_eq!(tracker.settled(), 3);
    }

    #[test]
    fn test_message_without_problems() {
        let tracker = tracker(3);
        tracker.task_started();
        tracker.task_finished(TaskOutcome::Succeeded, true);

        let (total, current, message) = TaskTracker::progress_reporter_callback(&tracker.counters, false);
        assert_eq!((total, current), (3, 1));
        assert_eq!(message, "1/3 tasks, 0 running");
    }

    #[test]
    fn test_message_lists_problems() {
        let tracker = tracker(3);
        for outcome in [TaskOutcome::PartiallyFailed, TaskOutcome::Failed, TaskOutcome::TimedOut] {
            tracker.task_started();
            tracker.task_finished(outcome, true);
        }

        let (_, _, message) = TaskTracker::progress_reporter_callback(&tracker.counters, false);
        assert_eq!(message, "3/3 tasks, 0 running, 1 partial, 1 failed, 1 timed out");
    }
}
