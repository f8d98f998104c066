use super::{RunContext, TaskKey, TaskOutcome, TaskReport, TaskState, TaskTracker, Throttler, plan};
use crate::collectors::{CollectContext, invoke, panic_message};
use crate::inventory::{Account, CollectorFailure, Region};
use core::panic::AssertUnwindSafe;
use futures::FutureExt;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, timeout_at};

const LOG_TARGET: &str = "    engine";

/// Run every registered collector against every (account, region) pair.
///
/// The first region is each account's home region, where global collectors run. Returns one
/// report per pair in plan order once every task has settled. Cancelling the context's token
/// stops new tasks from starting; tasks already running finish or time out.
pub async fn run(ctx: &RunContext, accounts: &[Account], regions: &[Region]) -> Vec<TaskReport> {
    let Some(home_region) = regions.first() else {
        return Vec::new();
    };

    let keys = plan(accounts, regions);
    log::info!(
        target: LOG_TARGET,
        "Starting {} tasks ({} accounts, {} regions, {} collectors), {} at a time with a {}s budget each",
        keys.len(),
        accounts.len(),
        regions.len(),
        ctx.registry.len(),
        ctx.settings.max_concurrency,
        ctx.settings.task_timeout.as_secs()
    );

    ctx.progress.set_phase("Scanning");
    let tracker = TaskTracker::new(&ctx.progress, keys.len(), ctx.use_colors);
    let throttler = Throttler::new(ctx.settings.max_concurrency.max(1));

    let mut reports = Vec::with_capacity(keys.len());
    let mut started = Vec::with_capacity(keys.len());
    let mut join_set = JoinSet::new();
    let mut pending = keys.into_iter();
    let mut interrupted = false;

    for key in pending.by_ref() {
        let permit = if ctx.cancel.is_cancelled() {
            None
        } else {
            throttler.acquire(&ctx.cancel).await
        };

        let Some(permit) = permit else {
            tracker.task_finished(TaskOutcome::Cancelled, false);
            reports.push(TaskReport::cancelled(key));
            interrupted = true;
            break;
        };

        started.push(key.clone());

        let ctx = ctx.clone();
        let home_region = home_region.clone();
        let throttler = Arc::clone(&throttler);
        let tracker = tracker.clone();
        let _ = join_set.spawn(async move {
            let _permit = permit;
            tracker.task_started();
            let report = drive_guarded(&ctx, key, &home_region, &throttler).await;
            tracker.task_finished(report.outcome(), true);
            report
        });

        while let Some(joined) = join_set.try_join_next() {
            accept(joined, &mut reports);
        }
    }

    let never_started: Vec<_> = pending.collect();
    if interrupted {
        log::warn!(target: LOG_TARGET, "Run cancelled, {} tasks were not started", never_started.len() + 1);
    }

    for key in never_started {
        tracker.task_finished(TaskOutcome::Cancelled, false);
        reports.push(TaskReport::cancelled(key));
    }

    while let Some(joined) = join_set.join_next().await {
        accept(joined, &mut reports);
    }

    // A task that died without reporting still needs a terminal state
    let reported: HashSet<_> = reports.iter().map(|r| r.key.ordinal).collect();
    for key in started.into_iter().filter(|k| !reported.contains(&k.ordinal)) {
        let report = TaskReport::failed(key, CollectorFailure::unknown("task ended without reporting a result"));
        tracker.task_finished(report.outcome(), true);
        reports.push(report);
    }

    reports.sort_by_key(|r| r.key.ordinal);
    ctx.progress.done();

    log::info!(target: LOG_TARGET, "All {} tasks settled", reports.len());
    reports
}

fn accept(joined: Result<TaskReport, JoinError>, reports: &mut Vec<TaskReport>) {
    match joined {
        Ok(report) => reports.push(report),
        Err(e) => log::error!(target: LOG_TARGET, "A task could not be joined: {e}"),
    }
}

/// Drive a task, turning a panic outside the collectors into a failed task.
async fn drive_guarded(ctx: &RunContext, key: TaskKey, home_region: &Region, throttler: &Arc<Throttler>) -> TaskReport {
    let fallback = key.clone();
    match AssertUnwindSafe(drive(ctx, key, home_region, throttler)).catch_unwind().await {
        Ok(report) => report,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            log::error!(
                target: LOG_TARGET,
                "Task for {} {} panicked: {message}",
                fallback.account,
                fallback.region
            );
            TaskReport::failed(fallback, CollectorFailure::unknown(format!("task driver panicked: {message}")))
        }
    }
}

async fn drive(ctx: &RunContext, key: TaskKey, home_region: &Region, throttler: &Arc<Throttler>) -> TaskReport {
    log::debug!(target: LOG_TARGET, "Starting task for {} {}", key.account, key.region);
    let deadline = Instant::now() + ctx.settings.task_timeout;

    let credentials = match timeout_at(deadline, ctx.resolver.resolve(&key.account)).await {
        Ok(Ok(credentials)) => credentials,
        Ok(Err(failure)) => return TaskReport::failed(key, failure),
        Err(_elapsed) => {
            log::warn!(target: LOG_TARGET, "Task for {} {} timed out resolving credentials", key.account, key.region);
            return TaskReport {
                key,
                state: TaskState::TimedOut,
                results: Vec::new(),
            };
        }
    };

    let mut results = Vec::with_capacity(ctx.registry.len());
    let state = {
        let collect_ctx = CollectContext::new(ctx.api.as_ref(), &credentials, &key.account, &key.region, home_region);

        let mut state = TaskState::Succeeded;
        for collector in ctx.registry.iter() {
            let Ok(result) = timeout_at(deadline, invoke(collector.as_ref(), &collect_ctx)).await else {
                log::warn!(
                    target: LOG_TARGET,
                    "Task for {} {} timed out in collector '{}'",
                    key.account,
                    key.region,
                    collector.name()
                );
                state = TaskState::TimedOut;
                break;
            };

            results.push((collector.name(), result));

            if collect_ctx.take_throttled() && !ctx.settings.throttle_pause.is_zero() && throttler.pause_for(ctx.settings.throttle_pause) {
                log::info!(
                    target: LOG_TARGET,
                    "Provider throttled account {}, pausing dispatch for {}s",
                    key.account,
                    ctx.settings.throttle_pause.as_secs()
                );
            }
        }
        state
    };

    log::debug!(target: LOG_TARGET, "Finished task for {} {}", key.account, key.region);
    TaskReport { key, state, results }
}
