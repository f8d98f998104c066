//! Bounded-parallel execution of inventory tasks
//!
//! A run is the cross product of accounts × regions. Each pair becomes one task that resolves
//! the account's credentials through the shared [`CredentialResolver`] and then runs every
//! registered collector in registry order. Tasks run concurrently, at most
//! [`RunSettings::max_concurrency`] at a time, with worker slots handed out by the [`Throttler`].
//!
//! # Failure isolation
//!
//! Every task reaches exactly one terminal [`TaskState`]:
//!
//! - credential failures fail the task with `AuthFailure`, without affecting other accounts
//! - a task whose budget elapses is `TimedOut`, keeping the results of collectors that finished
//! - a panic in the task driver fails the task with `Unknown`
//! - tasks never started because the run was cancelled fail with `Cancelled`
//!
//! Collector failures never fail a task. They are values in the task's results.
//!
//! [`run`] returns the reports in plan order once all tasks settled.

mod credential_resolver;
mod executor;
mod progress;
mod run_context;
mod task;
mod task_tracker;
mod throttler;

pub use credential_resolver::CredentialResolver;
pub use executor::run;
pub use progress::{Progress, SilentProgress};
pub use run_context::{RunContext, RunSettings};
pub use task::{TaskKey, TaskOutcome, TaskReport, TaskState, plan};
pub use task_tracker::TaskTracker;
pub use throttler::Throttler;
