use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Limits concurrency and supports temporary pausing of task dispatch.
///
/// Wrap in an `Arc` via [`Throttler::new`], then call [`Throttler::acquire`] before
/// starting each task. At most `max_concurrent` tasks run simultaneously.
/// Any task can call [`Throttler::pause_for`] to temporarily halt dispatch of new tasks,
/// for example when the provider starts throttling requests.
///
/// When multiple tasks call [`Throttler::pause_for`] concurrently, the longest
/// pause wins and shorter pauses are ignored if a longer one is already active.
#[derive(Debug)]
pub struct Throttler {
    semaphore: Arc<Semaphore>,
    paused: AtomicBool,
    resume: Notify,
    /// When the current pause should expire.
    resume_at: Mutex<Option<Instant>>,
}

impl Throttler {
    /// Minimum extension required for a new pause to override an active one.
    const MIN_PAUSE_EXTENSION: Duration = Duration::from_secs(1);

    /// Create a new throttler that allows at most `max_concurrent` tasks at a time.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Arc<Self> {
        Arc::new(Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            paused: AtomicBool::new(false),
            resume: Notify::new(),
            resume_at: Mutex::new(None),
        })
    }

    /// Wait until unpaused, then acquire a worker slot.
    ///
    /// The returned permit must be held for the duration of the task. Returns `None` if
    /// `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<OwnedSemaphorePermit> {
        loop {
            // Created before checking the flag so a resume between the two is not missed
            let resumed = self.resume.notified();
            if self.paused.load(Ordering::Acquire) {
                tokio::select! {
                    () = resumed => continue,
                    () = cancel.cancelled() => return None,
                }
            }

            let permit = tokio::select! {
                permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok()?,
                () = cancel.cancelled() => return None,
            };

            // A pause may have started while waiting for the slot
            if self.paused.load(Ordering::Acquire) {
                drop(permit);
                continue;
            }

            return Some(permit);
        }
    }

    /// Returns whether the throttler is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause dispatching for `duration`, then automatically resume.
    ///
    /// Tasks already running are not interrupted. Callers waiting in [`acquire`](Self::acquire)
    /// stay parked until the duration elapses. Returns `true` only when a new pause is actually
    /// established, `false` if a similar or longer pause is already active.
    pub fn pause_for(self: &Arc<Self>, duration: Duration) -> bool {
        let new_resume_at = Instant::now() + duration;

        {
            let mut guard = self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
            if guard.is_some_and(|existing| existing + Self::MIN_PAUSE_EXTENSION >= new_resume_at) {
                return false;
            }
            *guard = Some(new_resume_at);
        }

        self.paused.store(true, Ordering::Release);
        let this = Arc::clone(self);
        drop(tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let should_resume = {
                let mut guard = this.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
                if guard.is_some_and(|t| Instant::now() >= t) {
                    *guard = None;
                    true
                } else {
                    false // a longer pause was scheduled after us
                }
            };

            if should_resume {
                this.paused.store(false, Ordering::Release);
                this.resume.notify_waiters();
            }
        }));

        true
    }
}
