use super::{CredentialResolver, Progress, SilentProgress};
use crate::collectors::Registry;
use crate::provider::{CloudApi, CredentialSource};
use core::time::Duration;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Execution limits for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Maximum number of tasks running at once.
    pub max_concurrency: usize,

    /// Wall-clock budget for one task, covering credential resolution and every collector.
    pub task_timeout: Duration,

    /// How long to stop dispatching new tasks after the provider throttles a call. Zero disables pausing.
    pub throttle_pause: Duration,

    /// Session name used for role assumption.
    pub session_name: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            task_timeout: Duration::from_secs(300),
            throttle_pause: Duration::from_secs(5),
            session_name: "cloud-runbook".to_string(),
        }
    }
}

/// Everything a run needs, passed explicitly to the engine.
///
/// The credential resolver is the only state shared between tasks. Cloning is cheap and all
/// clones share the same resolver and cancellation token.
#[derive(Clone)]
pub struct RunContext {
    pub resolver: Arc<CredentialResolver>,
    pub api: Arc<dyn CloudApi>,
    pub registry: Arc<Registry>,
    pub settings: RunSettings,
    pub cancel: CancellationToken,
    pub progress: Arc<dyn Progress>,
    pub use_colors: bool,
}

impl core::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RunContext")
            .field("resolver", &self.resolver)
            .field("api", &"<dyn CloudApi>")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .field("cancel", &self.cancel)
            .field("progress", &"<dyn Progress>")
            .finish()
    }
}

impl RunContext {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialSource>, api: Arc<dyn CloudApi>, registry: Registry, settings: RunSettings) -> Self {
        Self {
            resolver: Arc::new(CredentialResolver::new(credentials, settings.session_name.clone())),
            api,
            registry: Arc::new(registry),
            settings,
            cancel: CancellationToken::new(),
            progress: Arc::new(SilentProgress),
            use_colors: false,
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn Progress>, use_colors: bool) -> Self {
        self.progress = progress;
        self.use_colors = use_colors;
        self
    }
}
