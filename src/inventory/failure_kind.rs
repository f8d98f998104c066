use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Why a collector slot or a whole task produced no data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
pub enum FailureKind {
    /// Credential resolution failed, or the provider rejected the credentials.
    AuthFailure,

    /// The credentials are valid but lack permission for a specific API.
    NotAuthorized,

    /// The feature or service is not in use for this account or region.
    NotFoundOrDisabled,

    /// Transient provider-side problem, including throttling.
    ServiceUnavailable,

    /// The task exceeded its wall-clock budget before this slot completed.
    Timeout,

    /// The run was cancelled before the task was started.
    Cancelled,

    /// Anything else, including malformed responses and panics.
    Unknown,
}

impl FailureKind {
    /// Returns `true` for kinds that describe an absent feature rather than a real error.
    #[must_use]
    pub const fn is_benign(self) -> bool {
        matches!(self, Self::NotFoundOrDisabled)
    }
}
