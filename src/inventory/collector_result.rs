use super::{FailureKind, Payload};
use core::fmt::{Display, Formatter};
use serde::Serialize;

/// A typed failure for one collector slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectorFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl CollectorFailure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unknown, message)
    }
}

impl Display for CollectorFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of running one collector against one (account, region).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum CollectorResult {
    /// The collector ran and produced a payload, possibly with notes about partial data.
    Found(Payload),

    /// The collector could not produce data.
    Failed(CollectorFailure),
}

impl CollectorResult {
    /// Returns `true` if the result is `Found`.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns the payload if `Found`.
    #[must_use]
    pub const fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Found(payload) => Some(payload),
            Self::Failed(_) => None,
        }
    }

    /// Returns the failure if `Failed`.
    #[must_use]
    pub const fn failure(&self) -> Option<&CollectorFailure> {
        match self {
            Self::Found(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// Returns a string describing the status of this result.
    #[must_use]
    pub const fn status_str(&self) -> &'static str {
        match self {
            Self::Found(_) => "Found",
            Self::Failed(_) => "Failed",
        }
    }
}

impl From<Result<Payload, CollectorFailure>> for CollectorResult {
    fn from(result: Result<Payload, CollectorFailure>) -> Self {
        match result {
            Ok(payload) => Self::Found(payload),
            Err(failure) => Self::Failed(failure),
        }
    }
}
