use crate::inventory::{CollectorFailure, FailureKind};
use core::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

const NOT_AUTHORIZED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
    "AuthorizationError",
    "UnauthorizedException",
];

const AUTH_FAILURE_CODES: &[&str] = &[
    "AuthFailure",
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidClientTokenId",
    "UnrecognizedClientException",
    "SignatureDoesNotMatch",
    "MissingAuthenticationToken",
];

const NOT_FOUND_CODES: &[&str] = &[
    "AWSOrganizationsNotInUseException",
    "ResourceNotFoundException",
    "NoSuchEntity",
    "OptInRequired",
    "SubscriptionRequiredException",
    "InvalidAction",
];

const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded", "TooManyRequestsException"];

const UNAVAILABLE_CODES: &[&str] = &["ServiceUnavailable", "InternalError", "InternalFailure"];

/// An error reported by the provider for a single API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderError {
    /// The provider's error code, e.g. `AccessDenied`.
    pub code: String,

    #[serde(default)]
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Classify the error code into the failure taxonomy.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        let code = self.code.as_str();
        if NOT_AUTHORIZED_CODES.contains(&code) {
            FailureKind::NotAuthorized
        } else if AUTH_FAILURE_CODES.contains(&code) {
            FailureKind::AuthFailure
        } else if NOT_FOUND_CODES.contains(&code) {
            FailureKind::NotFoundOrDisabled
        } else if THROTTLING_CODES.contains(&code) || UNAVAILABLE_CODES.contains(&code) {
            FailureKind::ServiceUnavailable
        } else {
            FailureKind::Unknown
        }
    }

    /// Returns `true` when the provider is asking callers to slow down.
    #[must_use]
    pub fn is_throttling(&self) -> bool {
        THROTTLING_CODES.contains(&self.code.as_str())
    }

    /// Convert into a collector failure, prefixing the message with `context`.
    #[must_use]
    pub fn to_failure(&self, context: &str) -> CollectorFailure {
        CollectorFailure::new(self.failure_kind(), format!("{context}: {self}"))
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl core::error::Error for ProviderError {}
