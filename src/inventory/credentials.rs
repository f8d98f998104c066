use chrono::{DateTime, Utc};
use core::fmt::{Debug, Formatter};
use serde::Deserialize;

/// Short-lived credentials scoped to one account.
///
/// Credentials live only in memory for the duration of a run and are never serialized into reports.
/// The `Debug` implementation redacts the secret parts.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,

    #[serde(default)]
    pub session_token: Option<String>,

    /// When the credentials stop being valid. Ambient identities usually report no expiry.
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Returns `true` if the credentials carry an expiry at or before `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|expiration| expiration <= now)
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(expiration: Option<DateTime<Utc>>) -> Credentials {
        Credentials {
            access_key_id: "ASIAEXAMPLE".into(),
            secret_access_key: "very-secret".into(),
            session_token: Some("token-value".into()),
            expiration,
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_str = format!("{:?}", sample(None));
        assert!(debug_str.contains("ASIAEXAMPLE"));
        assert!(!debug_str.contains("very-secret"));
        assert!(!debug_str.contains("token-value"));
    }

    #[test]
    fn test_is_expired() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert!(!sample(None).is_expired(now));
        assert!(sample(Some(now)).is_expired(now));
        assert!(!sample(Some(now + chrono::Duration::hours(1))).is_expired(now));
    }
}
