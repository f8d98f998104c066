use crate::Result;
use core::fmt::{Display, Formatter};
use ohno::bail;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static ACCOUNT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{12}$").expect("valid regex"));

static ROLE_ARN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^arn:aws[a-z-]*:iam::(\d{12}):role/[\w+=,.@/-]+$").expect("valid regex"));

/// An account to inventory, immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    /// The 12-digit account identifier.
    pub id: String,

    /// Role to assume in the account. When absent, the ambient identity is used directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,

    /// Human-friendly name shown in reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Account {
    /// Create a validated account.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier or role ARN is malformed.
    pub fn new(id: impl Into<String>, role_arn: Option<String>, alias: Option<String>) -> Result<Self> {
        let account = Self {
            id: id.into(),
            role_arn,
            alias,
        };
        account.validate()?;
        Ok(account)
    }

    /// Check the identifier shape and that the role ARN, if any, belongs to this account.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !ACCOUNT_ID.is_match(&self.id) {
            bail!("account id '{}' must be exactly 12 digits", self.id);
        }

        if let Some(arn) = &self.role_arn {
            let Some(captures) = ROLE_ARN.captures(arn) else {
                bail!("role ARN '{arn}' for account {} is not an IAM role ARN", self.id);
            };

            if &captures[1] != self.id.as_str() {
                bail!("role ARN '{arn}' belongs to account {}, not {}", &captures[1], self.id);
            }
        }

        Ok(())
    }

    /// The alias if one is configured, otherwise the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.id)
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} ({alias})", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}
