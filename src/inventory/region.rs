use crate::Result;
use core::fmt::{Display, Formatter};
use ohno::bail;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An opaque region identifier such as `us-east-1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(Arc<str>);

impl Region {
    /// Create a region, checking that the identifier is non-empty lowercase ASCII, digits and dashes.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier contains anything else.
    pub fn new(id: impl AsRef<str>) -> Result<Self> {
        let id = id.as_ref();
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
            bail!("region '{id}' is not a valid region identifier");
        }

        Ok(Self(Arc::from(id)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_standard_regions() {
        for id in ["us-east-1", "sa-east-1", "ap-southeast-2", "us-gov-west-1"] {
            assert_eq!(Region::new(id).unwrap().as_str(), id);
        }
    }

    #[test]
    fn test_rejects_empty_and_uppercase() {
        assert!(Region::new("").is_err());
        assert!(Region::new("US-EAST-1").is_err());
        assert!(Region::new("us east 1").is_err());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(Region::new("eu-west-1").unwrap() < Region::new("us-east-1").unwrap());
    }
}
