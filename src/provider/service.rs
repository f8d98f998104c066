use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A provider service endpoint family.
///
/// The string form is the service's endpoint prefix, which is also what recordings use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Sts,
    Iam,
    Organizations,
    #[strum(serialize = "controltower")]
    #[serde(rename = "controltower")]
    ControlTower,
    Ec2,
    Route53,
    Rds,
    #[strum(serialize = "apigateway")]
    #[serde(rename = "apigateway")]
    ApiGateway,
    #[strum(serialize = "cloudfront")]
    #[serde(rename = "cloudfront")]
    CloudFront,
    Lambda,
    Sns,
    Backup,
    Events,
    Elbv2,
    Ecs,
    #[strum(serialize = "sso-admin")]
    #[serde(rename = "sso-admin")]
    SsoAdmin,
}

impl Service {
    /// Returns `true` for services served from a single global endpoint.
    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self, Self::Iam | Self::Organizations | Self::Route53 | Self::CloudFront)
    }
}
