//! Resource collectors
//!
//! A [`Collector`] is a self-contained probe for one category of resources. Given a
//! [`CollectContext`] (resolved credentials, the account and the region) it returns a
//! [`CollectorResult`]. Provider errors, malformed responses and panics never escape a
//! collector: [`invoke`] turns all of them into `Failed` results with a typed kind.
//!
//! Collectors that need several calls to build their records may partially fail. They return
//! whatever they gathered and describe what is missing in the payload's notes.
//!
//! The [`Registry`] holds the collectors in report order.

use crate::inventory::{Account, CollectorFailure, CollectorResult, Credentials, Payload, Region};
use crate::provider::{ApiRequest, CloudApi, Service};
use core::panic::AssertUnwindSafe;
use core::sync::atomic::{AtomicBool, Ordering};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::any::Any;

const LOG_TARGET: &str = "collectors";

/// Declares a unit struct implementing [`Collector`] by delegating to an async function
/// returning `Result<Payload, CollectorFailure>`.
macro_rules! declare_collector {
    (
        $(#[$meta:meta])*
        $ty:ident {
            name: $name:literal,
            title: $title:literal,
            description: $description:literal,
            scope: $scope:ident,
            collect: $collect:path $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl $crate::collectors::Collector for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn title(&self) -> &'static str {
                $title
            }

            fn description(&self) -> &'static str {
                $description
            }

            fn scope(&self) -> $crate::collectors::Scope {
                $crate::collectors::Scope::$scope
            }

            fn collect<'a>(
                &'a self,
                ctx: &'a $crate::collectors::CollectContext<'a>,
            ) -> futures::future::BoxFuture<'a, $crate::inventory::CollectorResult> {
                Box::pin(async move { $crate::inventory::CollectorResult::from($collect(ctx).await) })
            }
        }
    };
}

mod account;
mod compute;
mod data;
mod messaging;
mod network;
mod registry;

pub use account::{AccountIdentity, ControlTower, IdentityCenter, Organizations};
pub use compute::{ContainerClusters, Functions, Instances};
pub use data::{BackupPlans, Databases};
pub use messaging::{EventRules, Topics};
pub use network::{ApiGateways, CdnDistributions, DnsZones, LoadBalancers, Network};
pub use registry::Registry;

/// Where a collector's resources live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Served from a global endpoint; collected once per account, in its home region.
    Global,

    /// Collected in every region.
    Regional,
}

/// A named probe for one category of resources.
pub trait Collector: Send + Sync {
    /// Unique, stable identifier.
    fn name(&self) -> &'static str;

    /// Section heading in reports.
    fn title(&self) -> &'static str;

    /// One-sentence description shown under the section heading.
    fn description(&self) -> &'static str;

    fn scope(&self) -> Scope;

    fn collect<'a>(&'a self, ctx: &'a CollectContext<'a>) -> BoxFuture<'a, CollectorResult>;
}

/// Everything a collector needs for one (account, region).
pub struct CollectContext<'a> {
    api: &'a dyn CloudApi,
    credentials: &'a Credentials,
    account: &'a Account,
    region: &'a Region,
    home_region: &'a Region,
    throttled: AtomicBool,
}

impl core::fmt::Debug for CollectContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CollectContext")
            .field("api", &"<dyn CloudApi>")
            .field("account", &self.account.id)
            .field("region", &self.region)
            .field("home_region", &self.home_region)
            .finish_non_exhaustive()
    }
}

impl<'a> CollectContext<'a> {
    #[must_use]
    pub const fn new(
        api: &'a dyn CloudApi,
        credentials: &'a Credentials,
        account: &'a Account,
        region: &'a Region,
        home_region: &'a Region,
    ) -> Self {
        Self {
            api,
            credentials,
            account,
            region,
            home_region,
            throttled: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn account(&self) -> &Account {
        self.account
    }

    #[must_use]
    pub const fn region(&self) -> &Region {
        self.region
    }

    /// Returns `true` if this context's region is the account's home region.
    #[must_use]
    pub fn is_home_region(&self) -> bool {
        self.region == self.home_region
    }

    /// Returns whether a call made through this context was throttled since the last check, and resets the flag.
    pub fn take_throttled(&self) -> bool {
        self.throttled.swap(false, Ordering::Relaxed)
    }

    /// Call a provider operation and deserialize its response.
    ///
    /// Provider errors are classified by their code. A response that does not have the expected
    /// shape becomes an `Unknown` failure.
    pub async fn call<T: DeserializeOwned>(
        &self,
        service: Service,
        operation: &'static str,
        params: serde_json::Value,
    ) -> Result<T, CollectorFailure> {
        let request = ApiRequest {
            credentials: self.credentials,
            account: self.account,
            region: self.region,
            service,
            operation,
            params,
        };

        let response = match self.api.call(request).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_throttling() {
                    self.throttled.store(true, Ordering::Relaxed);
                }
                return Err(e.to_failure(&format!("{service}:{operation}")));
            }
        };

        // An empty response is an empty object as far as the response shapes are concerned
        let response = if response.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            response
        };

        serde_json::from_value(response).map_err(|e| CollectorFailure::unknown(format!("malformed {service}:{operation} response: {e}")))
    }
}

/// Run one collector, turning a panic into an `Unknown` failure.
///
/// Global collectors outside the account's home region return an empty payload with a note instead of calling out.
pub async fn invoke(collector: &dyn Collector, ctx: &CollectContext<'_>) -> CollectorResult {
    if collector.scope() == Scope::Global && !ctx.is_home_region() {
        return CollectorResult::Found(
            Payload::default().with_note(format!("Global resource, collected in home region {}", ctx.home_region)),
        );
    }

    let result = AssertUnwindSafe(async { collector.collect(ctx).await }).catch_unwind().await;
    match result {
        Ok(result) => {
            if let CollectorResult::Failed(failure) = &result {
                log::debug!(
                    target: LOG_TARGET,
                    "Collector '{}' failed in {} {}: {failure}",
                    collector.name(),
                    ctx.account.id,
                    ctx.region
                );
            }
            result
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            log::error!(
                target: LOG_TARGET,
                "Collector '{}' panicked in {} {}: {message}",
                collector.name(),
                ctx.account.id,
                ctx.region
            );
            CollectorResult::Failed(CollectorFailure::unknown(format!("collector panicked: {message}")))
        }
    }
}

/// Extract a readable message from a panic payload.
#[must_use]
pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// The last `separator`-delimited segment of an ARN, used as a display name.
fn arn_suffix(arn: &str, separator: char) -> String {
    arn.rsplit(separator).next().unwrap_or(arn).to_string()
}


#[cfg(test)]
mod tests {
    use super::test_support::{CannedApi, Fixture};
    use super::*;
    use crate::inventory::FailureKind;
    use serde_json::json;

    declare_collector! {
        Exploding {
            name: "exploding",
            title: "Exploding",
            description: "Always panics.",
            scope: Regional,
            collect: explode,
        }
    }

    async fn explode(_ctx: &CollectContext<'_>) -> Result<Payload, CollectorFailure> {
        tokio::task::yield_now().await;
        panic!("malformed response");
    }

    #[tokio::test]
    async fn test_panic_becomes_unknown_failure() {
        let fixture = Fixture::new();
        let api = CannedApi::default();
        let result = invoke(&Exploding, &fixture.context(&api)).await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Unknown);
        assert_eq!(failure.message, "collector panicked: malformed response");
    }

    #[tokio::test]
    async fn test_global_collector_skipped_outside_home_region() {
        let fixture = Fixture::in_region("eu-west-1");
        let api = CannedApi::default();
        let result = invoke(&AccountIdentity, &fixture.context(&api)).await;

        let payload = result.payload().unwrap();
        assert!(payload.is_empty());
        assert!(payload.notes[0].contains("us-east-1"));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_call_classifies_errors_and_flags_throttling() {
        let fixture = Fixture::new();
        let api = CannedApi::default()
            .err(Service::Ec2, "DescribeVpcs", "ThrottlingException")
            .ok(Service::Sns, "ListTopics", json!({ "Topics": "not a list" }));
        let ctx = fixture.context(&api);

        let throttled = ctx
            .call::<serde_json::Value>(Service::Ec2, "DescribeVpcs", serde_json::Value::Null)
            .await
            .unwrap_err();
        assert_eq!(throttled.kind, FailureKind::ServiceUnavailable);
        assert!(ctx.take_throttled());
        assert!(!ctx.take_throttled());

        let malformed = ctx.call::<Vec<String>>(Service::Sns, "ListTopics", serde_json::Value::Null).await.unwrap_err();
        assert_eq!(malformed.kind, FailureKind::Unknown);
        assert!(malformed.message.starts_with("malformed sns:ListTopics response"));
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic payload");
    }

    #[test]
    fn test_arn_suffix() {
        assert_eq!(arn_suffix("arn:aws:sns:us-east-1:111111111111:alerts", ':'), "alerts");
        assert_eq!(arn_suffix("arn:aws:ecs:us-east-1:111111111111:cluster/prod", '/'), "prod");
        assert_eq!(arn_suffix("plain", '/'), "plain");
    }
}
