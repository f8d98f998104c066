use super::{ProviderError, Service};
use crate::inventory::{Account, Credentials, Region};
use futures::future::BoxFuture;

/// One unary call against a provider service.
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    pub credentials: &'a Credentials,
    pub account: &'a Account,
    pub region: &'a Region,
    pub service: Service,

    /// The operation name as the provider spells it, e.g. `DescribeVpcs`.
    pub operation: &'static str,

    /// Operation parameters; `Value::Null` when there are none.
    pub params: serde_json::Value,
}

/// Access to the provider's list/describe APIs.
///
/// Implementations return the service's native response with pagination flattened.
pub trait CloudApi: Send + Sync {
    fn call<'a>(&'a self, request: ApiRequest<'a>) -> BoxFuture<'a, Result<serde_json::Value, ProviderError>>;
}

/// Source of credentials for the accounts being scanned.
pub trait CredentialSource: Send + Sync {
    /// The caller's ambient identity.
    fn ambient(&self) -> BoxFuture<'_, Result<Credentials, ProviderError>>;

    /// Exchange the ambient identity for credentials scoped to `role_arn`.
    fn assume_role<'a>(&'a self, role_arn: &'a str, session_name: &'a str) -> BoxFuture<'a, Result<Credentials, ProviderError>>;
}
