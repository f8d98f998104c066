use super::{ApiRequest, CloudApi, CredentialSource, ProviderError, Service};
use crate::Result;
use crate::inventory::Credentials;
use camino::Utf8Path;
use core::time::Duration;
use futures::future::BoxFuture;
use ohno::{IntoAppError, app_err};
use serde::Deserialize;
use std::fs;

const LOG_TARGET: &str = "    replay";

/// Error code returned when a call has no matching recording.
pub const NO_RECORDED_RESPONSE: &str = "NoRecordedResponse";

/// A provider that answers from a recording instead of the network.
///
/// A recording lists credential outcomes and API responses. A call is answered by the first
/// response entry whose service and operation match and whose optional `account`, `region`
/// and `params` filters also match. Calls with no match fail with `NoRecordedResponse`.
///
/// ```toml
/// [ambient.credentials]
/// access_key_id = "AKIA..."
/// secret_access_key = "..."
///
/// [[roles]]
/// role_arn = "arn:aws:iam::222222222222:role/Audit"
/// error = { code = "AccessDenied", message = "not trusted" }
///
/// [[responses]]
/// service = "ec2"
/// operation = "DescribeVpcs"
/// region = "us-east-1"
/// response = { Vpcs = [] }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayProvider {
    #[serde(default)]
    ambient: Option<RecordedCredentials>,

    #[serde(default)]
    roles: Vec<RecordedRole>,

    #[serde(default)]
    responses: Vec<RecordedResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordedCredentials {
    #[serde(default)]
    credentials: Option<Credentials>,

    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordedRole {
    role_arn: String,

    #[serde(default)]
    credentials: Option<Credentials>,

    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordedResponse {
    service: Service,
    operation: String,

    #[serde(default)]
    account: Option<String>,

    #[serde(default)]
    region: Option<String>,

    #[serde(default)]
    params: Option<serde_json::Value>,

    #[serde(default)]
    response: Option<serde_json::Value>,

    #[serde(default)]
    error: Option<ProviderError>,

    /// Simulated latency in milliseconds.
    #[serde(default)]
    delay_ms: u64,
}

fn credential_outcome(credentials: Option<&Credentials>, error: Option<&ProviderError>, what: &str) -> Result<Credentials, ProviderError> {
    if let Some(error) = error {
        return Err(error.clone());
    }

    credentials
        .cloned()
        .ok_or_else(|| ProviderError::new(NO_RECORDED_RESPONSE, format!("recording for {what} has neither credentials nor error")))
}

impl RecordedResponse {
    fn matches(&self, request: &ApiRequest<'_>) -> bool {
        self.service == request.service
            && self.operation == request.operation
            && self.account.as_deref().is_none_or(|a| a == request.account.id)
            && self.region.as_deref().is_none_or(|r| r == request.region.as_str())
            && self.params.as_ref().is_none_or(|p| *p == request.params)
    }

    fn outcome(&self) -> Result<serde_json::Value, ProviderError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        Ok(self.response.clone().unwrap_or(serde_json::Value::Null))
    }
}

impl ReplayProvider {
    /// Load a recording from a TOML, YAML or JSON file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading replay recording from {path}"))?;

        let extension = path.extension().unwrap_or_default();
        let provider: Self = match extension {
            "toml" => toml::from_str(&text).into_app_err_with(|| format!("parsing TOML recording from {path}"))?,
            "yml" | "yaml" => serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing YAML recording from {path}"))?,
            "json" => serde_json::from_str(&text).into_app_err_with(|| format!("parsing JSON recording from {path}"))?,
            _ => return Err(app_err!("unsupported recording file extension: {extension}")),
        };

        log::info!(
            target: LOG_TARGET,
            "Loaded {} recorded responses and {} role outcomes from {path}",
            provider.responses.len(),
            provider.roles.len()
        );

        Ok(provider)
    }

    /// Parse a recording from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid recording.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).into_app_err("parsing JSON recording")
    }

    fn replay_credentials() -> Credentials {
        Credentials {
            access_key_id: "REPLAYACCESSKEY".to_string(),
            secret_access_key: "replay-secret".to_string(),
            session_token: None,
            expiration: None,
        }
    }
}

impl CloudApi for ReplayProvider {
    fn call<'a>(&'a self, request: ApiRequest<'a>) -> BoxFuture<'a, Result<serde_json::Value, ProviderError>> {
        Box::pin(async move {
            let Some(entry) = self.responses.iter().find(|r| r.matches(&request)) else {
                log::debug!(
                    target: LOG_TARGET,
                    "No recorded response for {}:{} in {} {}",
                    request.service,
                    request.operation,
                    request.account.id,
                    request.region
                );
                return Err(ProviderError::new(
                    NO_RECORDED_RESPONSE,
                    format!("{}:{} in {} {}", request.service, request.operation, request.account.id, request.region),
                ));
            };

            if entry.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(entry.delay_ms)).await;
            }

            entry.outcome()
        })
    }
}

impl CredentialSource for ReplayProvider {
    fn ambient(&self) -> BoxFuture<'_, Result<Credentials, ProviderError>> {
        Box::pin(async move {
            self.ambient
                .as_ref()
                .map_or_else(|| Ok(Self::replay_credentials()), |recorded| {
                    credential_outcome(recorded.credentials.as_ref(), recorded.error.as_ref(), "the ambient identity")
                })
        })
    }

    fn assume_role<'a>(&'a self, role_arn: &'a str, _session_name: &'a str) -> BoxFuture<'a, Result<Credentials, ProviderError>> {
        Box::pin(async move {
            match self.roles.iter().find(|r| r.role_arn == role_arn) {
                Some(recorded) => credential_outcome(recorded.credentials.as_ref(), recorded.error.as_ref(), role_arn),
                None => Err(ProviderError::new("AccessDenied", format!("no recorded role assumption for {role_arn}"))),
            }
        })
    }
}
