//! Collaborator interfaces to the cloud provider
//!
//! Collectors never talk to the provider directly. They go through [`CloudApi`], which takes
//! a resolved credential, a service and a region and returns the service's native response
//! as JSON with pagination already flattened. Credentials come from a [`CredentialSource`],
//! which either hands out the ambient identity or performs a role assumption.
//!
//! Failures at this boundary are [`ProviderError`]s carrying the provider's error code;
//! [`ProviderError::failure_kind`] classifies them into the run's failure taxonomy.
//!
//! [`ReplayProvider`] implements both traits over a recording file, which makes runs
//! reproducible without network access.

mod cloud_api;
mod provider_error;
mod replay;
mod service;

pub use cloud_api::{ApiRequest, CloudApi, CredentialSource};
pub use provider_error::ProviderError;
pub use replay::ReplayProvider;
pub use service::Service;
