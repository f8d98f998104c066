use crate::inventory::{Account, CollectorFailure, Credentials, FailureKind};
use crate::provider::CredentialSource;
use chrono::Utc;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

const LOG_TARGET: &str = "  resolver";

type Resolution = Result<Arc<Credentials>, CollectorFailure>;

/// Resolves and memoizes per-account credentials for one run.
///
/// The first task to ask for an account's credentials starts the exchange; concurrent and
/// later callers wait for and share its outcome. Failures are cached too, so every task for an
/// account that cannot be accessed fails with the same `AuthFailure` without retrying.
///
/// The exchange runs on its own spawned task. A caller that stops waiting, for example because
/// its deadline passed, does not abandon the exchange, and the next caller picks up its outcome.
pub struct CredentialResolver {
    source: Arc<dyn CredentialSource>,
    session_name: Arc<str>,
    cache: Mutex<HashMap<String, Shared<BoxFuture<'static, Resolution>>>>,
}

impl core::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("source", &"<dyn CredentialSource>")
            .field("session_name", &self.session_name)
            .finish_non_exhaustive()
    }
}

impl CredentialResolver {
    #[must_use]
    pub fn new(source: Arc<dyn CredentialSource>, session_name: impl Into<String>) -> Self {
        Self {
            source,
            session_name: Arc::from(session_name.into()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Credentials for `account`, resolving them on first use.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an `AuthFailure` if the exchange failed, now or for an earlier caller.
    pub async fn resolve(&self, account: &Account) -> Resolution {
        let resolution = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache
                .entry(account.id.clone())
                .or_insert_with(|| self.start(account))
                .clone()
        };

        resolution.await
    }

    fn start(&self, account: &Account) -> Shared<BoxFuture<'static, Resolution>> {
        let exchange = tokio::spawn(resolve_uncached(
            Arc::clone(&self.source),
            Arc::clone(&self.session_name),
            account.clone(),
        ));

        let account_id = account.id.clone();
        async move {
            exchange.await.unwrap_or_else(|e| {
                log::error!(target: LOG_TARGET, "Credential exchange for account {account_id} did not complete: {e}");
                Err(CollectorFailure::new(
                    FailureKind::AuthFailure,
                    format!("credential exchange did not complete: {e}"),
                ))
            })
        }
        .boxed()
        .shared()
    }
}

async fn resolve_uncached(source: Arc<dyn CredentialSource>, session_name: Arc<str>, account: Account) -> Resolution {
    let outcome = match &account.role_arn {
        Some(role_arn) => {
            log::info!(target: LOG_TARGET, "Assuming role {role_arn} for account {}", account.id);
            source
                .assume_role(role_arn, &session_name)
                .await
                .map_err(|e| format!("assuming role {role_arn}: {e}"))
        }
        None => {
            log::info!(target: LOG_TARGET, "Using the ambient identity for account {}", account.id);
            source.ambient().await.map_err(|e| format!("resolving the ambient identity: {e}"))
        }
    };

    let outcome = outcome.and_then(|credentials| {
        if credentials.is_expired(Utc::now()) {
            Err("the provider returned credentials that have already expired".to_string())
        } else {
            Ok(Arc::new(credentials))
        }
    });

    outcome.map_err(|message| {
        log::warn!(target: LOG_TARGET, "Could not get credentials for account {}: {message}", account.id);
        CollectorFailure::new(FailureKind::AuthFailure, message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use core::time::Duration;

    #[derive(Debug, Default)]
    struct CountingSource {
        assumptions: AtomicUsize,
        ambient_calls: AtomicUsize,
        deny: bool,
        delay: Option<Duration>,
    }

    fn credentials() -> Credentials {
        Credentials {
            access_key_id: "AK".into(),
            secret_access_key: "SK".into(),
            session_token: Some("TOKEN".into()),
            expiration: None,
        }
    }

    impl CredentialSource for CountingSource {
        fn ambient(&self) -> BoxFuture<'_, Result<Credentials, ProviderError>> {
            _ = self.ambient_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(credentials()) })
        }

        fn assume_role<'a>(&'a self, _role_arn: &'a str, session_name: &'a str) -> BoxFuture<'a, Result<Credentials, ProviderError>> {
            Box::pin(async move {
                _ = self.assumptions.fetch_add(1, Ordering::SeqCst);
                assert_eq!(session_name, "test-session");
                tokio::time::sleep(self.delay.unwrap_or(Duration::from_millis(50))).await;
                if self.deny {
                    Err(ProviderError::new("AccessDenied", "not trusted"))
                } else {
                    Ok(credentials())
                }
            })
        }
    }

    fn role_account() -> Account {
        Account::new("222222222222", Some("arn:aws:iam::222222222222:role/Audit".into()), None).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_assumption() {
        let source = Arc::new(CountingSource::default());
        let resolver = Arc::new(CredentialResolver::new(Arc::clone(&source) as Arc<dyn CredentialSource>, "test-session"));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.resolve(&role_account()).await })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            assert_eq!(result.unwrap().unwrap().access_key_id, "AK");
        }
        assert_eq!(source.assumptions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_cached_as_auth_failure() {
        let source = Arc::new(CountingSource {
            deny: true,
            ..CountingSource::default()
        });
        let resolver = CredentialResolver::new(Arc::clone(&source) as Arc<dyn CredentialSource>, "test-session");

        let first = resolver.resolve(&role_account()).await.unwrap_err();
        let second = resolver.resolve(&role_account()).await.unwrap_err();

        assert_eq!(first.kind, FailureKind::AuthFailure);
        assert_eq!(first, second);
        assert!(first.message.contains("not trusted"));
        assert_eq!(source.assumptions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_accounts_are_cached_independently() {
        let source = Arc::new(CountingSource::default());
        let resolver = CredentialResolver::new(Arc::clone(&source) as Arc<dyn CredentialSource>, "test-session");

        let a = Account::new("111111111111", None, None).unwrap();
        let b = Account::new("333333333333", None, None).unwrap();
        _ = resolver.resolve(&a).await.unwrap();
        _ = resolver.resolve(&b).await.unwrap();
        _ = resolver.resolve(&a).await.unwrap();

        assert_eq!(source.ambient_calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.assumptions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_wait_does_not_restart_the_exchange() {
        let source = Arc::new(CountingSource {
            delay: Some(Duration::from_secs(120)),
            ..CountingSource::default()
        });
        let resolver = CredentialResolver::new(Arc::clone(&source) as Arc<dyn CredentialSource>, "test-session");

        let first = tokio::time::timeout(Duration::from_secs(10), resolver.resolve(&role_account())).await;
        assert!(first.is_err());

        let second = tokio::time::timeout(Duration::from_secs(10), resolver.resolve(&role_account())).await;
        assert!(second.is_err());

        let third = resolver.resolve(&role_account()).await.unwrap();
        assert_eq!(third.access_key_id, "AK");
        assert_eq!(source.assumptions.load(Ordering::SeqCst), 1);
    }
}
