use super::{
    AccountIdentity, ApiGateways, BackupPlans, CdnDistributions, Collector, ContainerClusters, ControlTower, Databases, DnsZones,
    EventRules, Functions, IdentityCenter, Instances, LoadBalancers, Network, Organizations, Topics,
};
use crate::Result;
use ohno::bail;
use std::sync::Arc;

/// The ordered set of collectors for a run.
///
/// Registration order is report section order. Collectors can be added but never removed or
/// reordered, and names are unique.
#[derive(Clone, Default)]
pub struct Registry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.collectors.iter().map(|c| c.name())).finish()
    }
}

impl Registry {
    #[must_use]
    pub const fn new() -> Self {
        Self { collectors: Vec::new() }
    }

    /// All built-in collectors in report order.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            collectors: vec![
                Arc::new(AccountIdentity),
                Arc::new(Organizations),
                Arc::new(ControlTower),
                Arc::new(Network),
                Arc::new(DnsZones),
                Arc::new(Instances),
                Arc::new(Databases),
                Arc::new(ApiGateways),
                Arc::new(CdnDistributions),
                Arc::new(Functions),
                Arc::new(Topics),
                Arc::new(BackupPlans),
                Arc::new(EventRules),
                Arc::new(LoadBalancers),
                Arc::new(ContainerClusters),
                Arc::new(IdentityCenter),
            ],
        }
    }

    /// Append a collector.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector with the same name is already registered.
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<()> {
        if self.get(collector.name()).is_some() {
            bail!("a collector named '{}' is already registered", collector.name());
        }

        self.collectors.push(collector);
        Ok(())
    }

    /// Keep only the named collectors, preserving registry order.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unknown collector.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        if let Some(unknown) = names.iter().find(|n| self.get(n.as_ref()).is_none()) {
            bail!(
                "unknown collector '{}', expected one of: {}",
                unknown.as_ref(),
                self.names().collect::<Vec<_>>().join(", ")
            );
        }

        Ok(Self {
            collectors: self
                .collectors
                .iter()
                .filter(|c| names.iter().any(|n| n.as_ref() == c.name()))
                .map(Arc::clone)
                .collect(),
        })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Collector>> {
        self.collectors.iter().find(|c| c.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Collector>> {
        self.collectors.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.collectors.iter().map(|c| c.name())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.collectors.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}
