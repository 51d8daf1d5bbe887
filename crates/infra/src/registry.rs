//! Provider registry
//!
//! Resolves a provider name (or the configured default) to a shared adapter
//! instance. Instances are built lazily on first use, at most once per
//! provider, and live until [`ProviderRegistry::reset`].
//!
//! ```
//! use selfcare_domain::ErpConfig;
//! use selfcare_infra::registry::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new(ErpConfig::default());
//! let first = registry.driver(Some("mock")).unwrap();
//! let second = registry.driver(None).unwrap();
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use selfcare_core::ErpAdapter;
use selfcare_domain::{ErpConfig, ErpError, ProviderKind, Result};
use tracing::info;

use crate::integrations::{ErpNextAdapter, MockErpAdapter};

/// Constructor recipe for one provider.
pub type AdapterFactory = Arc<dyn Fn(&ErpConfig) -> Result<Arc<dyn ErpAdapter>> + Send + Sync>;

/// Process-wide adapter cache, one instance per provider.
pub struct ProviderRegistry {
    config: ErpConfig,
    factories: HashMap<ProviderKind, AdapterFactory>,
    instances: DashMap<ProviderKind, Arc<dyn ErpAdapter>>,
}

impl ProviderRegistry {
    /// Registry with the built-in constructors.
    pub fn new(config: ErpConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: ErpConfig) -> ProviderRegistryBuilder {
        ProviderRegistryBuilder { config, factories: default_factories() }
    }

    /// Provider used when a caller names none.
    pub fn default_provider(&self) -> ProviderKind {
        self.config.provider
    }

    /// Resolve `name`, or the configured default when `None`.
    ///
    /// # Errors
    /// `ErpError::UnknownProvider` for names outside [`ProviderKind`]; no
    /// adapter is built and nothing touches the network. Construction errors
    /// (for example missing credentials) are returned as-is and nothing is
    /// cached, so a later call tries again.
    pub fn driver(&self, name: Option<&str>) -> Result<Arc<dyn ErpAdapter>> {
        let kind = match name {
            Some(name) => ProviderKind::parse(name)?,
            None => self.default_provider(),
        };
        self.driver_for(kind)
    }

    /// Resolve an already-parsed provider.
    pub fn driver_for(&self, kind: ProviderKind) -> Result<Arc<dyn ErpAdapter>> {
        if let Some(existing) = self.instances.get(&kind) {
            return Ok(Arc::clone(existing.value()));
        }

        // The entry holds its shard lock while the factory runs, so racing
        // first callers wait for a single construction.
        let entry = self.instances.entry(kind).or_try_insert_with(|| {
            let factory = self
                .factories
                .get(&kind)
                .ok_or_else(|| ErpError::unknown_provider(kind.as_str()))?;
            let adapter = factory(&self.config)?;
            info!(provider = %kind, "Constructed ERP adapter");
            Ok::<_, ErpError>(adapter)
        })?;
        Ok(Arc::clone(entry.value()))
    }

    /// Whether `kind` has a live instance.
    pub fn is_constructed(&self, kind: ProviderKind) -> bool {
        self.instances.contains_key(&kind)
    }

    /// Drop the cached instance for `kind`; the next call rebuilds it.
    pub fn reset(&self, kind: ProviderKind) {
        if self.instances.remove(&kind).is_some() {
            info!(provider = %kind, "Reset ERP adapter");
        }
    }

    /// Drop every cached instance.
    pub fn reset_all(&self) {
        self.instances.clear();
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("default_provider", &self.config.provider)
            .field("constructed", &self.instances.iter().map(|e| *e.key()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ProviderRegistry`] that lets tests and embedders swap
/// constructors.
pub struct ProviderRegistryBuilder {
    config: ErpConfig,
    factories: HashMap<ProviderKind, AdapterFactory>,
}

impl ProviderRegistryBuilder {
    /// Replace the constructor for `kind`.
    #[must_use]
    pub fn with_factory<F>(mut self, kind: ProviderKind, factory: F) -> Self
    where
        F: Fn(&ErpConfig) -> Result<Arc<dyn ErpAdapter>> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Arc::new(factory));
        self
    }

    /// Serve a prebuilt adapter for `kind`.
    #[must_use]
    pub fn with_adapter(self, kind: ProviderKind, adapter: Arc<dyn ErpAdapter>) -> Self {
        self.with_factory(kind, move |_| Ok(Arc::clone(&adapter)))
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry { config: self.config, factories: self.factories, instances: DashMap::new() }
    }
}

fn default_factories() -> HashMap<ProviderKind, AdapterFactory> {
    let mut factories: HashMap<ProviderKind, AdapterFactory> = HashMap::new();
    factories.insert(
        ProviderKind::ErpNext,
        Arc::new(|config: &ErpConfig| {
            Ok(Arc::new(ErpNextAdapter::new(config)?) as Arc<dyn ErpAdapter>)
        }),
    );
    factories.insert(
        ProviderKind::Mock,
        Arc::new(|_: &ErpConfig| Ok(Arc::new(MockErpAdapter::seeded()) as Arc<dyn ErpAdapter>)),
    );
    factories
}
