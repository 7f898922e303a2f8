//! Registry for all carrier plugins and their engines.

use std::fmt;
use std::sync::Arc;

use crate::model::{CarrierId, CarrierMeta};
use crate::ports::{QuoteError, RateEngine};

#[derive(Clone)]
/// A rate engine registered for a single carrier.
pub struct CarrierPlugin {
    /// Static metadata describing the carrier.
    pub meta: CarrierMeta,
    /// Implementation pricing requests for the carrier.
    pub engine: Arc<dyn RateEngine>,
}

impl CarrierPlugin {
    /// Wrap an engine, taking the metadata from the engine itself.
    #[must_use]
    pub fn new(engine: Arc<dyn RateEngine>) -> Self {
        Self {
            meta: engine.carrier().clone(),
            engine,
        }
    }
}

impl fmt::Debug for CarrierPlugin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CarrierPlugin")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
/// Registry that resolves plugins by carrier identifier, keeping registration order.
pub struct CarrierRegistry {
    plugins: Vec<CarrierPlugin>,
}

impl CarrierRegistry {
    /// Build a registry from the provided plugin list.
    ///
    /// A carrier registered twice keeps its first position and its last engine.
    #[must_use]
    pub fn new(plugins: Vec<CarrierPlugin>) -> Self {
        let mut registry = Self::default();
        for plugin in plugins {
            registry.register(plugin);
        }
        registry
    }

    /// Add a plugin, replacing any engine already registered for the carrier.
    pub fn register(&mut self, plugin: CarrierPlugin) {
        match self
            .plugins
            .iter_mut()
            .find(|existing| existing.meta.id == plugin.meta.id)
        {
            Some(existing) => *existing = plugin,
            None => self.plugins.push(plugin),
        }
    }

    /// Return metadata for all registered carriers.
    #[must_use]
    pub fn carriers(&self) -> Vec<CarrierMeta> {
        self.carriers_iter().cloned().collect()
    }

    /// Iterator over carrier metadata.
    pub fn carriers_iter(&self) -> impl Iterator<Item = &CarrierMeta> {
        self.plugins.iter().map(|plugin| &plugin.meta)
    }

    /// Registered plugins in registration order.
    #[must_use]
    pub fn plugins(&self) -> &[CarrierPlugin] {
        &self.plugins
    }

    /// Number of registered carriers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// True when no carrier is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Look up a plugin for the given carrier.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::UnsupportedCarrier`] when no plugin is registered.
    pub fn plugin(&self, carrier: CarrierId) -> Result<&CarrierPlugin, QuoteError> {
        self.plugins
            .iter()
            .find(|plugin| plugin.meta.id == carrier)
            .ok_or(QuoteError::UnsupportedCarrier(carrier))
    }
}
