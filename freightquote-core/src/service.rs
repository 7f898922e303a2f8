//! High-level service facade combining all carriers.

use std::any::Any;
use std::cmp::Ordering;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::{CarrierId, QuoteRequest, QuoteResult};
use crate::plugin::{CarrierPlugin, CarrierRegistry};
use crate::ports::{LocationLookup, QuoteError};

/// Public entry point for pricing requests across carriers.
pub struct QuoteService {
    registry: Arc<CarrierRegistry>,
    locations: Arc<dyn LocationLookup>,
}

impl QuoteService {
    /// Create a new service bound to the provided registries.
    #[must_use]
    pub fn new(registry: Arc<CarrierRegistry>, locations: Arc<dyn LocationLookup>) -> Self {
        Self {
            registry,
            locations,
        }
    }

    /// List all available carriers and their display names.
    #[must_use]
    pub fn carriers(&self) -> Vec<(CarrierId, String)> {
        self.registry
            .carriers()
            .into_iter()
            .map(|meta| (meta.id, meta.name))
            .collect()
    }

    /// Price a request with a single carrier.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteError`] if the carrier is unsupported or the engine fails.
    pub fn quote_carrier(
        &self,
        carrier: CarrierId,
        request: &QuoteRequest,
    ) -> Result<QuoteResult, QuoteError> {
        let plugin = self.registry.plugin(carrier)?;
        plugin.engine.compute_quote(request, self.locations.as_ref())
    }

    /// Price a request with every registered carrier and rank the results.
    ///
    /// Each engine runs once. Errors and panics become undeliverable results
    /// carrying the fault text. Deliverable quotes come first, cheapest first;
    /// ties and undeliverable quotes keep registration order.
    #[must_use]
    pub fn quote_all(&self, request: &QuoteRequest) -> Vec<QuoteResult> {
        let mut results: Vec<QuoteResult> = self
            .registry
            .plugins()
            .iter()
            .map(|plugin| self.quote_isolated(plugin, request))
            .collect();
        results.sort_by(rank);
        debug!(
            carriers = results.len(),
            deliverable = results.iter().filter(|result| result.deliverable).count(),
            "quoted all carriers"
        );
        results
    }

    fn quote_isolated(&self, plugin: &CarrierPlugin, request: &QuoteRequest) -> QuoteResult {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            plugin
                .engine
                .compute_quote(request, self.locations.as_ref())
        }));
        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                warn!(carrier = %plugin.meta.id, error = %err, "carrier failed to quote");
                QuoteResult::undeliverable(&plugin.meta, format!("Error: {err}"))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(carrier = %plugin.meta.id, panic = %message, "carrier engine panicked");
                QuoteResult::undeliverable(&plugin.meta, format!("Error: {message}"))
            }
        }
    }
}

fn rank(left: &QuoteResult, right: &QuoteResult) -> Ordering {
    match (left.deliverable, right.deliverable) {
        (true, true) => left.total_after_tax.total_cmp(&right.total_after_tax),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "engine panicked".to_owned())
}
