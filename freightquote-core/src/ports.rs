//! Traits describing rate engine capabilities and shared helper types.

use std::borrow::Cow;

use crate::model::{CarrierId, CarrierMeta, Location, QuoteRequest, QuoteResult, ZonePair};
use crate::pipeline::{SurchargeContext, SurchargeLedger};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
/// Errors that can occur while pricing a request.
pub enum QuoteError {
    /// The request carries no parcel items.
    #[error("Request has no parcel items")]
    NoItems,
    /// A parcel item has an impossible measure.
    #[error("Invalid parcel item: {0}")]
    InvalidItem(String),
    /// Declared value is negative or not a number.
    #[error("Invalid declared value: {0}")]
    InvalidDeclaredValue(f64),
    /// Arithmetic produced NaN or infinity.
    #[error("Non-finite amount while computing {stage}")]
    NonFiniteAmount {
        /// Pricing stage that produced the value.
        stage: &'static str,
    },
    /// The carrier has no registered plugin.
    #[error("Unsupported carrier: {0}")]
    UnsupportedCarrier(CarrierId),
    /// Internal engine error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Read-only access to location records keyed by postal code.
pub trait LocationLookup: Send + Sync {
    /// Record for the code, if known.
    fn lookup(&self, code: &str) -> Option<&Location>;

    /// Record for the code, or an unresolved location carrying only the code.
    fn resolve(&self, code: &str) -> Cow<'_, Location> {
        self.lookup(code)
            .map_or_else(|| Cow::Owned(Location::unresolved(code.trim())), Cow::Borrowed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where a base rate came from.
pub enum RateSource {
    /// A configured rate table.
    Table,
    /// The carrier fallback for lanes missing from its tables.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Base rate selected for a chargeable weight.
pub struct BaseRate {
    /// Rate per kilogram reported with the quote.
    pub rate_per_kg: f64,
    /// Freight before any minimum is applied.
    pub freight: f64,
    /// Table hit or fallback.
    pub source: RateSource,
}

/// Carrier-specific pricing capabilities.
///
/// Engines are immutable after construction and are shared across threads.
pub trait RateEngine: Send + Sync {
    /// Metadata describing the carrier priced by this engine.
    fn carrier(&self) -> &CarrierMeta;

    /// Resolve carrier zones for both ends of the lane.
    fn resolve_zones(
        &self,
        request: &QuoteRequest,
        origin: &Location,
        destination: &Location,
    ) -> ZonePair;

    /// Weight the request is charged on.
    fn chargeable_weight(&self, request: &QuoteRequest) -> f64;

    /// Rate and freight for the resolved zones and chargeable weight.
    fn base_rate_per_kg(
        &self,
        request: &QuoteRequest,
        zones: &ZonePair,
        chargeable_weight: f64,
    ) -> BaseRate;

    /// Surcharge lines for an already priced base freight.
    fn surcharges(&self, context: &SurchargeContext<'_>) -> SurchargeLedger;

    /// Price the request end to end.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteError`] when the request is invalid or pricing produces a
    /// non-finite amount.
    fn compute_quote(
        &self,
        request: &QuoteRequest,
        locations: &dyn LocationLookup,
    ) -> Result<QuoteResult, QuoteError>;
}
