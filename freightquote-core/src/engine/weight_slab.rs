use crate::config::ConfigError;
use crate::engine::{Diagnostics, PricingProfile, note, price};
use crate::model::{CarrierId, CarrierMeta, Location, QuoteRequest, QuoteResult, ZonePair};
use crate::pipeline::{SurchargeContext, SurchargeLedger};
use crate::ports::{BaseRate, LocationLookup, QuoteError, RateEngine, RateSource};
use crate::zones::ZoneResolver;

#[derive(Debug, Clone, Copy, PartialEq)]
/// One weight band: applies to weights above the previous slab's upper bound up to and
/// including its own.
pub struct Slab {
    /// Inclusive upper bound in kilograms; `None` for the open top slab.
    pub upper_kg: Option<f64>,
    /// Rate per chargeable kilogram.
    pub rate_per_kg: f64,
    /// Minimum freight for the slab; zero for none.
    pub min_charge: f64,
}

impl Slab {
    /// Bounded slab.
    #[must_use]
    pub const fn upto(upper_kg: f64, rate_per_kg: f64, min_charge: f64) -> Self {
        Self {
            upper_kg: Some(upper_kg),
            rate_per_kg,
            min_charge,
        }
    }

    /// Open-ended top slab.
    #[must_use]
    pub const fn open(rate_per_kg: f64, min_charge: f64) -> Self {
        Self {
            upper_kg: None,
            rate_per_kg,
            min_charge,
        }
    }

    /// Freight for a weight in this slab, raised to the slab minimum.
    #[must_use]
    pub fn freight(&self, weight: f64) -> f64 {
        (self.rate_per_kg * weight).max(self.min_charge)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Ascending list of slabs. Weights above the last bound use the last slab.
pub struct SlabTable {
    slabs: Vec<Slab>,
    top: Slab,
}

impl SlabTable {
    /// Validate and build a table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyRateTable`] for no slabs and
    /// [`ConfigError::UnorderedSlabs`] when bounds do not strictly increase or an
    /// open slab is not last.
    pub fn new(carrier: CarrierId, table: &str, slabs: &[Slab]) -> Result<Self, ConfigError> {
        let Some((top, lower)) = slabs.split_last() else {
            return Err(ConfigError::EmptyRateTable {
                carrier,
                table: table.to_owned(),
            });
        };
        let mut previous = f64::NEG_INFINITY;
        for slab in lower {
            match slab.upper_kg {
                Some(upper) if upper > previous => previous = upper,
                _ => {
                    return Err(ConfigError::UnorderedSlabs {
                        carrier,
                        table: table.to_owned(),
                    });
                }
            }
        }
        if top.upper_kg.is_some_and(|upper| upper <= previous) {
            return Err(ConfigError::UnorderedSlabs {
                carrier,
                table: table.to_owned(),
            });
        }
        Ok(Self {
            slabs: slabs.to_vec(),
            top: *top,
        })
    }

    /// First slab whose upper bound is at least `weight`, else the last slab.
    #[must_use]
    pub fn slab_for(&self, weight: f64) -> Slab {
        self.slabs
            .iter()
            .find(|slab| slab.upper_kg.is_none_or(|upper| weight <= upper))
            .copied()
            .unwrap_or(self.top)
    }
}

/// Rate per kilogram chosen by weight slab, with a per-slab minimum charge.
#[derive(Debug, Clone)]
pub struct WeightSlabEngine {
    meta: CarrierMeta,
    zones: ZoneResolver,
    slabs: SlabTable,
    profile: PricingProfile,
}

impl WeightSlabEngine {
    /// Assemble an engine from its tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the profile's minimum stage disagrees with its pipeline.
    pub fn new(
        meta: CarrierMeta,
        zones: ZoneResolver,
        slabs: SlabTable,
        profile: PricingProfile,
    ) -> Result<Self, ConfigError> {
        profile.validate(meta.id)?;
        Ok(Self {
            meta,
            zones,
            slabs,
            profile,
        })
    }

    /// Pricing profile in use.
    #[must_use]
    pub const fn profile(&self) -> &PricingProfile {
        &self.profile
    }

    /// Price with an extra ODA condition and extra diagnostics.
    pub(crate) fn quote_with(
        &self,
        request: &QuoteRequest,
        locations: &dyn LocationLookup,
        oda_gate: impl FnOnce(&ZonePair) -> bool,
        extra: impl FnOnce(&mut Diagnostics),
    ) -> Result<QuoteResult, QuoteError> {
        price(
            self,
            &self.profile,
            request,
            locations,
            oda_gate,
            |_, _, diagnostics| {
                let slab = self.slabs.slab_for(self.chargeable_weight(request));
                match slab.upper_kg {
                    Some(upper) => note(diagnostics, "slab_upper_kg", upper),
                    None => note(diagnostics, "slab_upper_kg", "open"),
                }
                note(diagnostics, "slab_rate_per_kg", slab.rate_per_kg);
                note(diagnostics, "slab_min_charge", slab.min_charge);
                extra(diagnostics);
            },
        )
    }
}

impl RateEngine for WeightSlabEngine {
    fn carrier(&self) -> &CarrierMeta {
        &self.meta
    }

    fn resolve_zones(
        &self,
        _request: &QuoteRequest,
        origin: &Location,
        destination: &Location,
    ) -> ZonePair {
        self.zones.resolve_pair(origin, destination)
    }

    fn chargeable_weight(&self, request: &QuoteRequest) -> f64 {
        self.profile.weight.chargeable(&request.items)
    }

    fn base_rate_per_kg(
        &self,
        _request: &QuoteRequest,
        _zones: &ZonePair,
        chargeable_weight: f64,
    ) -> BaseRate {
        let slab = self.slabs.slab_for(chargeable_weight);
        BaseRate {
            rate_per_kg: slab.rate_per_kg,
            freight: slab.freight(chargeable_weight),
            source: RateSource::Table,
        }
    }

    fn surcharges(&self, context: &SurchargeContext<'_>) -> SurchargeLedger {
        self.profile.pipeline.run(context)
    }

    fn compute_quote(
        &self,
        request: &QuoteRequest,
        locations: &dyn LocationLookup,
    ) -> Result<QuoteResult, QuoteError> {
        self.quote_with(request, locations, |_| true, |_| {})
    }
}
