use std::collections::HashMap;

use tracing::debug;

use crate::config::ConfigError;
use crate::engine::{
    Diagnostics, Priced, PricingProfile, SlabTable, decline_unserviceable, note, reject_line,
};
use crate::model::{CarrierMeta, Location, QuoteRequest, QuoteResult, ZonePair, normalize_key};
use crate::money::{ensure_finite, round_money};
use crate::pipeline::{SurchargeContext, SurchargeKind, SurchargeLedger};
use crate::ports::{BaseRate, LocationLookup, QuoteError, RateEngine, RateSource};
use crate::zones::ZoneResolver;

#[derive(Debug, Clone, PartialEq, Default)]
/// Slab tables keyed by destination band.
pub struct BandSlabs {
    tables: HashMap<String, SlabTable>,
    fallback_rate: f64,
}

impl BandSlabs {
    /// No bands yet; unknown bands are charged `fallback_rate` per kilogram.
    #[must_use]
    pub fn new(fallback_rate: f64) -> Self {
        Self {
            tables: HashMap::new(),
            fallback_rate,
        }
    }

    /// Add a band. Band names are matched case-insensitively.
    #[must_use]
    pub fn with_band(mut self, band: &str, table: SlabTable) -> Self {
        if let Some(key) = normalize_key(band) {
            self.tables.insert(key, table);
        }
        self
    }

    fn rate_for(&self, band: Option<&str>, weight: f64) -> (f64, RateSource) {
        band.and_then(normalize_key)
            .and_then(|key| self.tables.get(&key))
            .map_or((self.fallback_rate, RateSource::Fallback), |table| {
                (table.slab_for(weight).rate_per_kg, RateSource::Table)
            })
    }
}

/// Destination-band slab pricing where fuel is charged on the whole pre-tax subtotal.
///
/// The surcharge pipeline runs first, fuel is then a percentage of base plus
/// surcharges, and tax is computed on that new subtotal.
#[derive(Debug, Clone)]
pub struct TotalFuelSurchargeEngine {
    meta: CarrierMeta,
    bands: ZoneResolver,
    local_band: Option<&'static str>,
    slabs: BandSlabs,
    fuel_percent: f64,
    profile: PricingProfile,
}

impl TotalFuelSurchargeEngine {
    /// Assemble an engine from its tables.
    ///
    /// `local_band` is used when origin and destination share a known city.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the profile's minimum stage disagrees with its
    /// pipeline or the pipeline already contains a fuel step.
    pub fn new(
        meta: CarrierMeta,
        bands: ZoneResolver,
        local_band: Option<&'static str>,
        slabs: BandSlabs,
        fuel_percent: f64,
        profile: PricingProfile,
    ) -> Result<Self, ConfigError> {
        profile.validate(meta.id)?;
        reject_line(
            &profile.pipeline,
            SurchargeKind::FuelSurcharge,
            ConfigError::DuplicateFuel { carrier: meta.id },
        )?;
        Ok(Self {
            meta,
            bands,
            local_band,
            slabs,
            fuel_percent,
            profile,
        })
    }

    /// Pricing profile in use.
    #[must_use]
    pub const fn profile(&self) -> &PricingProfile {
        &self.profile
    }

    fn local_lane(&self, origin: &Location, destination: &Location) -> Option<String> {
        let band = self.local_band?;
        let same_city = matches!(
            (origin.city_key(), destination.city_key()),
            (Some(from), Some(to)) if from == to
        );
        same_city.then(|| band.to_owned())
    }
}

impl RateEngine for TotalFuelSurchargeEngine {
    fn carrier(&self) -> &CarrierMeta {
        &self.meta
    }

    /// Origin zone is the origin state; destination zone is the band.
    fn resolve_zones(
        &self,
        _request: &QuoteRequest,
        origin: &Location,
        destination: &Location,
    ) -> ZonePair {
        let band = self
            .bands
            .attached_region(destination)
            .or_else(|| self.local_lane(origin, destination))
            .or_else(|| self.bands.resolve(destination));
        let origin_state = origin
            .state
            .as_deref()
            .map(str::trim)
            .filter(|state| !state.is_empty())
            .map(str::to_owned);
        ZonePair::new(origin_state, band)
    }

    fn chargeable_weight(&self, request: &QuoteRequest) -> f64 {
        self.profile.weight.chargeable(&request.items)
    }

    fn base_rate_per_kg(
        &self,
        _request: &QuoteRequest,
        zones: &ZonePair,
        chargeable_weight: f64,
    ) -> BaseRate {
        let (rate_per_kg, source) = self.slabs.rate_for(zones.to.as_deref(), chargeable_weight);
        BaseRate {
            rate_per_kg,
            freight: rate_per_kg * chargeable_weight,
            source,
        }
    }

    /// Pipeline lines only; fuel is added by [`RateEngine::compute_quote`].
    fn surcharges(&self, context: &SurchargeContext<'_>) -> SurchargeLedger {
        self.profile.pipeline.run(context)
    }

    fn compute_quote(
        &self,
        request: &QuoteRequest,
        locations: &dyn LocationLookup,
    ) -> Result<QuoteResult, QuoteError> {
        request.validate()?;
        let origin = locations.resolve(&request.origin);
        let destination = locations.resolve(&request.destination);
        let zones = self.resolve_zones(request, &origin, &destination);
        if let Some(declined) = decline_unserviceable(&self.meta, &destination, &zones) {
            return Ok(declined);
        }

        let chargeable_weight = self.chargeable_weight(request);
        let rate = self.base_rate_per_kg(request, &zones, chargeable_weight);
        let base_freight = round_money(ensure_finite(
            "base freight",
            self.profile.floor_base(rate.freight),
        )?);
        let context = SurchargeContext {
            request,
            destination: &destination,
            zones: &zones,
            chargeable_weight,
            base_freight,
            oda_applies: self.profile.destination_is_oda(self.meta.id, &destination),
        };
        let mut surcharges = self.surcharges(&context);

        let subtotal = round_money(base_freight + surcharges.total());
        let fuel = round_money(self.fuel_percent * subtotal);
        surcharges.set(SurchargeKind::FuelSurcharge, fuel);
        let totals = self
            .profile
            .tax_rule()
            .settle_subtotal(round_money(subtotal + fuel), request.tax_mode);
        debug!(
            carrier = %self.meta.id,
            band = zones.to.as_deref().unwrap_or("?"),
            subtotal,
            fuel,
            total = totals.total_after_tax,
            "priced request with fuel on subtotal"
        );

        let mut diagnostics = Diagnostics::new();
        if let Some(band) = &zones.to {
            note(&mut diagnostics, "destination_band", band.clone());
        }
        note(&mut diagnostics, "fuel_percent_of_subtotal", self.fuel_percent);
        Priced {
            meta: &self.meta,
            request,
            profile: &self.profile,
            zones,
            chargeable_weight,
            rate,
            base_freight,
            surcharges,
            totals,
            diagnostics,
        }
        .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MinimumStage, Slab};
    use crate::model::{CarrierId, ParcelItem};
    use crate::pipeline::{ChargeBase, SurchargePipeline, SurchargeStep};
    use crate::registry::LocationRegistry;
    use crate::tax::TaxPolicy;
    use crate::weight::WeightRule;

    fn table(rates: [f64; 3]) -> SlabTable {
        let [light, medium, heavy] = rates;
        SlabTable::new(
            CarrierId::Anjani,
            "test",
            &[
                Slab::upto(5.0, light, 0.0),
                Slab::upto(20.0, medium, 0.0),
                Slab::open(heavy, 0.0),
            ],
        )
        .expect("ordered slabs")
    }

    fn engine(pipeline: SurchargePipeline) -> Result<TotalFuelSurchargeEngine, ConfigError> {
        TotalFuelSurchargeEngine::new(
            CarrierMeta::new(CarrierId::Anjani, "Total Fuel Test"),
            ZoneResolver::new(CarrierId::Anjani)
                .with_states(&[("gujarat", "Gujarat")])
                .with_default("Rest of India"),
            Some("Local"),
            BandSlabs::new(20.0)
                .with_band("Local", table([20.0, 15.0, 12.0]))
                .with_band("Gujarat", table([25.0, 18.0, 15.0]))
                .with_band("Rest of India", table([30.0, 22.0, 18.0])),
            0.15,
            PricingProfile::new(
                WeightRule::new(5000.0, 0.0),
                pipeline,
                TaxPolicy::default(),
                MinimumStage::Unfloored,
            ),
        )
    }

    fn locations() -> LocationRegistry {
        LocationRegistry::new(vec![
            Location::unresolved("380001")
                .with_state("Gujarat")
                .with_city("Ahmedabad"),
            Location::unresolved("380015")
                .with_state("Gujarat")
                .with_city("ahmedabad"),
            Location::unresolved("395003")
                .with_state("Gujarat")
                .with_city("Surat"),
            Location::unresolved("110001").with_state("Delhi"),
        ])
    }

    fn request(destination: &str, weight: f64) -> QuoteRequest {
        let item = ParcelItem::new(weight, 1.0, 1.0, 1.0).expect("valid item");
        QuoteRequest::new("380001", destination, vec![item])
    }

    #[test]
    fn fuel_is_charged_on_base_plus_surcharges() {
        let engine = engine(SurchargePipeline::new(vec![SurchargeStep::Flat {
            kind: SurchargeKind::Waybill,
            amount: 30.0,
        }]))
        .expect("valid engine");
        let quote = engine
            .compute_quote(&request("110001", 10.0), &locations())
            .expect("quote computes");
        assert_eq!(quote.to_zone.as_deref(), Some("Rest of India"));
        assert_eq!(quote.from_zone.as_deref(), Some("Gujarat"));
        assert_eq!(quote.base_freight, 220.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::FuelSurcharge), Some(37.5));
        assert_eq!(quote.total_before_tax, 287.5);
        assert_eq!(quote.tax_amount, 51.75);
        assert_eq!(quote.total_after_tax, 339.25);
    }

    #[test]
    fn same_city_is_local_and_same_state_is_state_band() {
        let engine = engine(SurchargePipeline::default()).expect("valid engine");
        let local = engine
            .compute_quote(&request("380015", 4.0), &locations())
            .expect("quote computes");
        assert_eq!(local.to_zone.as_deref(), Some("Local"));
        assert_eq!(local.rate_per_kg, 20.0);
        let state = engine
            .compute_quote(&request("395003", 4.0), &locations())
            .expect("quote computes");
        assert_eq!(state.to_zone.as_deref(), Some("Gujarat"));
        assert_eq!(state.rate_per_kg, 25.0);
    }

    #[test]
    fn unknown_cities_are_never_local() {
        let engine = engine(SurchargePipeline::default()).expect("valid engine");
        let item = ParcelItem::new(4.0, 1.0, 1.0, 1.0).expect("valid item");
        let quote = engine
            .compute_quote(
                &QuoteRequest::new("000001", "000002", vec![item]),
                &LocationRegistry::default(),
            )
            .expect("quote computes");
        assert_eq!(quote.to_zone.as_deref(), Some("Rest of India"));
    }

    #[test]
    fn pipeline_fuel_step_is_rejected() {
        let err = engine(SurchargePipeline::new(vec![SurchargeStep::Fuel {
            percent: 0.15,
            on: ChargeBase::Running,
        }]))
        .expect_err("fuel belongs to the engine");
        assert_eq!(
            err,
            ConfigError::DuplicateFuel {
                carrier: CarrierId::Anjani
            }
        );
    }
}
