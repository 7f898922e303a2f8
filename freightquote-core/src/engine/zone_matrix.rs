use crate::config::ConfigError;
use crate::engine::{Diagnostics, PricingProfile, ZoneMatrix, note, price, zone_label};
use crate::model::{CarrierMeta, Location, QuoteRequest, QuoteResult, ZonePair};
use crate::pipeline::{SurchargeContext, SurchargeLedger};
use crate::ports::{BaseRate, LocationLookup, QuoteError, RateEngine, RateSource};
use crate::zones::ZoneResolver;

/// Per-kilogram rate looked up from an origin by destination zone matrix.
#[derive(Debug, Clone)]
pub struct ZoneMatrixEngine {
    meta: CarrierMeta,
    zones: ZoneResolver,
    rates: ZoneMatrix<f64>,
    fallback_rate: f64,
    profile: PricingProfile,
}

impl ZoneMatrixEngine {
    /// Assemble an engine from its tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the profile's minimum stage disagrees with its pipeline.
    pub fn new(
        meta: CarrierMeta,
        zones: ZoneResolver,
        rates: ZoneMatrix<f64>,
        fallback_rate: f64,
        profile: PricingProfile,
    ) -> Result<Self, ConfigError> {
        profile.validate(meta.id)?;
        Ok(Self {
            meta,
            zones,
            rates,
            fallback_rate,
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
            |zones, rate, diagnostics| {
                note(diagnostics, "zone_code", zone_label(zones));
                note(diagnostics, "rate_per_kg", rate.rate_per_kg);
                extra(diagnostics);
            },
        )
    }
}

impl RateEngine for ZoneMatrixEngine {
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
        zones: &ZonePair,
        chargeable_weight: f64,
    ) -> BaseRate {
        let (rate_per_kg, source) = self
            .rates
            .get_pair(zones)
            .map_or((self.fallback_rate, RateSource::Fallback), |rate| {
                (rate, RateSource::Table)
            });
        BaseRate {
            rate_per_kg,
            freight: rate_per_kg * chargeable_weight,
            source,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CarrierId, ParcelItem};
    use crate::engine::MinimumStage;
    use crate::pipeline::{ChargeBase, SurchargeKind, SurchargePipeline, SurchargeStep};
    use crate::registry::LocationRegistry;
    use crate::tax::TaxPolicy;
    use crate::weight::WeightRule;

    fn engine(minimum: MinimumStage) -> ZoneMatrixEngine {
        let pipeline = SurchargePipeline::new(vec![
            SurchargeStep::OutOfDeliveryArea {
                kind: SurchargeKind::Oda,
                flat: 600.0,
                per_kg: None,
            },
            SurchargeStep::Fuel {
                percent: 0.10,
                on: ChargeBase::Running,
            },
        ]);
        ZoneMatrixEngine::new(
            CarrierMeta::new(CarrierId::GlobalCargo, "Matrix Test"),
            ZoneResolver::new(CarrierId::GlobalCargo).with_states(&[("rajasthan", "JAI")]),
            ZoneMatrix::new(["JAI", "DEL"], [[10.0, 12.0], [12.0, 10.0]]),
            13.0,
            PricingProfile::new(
                WeightRule::new(4000.0, 20.0),
                pipeline,
                TaxPolicy::default(),
                minimum,
            ),
        )
        .expect("valid engine")
    }

    fn request(weight: f64, origin: &str, destination: &str) -> QuoteRequest {
        let item = ParcelItem::new(weight, 10.0, 10.0, 10.0).expect("valid item");
        QuoteRequest::new(origin, destination, vec![item])
    }

    #[test]
    fn unknown_lane_uses_fallback_rate_and_base_minimum() {
        let quote = engine(MinimumStage::BaseFreight(450.0))
            .compute_quote(&request(1.0, "000001", "000002"), &LocationRegistry::default())
            .expect("quote computes");
        assert!(quote.deliverable);
        assert_eq!(quote.rate_per_kg, 13.0);
        assert_eq!(quote.chargeable_weight_kg, 20.0);
        assert_eq!(quote.base_freight, 450.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::FuelSurcharge), Some(45.0));
        assert_eq!(quote.total_before_tax, 495.0);
        assert_eq!(quote.tax_amount, 89.1);
        assert_eq!(quote.total_after_tax, 584.1);
        assert_eq!(quote.diagnostics["rate_source"], "fallback");
    }

    #[test]
    fn oda_destination_pays_flat_charge_before_fuel() {
        let locations = LocationRegistry::new(vec![
            Location::unresolved("302001").with_state("Rajasthan"),
            Location::unresolved("302002")
                .with_state("Rajasthan")
                .with_oda(CarrierId::GlobalCargo, true),
        ]);
        let quote = engine(MinimumStage::BaseFreight(450.0))
            .compute_quote(&request(50.0, "302001", "302002"), &locations)
            .expect("quote computes");
        assert_eq!(quote.from_zone.as_deref(), Some("JAI"));
        assert_eq!(quote.base_freight, 500.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::Oda), Some(600.0));
        assert_eq!(quote.surcharges.get(SurchargeKind::FuelSurcharge), Some(110.0));
        assert_eq!(quote.total_before_tax, 1210.0);
    }

    #[test]
    fn unserviceable_destination_is_declined() {
        let locations = LocationRegistry::new(vec![
            Location::unresolved("302002").with_serviceable(CarrierId::GlobalCargo, false),
        ]);
        let quote = engine(MinimumStage::Unfloored)
            .compute_quote(&request(5.0, "302001", "302002"), &locations)
            .expect("declining is not an error");
        assert!(!quote.deliverable);
        assert_eq!(quote.total_after_tax, 0.0);
        assert!(quote.surcharges.is_empty());
    }

    #[test]
    fn rejects_top_up_outside_pre_tax_stage() {
        let err = ZoneMatrixEngine::new(
            CarrierMeta::new(CarrierId::GlobalCargo, "Matrix Test"),
            ZoneResolver::new(CarrierId::GlobalCargo),
            ZoneMatrix::new(["JAI"], [[10.0]]),
            13.0,
            PricingProfile::new(
                WeightRule::new(4000.0, 0.0),
                SurchargePipeline::new(vec![SurchargeStep::MinimumTopUp {
                    threshold: 500.0,
                    on: ChargeBase::Running,
                }]),
                TaxPolicy::default(),
                MinimumStage::FinalTotal(500.0),
            ),
        )
        .expect_err("conflicting minimums");
        assert_eq!(
            err,
            ConfigError::ConflictingMinimums {
                carrier: CarrierId::GlobalCargo
            }
        );
    }
}
