use std::collections::HashMap;

use crate::config::ConfigError;
use crate::engine::{Diagnostics, PricingProfile, ZoneMatrix, note, price};
use crate::model::{CarrierMeta, Location, QuoteRequest, QuoteResult, ZonePair, normalize_key};
use crate::money::round_money;
use crate::pipeline::{SurchargeContext, SurchargeLedger};
use crate::ports::{BaseRate, LocationLookup, QuoteError, RateEngine, RateSource};
use crate::zones::ZoneResolver;

/// Weight covered by the first step of a stepped tariff.
const FIRST_STEP_KG: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Charge for the first ten kilograms plus a rate for each kilogram beyond.
pub struct StepRate {
    /// Charge covering up to ten kilograms.
    pub first_10kg: f64,
    /// Rate per kilogram above ten.
    pub per_kg_beyond: f64,
}

impl StepRate {
    /// Build a step rate.
    #[must_use]
    pub const fn new(first_10kg: f64, per_kg_beyond: f64) -> Self {
        Self {
            first_10kg,
            per_kg_beyond,
        }
    }

    /// Freight for a chargeable weight.
    #[must_use]
    pub fn freight(self, weight: f64) -> f64 {
        if weight <= FIRST_STEP_KG {
            self.first_10kg
        } else {
            self.first_10kg + (weight - FIRST_STEP_KG) * self.per_kg_beyond
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// How a region lane is turned into freight.
pub enum BandPricing {
    /// Region lane selects a band; the band has a flat rate per kilogram.
    Flat {
        /// Band for each origin and destination region.
        bands: ZoneMatrix<&'static str>,
        /// Band used when a lane is missing.
        default_band: &'static str,
        /// Rate per kilogram keyed by lower-cased band.
        band_rates: HashMap<String, f64>,
        /// Rate for a band without a configured rate.
        fallback_rate: f64,
    },
    /// Region lane selects a stepped rate directly.
    Stepped {
        /// Step rate for each origin and destination region.
        rates: ZoneMatrix<StepRate>,
        /// Rate for a missing lane.
        fallback: StepRate,
    },
}

impl BandPricing {
    /// Flat band pricing.
    #[must_use]
    pub fn flat(
        bands: ZoneMatrix<&'static str>,
        default_band: &'static str,
        band_rates: &[(&str, f64)],
        fallback_rate: f64,
    ) -> Self {
        Self::Flat {
            bands,
            default_band,
            band_rates: band_rates
                .iter()
                .filter_map(|(band, rate)| normalize_key(band).map(|key| (key, *rate)))
                .collect(),
            fallback_rate,
        }
    }

    /// Stepped pricing.
    #[must_use]
    pub const fn stepped(rates: ZoneMatrix<StepRate>, fallback: StepRate) -> Self {
        Self::Stepped { rates, fallback }
    }
}

/// Region to region pricing through a band matrix or a stepped rate matrix.
#[derive(Debug, Clone)]
pub struct RegionBandMatrixEngine {
    meta: CarrierMeta,
    regions: ZoneResolver,
    pricing: BandPricing,
    profile: PricingProfile,
}

impl RegionBandMatrixEngine {
    /// Assemble an engine from its tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the profile's minimum stage disagrees with its pipeline.
    pub fn new(
        meta: CarrierMeta,
        regions: ZoneResolver,
        pricing: BandPricing,
        profile: PricingProfile,
    ) -> Result<Self, ConfigError> {
        profile.validate(meta.id)?;
        Ok(Self {
            meta,
            regions,
            pricing,
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
                note(diagnostics, "rate_per_kg", rate.rate_per_kg);
                if let Some((step, _)) = self.step_rate(zones) {
                    note(diagnostics, "first_10kg_charge", step.first_10kg);
                    note(diagnostics, "per_kg_beyond_10kg", step.per_kg_beyond);
                } else if let Some(band) = &zones.to {
                    note(diagnostics, "band", band.clone());
                }
                extra(diagnostics);
            },
        )
    }

    fn step_rate(&self, zones: &ZonePair) -> Option<(StepRate, RateSource)> {
        match &self.pricing {
            BandPricing::Stepped { rates, fallback } => Some(
                rates
                    .get_pair(zones)
                    .map_or((*fallback, RateSource::Fallback), |rate| {
                        (rate, RateSource::Table)
                    }),
            ),
            BandPricing::Flat { .. } => None,
        }
    }
}

impl RateEngine for RegionBandMatrixEngine {
    fn carrier(&self) -> &CarrierMeta {
        &self.meta
    }

    /// Flat pricing reports the band as the destination zone; stepped pricing reports the region.
    fn resolve_zones(
        &self,
        _request: &QuoteRequest,
        origin: &Location,
        destination: &Location,
    ) -> ZonePair {
        let lane = self.regions.resolve_pair(origin, destination);
        match &self.pricing {
            BandPricing::Flat {
                bands,
                default_band,
                ..
            } => {
                let band = bands.get_pair(&lane).unwrap_or(*default_band);
                ZonePair::new(lane.from, Some(band.to_owned()))
            }
            BandPricing::Stepped { .. } => lane,
        }
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
        match &self.pricing {
            BandPricing::Flat {
                band_rates,
                fallback_rate,
                ..
            } => {
                let (rate_per_kg, source) = zones
                    .to
                    .as_deref()
                    .and_then(normalize_key)
                    .and_then(|band| band_rates.get(&band).copied())
                    .map_or((*fallback_rate, RateSource::Fallback), |rate| {
                        (rate, RateSource::Table)
                    });
                BaseRate {
                    rate_per_kg,
                    freight: rate_per_kg * chargeable_weight,
                    source,
                }
            }
            BandPricing::Stepped { rates, fallback } => {
                let (step, source) = rates
                    .get_pair(zones)
                    .map_or((*fallback, RateSource::Fallback), |rate| {
                        (rate, RateSource::Table)
                    });
                let freight = step.freight(chargeable_weight);
                let rate_per_kg = if chargeable_weight > 0.0 {
                    round_money(freight / chargeable_weight)
                } else {
                    round_money(step.first_10kg / FIRST_STEP_KG)
                };
                BaseRate {
                    rate_per_kg,
                    freight,
                    source,
                }
            }
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
    use crate::engine::MinimumStage;
    use crate::model::{CarrierId, ParcelItem};
    use crate::pipeline::{ChargeBase, SurchargeKind, SurchargePipeline, SurchargeStep};
    use crate::registry::LocationRegistry;
    use crate::tax::TaxPolicy;
    use crate::weight::WeightRule;

    fn regions() -> ZoneResolver {
        ZoneResolver::new(CarrierId::Safexpress)
            .with_states(&[("delhi", "NORTH"), ("maharashtra", "WEST")])
            .with_default("CENTRAL")
    }

    fn locations() -> LocationRegistry {
        LocationRegistry::new(vec![
            Location::unresolved("110001").with_state("Delhi"),
            Location::unresolved("400001").with_state("Maharashtra"),
        ])
    }

    fn request(weight: f64) -> QuoteRequest {
        let item = ParcelItem::new(weight, 1.0, 1.0, 1.0).expect("valid item");
        QuoteRequest::new("110001", "400001", vec![item])
    }

    fn profile(pipeline: SurchargePipeline, minimum: MinimumStage) -> PricingProfile {
        PricingProfile::new(WeightRule::new(5000.0, 0.0), pipeline, TaxPolicy::default(), minimum)
    }

    #[test]
    fn flat_band_prices_by_band_rate() {
        let engine = RegionBandMatrixEngine::new(
            CarrierMeta::new(CarrierId::Safexpress, "Band Test"),
            regions(),
            BandPricing::flat(
                ZoneMatrix::new(["NORTH", "WEST"], [["A", "B"], ["B", "A"]]),
                "C",
                &[("A", 6.0), ("B", 8.0), ("C", 10.0)],
                10.0,
            ),
            profile(SurchargePipeline::default(), MinimumStage::Unfloored),
        )
        .expect("valid engine");
        let quote = engine
            .compute_quote(&request(100.0), &locations())
            .expect("quote computes");
        assert_eq!(quote.from_zone.as_deref(), Some("NORTH"));
        assert_eq!(quote.to_zone.as_deref(), Some("B"));
        assert_eq!(quote.base_freight, 800.0);
        assert_eq!(quote.diagnostics["rate_source"], "table");
    }

    #[test]
    fn missing_lane_uses_default_band() {
        let engine = RegionBandMatrixEngine::new(
            CarrierMeta::new(CarrierId::Safexpress, "Band Test"),
            regions(),
            BandPricing::flat(
                ZoneMatrix::new(["NORTH"], [["A"]]),
                "C",
                &[("A", 6.0), ("C", 10.0)],
                11.0,
            ),
            profile(SurchargePipeline::default(), MinimumStage::Unfloored),
        )
        .expect("valid engine");
        let quote = engine
            .compute_quote(&request(10.0), &locations())
            .expect("quote computes");
        assert_eq!(quote.to_zone.as_deref(), Some("C"));
        assert_eq!(quote.rate_per_kg, 10.0);
    }

    #[test]
    fn pre_tax_top_up_lifts_small_shipments() {
        let pipeline = SurchargePipeline::new(vec![
            SurchargeStep::Flat {
                kind: SurchargeKind::Waybill,
                amount: 150.0,
            },
            SurchargeStep::MinimumTopUp {
                threshold: 500.0,
                on: ChargeBase::Running,
            },
            SurchargeStep::Fuel {
                percent: 0.10,
                on: ChargeBase::Running,
            },
        ]);
        let engine = RegionBandMatrixEngine::new(
            CarrierMeta::new(CarrierId::Safexpress, "Band Test"),
            regions(),
            BandPricing::flat(ZoneMatrix::new(["NORTH"], [["A"]]), "C", &[("C", 10.0)], 10.0),
            profile(pipeline, MinimumStage::PreTaxTopUp),
        )
        .expect("valid engine");
        let quote = engine
            .compute_quote(&request(20.0), &locations())
            .expect("quote computes");
        assert_eq!(quote.base_freight, 200.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::Osc), Some(150.0));
        assert_eq!(quote.surcharges.get(SurchargeKind::FuelSurcharge), Some(50.0));
        assert_eq!(quote.total_before_tax, 550.0);
    }

    #[test]
    fn stepped_rate_charges_first_ten_then_per_kg() {
        let engine = RegionBandMatrixEngine::new(
            CarrierMeta::new(CarrierId::BigshipMetro, "Stepped Test"),
            regions(),
            BandPricing::stepped(
                ZoneMatrix::new(
                    ["NORTH", "WEST"],
                    [
                        [StepRate::new(200.0, 18.0), StepRate::new(296.0, 24.0)],
                        [StepRate::new(296.0, 24.0), StepRate::new(200.0, 18.0)],
                    ],
                ),
                StepRate::new(400.0, 30.0),
            ),
            profile(SurchargePipeline::default(), MinimumStage::Unfloored).tax_inclusive(),
        )
        .expect("valid engine");
        let light = engine
            .compute_quote(&request(4.0), &locations())
            .expect("quote computes");
        assert_eq!(light.base_freight, 296.0);
        assert_eq!(light.tax_amount, 0.0);
        assert_eq!(light.total_after_tax, 296.0);

        let heavy = engine
            .compute_quote(&request(15.0), &locations())
            .expect("quote computes");
        assert_eq!(heavy.base_freight, 416.0);
        assert_eq!(heavy.to_zone.as_deref(), Some("WEST"));
        assert_eq!(heavy.diagnostics["first_10kg_charge"], 296.0);
    }
}
