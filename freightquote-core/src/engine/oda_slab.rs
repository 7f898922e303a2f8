use std::collections::{BTreeMap, BTreeSet};

use crate::config::ConfigError;
use crate::engine::{
    Diagnostics, RegionBandMatrixEngine, WeightSlabEngine, ZoneMatrixEngine, note,
};
use crate::model::{CarrierMeta, Location, QuoteRequest, QuoteResult, ServiceSubtype, ZonePair};
use crate::pipeline::{SurchargeContext, SurchargeLedger};
use crate::ports::{BaseRate, LocationLookup, QuoteError, RateEngine};

/// Tariff for one service subtype.
#[derive(Debug, Clone)]
pub enum ServiceEngine {
    /// Rate chosen by weight slab.
    Slabs(WeightSlabEngine),
    /// Per-kilogram rate from a zone matrix.
    Matrix(ZoneMatrixEngine),
    /// Region bands or a stepped region matrix.
    Bands(RegionBandMatrixEngine),
}

impl ServiceEngine {
    fn engine(&self) -> &dyn RateEngine {
        match self {
            Self::Slabs(engine) => engine,
            Self::Matrix(engine) => engine,
            Self::Bands(engine) => engine,
        }
    }

    fn quote_with(
        &self,
        request: &QuoteRequest,
        locations: &dyn LocationLookup,
        oda_gate: impl FnOnce(&ZonePair) -> bool,
        extra: impl FnOnce(&mut Diagnostics),
    ) -> Result<QuoteResult, QuoteError> {
        match self {
            Self::Slabs(engine) => engine.quote_with(request, locations, oda_gate, extra),
            Self::Matrix(engine) => engine.quote_with(request, locations, oda_gate, extra),
            Self::Bands(engine) => engine.quote_with(request, locations, oda_gate, extra),
        }
    }
}

impl From<WeightSlabEngine> for ServiceEngine {
    fn from(engine: WeightSlabEngine) -> Self {
        Self::Slabs(engine)
    }
}

impl From<ZoneMatrixEngine> for ServiceEngine {
    fn from(engine: ZoneMatrixEngine) -> Self {
        Self::Matrix(engine)
    }
}

impl From<RegionBandMatrixEngine> for ServiceEngine {
    fn from(engine: RegionBandMatrixEngine) -> Self {
        Self::Bands(engine)
    }
}

/// Separate tariffs per service subtype, with ODA charges limited to some
/// subtypes and never applied within a single zone.
#[derive(Debug, Clone)]
pub struct OdaAwareSlabEngine {
    meta: CarrierMeta,
    default_service: ServiceSubtype,
    default_engine: ServiceEngine,
    services: BTreeMap<ServiceSubtype, ServiceEngine>,
    oda_services: BTreeSet<ServiceSubtype>,
}

impl OdaAwareSlabEngine {
    /// Combine per-subtype engines. Requests without a subtype, or with one that has
    /// no engine, are priced by the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateService`] when a subtype is configured twice.
    pub fn new(
        default: (ServiceSubtype, ServiceEngine),
        others: Vec<(ServiceSubtype, ServiceEngine)>,
        oda_services: &[ServiceSubtype],
    ) -> Result<Self, ConfigError> {
        let (default_service, default_engine) = default;
        let meta = default_engine.engine().carrier().clone();
        let mut services = BTreeMap::new();
        for (subtype, engine) in others {
            if subtype == default_service || services.insert(subtype, engine).is_some() {
                return Err(ConfigError::DuplicateService {
                    carrier: meta.id,
                    service: subtype.to_string(),
                });
            }
        }
        Ok(Self {
            meta,
            default_service,
            default_engine,
            services,
            oda_services: oda_services.iter().copied().collect(),
        })
    }

    /// Subtype and engine that will price a request.
    #[must_use]
    pub fn service_for(&self, request: &QuoteRequest) -> (ServiceSubtype, &ServiceEngine) {
        let requested = request.service_subtype.unwrap_or(self.default_service);
        self.services
            .get(&requested)
            .map_or((self.default_service, &self.default_engine), |engine| {
                (requested, engine)
            })
    }
}

impl RateEngine for OdaAwareSlabEngine {
    fn carrier(&self) -> &CarrierMeta {
        &self.meta
    }

    fn resolve_zones(
        &self,
        request: &QuoteRequest,
        origin: &Location,
        destination: &Location,
    ) -> ZonePair {
        self.service_for(request)
            .1
            .engine()
            .resolve_zones(request, origin, destination)
    }

    fn chargeable_weight(&self, request: &QuoteRequest) -> f64 {
        self.service_for(request).1.engine().chargeable_weight(request)
    }

    fn base_rate_per_kg(
        &self,
        request: &QuoteRequest,
        zones: &ZonePair,
        chargeable_weight: f64,
    ) -> BaseRate {
        self.service_for(request)
            .1
            .engine()
            .base_rate_per_kg(request, zones, chargeable_weight)
    }

    fn surcharges(&self, context: &SurchargeContext<'_>) -> SurchargeLedger {
        self.service_for(context.request).1.engine().surcharges(context)
    }

    fn compute_quote(
        &self,
        request: &QuoteRequest,
        locations: &dyn LocationLookup,
    ) -> Result<QuoteResult, QuoteError> {
        let (subtype, engine) = self.service_for(request);
        let oda_enabled = self.oda_services.contains(&subtype);
        engine.quote_with(
            request,
            locations,
            |zones| oda_enabled && !zones.is_within_zone(),
            |diagnostics| {
                note(diagnostics, "service_type", subtype.to_string());
                note(diagnostics, "oda_eligible_service", oda_enabled);
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MinimumStage, PricingProfile, Slab, SlabTable, ZoneMatrix};
    use crate::model::{CarrierId, ParcelItem};
    use crate::pipeline::{SurchargeKind, SurchargePipeline, SurchargeStep};
    use crate::registry::LocationRegistry;
    use crate::tax::TaxPolicy;
    use crate::weight::WeightRule;
    use crate::zones::ZoneResolver;

    fn zones() -> ZoneResolver {
        ZoneResolver::new(CarrierId::Bigship)
            .with_states(&[("delhi", "N1"), ("karnataka", "S1")])
            .with_default("N1")
    }

    fn profile() -> PricingProfile {
        PricingProfile::new(
            WeightRule::new(5000.0, 0.0),
            SurchargePipeline::new(vec![SurchargeStep::OutOfDeliveryArea {
                kind: SurchargeKind::Oda,
                flat: 600.0,
                per_kg: None,
            }]),
            TaxPolicy::default(),
            MinimumStage::Unfloored,
        )
    }

    fn service(rate: f64) -> WeightSlabEngine {
        WeightSlabEngine::new(
            CarrierMeta::new(CarrierId::Bigship, "Bigship"),
            zones(),
            SlabTable::new(CarrierId::Bigship, "flat", &[Slab::open(rate, 0.0)])
                .expect("single slab"),
            profile(),
        )
        .expect("valid engine")
    }

    fn matrix_service() -> ZoneMatrixEngine {
        ZoneMatrixEngine::new(
            CarrierMeta::new(CarrierId::Bigship, "Bigship"),
            zones(),
            ZoneMatrix::new(["N1", "S1"], [[9.0, 15.5], [14.5, 10.0]]),
            10.0,
            profile().tax_inclusive(),
        )
        .expect("valid engine")
    }

    fn engine() -> OdaAwareSlabEngine {
        OdaAwareSlabEngine::new(
            (ServiceSubtype::Ltl, service(50.0).into()),
            vec![
                (ServiceSubtype::Mps, service(60.0).into()),
                (ServiceSubtype::Cft, matrix_service().into()),
            ],
            &[ServiceSubtype::Ltl, ServiceSubtype::Cft],
        )
        .expect("valid services")
    }

    fn locations() -> LocationRegistry {
        LocationRegistry::new(vec![
            Location::unresolved("110001").with_state("Delhi"),
            Location::unresolved("110099")
                .with_state("Delhi")
                .with_oda(CarrierId::Bigship, true),
            Location::unresolved("560099")
                .with_state("Karnataka")
                .with_oda(CarrierId::Bigship, true),
        ])
    }

    fn request(destination: &str) -> QuoteRequest {
        let item = ParcelItem::new(10.0, 1.0, 1.0, 1.0).expect("valid item");
        QuoteRequest::new("110001", destination, vec![item])
    }

    #[test]
    fn oda_applies_across_zones_for_eligible_service() {
        let quote = engine()
            .compute_quote(&request("560099"), &locations())
            .expect("quote computes");
        assert_eq!(quote.surcharges.get(SurchargeKind::Oda), Some(600.0));
        assert_eq!(quote.diagnostics["service_type"], "LTL");
    }

    #[test]
    fn oda_is_skipped_within_one_zone() {
        let quote = engine()
            .compute_quote(&request("110099"), &locations())
            .expect("quote computes");
        assert_eq!(quote.from_zone, quote.to_zone);
        assert_eq!(quote.surcharges.get(SurchargeKind::Oda), None);
    }

    #[test]
    fn oda_is_skipped_for_ineligible_service() {
        let request = request("560099").with_subtype(ServiceSubtype::Mps);
        let quote = engine()
            .compute_quote(&request, &locations())
            .expect("quote computes");
        assert_eq!(quote.base_freight, 600.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::Oda), None);
    }

    #[test]
    fn matrix_service_prices_lane_and_keeps_oda() {
        let request = request("560099").with_subtype(ServiceSubtype::Cft);
        let quote = engine()
            .compute_quote(&request, &locations())
            .expect("quote computes");
        assert_eq!(quote.rate_per_kg, 15.5);
        assert_eq!(quote.base_freight, 155.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::Oda), Some(600.0));
        assert_eq!(quote.tax_amount, 0.0);
        assert_eq!(quote.total_after_tax, 755.0);
        assert_eq!(quote.diagnostics["service_type"], "CFT");
        assert_eq!(quote.diagnostics["zone_code"], "N1->S1");
    }

    #[test]
    fn unconfigured_subtype_falls_back_to_default() {
        let engine = OdaAwareSlabEngine::new(
            (ServiceSubtype::Ltl, service(50.0).into()),
            vec![(ServiceSubtype::Mps, service(60.0).into())],
            &[ServiceSubtype::Ltl],
        )
        .expect("valid services");
        let request = request("560099").with_subtype(ServiceSubtype::Cft);
        let (subtype, _) = engine.service_for(&request);
        assert_eq!(subtype, ServiceSubtype::Ltl);
    }

    #[test]
    fn duplicate_service_is_rejected() {
        let err = OdaAwareSlabEngine::new(
            (ServiceSubtype::Ltl, service(50.0).into()),
            vec![(ServiceSubtype::Ltl, service(60.0).into())],
            &[],
        )
        .expect_err("duplicate subtype");
        assert!(matches!(err, ConfigError::DuplicateService { .. }));
    }
}
