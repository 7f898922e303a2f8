//! Carrier plugins for Bigship.
//!
//! [`plugin`] prices the franchise services: CFT and LTL from per-kilogram zone
//! matrices, MPS from a matrix of first-ten-kilogram charges plus a per-kilogram
//! rate. Out-of-delivery-area fees apply only to CFT and LTL and never within a
//! single zone. [`metro_plugin`] prices Bigship Metro Parcel from the same stepped
//! matrix as MPS. Every Bigship rate includes GST and no fuel is charged.

use std::sync::Arc;

use freightquote_core::engine::{
    BandPricing, MinimumStage, OdaAwareSlabEngine, PricingProfile, RegionBandMatrixEngine,
    StepRate, ZoneMatrix, ZoneMatrixEngine,
};
use freightquote_core::pipeline::{SurchargeKind, SurchargePipeline, SurchargeStep};
use freightquote_core::weight::WeightRule;
use freightquote_core::zones::ZoneResolver;
use freightquote_core::{
    CarrierId, CarrierMeta, CarrierPlugin, ConfigError, ServiceSubtype, Settings,
};

const ODA_CHARGE: f64 = 600.0;
const OWNER_RISK_FEE: f64 = 33.0;
const GREEN_TAX_STATE: &str = "delhi";
const GREEN_TAX_PERCENT: f64 = 0.01;
const MINIMUM_BASE_FREIGHT: f64 = 350.0;

const CFT_ZONE_BY_STATE: &[(&str, &str)] = &[
    ("delhi", "N1"),
    ("dl", "N1"),
    ("uttar pradesh", "N1"),
    ("up", "N1"),
    ("haryana", "N1"),
    ("rajasthan", "N1"),
    ("chandigarh", "N2"),
    ("punjab", "N2"),
    ("himachal pradesh", "N2"),
    ("hp", "N2"),
    ("uttarakhand", "N2"),
    ("jammu & kashmir", "N2"),
    ("jammu and kashmir", "N2"),
    ("j&k", "N2"),
    ("ladakh", "N2"),
    ("west bengal", "E"),
    ("wb", "E"),
    ("odisha", "E"),
    ("bihar", "E"),
    ("jharkhand", "E"),
    ("assam", "NE"),
    ("meghalaya", "NE"),
    ("tripura", "NE"),
    ("manipur", "NE"),
    ("mizoram", "NE"),
    ("nagaland", "NE"),
    ("arunachal pradesh", "NE"),
    ("sikkim", "NE"),
    ("gujarat", "W1"),
    ("dadra and nagar haveli", "W1"),
    ("maharashtra", "W2"),
    ("karnataka", "S1"),
    ("telangana", "S1"),
    ("andhra pradesh", "S2"),
    ("tamil nadu", "S2"),
    ("madhya pradesh", "Central"),
    ("chhattisgarh", "Central"),
    ("goa", "Central"),
    ("kerala", "Central"),
];

const LTL_ZONE_BY_STATE: &[(&str, &str)] = &[
    ("delhi", "N1"),
    ("dl", "N1"),
    ("chandigarh", "N1"),
    ("himachal pradesh", "N2"),
    ("hp", "N2"),
    ("uttarakhand", "N2"),
    ("punjab", "N2"),
    ("haryana", "N3"),
    ("rajasthan", "N3"),
    ("uttar pradesh", "N3"),
    ("up", "N3"),
    ("jammu & kashmir", "N4"),
    ("jammu and kashmir", "N4"),
    ("j&k", "N4"),
    ("madhya pradesh", "C1"),
    ("chhattisgarh", "C2"),
    ("maharashtra", "W1"),
    ("gujarat", "W2"),
    ("goa", "W2"),
    ("dadra and nagar haveli", "W2"),
    ("daman and diu", "W2"),
    ("karnataka", "S1"),
    ("andhra pradesh", "S2"),
    ("telangana", "S2"),
    ("tamil nadu", "S3"),
    ("kerala", "S4"),
    ("west bengal", "E1"),
    ("wb", "E1"),
    ("bihar", "E2"),
    ("odisha", "E2"),
    ("jharkhand", "E2"),
    ("assam", "NE1"),
    ("arunachal pradesh", "NE2"),
    ("manipur", "NE2"),
    ("meghalaya", "NE2"),
    ("mizoram", "NE2"),
    ("nagaland", "NE2"),
    ("sikkim", "NE2"),
    ("tripura", "NE2"),
];

/// Shared by MPS and Metro Parcel.
const MPS_ZONE_BY_STATE: &[(&str, &str)] = &[
    ("delhi", "N1"),
    ("dl", "N1"),
    ("haryana", "N1"),
    ("chandigarh", "N1"),
    ("uttar pradesh", "N2"),
    ("up", "N2"),
    ("rajasthan", "N2"),
    ("punjab", "N2"),
    ("dehradun", "N2"),
    ("uttarakhand", "N2"),
    ("madhya pradesh", "C"),
    ("mp", "C"),
    ("chhattisgarh", "C"),
    ("maharashtra", "W1"),
    ("gujarat", "W2"),
    ("goa", "W2"),
    ("daman and diu", "W2"),
    ("dadra and nagar haveli", "W2"),
    ("tamil nadu", "S1"),
    ("tn", "S1"),
    ("karnataka", "S1"),
    ("andhra pradesh", "S2"),
    ("ap", "S2"),
    ("telangana", "S2"),
    ("pondicherry", "S2"),
    ("west bengal", "E1"),
    ("wb", "E1"),
    ("bihar", "E2"),
    ("jharkhand", "E2"),
    ("odisha", "E2"),
    ("assam", "SPL"),
    ("arunachal pradesh", "SPL"),
    ("manipur", "SPL"),
    ("meghalaya", "SPL"),
    ("mizoram", "SPL"),
    ("nagaland", "SPL"),
    ("sikkim", "SPL"),
    ("tripura", "SPL"),
    ("himachal pradesh", "SPL"),
    ("hp", "SPL"),
    ("jammu & kashmir", "SPL"),
    ("jammu and kashmir", "SPL"),
    ("j&k", "SPL"),
    ("ladakh", "SPL"),
    ("kerala", "SPL"),
];

const CFT_ZONES: [&str; 9] = ["N1", "N2", "E", "NE", "W1", "W2", "S1", "S2", "Central"];

#[rustfmt::skip]
const CFT_RATES: [[f64; 9]; 9] = [
    //  N1     N2     E      NE     W1     W2     S1     S2     Central
    [ 9.02,  9.77, 13.75, 24.27, 10.31, 12.88, 15.35, 16.63, 11.19], // N1
    [ 9.94,  9.25, 15.48, 32.75, 11.92, 13.31, 15.64, 17.94, 11.97], // N2
    [11.91, 12.76, 10.71, 26.09, 12.18, 12.17, 13.05, 16.43, 11.32], // E
    [26.26, 29.26, 21.53, 22.76, 27.26, 28.43, 27.26, 28.59, 26.26], // NE
    [11.06, 13.43, 16.00, 33.75,  7.95, 10.46, 14.44, 15.87, 11.43], // W1
    [12.62, 13.95, 14.83, 29.60,  9.38,  8.81, 11.86, 14.05, 11.19], // W2
    [14.56, 16.29, 14.42, 30.85, 12.01, 11.25, 10.71, 10.84, 12.92], // S1
    [16.93, 20.11, 15.52, 33.42, 11.91, 10.58, 10.48,  8.57, 11.86], // S2
    [11.25, 12.58, 14.52, 31.80,  9.91, 10.73, 13.25, 15.82, 11.25], // Central
];

const CFT_FALLBACK_RATE: f64 = 10.0;

const LTL_ZONES: [&str; 16] = [
    "N1", "N2", "N3", "N4", "C1", "C2", "W1", "W2", "S1", "S2", "S3", "S4", "E1", "E2", "NE1",
    "NE2",
];

#[rustfmt::skip]
const LTL_RATES: [[f64; 16]; 16] = [
    //  N1     N2     N3     N4     C1     C2     W1     W2     S1     S2     S3     S4     E1     E2     NE1    NE2
    [ 7.60,  8.50,  8.96,  9.21, 11.23, 11.36, 11.87, 11.33, 17.46, 17.46, 18.27, 24.32, 15.49, 15.66, 19.99, 24.61], // N1
    [ 8.61,  9.78,  9.10, 11.05, 12.52, 14.39, 16.61, 17.18, 18.94, 18.57, 19.66, 24.32, 15.98, 16.82, 20.01, 25.54], // N2
    [ 8.20,  8.71,  8.26, 10.25, 12.91, 12.64, 12.46, 13.35, 17.59, 15.57, 16.25, 24.32, 14.72, 14.90, 22.11, 25.02], // N3
    [11.30, 11.19, 11.19,  8.93, 15.73, 16.69, 13.30, 13.87, 17.62, 16.78, 17.32, 24.69, 16.11, 15.72, 21.67, 23.93], // N4
    [12.14, 12.07, 12.69, 13.30, 11.14, 12.33, 10.17, 10.84, 14.90, 14.47, 17.30, 19.15, 14.72, 14.65, 22.55, 26.80], // C1
    [12.91, 12.64, 12.77, 13.04, 12.53,  8.43, 10.70, 12.31, 16.86, 16.34, 16.33, 19.22, 15.05, 15.09, 23.03, 26.53], // C2
    [12.22, 12.65, 13.15, 14.44, 10.44, 11.74,  7.60,  8.57, 12.84, 12.88, 13.56, 18.94, 17.45, 17.67, 20.07, 23.22], // W1
    [12.68, 12.89, 13.81, 17.27, 11.21, 15.99,  9.37, 10.52, 17.59, 17.93, 18.27, 18.93, 18.99, 17.84, 27.21, 26.22], // W2
    [12.48, 17.10, 16.92, 15.44, 13.08, 13.56, 10.54, 11.54,  9.52, 11.04, 11.18, 13.49, 16.25, 16.25, 23.16, 23.22], // S1
    [12.55, 18.00, 16.92, 16.25, 13.02, 13.15, 11.00, 13.22, 10.79, 10.19, 13.36, 14.16, 16.25, 17.73, 23.10, 24.47], // S2
    [13.56, 17.35, 17.30, 17.32, 13.68, 13.56, 11.57, 12.93, 11.59, 10.84,  9.52, 13.27, 22.01, 21.63, 24.25, 26.09], // S3
    [13.56, 17.21, 18.00, 16.65, 13.28, 13.18, 11.56, 12.48, 12.81, 12.20, 12.58, 12.47, 21.36, 21.16, 24.10, 24.70], // S4
    [12.14, 13.07, 13.45, 13.56, 12.14, 12.60, 13.35, 13.47, 12.14, 13.02, 13.45, 14.23,  9.26, 11.45, 14.15, 16.81], // E1
    [13.44, 13.45, 13.56, 14.24, 12.67, 13.56, 13.61, 13.29, 14.90, 13.56, 16.25, 17.98, 11.86,  9.88, 15.97, 18.41], // E2
    [18.51, 19.26, 20.09, 21.39, 17.67, 17.67, 18.33, 20.09, 20.09, 20.09, 20.09, 21.33, 13.40, 15.44, 10.89, 12.56], // NE1
    [22.31, 22.14, 23.56, 25.37, 18.88, 18.88, 21.85, 23.07, 21.39, 22.14, 23.56, 25.37, 15.44, 17.29, 11.82, 13.78], // NE2
];

const LTL_FALLBACK_RATE: f64 = 15.0;

/// Parcel zones shared by MPS and Metro Parcel.
const PARCEL_ZONES: [&str; 10] = ["N1", "N2", "C", "W1", "W2", "S1", "S2", "E1", "E2", "SPL"];

const LOCAL: StepRate = StepRate::new(153.0, 14.0);
const NEAR: StepRate = StepRate::new(222.0, 20.0);
const LINKED: StepRate = StepRate::new(263.0, 23.0);
const SOUTH: StepRate = StepRate::new(180.0, 17.0);
const REST: StepRate = StepRate::new(296.0, 24.0);
const SPECIAL: StepRate = StepRate::new(376.0, 32.0);

#[rustfmt::skip]
const PARCEL_RATES: [[StepRate; 10]; 10] = [
    //  N1      N2     C      W1      W2     S1     S2     E1      E2     SPL
    [LOCAL,  NEAR,  REST,  LINKED, REST,  LINKED, REST, LINKED, REST,  SPECIAL], // N1
    [NEAR,   REST,  REST,  REST,   REST,  REST,  REST,  REST,   REST,  SPECIAL], // N2
    [REST,   REST,  NEAR,  REST,   REST,  REST,  REST,  REST,   REST,  SPECIAL], // C
    [LINKED, REST,  REST,  LOCAL,  NEAR,  REST,  REST,  LINKED, REST,  SPECIAL], // W1
    [REST,   REST,  REST,  NEAR,   NEAR,  REST,  REST,  REST,   REST,  SPECIAL], // W2
    [LINKED, REST,  REST,  REST,   REST,  SOUTH, REST,  LINKED, REST,  SPECIAL], // S1
    [REST,   REST,  REST,  REST,   REST,  NEAR,  NEAR,  REST,   REST,  SPECIAL], // S2
    [REST,   REST,  REST,  REST,   REST,  REST,  REST,  LOCAL,  NEAR,  SPECIAL], // E1
    [REST,   REST,  REST,  REST,   REST,  REST,  REST,  REST,   REST,  SPECIAL], // E2
    [SPECIAL, SPECIAL, SPECIAL, SPECIAL, SPECIAL, SPECIAL, SPECIAL, SPECIAL, SPECIAL, SPECIAL], // SPL
];

/// Build the Bigship franchise plugin covering CFT, LTL, and MPS.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a tariff table is inconsistent.
pub fn plugin(settings: &Settings) -> Result<CarrierPlugin, ConfigError> {
    Ok(CarrierPlugin::new(Arc::new(engine(settings)?)))
}

/// Build the franchise engine. LTL prices requests without a service subtype.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a tariff table is inconsistent.
pub fn engine(settings: &Settings) -> Result<OdaAwareSlabEngine, ConfigError> {
    OdaAwareSlabEngine::new(
        (ServiceSubtype::Ltl, ltl(settings)?.into()),
        vec![
            (ServiceSubtype::Cft, cft(settings)?.into()),
            (ServiceSubtype::Mps, parcel_engine(meta(), settings)?.into()),
        ],
        &[ServiceSubtype::Cft, ServiceSubtype::Ltl],
    )
}

fn meta() -> CarrierMeta {
    CarrierMeta::new(CarrierId::Bigship, "Bigship")
}

fn franchise_pipeline(lr_fee: f64) -> SurchargePipeline {
    SurchargePipeline::new(vec![
        SurchargeStep::Flat {
            kind: SurchargeKind::Lr,
            amount: lr_fee,
        },
        SurchargeStep::Pickup {
            per_kg: 1.0,
            minimum: 75.0,
            above_kg: 20.0,
        },
        SurchargeStep::Flat {
            kind: SurchargeKind::OwnerRisk,
            amount: OWNER_RISK_FEE,
        },
        SurchargeStep::GreenTax {
            state: GREEN_TAX_STATE,
            percent: GREEN_TAX_PERCENT,
        },
        SurchargeStep::OutOfDeliveryArea {
            kind: SurchargeKind::Oda,
            flat: ODA_CHARGE,
            per_kg: None,
        },
    ])
}

fn franchise_profile(settings: &Settings, weight: WeightRule, lr_fee: f64) -> PricingProfile {
    PricingProfile::new(
        weight,
        franchise_pipeline(lr_fee),
        settings.tax,
        MinimumStage::BaseFreight(MINIMUM_BASE_FREIGHT),
    )
    .tax_inclusive()
}

fn cft(settings: &Settings) -> Result<ZoneMatrixEngine, ConfigError> {
    ZoneMatrixEngine::new(
        meta(),
        ZoneResolver::new(CarrierId::Bigship)
            .with_states(CFT_ZONE_BY_STATE)
            .with_default("Central"),
        ZoneMatrix::new(CFT_ZONES, CFT_RATES),
        CFT_FALLBACK_RATE,
        franchise_profile(settings, WeightRule::new(2700.0, 0.0), 25.0),
    )
}

fn ltl(settings: &Settings) -> Result<ZoneMatrixEngine, ConfigError> {
    ZoneMatrixEngine::new(
        meta(),
        ZoneResolver::new(CarrierId::Bigship)
            .with_states(LTL_ZONE_BY_STATE)
            .with_default("N1"),
        ZoneMatrix::new(LTL_ZONES, LTL_RATES),
        LTL_FALLBACK_RATE,
        franchise_profile(settings, WeightRule::new(4500.0, 25.0), 80.0),
    )
}

/// Stepped parcel tariff used by MPS and by Metro Parcel. Rates include GST.
fn parcel_engine(
    meta: CarrierMeta,
    settings: &Settings,
) -> Result<RegionBandMatrixEngine, ConfigError> {
    let profile = PricingProfile::new(
        WeightRule::new(5000.0, 0.0),
        SurchargePipeline::new(vec![
            SurchargeStep::Flat {
                kind: SurchargeKind::Lr,
                amount: 25.0,
            },
            SurchargeStep::GreenTax {
                state: GREEN_TAX_STATE,
                percent: GREEN_TAX_PERCENT,
            },
        ]),
        settings.tax,
        MinimumStage::Unfloored,
    )
    .tax_inclusive();
    let zones = ZoneResolver::new(meta.id)
        .with_states(MPS_ZONE_BY_STATE)
        .with_default("N1");
    RegionBandMatrixEngine::new(
        meta,
        zones,
        BandPricing::stepped(ZoneMatrix::new(PARCEL_ZONES, PARCEL_RATES), REST),
        profile,
    )
}

/// Build the Bigship Metro Parcel plugin.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the tariff configuration is inconsistent.
pub fn metro_plugin(settings: &Settings) -> Result<CarrierPlugin, ConfigError> {
    Ok(CarrierPlugin::new(Arc::new(metro_engine(settings)?)))
}

/// Build the Metro Parcel engine. Its rates already include GST.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the tariff configuration is inconsistent.
pub fn metro_engine(settings: &Settings) -> Result<RegionBandMatrixEngine, ConfigError> {
    parcel_engine(
        CarrierMeta::new(CarrierId::BigshipMetro, "Bigship Metro Parcel"),
        settings,
    )
}

#[cfg(test)]
mod tests {
    use freightquote_core::registry::LocationRegistry;
    use freightquote_core::{Location, ParcelItem, QuoteRequest, QuoteResult, RateEngine};

    use super::*;

    fn locations() -> LocationRegistry {
        LocationRegistry::new(vec![
            Location::unresolved("110001")
                .with_state("Delhi")
                .with_oda(CarrierId::Bigship, false),
            Location::unresolved("110085")
                .with_state("Delhi")
                .with_oda(CarrierId::Bigship, true),
            Location::unresolved("413001")
                .with_state("Maharashtra")
                .with_oda(CarrierId::Bigship, true),
            Location::unresolved("560001").with_state("Karnataka"),
        ])
    }

    fn request(origin: &str, destination: &str, weight: f64) -> QuoteRequest {
        let item = ParcelItem::new(weight, 10.0, 10.0, 10.0).expect("valid item");
        QuoteRequest::new(origin, destination, vec![item])
    }

    fn quote(request: &QuoteRequest) -> QuoteResult {
        engine(&Settings::default())
            .expect("engine builds")
            .compute_quote(request, &locations())
            .expect("quote computes")
    }

    fn metro_quote(request: &QuoteRequest) -> QuoteResult {
        metro_engine(&Settings::default())
            .expect("metro engine builds")
            .compute_quote(request, &locations())
            .expect("quote computes")
    }

    #[test]
    fn ltl_is_the_default_service_priced_from_its_zone_matrix() {
        let quote = quote(&request("110001", "413001", 100.0));
        assert_eq!(quote.from_zone.as_deref(), Some("N1"));
        assert_eq!(quote.to_zone.as_deref(), Some("W1"));
        assert_eq!(quote.rate_per_kg, 11.87);
        assert_eq!(quote.base_freight, 1187.0);
        let lines: Vec<(SurchargeKind, f64)> = quote.surcharges.iter().collect();
        assert_eq!(
            lines,
            vec![
                (SurchargeKind::Lr, 80.0),
                (SurchargeKind::Pickup, 100.0),
                (SurchargeKind::OwnerRisk, 33.0),
                (SurchargeKind::Oda, 600.0),
            ]
        );
        assert_eq!(quote.total_before_tax, 2000.0);
        assert_eq!(quote.tax_amount, 0.0);
        assert_eq!(quote.total_after_tax, 2000.0);
        assert_eq!(quote.diagnostics["service_type"], "LTL");
    }

    #[test]
    fn ltl_light_shipment_is_floored() {
        let quote = quote(&request("110001", "413001", 12.0));
        assert_eq!(quote.chargeable_weight_kg, 25.0);
        assert_eq!(quote.base_freight, 350.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::Pickup), Some(75.0));
        assert_eq!(quote.total_after_tax, 1138.0);
    }

    #[test]
    fn cft_uses_its_own_zones_and_rates() {
        let request = request("110001", "413001", 50.0).with_subtype(ServiceSubtype::Cft);
        let quote = quote(&request);
        assert_eq!(quote.from_zone.as_deref(), Some("N1"));
        assert_eq!(quote.to_zone.as_deref(), Some("W2"));
        assert_eq!(quote.rate_per_kg, 12.88);
        assert_eq!(quote.base_freight, 644.0);
        let lines: Vec<(SurchargeKind, f64)> = quote.surcharges.iter().collect();
        assert_eq!(
            lines,
            vec![
                (SurchargeKind::Lr, 25.0),
                (SurchargeKind::Pickup, 75.0),
                (SurchargeKind::OwnerRisk, 33.0),
                (SurchargeKind::Oda, 600.0),
            ]
        );
        assert_eq!(quote.tax_amount, 0.0);
        assert_eq!(quote.total_after_tax, 1377.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::FuelSurcharge), None);
    }

    #[test]
    fn cft_within_one_zone_skips_oda_and_pays_green_tax() {
        let request = request("110001", "110085", 3.0).with_subtype(ServiceSubtype::Cft);
        let quote = quote(&request);
        assert!(quote.deliverable);
        assert_eq!(quote.rate_per_kg, 9.02);
        assert_eq!(quote.base_freight, 350.0);
        let lines: Vec<(SurchargeKind, f64)> = quote.surcharges.iter().collect();
        assert_eq!(
            lines,
            vec![
                (SurchargeKind::Lr, 25.0),
                (SurchargeKind::OwnerRisk, 33.0),
                (SurchargeKind::GreenTax, 3.5),
            ]
        );
        assert_eq!(quote.total_before_tax, 411.5);
        assert_eq!(quote.total_after_tax, 411.5);
    }

    #[test]
    fn mps_uses_the_parcel_matrix_and_never_charges_oda() {
        let request = request("110001", "413001", 15.0).with_subtype(ServiceSubtype::Mps);
        let quote = quote(&request);
        assert_eq!(quote.from_zone.as_deref(), Some("N1"));
        assert_eq!(quote.to_zone.as_deref(), Some("W1"));
        assert_eq!(quote.base_freight, 378.0);
        assert_eq!(quote.rate_per_kg, 25.2);
        let lines: Vec<(SurchargeKind, f64)> = quote.surcharges.iter().collect();
        assert_eq!(lines, vec![(SurchargeKind::Lr, 25.0)]);
        assert_eq!(quote.tax_amount, 0.0);
        assert_eq!(quote.total_after_tax, 403.0);
        assert_eq!(quote.diagnostics["oda_eligible_service"], false);
    }

    #[test]
    fn metro_charges_first_ten_kilograms_then_per_kilogram() {
        let ten = metro_quote(&request("413001", "560001", 10.0));
        assert_eq!(ten.from_zone.as_deref(), Some("W1"));
        assert_eq!(ten.to_zone.as_deref(), Some("S1"));
        assert_eq!(ten.base_freight, 296.0);
        assert_eq!(ten.tax_amount, 0.0);
        assert_eq!(ten.total_after_tax, 321.0);

        let fifteen = metro_quote(&request("413001", "560001", 15.0));
        assert_eq!(fifteen.base_freight, 416.0);
    }

    #[test]
    fn metro_local_delhi_lane_pays_green_tax() {
        let quote = metro_quote(&request("110001", "110085", 15.0));
        assert_eq!(quote.base_freight, 223.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::GreenTax), Some(2.23));
        assert_eq!(quote.total_before_tax, 250.23);
        assert_eq!(quote.total_after_tax, 250.23);
    }

    #[test]
    fn plugins_use_distinct_carrier_ids() {
        let settings = Settings::default();
        let franchise = plugin(&settings).expect("plugin builds");
        let metro = metro_plugin(&settings).expect("metro plugin builds");
        assert_eq!(franchise.meta.id, CarrierId::Bigship);
        assert_eq!(metro.meta.id, CarrierId::BigshipMetro);
    }
}
