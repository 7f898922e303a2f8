//! Carrier plugin for Safexpress surface freight.
//!
//! Origin and destination states map to nine regions; the region lane picks a
//! rate band (A to E) and the band sets the rate per kilogram. Small shipments
//! are topped up to a pre-tax minimum measured on base freight and the waybill
//! fee; the top-up line follows the state surcharge and precedes fuel.

use std::sync::Arc;

use freightquote_core::engine::{
    BandPricing, MinimumStage, PricingProfile, RegionBandMatrixEngine, ZoneMatrix,
};
use freightquote_core::pipeline::{
    ChargeBase, StateTier, SurchargeKind, SurchargePipeline, SurchargeStep,
};
use freightquote_core::weight::WeightRule;
use freightquote_core::zones::ZoneResolver;
use freightquote_core::{CarrierId, CarrierMeta, CarrierPlugin, ConfigError, Settings};

/// Rate for a band without a configured rate.
pub const FALLBACK_RATE_PER_KG: f64 = 10.0;
/// Pre-tax amount every shipment is topped up to.
pub const MINIMUM_CHARGE: f64 = 500.0;

const VOLUMETRIC_DIVISOR: f64 = 4000.0;
const MINIMUM_WEIGHT_KG: f64 = 20.0;
const DEFAULT_REGION: &str = "CENTRAL";
const DEFAULT_BAND: &str = "C";

const REGIONS: [&str; 9] = [
    "NORTH_ONE",
    "NORTH_TWO",
    "EAST",
    "NORTH_EAST",
    "WEST_ONE",
    "WEST_TWO",
    "SOUTH_ONE",
    "SOUTH_TWO",
    "CENTRAL",
];

#[rustfmt::skip]
const BANDS: [[&str; 9]; 9] = [
    //  N1   N2   E    NE   W1   W2   S1   S2   C
    ["A", "A", "D", "E", "B", "C", "C", "D", "B"], // NORTH_ONE
    ["A", "A", "D", "E", "C", "C", "D", "D", "B"], // NORTH_TWO
    ["C", "D", "A", "B", "C", "D", "C", "D", "B"], // EAST
    ["C", "D", "B", "A", "D", "D", "D", "E", "C"], // NORTH_EAST
    ["B", "C", "D", "E", "A", "A", "C", "D", "B"], // WEST_ONE
    ["C", "D", "D", "E", "A", "A", "B", "D", "B"], // WEST_TWO
    ["C", "D", "D", "E", "C", "B", "A", "A", "B"], // SOUTH_ONE
    ["D", "D", "D", "E", "C", "C", "A", "A", "B"], // SOUTH_TWO
    ["B", "C", "D", "E", "A", "B", "B", "D", "A"], // CENTRAL
];

const BAND_RATES: &[(&str, f64)] = &[("A", 6.0), ("B", 8.0), ("C", 10.0), ("D", 12.0), ("E", 15.0)];

const REGION_BY_STATE: &[(&str, &str)] = &[
    ("delhi", "NORTH_ONE"),
    ("uttar pradesh", "NORTH_ONE"),
    ("haryana", "NORTH_ONE"),
    ("rajasthan", "NORTH_ONE"),
    ("chandigarh", "NORTH_TWO"),
    ("punjab", "NORTH_TWO"),
    ("himachal pradesh", "NORTH_TWO"),
    ("uttarakhand", "NORTH_TWO"),
    ("jammu and kashmir", "NORTH_TWO"),
    ("ladakh", "NORTH_TWO"),
    ("west bengal", "EAST"),
    ("odisha", "EAST"),
    ("orissa", "EAST"),
    ("bihar", "EAST"),
    ("jharkhand", "EAST"),
    ("chhattisgarh", "EAST"),
    ("assam", "NORTH_EAST"),
    ("meghalaya", "NORTH_EAST"),
    ("tripura", "NORTH_EAST"),
    ("arunachal pradesh", "NORTH_EAST"),
    ("mizoram", "NORTH_EAST"),
    ("manipur", "NORTH_EAST"),
    ("nagaland", "NORTH_EAST"),
    ("sikkim", "NORTH_EAST"),
    ("gujarat", "WEST_ONE"),
    ("gujaratstate", "WEST_ONE"),
    ("daman and diu", "WEST_ONE"),
    ("dadra and nagar haveli", "WEST_ONE"),
    ("maharashtra", "WEST_TWO"),
    ("goa", "WEST_TWO"),
    ("andhra pradesh", "SOUTH_ONE"),
    ("telangana", "SOUTH_ONE"),
    ("karnataka", "SOUTH_ONE"),
    ("tamil nadu", "SOUTH_ONE"),
    ("kerala", "SOUTH_TWO"),
    ("puducherry", "SOUTH_TWO"),
    ("pondicherry", "SOUTH_TWO"),
    ("madhya pradesh", "CENTRAL"),
];

/// Destination cities charged the urban congestion fee.
const UCC_CITIES: &[&str] = &[
    "ahmedabad",
    "bengaluru",
    "bangalore",
    "chennai",
    "delhi",
    "new delhi",
    "hyderabad",
    "kolkata",
    "mumbai",
    "pune",
    "vasai",
    "vasaivirar",
];

const STATE_TIERS: &[StateTier] = &[
    StateTier {
        states: &["kerala", "assam", "jammu and kashmir", "j&k"],
        per_kg: 4.0,
    },
    StateTier {
        states: &[
            "arunachal pradesh",
            "mizoram",
            "tripura",
            "manipur",
            "meghalaya",
            "nagaland",
        ],
        per_kg: 12.0,
    },
];

/// Build the Safexpress plugin.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the tariff configuration is inconsistent.
pub fn plugin(settings: &Settings) -> Result<CarrierPlugin, ConfigError> {
    Ok(CarrierPlugin::new(Arc::new(engine(settings)?)))
}

/// Build the rate engine.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the tariff configuration is inconsistent.
pub fn engine(settings: &Settings) -> Result<RegionBandMatrixEngine, ConfigError> {
    let regions = ZoneResolver::new(CarrierId::Safexpress)
        .with_states(REGION_BY_STATE)
        .with_default(DEFAULT_REGION);
    let pricing = BandPricing::flat(
        ZoneMatrix::new(REGIONS, BANDS),
        DEFAULT_BAND,
        BAND_RATES,
        FALLBACK_RATE_PER_KG,
    );
    let profile = PricingProfile::new(
        WeightRule::new(VOLUMETRIC_DIVISOR, MINIMUM_WEIGHT_KG),
        pipeline(settings),
        settings.tax,
        MinimumStage::PreTaxTopUp,
    )
    .assume_oda_when_unknown();
    RegionBandMatrixEngine::new(
        CarrierMeta::new(CarrierId::Safexpress, "Safexpress"),
        regions,
        pricing,
        profile,
    )
}

fn pipeline(settings: &Settings) -> SurchargePipeline {
    SurchargePipeline::new(vec![
        SurchargeStep::Flat {
            kind: SurchargeKind::Waybill,
            amount: 150.0,
        },
        SurchargeStep::DeclaredValueSlab {
            kind: SurchargeKind::ValueSurcharge,
            slab_size: 50_000.0,
            per_slab: 100.0,
            undeclared: Some(100.0),
        },
        SurchargeStep::MetroDestination {
            cities: UCC_CITIES,
            amount: 100.0,
        },
        SurchargeStep::OutOfDeliveryArea {
            kind: SurchargeKind::SafeExtension,
            flat: 1500.0,
            per_kg: Some(3.0),
        },
        SurchargeStep::SpecialHandling {
            flat: 1500.0,
            per_kg: 5.0,
        },
        SurchargeStep::StateTiers {
            kind: SurchargeKind::StateSurcharge,
            tiers: STATE_TIERS,
        },
        // The minimum LR charge covers base freight and waybill only.
        SurchargeStep::MinimumTopUp {
            threshold: MINIMUM_CHARGE,
            on: ChargeBase::Including(&[SurchargeKind::Waybill]),
        },
        SurchargeStep::Fuel {
            percent: settings.fuel.safexpress,
            on: ChargeBase::Running,
        },
    ])
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
                .with_city("New Delhi")
                .with_oda(CarrierId::Safexpress, false),
            Location::unresolved("400001")
                .with_state("Maharashtra")
                .with_city("Mumbai")
                .with_oda(CarrierId::Safexpress, false),
            Location::unresolved("682001")
                .with_state("Kerala")
                .with_city("Kochi"),
            Location::unresolved("695001")
                .with_state("Kerala")
                .with_city("Trivandrum"),
            Location::unresolved("795001")
                .with_state("Manipur")
                .with_city("Imphal")
                .with_oda(CarrierId::Safexpress, false),
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

    #[test]
    fn metro_lane_above_minimum() {
        let quote = quote(&request("110001", "400001", 50.0));
        assert_eq!(quote.from_zone.as_deref(), Some("NORTH_ONE"));
        assert_eq!(quote.to_zone.as_deref(), Some("C"));
        assert_eq!(quote.rate_per_kg, 10.0);
        assert_eq!(quote.base_freight, 500.0);
        let lines: Vec<(SurchargeKind, f64)> = quote.surcharges.iter().collect();
        assert_eq!(
            lines,
            vec![
                (SurchargeKind::Waybill, 150.0),
                (SurchargeKind::ValueSurcharge, 100.0),
                (SurchargeKind::Ucc, 100.0),
                (SurchargeKind::FuelSurcharge, 85.0),
            ]
        );
        assert_eq!(quote.total_before_tax, 935.0);
        assert_eq!(quote.tax_amount, 168.3);
        assert_eq!(quote.total_after_tax, 1103.3);
    }

    #[test]
    fn small_shipment_is_topped_up_and_unknown_oda_is_charged() {
        let quote = quote(&request("682001", "695001", 1.0));
        assert_eq!(quote.chargeable_weight_kg, 20.0);
        assert_eq!(quote.to_zone.as_deref(), Some("A"));
        assert_eq!(quote.base_freight, 120.0);
        let lines: Vec<(SurchargeKind, f64)> = quote.surcharges.iter().collect();
        assert_eq!(
            lines,
            vec![
                (SurchargeKind::Waybill, 150.0),
                (SurchargeKind::ValueSurcharge, 100.0),
                (SurchargeKind::SafeExtension, 1500.0),
                (SurchargeKind::StateSurcharge, 80.0),
                (SurchargeKind::Osc, 230.0),
                (SurchargeKind::FuelSurcharge, 218.0),
            ]
        );
        assert_eq!(quote.total_before_tax, 2398.0);
        assert_eq!(quote.tax_amount, 431.64);
        assert_eq!(quote.total_after_tax, 2829.64);
    }

    #[test]
    fn declared_value_is_charged_per_started_slab() {
        let request = request("110001", "400001", 50.0).with_declared_value(120_000.0);
        let quote = quote(&request);
        assert_eq!(quote.surcharges.get(SurchargeKind::ValueSurcharge), Some(300.0));
    }

    #[test]
    fn far_north_east_pays_higher_state_tier_and_special_handling() {
        let mut request = request("110001", "795001", 100.0);
        request.special_handling = true;
        let quote = quote(&request);
        assert_eq!(quote.to_zone.as_deref(), Some("E"));
        assert_eq!(quote.base_freight, 1500.0);
        assert_eq!(quote.surcharges.get(SurchargeKind::Sds), Some(1500.0));
        assert_eq!(quote.surcharges.get(SurchargeKind::StateSurcharge), Some(1200.0));
        assert_eq!(quote.surcharges.get(SurchargeKind::Ucc), None);
        assert_eq!(quote.surcharges.get(SurchargeKind::SafeExtension), None);
    }

    #[test]
    fn unknown_states_use_central_region() {
        let quote = quote(&request("999998", "999999", 20.0));
        assert_eq!(quote.from_zone.as_deref(), Some("CENTRAL"));
        assert_eq!(quote.to_zone.as_deref(), Some("A"));
        assert_eq!(quote.rate_per_kg, 6.0);
    }
}
