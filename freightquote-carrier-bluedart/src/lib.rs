//! Carrier plugin for the Bluedart surface service.

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
pub const FALLBACK_RATE_PER_KG: f64 = 11.0;
/// Minimum base freight per shipment.
pub const MINIMUM_BASE_FREIGHT: f64 = 150.0;

const VOLUMETRIC_DIVISOR: f64 = 2700.0;
const MINIMUM_WEIGHT_KG: f64 = 10.0;

const REGIONS: [&str; 6] = ["NORTH", "EAST", "WEST", "SOUTH", "NE", "J&K"];

#[rustfmt::skip]
const BANDS: [[&str; 6]; 6] = [
    //  NORTH EAST WEST SOUTH NE  J&K
    ["1", "3", "2", "3", "5", "2"], // NORTH
    ["3", "1", "3", "4", "2", "5"], // EAST
    ["2", "3", "1", "2", "5", "5"], // WEST
    ["3", "4", "2", "1", "5", "5"], // SOUTH
    ["5", "2", "5", "2", "1", "2"], // NE
    ["2", "5", "5", "5", "2", "1"], // J&K
];

const BAND_RATES: &[(&str, f64)] = &[("1", 8.0), ("2", 11.0), ("3", 11.0), ("4", 14.0), ("5", 24.0)];

const REGION_BY_STATE: &[(&str, &str)] = &[
    ("himachal pradesh", "NORTH"),
    ("punjab", "NORTH"),
    ("haryana", "NORTH"),
    ("uttarakhand", "NORTH"),
    ("uttar pradesh", "NORTH"),
    ("rajasthan", "NORTH"),
    ("delhi", "NORTH"),
    ("bihar", "EAST"),
    ("odisha", "EAST"),
    ("orissa", "EAST"),
    ("west bengal", "EAST"),
    ("jharkhand", "EAST"),
    ("maharashtra", "WEST"),
    ("madhya pradesh", "WEST"),
    ("gujarat", "WEST"),
    ("chhattisgarh", "WEST"),
    ("goa", "WEST"),
    ("daman and diu", "WEST"),
    ("dadra and nagar haveli", "WEST"),
    ("karnataka", "SOUTH"),
    ("tamil nadu", "SOUTH"),
    ("kerala", "SOUTH"),
    ("andhra pradesh", "SOUTH"),
    ("telangana", "SOUTH"),
    ("pondicherry", "SOUTH"),
    ("puducherry", "SOUTH"),
    ("nagaland", "NE"),
    ("mizoram", "NE"),
    ("manipur", "NE"),
    ("meghalaya", "NE"),
    ("tripura", "NE"),
    ("arunachal pradesh", "NE"),
    ("jammu and kashmir", "J&K"),
    ("ladakh", "J&K"),
];

/// Remote area surcharge states.
const RAS_TIERS: &[StateTier] = &[StateTier {
    states: &["bihar", "jharkhand", "kerala", "jammu and kashmir", "ladakh"],
    per_kg: 4.0,
}];

/// Build the Bluedart plugin.
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
    let regions = ZoneResolver::new(CarrierId::Bluedart)
        .with_states(REGION_BY_STATE)
        .with_default("WEST");
    let pricing = BandPricing::flat(
        ZoneMatrix::new(REGIONS, BANDS),
        "3",
        BAND_RATES,
        FALLBACK_RATE_PER_KG,
    );
    let profile = PricingProfile::new(
        WeightRule::new(VOLUMETRIC_DIVISOR, MINIMUM_WEIGHT_KG).rounded_to_half_kg(),
        pipeline(settings),
        settings.tax,
        MinimumStage::BaseFreight(MINIMUM_BASE_FREIGHT),
    );
    RegionBandMatrixEngine::new(
        CarrierMeta::new(CarrierId::Bluedart, "Bluedart (Surface)"),
        regions,
        pricing,
        profile,
    )
}

// Fuel is charged on base freight alone.
fn pipeline(settings: &Settings) -> SurchargePipeline {
    SurchargePipeline::new(vec![
        SurchargeStep::Flat {
            kind: SurchargeKind::Docket,
            amount: 100.0,
        },
        SurchargeStep::Fuel {
            percent: settings.fuel.bluedart,
            on: ChargeBase::BASE_FREIGHT,
        },
        SurchargeStep::StateTiers {
            kind: SurchargeKind::Ras,
            tiers: RAS_TIERS,
        },
        SurchargeStep::OutOfDeliveryArea {
            kind: SurchargeKind::Oda,
            flat: 600.0,
            per_kg: Some(3.0),
        },
    ])
}
