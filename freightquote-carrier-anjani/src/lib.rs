//! Carrier plugin for Shree Anjani Courier.
//!
//! Rates depend only on the destination band: same city, Gujarat, or the rest of
//! India. Fuel is a percentage of the whole pre-tax subtotal.

use std::sync::Arc;

use freightquote_core::engine::{
    BandSlabs, MinimumStage, PricingProfile, Slab, SlabTable, TotalFuelSurchargeEngine,
};
use freightquote_core::pipeline::{SurchargeKind, SurchargePipeline, SurchargeStep};
use freightquote_core::weight::WeightRule;
use freightquote_core::zones::ZoneResolver;
use freightquote_core::{CarrierId, CarrierMeta, CarrierPlugin, ConfigError, Settings};

/// Rate for a band without a slab table.
pub const FALLBACK_RATE_PER_KG: f64 = 20.0;

const LOCAL: &str = "Local";
const GUJARAT: &str = "Gujarat";
const REST_OF_INDIA: &str = "Rest of India";

const VOLUMETRIC_DIVISOR: f64 = 5000.0;
const VALUATION_PERCENT: f64 = 0.02;
const WAYBILL_FEE: f64 = 30.0;

/// Rates per kilogram for the up-to-5 kg, up-to-20 kg, and heavier slabs.
const SLAB_RATES: [(&str, [f64; 3]); 3] = [
    (LOCAL, [20.0, 15.0, 12.0]),
    (GUJARAT, [25.0, 18.0, 15.0]),
    (REST_OF_INDIA, [30.0, 22.0, 18.0]),
];

fn slab_table(band: &str, rates: [f64; 3]) -> Result<SlabTable, ConfigError> {
    let [light, medium, heavy] = rates;
    SlabTable::new(
        CarrierId::Anjani,
        band,
        &[
            Slab::upto(5.0, light, 0.0),
            Slab::upto(20.0, medium, 0.0),
            Slab::open(heavy, 0.0),
        ],
    )
}

/// Build the Shree Anjani Courier plugin.
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
pub fn engine(settings: &Settings) -> Result<TotalFuelSurchargeEngine, ConfigError> {
    let bands = ZoneResolver::new(CarrierId::Anjani)
        .with_states(&[("gujarat", GUJARAT)])
        .with_default(REST_OF_INDIA);
    let mut slabs = BandSlabs::new(FALLBACK_RATE_PER_KG);
    for (band, rates) in SLAB_RATES {
        slabs = slabs.with_band(band, slab_table(band, rates)?);
    }
    let pipeline = SurchargePipeline::new(vec![
        SurchargeStep::DeclaredValue {
            kind: SurchargeKind::Valuation,
            percent: VALUATION_PERCENT,
            minimum: 0.0,
            undeclared: None,
        },
        SurchargeStep::Flat {
            kind: SurchargeKind::Waybill,
            amount: WAYBILL_FEE,
        },
    ]);
    TotalFuelSurchargeEngine::new(
        CarrierMeta::new(CarrierId::Anjani, "Shree Anjani Courier"),
        bands,
        Some(LOCAL),
        slabs,
        settings.fuel.anjani,
        PricingProfile::new(
            WeightRule::new(VOLUMETRIC_DIVISOR, 0.0),
            pipeline,
            settings.tax,
            MinimumStage::Unfloored,
        ),
    )
}
