//! Carrier plugin for Global Courier Cargo using its 18-zone rate card.

use std::sync::Arc;

use freightquote_core::engine::{MinimumStage, PricingProfile, ZoneMatrix, ZoneMatrixEngine};
use freightquote_core::pipeline::{ChargeBase, SurchargeKind, SurchargePipeline, SurchargeStep};
use freightquote_core::weight::WeightRule;
use freightquote_core::zones::ZoneResolver;
use freightquote_core::{CarrierId, CarrierMeta, CarrierPlugin, ConfigError, RiskBearer, Settings};

/// Rate for lanes whose zones are unknown.
pub const FALLBACK_RATE_PER_KG: f64 = 13.0;
/// Minimum base freight per shipment.
pub const MINIMUM_BASE_FREIGHT: f64 = 450.0;

const VOLUMETRIC_DIVISOR: f64 = 4000.0;
const MINIMUM_WEIGHT_KG: f64 = 20.0;
const ODA_CHARGE: f64 = 600.0;
const INSURANCE_MINIMUM: f64 = 100.0;
const REVERSE_PICKUP_FEE: f64 = 150.0;
const DEMURRAGE_PER_KG_PER_DAY: f64 = 2.0;

/// Zone codes in rate card order.
const ZONES: [&str; 18] = [
    "AMB", "JAI", "DEL", "AMD", "PNQ", "BOM", "NAG", "IDR", "BLR", "HYD", "MAA", "CJB", "BBI",
    "LOK", "PAT", "NJP", "CCU", "GAU",
];

/// Rate per kg, rows are origin zones and columns destination zones.
#[rustfmt::skip]
const RATES: [[f64; 18]; 18] = [
    // AMB
    [12.0, 13.0, 12.0, 14.0, 14.0, 14.0, 13.0, 13.0, 14.0, 14.0, 14.0, 14.0, 17.0, 14.0, 18.0, 35.0, 17.0, 17.0],
    // JAI
    [13.0, 10.0, 12.0, 12.0, 14.0, 13.0, 13.0, 14.0, 13.0, 13.0, 14.0, 14.0, 15.0, 14.0, 18.0, 36.0, 16.0, 18.0],
    // DEL
    [12.0, 12.0, 10.0, 14.0, 15.0, 15.0, 13.0, 14.0, 14.0, 14.0, 14.0, 14.0, 16.0, 12.0, 16.0, 34.0, 16.0, 17.0],
    // AMD
    [13.0, 13.0, 13.0, 10.0, 13.0, 12.0, 12.0, 13.0, 14.0, 14.0, 14.0, 13.0, 16.0, 13.0, 18.0, 34.0, 16.0, 16.0],
    // PNQ
    [13.0, 13.0, 13.0, 13.0, 10.0, 10.0, 12.0, 13.0, 13.0, 13.0, 14.0, 15.0, 16.0, 14.0, 18.0, 35.0, 17.0, 17.0],
    // BOM
    [13.0, 14.0, 13.0, 12.0, 10.0, 10.0, 10.0, 13.0, 13.0, 13.0, 14.0, 14.0, 16.0, 13.0, 18.0, 35.0, 17.0, 17.0],
    // NAG
    [12.0, 12.0, 13.0, 12.0, 10.0, 10.0, 10.0, 12.0, 14.0, 14.0, 14.0, 14.0, 15.0, 14.0, 16.0, 32.0, 16.0, 16.0],
    // IDR
    [12.0, 13.0, 13.0, 13.0, 14.0, 13.0, 12.0, 10.0, 13.0, 13.0, 13.0, 14.0, 15.0, 14.0, 16.0, 35.0, 17.0, 16.0],
    // BLR
    [14.0, 14.0, 15.0, 13.0, 13.0, 13.0, 13.0, 14.0, 10.0, 13.0, 13.0, 13.0, 14.0, 15.0, 18.0, 32.0, 17.0, 17.0],
    // HYD
    [14.0, 14.0, 13.0, 13.0, 13.0, 12.0, 12.0, 12.0, 14.0, 10.0, 12.0, 12.0, 16.0, 15.0, 16.0, 32.0, 16.0, 16.0],
    // MAA
    [14.0, 14.0, 13.0, 13.0, 12.0, 12.0, 12.0, 13.0, 12.0, 13.0, 10.0, 12.0, 14.0, 15.0, 16.0, 32.0, 15.0, 16.0],
    // CJB
    [15.0, 15.0, 16.0, 16.0, 17.0, 17.0, 16.0, 15.0, 14.0, 14.0, 13.0, 10.0, 16.0, 13.0, 16.0, 32.0, 16.0, 17.0],
    // BBI
    [13.0, 13.0, 13.0, 14.0, 15.0, 15.0, 15.0, 14.0, 15.0, 15.0, 15.0, 15.0, 10.0, 13.0, 15.0, 35.0, 15.0, 15.0],
    // LOK
    [12.0, 13.0, 12.0, 14.0, 15.0, 15.0, 14.0, 13.0, 14.0, 14.0, 14.0, 14.0, 13.0, 13.0, 16.0, 36.0, 16.0, 17.0],
    // PAT
    [17.0, 17.0, 15.0, 15.0, 16.0, 15.0, 14.0, 14.0, 15.0, 15.0, 15.0, 15.0, 15.0, 13.0, 15.0, 36.0, 13.0, 14.0],
    // NJP
    [35.0, 35.0, 36.0, 36.0, 36.0, 36.0, 30.0, 30.0, 35.0, 35.0, 35.0, 35.0, 35.0, 30.0, 35.0, 25.0, 30.0, 30.0],
    // CCU
    [18.0, 17.0, 16.0, 17.0, 16.0, 16.0, 15.0, 14.0, 15.0, 15.0, 15.0, 15.0, 12.0, 15.0, 14.0, 20.0, 12.0, 13.0],
    // GAU
    [15.0, 16.0, 17.0, 17.0, 17.0, 16.0, 15.0, 16.0, 17.0, 17.0, 17.0, 17.0, 18.0, 18.0, 17.0, 17.0, 12.0, 16.0],
];

/// Lookup keys to zone, matched against the location's state.
///
/// The table carries a few city and district names for records whose state
/// column holds them. Zones such as `NAG`, `IDR`, and `LOK` are otherwise only
/// reached through a region attached to the location.
const ZONE_BY_STATE: &[(&str, &str)] = &[
    ("chandigarh", "AMB"),
    ("himachal pradesh", "AMB"),
    ("jammu & kashmir", "AMB"),
    ("jammu and kashmir", "AMB"),
    ("punjab", "AMB"),
    ("haryana", "AMB"),
    ("uttarakhand", "AMB"),
    ("uttar pradesh", "AMB"),
    ("up", "AMB"),
    ("rajasthan", "JAI"),
    ("delhi", "DEL"),
    ("ncr", "DEL"),
    ("agra", "DEL"),
    ("aligarh", "DEL"),
    ("moradabad", "DEL"),
    ("dadra & nagar haveli", "AMD"),
    ("dadra and nagar haveli", "AMD"),
    ("daman & diu", "AMD"),
    ("daman and diu", "AMD"),
    ("gujarat", "AMD"),
    ("goa", "PNQ"),
    ("maharashtra", "BOM"),
    ("karnataka", "BLR"),
    ("andhra pradesh", "HYD"),
    ("telangana", "HYD"),
    ("tamil nadu", "MAA"),
    ("puducherry", "MAA"),
    ("kerala", "CJB"),
    ("odisha", "BBI"),
    ("west bengal", "CCU"),
    ("jharkhand", "CCU"),
    ("bihar", "PAT"),
    ("siligrim", "NJP"),
    ("sikkim", "NJP"),
    ("pune", "PNQ"),
    ("mumbai", "BOM"),
    ("nagpur", "NAG"),
    ("indore", "IDR"),
    ("coimbatore", "CJB"),
    ("lucknow", "LOK"),
    ("patna", "PAT"),
    ("hyderabad", "HYD"),
    ("bangalore", "BLR"),
];

/// Build the Global Courier Cargo plugin.
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
pub fn engine(settings: &Settings) -> Result<ZoneMatrixEngine, ConfigError> {
    let zones = ZoneResolver::new(CarrierId::GlobalCargo).with_states(ZONE_BY_STATE);
    let profile = PricingProfile::new(
        WeightRule::new(VOLUMETRIC_DIVISOR, MINIMUM_WEIGHT_KG),
        pipeline(settings),
        settings.tax,
        MinimumStage::BaseFreight(MINIMUM_BASE_FREIGHT),
    );
    ZoneMatrixEngine::new(
        carrier_meta(),
        zones,
        ZoneMatrix::new(ZONES, RATES),
        FALLBACK_RATE_PER_KG,
        profile,
    )
}

fn pipeline(settings: &Settings) -> SurchargePipeline {
    let insurance_percent = match settings.risk {
        RiskBearer::Carrier => 0.002,
        RiskBearer::Owner => 0.001,
    };
    SurchargePipeline::new(vec![
        SurchargeStep::OutOfDeliveryArea {
            kind: SurchargeKind::Oda,
            flat: ODA_CHARGE,
            per_kg: None,
        },
        SurchargeStep::DeclaredValue {
            kind: SurchargeKind::Insurance,
            percent: insurance_percent,
            minimum: INSURANCE_MINIMUM,
            undeclared: None,
        },
        SurchargeStep::Fuel {
            percent: settings.fuel.global_cargo,
            on: ChargeBase::Running,
        },
        SurchargeStep::ReversePickup {
            fee: REVERSE_PICKUP_FEE,
        },
        SurchargeStep::Demurrage {
            per_kg_per_day: DEMURRAGE_PER_KG_PER_DAY,
            free_days: settings.free_storage_days,
        },
    ])
}

fn carrier_meta() -> CarrierMeta {
    CarrierMeta::new(CarrierId::GlobalCargo, "Global Courier Cargo")
}
