//! Domain data structures for carriers, parcels, locations, and quotes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::SurchargeLedger;
use crate::ports::QuoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Carriers known to freightquote.
pub enum CarrierId {
    /// Safexpress surface freight.
    Safexpress,
    /// Bluedart surface service.
    Bluedart,
    /// Global Courier Cargo.
    GlobalCargo,
    /// Shree Anjani Courier.
    Anjani,
    /// Bigship CFT, LTL, and MPS services.
    Bigship,
    /// Bigship metro parcel rates.
    BigshipMetro,
}

impl CarrierId {
    /// Every carrier in registration order.
    pub const ALL: [Self; 6] = [
        Self::GlobalCargo,
        Self::Safexpress,
        Self::Bluedart,
        Self::Anjani,
        Self::Bigship,
        Self::BigshipMetro,
    ];

    /// Stable machine-readable slug, also used as the CSV column prefix.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Safexpress => "safexpress",
            Self::Bluedart => "bluedart",
            Self::GlobalCargo => "global_cargo",
            Self::Anjani => "anjani",
            Self::Bigship => "bigship",
            Self::BigshipMetro => "bigship_metro",
        }
    }

    /// Parse a slug produced by [`CarrierId::slug`].
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim();
        Self::ALL
            .into_iter()
            .find(|carrier| carrier.slug().eq_ignore_ascii_case(slug))
    }
}

impl fmt::Display for CarrierId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Metadata describing a carrier and its human-friendly name.
pub struct CarrierMeta {
    /// Unique identifier.
    pub id: CarrierId,
    /// Display name used in quote results.
    pub name: String,
}

impl CarrierMeta {
    /// Construct metadata for a carrier.
    #[must_use]
    pub fn new(id: CarrierId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Service subtype selecting a rate family for carriers that offer several.
pub enum ServiceSubtype {
    /// Volumetric cubic-feet pricing.
    Cft,
    /// Less-than-truckload.
    #[default]
    Ltl,
    /// Multi-piece shipment.
    Mps,
}

impl ServiceSubtype {
    /// All subtypes in display order.
    pub const ALL: [Self; 3] = [Self::Cft, Self::Ltl, Self::Mps];

    /// Parse a subtype name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|subtype| subtype.to_string().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for ServiceSubtype {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cft => "CFT",
            Self::Ltl => "LTL",
            Self::Mps => "MPS",
        };
        formatter.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Which GST rate applies to the request.
pub enum TaxMode {
    /// The standard rate.
    #[default]
    Standard,
    /// The reduced rate.
    Reduced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// A single physical package. Dimensions are centimetres, weight is kilograms.
pub struct ParcelItem {
    weight_kg: f64,
    length_cm: f64,
    breadth_cm: f64,
    height_cm: f64,
}

impl ParcelItem {
    /// Create a parcel item.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidItem`] when the weight is not above zero or a
    /// dimension is negative or not finite.
    pub fn new(
        weight_kg: f64,
        length_cm: f64,
        breadth_cm: f64,
        height_cm: f64,
    ) -> Result<Self, QuoteError> {
        let item = Self {
            weight_kg,
            length_cm,
            breadth_cm,
            height_cm,
        };
        item.check()?;
        Ok(item)
    }

    /// Items built through deserialization skip [`ParcelItem::new`], so requests re-check them.
    fn check(&self) -> Result<(), QuoteError> {
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(QuoteError::InvalidItem(format!(
                "weight must be above zero, got {}",
                self.weight_kg
            )));
        }
        for (name, value) in [
            ("length", self.length_cm),
            ("breadth", self.breadth_cm),
            ("height", self.height_cm),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(QuoteError::InvalidItem(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Dead weight in kilograms.
    #[must_use]
    pub const fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    /// Length in centimetres.
    #[must_use]
    pub const fn length_cm(&self) -> f64 {
        self.length_cm
    }

    /// Breadth in centimetres.
    #[must_use]
    pub const fn breadth_cm(&self) -> f64 {
        self.breadth_cm
    }

    /// Height in centimetres.
    #[must_use]
    pub const fn height_cm(&self) -> f64 {
        self.height_cm
    }

    /// Volume in cubic centimetres.
    #[must_use]
    pub fn volume_cm3(&self) -> f64 {
        self.length_cm * self.breadth_cm * self.height_cm
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A shipment to be priced by every registered carrier.
pub struct QuoteRequest {
    /// Origin postal code.
    pub origin: String,
    /// Destination postal code.
    pub destination: String,
    /// Packages in the shipment. Must not be empty.
    pub items: Vec<ParcelItem>,
    /// Declared goods value; `None` when not declared.
    pub declared_value: Option<f64>,
    /// Collect from the consignee instead of the shipper.
    pub reverse_pickup: bool,
    /// Fragile or otherwise special handling requested.
    pub special_handling: bool,
    /// Rate family for carriers offering several; carriers pick their default when absent.
    pub service_subtype: Option<ServiceSubtype>,
    /// Days the consignment is held in storage.
    pub storage_days: u32,
    /// GST rate selector.
    pub tax_mode: TaxMode,
}

impl QuoteRequest {
    /// Start a request with the given lanes and items and every option off.
    #[must_use]
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        items: Vec<ParcelItem>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            items,
            declared_value: None,
            reverse_pickup: false,
            special_handling: false,
            service_subtype: None,
            storage_days: 0,
            tax_mode: TaxMode::Standard,
        }
    }

    /// Set the declared goods value.
    #[must_use]
    pub fn with_declared_value(mut self, value: f64) -> Self {
        self.declared_value = Some(value);
        self
    }

    /// Select a service subtype.
    #[must_use]
    pub fn with_subtype(mut self, subtype: ServiceSubtype) -> Self {
        self.service_subtype = Some(subtype);
        self
    }

    /// Check the request can be priced.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::NoItems`] for an empty item list,
    /// [`QuoteError::InvalidItem`] for an item without weight or with a bad dimension, and
    /// [`QuoteError::InvalidDeclaredValue`] for a negative or non-finite declared value.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.items.is_empty() {
            return Err(QuoteError::NoItems);
        }
        for item in &self.items {
            item.check()?;
        }
        if let Some(value) = self.declared_value
            && (!value.is_finite() || value < 0.0)
        {
            return Err(QuoteError::InvalidDeclaredValue(value));
        }
        Ok(())
    }

    /// Declared value when one was given and it is above zero.
    #[must_use]
    pub fn positive_declared_value(&self) -> Option<f64> {
        self.declared_value.filter(|value| *value > 0.0)
    }
}

/// Normalise a free-text key for case-insensitive table lookups.
pub(crate) fn normalize_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Geographic attributes of a postal code with per-carrier overlays.
pub struct Location {
    /// Six-digit postal code.
    pub code: String,
    /// State name as written in the source data.
    pub state: Option<String>,
    /// City name as written in the source data.
    pub city: Option<String>,
    /// Carrier-specific region codes.
    pub regions: BTreeMap<CarrierId, String>,
    /// Out-of-delivery-area flags; a missing entry means unknown.
    pub oda: BTreeMap<CarrierId, bool>,
    /// Serviceability flags; a missing entry means unknown.
    pub serviceable: BTreeMap<CarrierId, bool>,
}

impl Location {
    /// A code absent from the registry: no state, city, or carrier attributes.
    #[must_use]
    pub fn unresolved(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Set the state name.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Set the city name.
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Attach a carrier region code.
    #[must_use]
    pub fn with_region(mut self, carrier: CarrierId, region: impl Into<String>) -> Self {
        self.regions.insert(carrier, region.into());
        self
    }

    /// Record the carrier's out-of-delivery-area flag.
    #[must_use]
    pub fn with_oda(mut self, carrier: CarrierId, oda: bool) -> Self {
        self.oda.insert(carrier, oda);
        self
    }

    /// Record the carrier's serviceability flag.
    #[must_use]
    pub fn with_serviceable(mut self, carrier: CarrierId, serviceable: bool) -> Self {
        self.serviceable.insert(carrier, serviceable);
        self
    }

    /// Non-blank region code the carrier attached to this location.
    #[must_use]
    pub fn region_for(&self, carrier: CarrierId) -> Option<&str> {
        self.regions
            .get(&carrier)
            .map(|region| region.trim())
            .filter(|region| !region.is_empty())
    }

    /// Out-of-delivery-area flag, `None` when unknown.
    #[must_use]
    pub fn oda_for(&self, carrier: CarrierId) -> Option<bool> {
        self.oda.get(&carrier).copied()
    }

    /// Serviceability flag, `None` when unknown.
    #[must_use]
    pub fn serviceable_for(&self, carrier: CarrierId) -> Option<bool> {
        self.serviceable.get(&carrier).copied()
    }

    /// Lower-cased, trimmed state name.
    #[must_use]
    pub fn state_key(&self) -> Option<String> {
        self.state.as_deref().and_then(normalize_key)
    }

    /// Lower-cased, trimmed city name.
    #[must_use]
    pub fn city_key(&self) -> Option<String> {
        self.city.as_deref().and_then(normalize_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Zones resolved for both ends of a lane; either side may be unresolved.
pub struct ZonePair {
    /// Origin zone.
    pub from: Option<String>,
    /// Destination zone or band.
    pub to: Option<String>,
}

impl ZonePair {
    /// Build a pair from resolved zone names.
    #[must_use]
    pub const fn new(from: Option<String>, to: Option<String>) -> Self {
        Self { from, to }
    }

    /// True when both sides resolved to the same zone.
    #[must_use]
    pub fn is_within_zone(&self) -> bool {
        matches!((&self.from, &self.to), (Some(from), Some(to)) if from == to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Price breakdown returned by one carrier for one request.
pub struct QuoteResult {
    /// Carrier that produced the quote.
    pub carrier: CarrierId,
    /// Carrier display name.
    pub carrier_name: String,
    /// False when the carrier cannot serve the lane or failed to price it.
    pub deliverable: bool,
    /// Why the quote is not deliverable.
    pub reason: Option<String>,
    /// Origin zone used for pricing.
    pub from_zone: Option<String>,
    /// Destination zone or band used for pricing.
    pub to_zone: Option<String>,
    /// Weight the freight was charged on.
    pub chargeable_weight_kg: f64,
    /// Freight before surcharges.
    pub base_freight: f64,
    /// Surcharge lines in the order they were computed.
    pub surcharges: SurchargeLedger,
    /// Base freight plus surcharges.
    pub total_before_tax: f64,
    /// GST on the pre-tax total.
    pub tax_amount: f64,
    /// Amount payable.
    pub total_after_tax: f64,
    /// Effective rate used for the base freight.
    pub rate_per_kg: f64,
    /// Summed volumetric weight, for display.
    pub volumetric_weight_kg: f64,
    /// Summed dead weight, for display.
    pub actual_weight_kg: f64,
    /// Engine-specific details, keyed by name.
    pub diagnostics: BTreeMap<String, serde_json::Value>,
}

impl QuoteResult {
    /// A zeroed result explaining why the carrier cannot quote.
    #[must_use]
    pub fn undeliverable(meta: &CarrierMeta, reason: impl Into<String>) -> Self {
        Self {
            carrier: meta.id,
            carrier_name: meta.name.clone(),
            deliverable: false,
            reason: Some(reason.into()),
            from_zone: None,
            to_zone: None,
            chargeable_weight_kg: 0.0,
            base_freight: 0.0,
            surcharges: SurchargeLedger::new(),
            total_before_tax: 0.0,
            tax_amount: 0.0,
            total_after_tax: 0.0,
            rate_per_kg: 0.0,
            volumetric_weight_kg: 0.0,
            actual_weight_kg: 0.0,
            diagnostics: BTreeMap::new(),
        }
    }

    /// Attach the zones that were resolved before the carrier declined.
    #[must_use]
    pub fn with_zones(mut self, zones: ZonePair) -> Self {
        self.from_zone = zones.from;
        self.to_zone = zones.to;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carrier_slugs_round_trip() {
        for carrier in CarrierId::ALL {
            assert_eq!(CarrierId::from_slug(carrier.slug()), Some(carrier));
        }
        assert_eq!(CarrierId::from_slug(" Global_Cargo "), Some(CarrierId::GlobalCargo));
        assert_eq!(CarrierId::from_slug("dhl"), None);
    }

    #[test]
    fn parcel_item_rejects_bad_measures() {
        assert!(ParcelItem::new(-1.0, 10.0, 10.0, 10.0).is_err());
        assert!(ParcelItem::new(1.0, f64::NAN, 10.0, 10.0).is_err());
        assert!(matches!(
            ParcelItem::new(0.0, 0.0, 0.0, 0.0),
            Err(QuoteError::InvalidItem(message)) if message.starts_with("weight must be above zero")
        ));
        let flat = ParcelItem::new(0.5, 0.0, 0.0, 0.0).expect("zero dimensions are allowed");
        assert_eq!(flat.volume_cm3(), 0.0);
    }

    #[test]
    fn deserialized_weightless_item_fails_validation() {
        let request: QuoteRequest = serde_json::from_value(serde_json::json!({
            "origin": "110001",
            "destination": "400001",
            "items": [{"weight_kg": 0.0, "length_cm": 10.0, "breadth_cm": 10.0, "height_cm": 10.0}],
            "declared_value": null,
            "reverse_pickup": false,
            "special_handling": false,
            "service_subtype": null,
            "storage_days": 0,
            "tax_mode": "standard"
        }))
        .expect("request deserializes");
        assert!(matches!(request.validate(), Err(QuoteError::InvalidItem(_))));
    }

    #[test]
    fn request_validation_checks_items_and_declared_value() {
        let item = ParcelItem::new(1.0, 1.0, 1.0, 1.0).expect("valid item");
        assert_eq!(
            QuoteRequest::new("110001", "400001", Vec::new()).validate(),
            Err(QuoteError::NoItems)
        );
        let negative = QuoteRequest::new("110001", "400001", vec![item]).with_declared_value(-5.0);
        assert_eq!(negative.validate(), Err(QuoteError::InvalidDeclaredValue(-5.0)));
        let zero = QuoteRequest::new("110001", "400001", vec![item]).with_declared_value(0.0);
        assert_eq!(zero.validate(), Ok(()));
        assert_eq!(zero.positive_declared_value(), None);
    }

    #[test]
    fn location_keys_are_trimmed_and_lowercased() {
        let location = Location::unresolved("380001")
            .with_state("  Gujarat ")
            .with_city("")
            .with_region(CarrierId::Bluedart, "  ");
        assert_eq!(location.state_key().as_deref(), Some("gujarat"));
        assert_eq!(location.city_key(), None);
        assert_eq!(location.region_for(CarrierId::Bluedart), None);
        assert_eq!(location.oda_for(CarrierId::Bluedart), None);
    }

    #[test]
    fn subtype_parsing_ignores_case() {
        assert_eq!(ServiceSubtype::parse(" cft"), Some(ServiceSubtype::Cft));
        assert_eq!(ServiceSubtype::parse("ftl"), None);
        assert_eq!(ServiceSubtype::default(), ServiceSubtype::Ltl);
    }
}
