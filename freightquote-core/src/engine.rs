//! Pricing engines shared by every carrier configuration.
//!
//! Each engine is a [`RateEngine`] parameterised by static rate tables and a
//! [`PricingProfile`]. Carrier crates only supply data.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::config::ConfigError;
use crate::model::{CarrierId, CarrierMeta, Location, QuoteRequest, QuoteResult, ZonePair};
use crate::money::{ensure_finite, round_money, round_weight};
use crate::pipeline::{SurchargeContext, SurchargeKind, SurchargeLedger, SurchargePipeline};
use crate::ports::{BaseRate, LocationLookup, QuoteError, RateEngine, RateSource};
use crate::tax::{TaxPolicy, TaxRule, TaxTreatment, Totals};
use crate::weight::{WeightRule, actual_weight};

mod matrix;
mod oda_slab;
mod region_band;
mod total_fuel;
mod weight_slab;
mod zone_matrix;

pub use matrix::ZoneMatrix;
pub use oda_slab::{OdaAwareSlabEngine, ServiceEngine};
pub use region_band::{BandPricing, RegionBandMatrixEngine, StepRate};
pub use total_fuel::{BandSlabs, TotalFuelSurchargeEngine};
pub use weight_slab::{Slab, SlabTable, WeightSlabEngine};
pub use zone_matrix::ZoneMatrixEngine;

/// Engine-specific details attached to a quote.
pub type Diagnostics = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Where a carrier's minimum charge is enforced.
pub enum MinimumStage {
    /// No minimum.
    Unfloored,
    /// Base freight is raised to this amount before surcharges.
    BaseFreight(f64),
    /// A top-up step in the surcharge pipeline lifts the pre-tax running total.
    PreTaxTopUp,
    /// The payable total is raised to this amount after tax.
    FinalTotal(f64),
}

impl MinimumStage {
    const fn name(self) -> &'static str {
        match self {
            Self::Unfloored => "unfloored",
            Self::BaseFreight(_) => "base freight",
            Self::PreTaxTopUp => "pre-tax top-up",
            Self::FinalTotal(_) => "final total",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Weight rule, surcharge pipeline, tax, and minimum shared by every engine kind.
pub struct PricingProfile {
    /// Chargeable weight rule.
    pub weight: WeightRule,
    /// Surcharge steps.
    pub pipeline: SurchargePipeline,
    /// GST rates.
    pub tax: TaxPolicy,
    /// Whether the tariff already includes GST.
    pub tax_treatment: TaxTreatment,
    /// Where the minimum charge applies.
    pub minimum: MinimumStage,
    /// Out-of-delivery-area charges apply when the destination flag is unknown.
    pub oda_when_unknown: bool,
}

impl PricingProfile {
    /// Profile adding GST on top and treating unknown ODA flags as serviced.
    #[must_use]
    pub const fn new(
        weight: WeightRule,
        pipeline: SurchargePipeline,
        tax: TaxPolicy,
        minimum: MinimumStage,
    ) -> Self {
        Self {
            weight,
            pipeline,
            tax,
            tax_treatment: TaxTreatment::Exclusive,
            minimum,
            oda_when_unknown: false,
        }
    }

    /// Rates already include GST.
    #[must_use]
    pub fn tax_inclusive(mut self) -> Self {
        self.tax_treatment = TaxTreatment::Inclusive;
        self
    }

    /// Treat destinations without an ODA flag as out of delivery area.
    #[must_use]
    pub fn assume_oda_when_unknown(mut self) -> Self {
        self.oda_when_unknown = true;
        self
    }

    /// Check the minimum stage agrees with the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingMinimums`] for a final-total minimum next to a
    /// top-up step, [`ConfigError::MissingTopUp`] when the pre-tax stage has no step,
    /// and [`ConfigError::UndeclaredTopUp`] when a step exists under another stage.
    pub fn validate(&self, carrier: CarrierId) -> Result<(), ConfigError> {
        match (self.minimum, self.pipeline.has_top_up()) {
            (MinimumStage::FinalTotal(_), true) => {
                Err(ConfigError::ConflictingMinimums { carrier })
            }
            (MinimumStage::PreTaxTopUp, false) => Err(ConfigError::MissingTopUp { carrier }),
            (stage @ (MinimumStage::Unfloored | MinimumStage::BaseFreight(_)), true) => {
                Err(ConfigError::UndeclaredTopUp {
                    carrier,
                    stage: stage.name(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Raise freight to the base minimum when that stage is configured.
    #[must_use]
    pub fn floor_base(&self, freight: f64) -> f64 {
        match self.minimum {
            MinimumStage::BaseFreight(minimum) => freight.max(minimum),
            _ => freight,
        }
    }

    /// Tax rule including any final-total minimum.
    #[must_use]
    pub const fn tax_rule(&self) -> TaxRule {
        TaxRule {
            policy: self.tax,
            treatment: self.tax_treatment,
            final_minimum: match self.minimum {
                MinimumStage::FinalTotal(minimum) => Some(minimum),
                _ => None,
            },
        }
    }

    /// Destination ODA flag for a carrier, with unknown resolved by this profile.
    #[must_use]
    pub fn destination_is_oda(&self, carrier: CarrierId, destination: &Location) -> bool {
        destination
            .oda_for(carrier)
            .unwrap_or(self.oda_when_unknown)
    }

    fn describe(&self, diagnostics: &mut Diagnostics) {
        note(diagnostics, "volumetric_divisor", self.weight.divisor);
        note(diagnostics, "minimum_weight_kg", self.weight.floor_kg);
        note(diagnostics, "minimum_stage", self.minimum.name());
        match self.minimum {
            MinimumStage::BaseFreight(minimum) => {
                note(diagnostics, "minimum_base_charge", minimum);
            }
            MinimumStage::FinalTotal(minimum) => {
                note(diagnostics, "minimum_total_charge", minimum);
            }
            MinimumStage::Unfloored | MinimumStage::PreTaxTopUp => {}
        }
    }
}

/// Record a diagnostic entry.
pub fn note(diagnostics: &mut Diagnostics, key: &str, value: impl Into<Value>) {
    diagnostics.insert(key.to_owned(), value.into());
}

pub(crate) fn zone_label(zones: &ZonePair) -> String {
    format!(
        "{}->{}",
        zones.from.as_deref().unwrap_or("?"),
        zones.to.as_deref().unwrap_or("?")
    )
}

/// Everything priced for one request before it becomes a [`QuoteResult`].
pub(crate) struct Priced<'req> {
    pub(crate) meta: &'req CarrierMeta,
    pub(crate) request: &'req QuoteRequest,
    pub(crate) profile: &'req PricingProfile,
    pub(crate) zones: ZonePair,
    pub(crate) chargeable_weight: f64,
    pub(crate) rate: BaseRate,
    pub(crate) base_freight: f64,
    pub(crate) surcharges: SurchargeLedger,
    pub(crate) totals: Totals,
    pub(crate) diagnostics: Diagnostics,
}

impl Priced<'_> {
    pub(crate) fn into_result(mut self) -> Result<QuoteResult, QuoteError> {
        ensure_finite("base freight", self.base_freight)?;
        ensure_finite("surcharges", self.surcharges.total())?;
        ensure_finite("total before tax", self.totals.total_before_tax)?;
        ensure_finite("tax", self.totals.tax_amount)?;
        ensure_finite("total after tax", self.totals.total_after_tax)?;

        self.profile.describe(&mut self.diagnostics);
        note(
            &mut self.diagnostics,
            "rate_source",
            match self.rate.source {
                RateSource::Table => "table",
                RateSource::Fallback => "fallback",
            },
        );
        let items = &self.request.items;
        Ok(QuoteResult {
            carrier: self.meta.id,
            carrier_name: self.meta.name.clone(),
            deliverable: true,
            reason: None,
            from_zone: self.zones.from,
            to_zone: self.zones.to,
            chargeable_weight_kg: round_weight(self.chargeable_weight),
            base_freight: self.base_freight,
            surcharges: self.surcharges,
            total_before_tax: self.totals.total_before_tax,
            tax_amount: self.totals.tax_amount,
            total_after_tax: self.totals.total_after_tax,
            rate_per_kg: self.rate.rate_per_kg,
            volumetric_weight_kg: round_weight(self.profile.weight.total_volumetric(items)),
            actual_weight_kg: round_weight(actual_weight(items)),
            diagnostics: self.diagnostics,
        })
    }
}

/// Standard flow: zones, serviceability, weight, base freight, surcharges, tax.
///
/// `oda_gate` narrows when the destination ODA flag counts; `extra` adds
/// engine-specific diagnostics.
pub(crate) fn price<E, Gate, Extra>(
    engine: &E,
    profile: &PricingProfile,
    request: &QuoteRequest,
    locations: &dyn LocationLookup,
    oda_gate: Gate,
    extra: Extra,
) -> Result<QuoteResult, QuoteError>
where
    E: RateEngine + ?Sized,
    Gate: FnOnce(&ZonePair) -> bool,
    Extra: FnOnce(&ZonePair, &BaseRate, &mut Diagnostics),
{
    request.validate()?;
    let meta = engine.carrier();
    let origin = locations.resolve(&request.origin);
    let destination = locations.resolve(&request.destination);
    let zones = engine.resolve_zones(request, &origin, &destination);

    if let Some(declined) = decline_unserviceable(meta, &destination, &zones) {
        return Ok(declined);
    }

    let chargeable_weight = engine.chargeable_weight(request);
    let rate = engine.base_rate_per_kg(request, &zones, chargeable_weight);
    let base_freight = round_money(ensure_finite(
        "base freight",
        profile.floor_base(rate.freight),
    )?);
    let oda_applies =
        profile.destination_is_oda(meta.id, &destination) && oda_gate(&zones);
    let context = SurchargeContext {
        request,
        destination: &destination,
        zones: &zones,
        chargeable_weight,
        base_freight,
        oda_applies,
    };
    let surcharges = engine.surcharges(&context);
    let totals = profile
        .tax_rule()
        .settle(base_freight, &surcharges, request.tax_mode);

    debug!(
        carrier = %meta.id,
        lane = %zone_label(&zones),
        chargeable_weight,
        base_freight,
        oda_applies,
        total = totals.total_after_tax,
        "priced request"
    );

    let mut diagnostics = Diagnostics::new();
    extra(&zones, &rate, &mut diagnostics);
    Priced {
        meta,
        request,
        profile,
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

/// Undeliverable result when the carrier flags the destination as not serviceable.
pub(crate) fn decline_unserviceable(
    meta: &CarrierMeta,
    destination: &Location,
    zones: &ZonePair,
) -> Option<QuoteResult> {
    (destination.serviceable_for(meta.id) == Some(false)).then(|| {
        debug!(carrier = %meta.id, destination = %destination.code, "destination not serviceable");
        QuoteResult::undeliverable(
            meta,
            format!("Not deliverable to destination pincode {}", destination.code),
        )
        .with_zones(zones.clone())
    })
}

/// Check a carrier pipeline does not write a line its engine adds itself.
pub(crate) fn reject_line(
    pipeline: &SurchargePipeline,
    kind: SurchargeKind,
    error: ConfigError,
) -> Result<(), ConfigError> {
    if pipeline.writes(kind) {
        Err(error)
    } else {
        Ok(())
    }
}
