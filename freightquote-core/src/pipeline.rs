//! Ordered surcharge steps and the ledger they fill.
//!
//! A carrier's pipeline is a list of [`SurchargeStep`]s evaluated in order.
//! Steps that depend on a running total (minimum top-up, fuel) see every line
//! added before them, so their position in the list is part of the tariff.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use crate::model::{Location, QuoteRequest, ZonePair};
use crate::money::round_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Names of surcharge lines.
pub enum SurchargeKind {
    /// Out-of-delivery-area charge.
    Oda,
    /// Safexpress extended-area charge.
    SafeExtension,
    /// Carrier or owner risk insurance.
    Insurance,
    /// Valuation charge on declared value.
    Valuation,
    /// Stepped charge per declared value slab.
    ValueSurcharge,
    /// Waybill fee.
    Waybill,
    /// Docket fee.
    Docket,
    /// Lorry receipt fee.
    Lr,
    /// Pickup charge.
    Pickup,
    /// Owner risk fee.
    OwnerRisk,
    /// Metro city delivery charge.
    Ucc,
    /// Per-kilogram state surcharge.
    StateSurcharge,
    /// Remote area surcharge.
    Ras,
    /// Delhi green tax.
    GreenTax,
    /// Special delivery service for fragile goods.
    Sds,
    /// Top-up to the carrier's minimum charge.
    Osc,
    /// Fuel surcharge.
    FuelSurcharge,
    /// Reverse pickup fee.
    ReversePickup,
    /// Storage beyond the free days.
    Demurrage,
}

impl SurchargeKind {
    /// Snake-case key used in serialized output.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Oda => "oda",
            Self::SafeExtension => "safe_extension",
            Self::Insurance => "insurance",
            Self::Valuation => "valuation",
            Self::ValueSurcharge => "value_surcharge",
            Self::Waybill => "waybill",
            Self::Docket => "docket",
            Self::Lr => "lr",
            Self::Pickup => "pickup",
            Self::OwnerRisk => "owner_risk",
            Self::Ucc => "ucc",
            Self::StateSurcharge => "state_surcharge",
            Self::Ras => "ras",
            Self::GreenTax => "green_tax",
            Self::Sds => "sds",
            Self::Osc => "osc",
            Self::FuelSurcharge => "fuel_surcharge",
            Self::ReversePickup => "reverse_pickup",
            Self::Demurrage => "demurrage",
        }
    }

    /// Human-friendly label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Oda => "ODA charge",
            Self::SafeExtension => "Safe extension",
            Self::Insurance => "Insurance",
            Self::Valuation => "Valuation",
            Self::ValueSurcharge => "Value surcharge",
            Self::Waybill => "Waybill",
            Self::Docket => "Docket",
            Self::Lr => "LR charge",
            Self::Pickup => "Pickup",
            Self::OwnerRisk => "Owner risk",
            Self::Ucc => "Metro delivery (UCC)",
            Self::StateSurcharge => "State surcharge",
            Self::Ras => "Remote area surcharge",
            Self::GreenTax => "Green tax",
            Self::Sds => "Special delivery (SDS)",
            Self::Osc => "Minimum charge top-up",
            Self::FuelSurcharge => "Fuel surcharge",
            Self::ReversePickup => "Reverse pickup",
            Self::Demurrage => "Demurrage",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Named surcharge amounts in insertion order, one line per kind.
pub struct SurchargeLedger {
    lines: Vec<(SurchargeKind, f64)>,
}

impl SurchargeLedger {
    /// Empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Record a line rounded to two decimals, replacing an existing line of the same kind in place.
    pub fn set(&mut self, kind: SurchargeKind, amount: f64) {
        let amount = round_money(amount);
        if let Some(line) = self.lines.iter_mut().find(|(existing, _)| *existing == kind) {
            line.1 = amount;
        } else {
            self.lines.push((kind, amount));
        }
    }

    /// Amount of a line, if present.
    #[must_use]
    pub fn get(&self, kind: SurchargeKind) -> Option<f64> {
        self.lines
            .iter()
            .find(|(existing, _)| *existing == kind)
            .map(|(_, amount)| *amount)
    }

    /// True when a line of this kind was recorded.
    #[must_use]
    pub fn contains(&self, kind: SurchargeKind) -> bool {
        self.get(kind).is_some()
    }

    /// Sum of all lines in insertion order.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|(_, amount)| amount).sum()
    }

    /// Sum of all lines except one kind.
    #[must_use]
    pub fn total_excluding(&self, excluded: SurchargeKind) -> f64 {
        self.lines
            .iter()
            .filter(|(kind, _)| *kind != excluded)
            .map(|(_, amount)| amount)
            .sum()
    }

    /// Lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SurchargeKind, f64)> + '_ {
        self.lines.iter().copied()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no line was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Serialize for SurchargeLedger {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.lines.len()))?;
        for (kind, amount) in &self.lines {
            map.serialize_entry(kind.key(), amount)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy)]
/// Inputs available to every surcharge step.
pub struct SurchargeContext<'ctx> {
    /// Request being priced.
    pub request: &'ctx QuoteRequest,
    /// Resolved destination.
    pub destination: &'ctx Location,
    /// Zones resolved for the lane.
    pub zones: &'ctx ZonePair,
    /// Chargeable weight in kilograms.
    pub chargeable_weight: f64,
    /// Rounded base freight after any base minimum.
    pub base_freight: f64,
    /// Whether the engine decided out-of-delivery-area charges apply.
    pub oda_applies: bool,
}

impl SurchargeContext<'_> {
    fn destination_state_is(&self, states: &[&str]) -> bool {
        self.destination
            .state_key()
            .is_some_and(|state| states.iter().any(|candidate| state == *candidate))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Per-kilogram surcharge for a group of states.
pub struct StateTier {
    /// Lower-case state names.
    pub states: &'static [&'static str],
    /// Rate per chargeable kilogram.
    pub per_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What a fuel percentage or minimum top-up is measured against.
pub enum ChargeBase {
    /// Base freight plus every line recorded so far except fuel.
    Running,
    /// Base freight plus only the listed lines, wherever they sit in the ledger.
    Including(&'static [SurchargeKind]),
}

impl ChargeBase {
    /// Base freight alone.
    pub const BASE_FREIGHT: Self = Self::Including(&[]);

    fn measure(self, context: &SurchargeContext<'_>, ledger: &SurchargeLedger) -> f64 {
        let lines = match self {
            Self::Running => ledger.total_excluding(SurchargeKind::FuelSurcharge),
            Self::Including(kinds) => kinds.iter().filter_map(|kind| ledger.get(*kind)).sum(),
        };
        context.base_freight + lines
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One surcharge rule. Steps that do not apply add no line.
pub enum SurchargeStep {
    /// Out-of-delivery-area charge when the engine flags the destination.
    /// With `per_kg` set the charge is the larger of `flat` and `per_kg` times weight.
    OutOfDeliveryArea {
        /// Line name.
        kind: SurchargeKind,
        /// Flat charge or minimum.
        flat: f64,
        /// Optional per-kilogram rate.
        per_kg: Option<f64>,
    },
    /// Percentage of a positive declared value, floored at a minimum.
    DeclaredValue {
        /// Line name.
        kind: SurchargeKind,
        /// Fraction of declared value.
        percent: f64,
        /// Minimum charge.
        minimum: f64,
        /// Charge when no positive value is declared; no line when `None`.
        undeclared: Option<f64>,
    },
    /// Fixed amount for every started slab of declared value.
    DeclaredValueSlab {
        /// Line name.
        kind: SurchargeKind,
        /// Declared value covered by one slab.
        slab_size: f64,
        /// Charge per slab.
        per_slab: f64,
        /// Charge when no positive value is declared; no line when `None`.
        undeclared: Option<f64>,
    },
    /// Unconditional fixed fee.
    Flat {
        /// Line name.
        kind: SurchargeKind,
        /// Fee.
        amount: f64,
    },
    /// Pickup charge above a weight threshold.
    Pickup {
        /// Rate per chargeable kilogram.
        per_kg: f64,
        /// Minimum charge.
        minimum: f64,
        /// Charged only above this weight.
        above_kg: f64,
    },
    /// Fixed fee for listed destination cities.
    MetroDestination {
        /// Lower-case city names.
        cities: &'static [&'static str],
        /// Fee.
        amount: f64,
    },
    /// Per-kilogram charge for the first tier listing the destination state.
    StateTiers {
        /// Line name.
        kind: SurchargeKind,
        /// Tiers checked in order.
        tiers: &'static [StateTier],
    },
    /// Special handling charge when requested.
    SpecialHandling {
        /// Minimum charge.
        flat: f64,
        /// Rate per chargeable kilogram.
        per_kg: f64,
    },
    /// Percentage of base freight for one destination state.
    GreenTax {
        /// Lower-case state name.
        state: &'static str,
        /// Fraction of base freight.
        percent: f64,
    },
    /// Top-up so the measured amount reaches a threshold.
    MinimumTopUp {
        /// Minimum of the measured amount.
        threshold: f64,
        /// Lines counted with base freight.
        on: ChargeBase,
    },
    /// Percentage of the measured amount.
    Fuel {
        /// Fraction applied.
        percent: f64,
        /// Lines counted with base freight.
        on: ChargeBase,
    },
    /// Fixed fee when reverse pickup is requested.
    ReversePickup {
        /// Fee.
        fee: f64,
    },
    /// Storage charge per kilogram per day beyond the free days.
    Demurrage {
        /// Rate per chargeable kilogram per day.
        per_kg_per_day: f64,
        /// Days free of charge.
        free_days: u32,
    },
}

impl SurchargeStep {
    /// Line this step writes.
    #[must_use]
    pub const fn kind(&self) -> SurchargeKind {
        match self {
            Self::OutOfDeliveryArea { kind, .. }
            | Self::DeclaredValue { kind, .. }
            | Self::DeclaredValueSlab { kind, .. }
            | Self::Flat { kind, .. }
            | Self::StateTiers { kind, .. } => *kind,
            Self::Pickup { .. } => SurchargeKind::Pickup,
            Self::MetroDestination { .. } => SurchargeKind::Ucc,
            Self::SpecialHandling { .. } => SurchargeKind::Sds,
            Self::GreenTax { .. } => SurchargeKind::GreenTax,
            Self::MinimumTopUp { .. } => SurchargeKind::Osc,
            Self::Fuel { .. } => SurchargeKind::FuelSurcharge,
            Self::ReversePickup { .. } => SurchargeKind::ReversePickup,
            Self::Demurrage { .. } => SurchargeKind::Demurrage,
        }
    }

    /// Amount this step charges, or `None` when it does not apply.
    #[must_use]
    pub fn amount(&self, context: &SurchargeContext<'_>, ledger: &SurchargeLedger) -> Option<f64> {
        let weight = context.chargeable_weight;
        match self {
            Self::OutOfDeliveryArea { flat, per_kg, .. } => context
                .oda_applies
                .then(|| per_kg.map_or(*flat, |rate| flat.max(rate * weight))),
            Self::DeclaredValue {
                percent,
                minimum,
                undeclared,
                ..
            } => context
                .request
                .positive_declared_value()
                .map(|value| (value * percent).max(*minimum))
                .or(*undeclared),
            Self::DeclaredValueSlab {
                slab_size,
                per_slab,
                undeclared,
                ..
            } => context
                .request
                .positive_declared_value()
                .map(|value| per_slab * (value / slab_size).ceil())
                .or(*undeclared),
            Self::Flat { amount, .. } => Some(*amount),
            Self::Pickup {
                per_kg,
                minimum,
                above_kg,
            } => (weight > *above_kg).then(|| (weight * per_kg).max(*minimum)),
            Self::MetroDestination { cities, amount } => context
                .destination
                .city_key()
                .is_some_and(|city| cities.iter().any(|candidate| *candidate == city))
                .then_some(*amount),
            Self::StateTiers { tiers, .. } => tiers
                .iter()
                .find(|tier| context.destination_state_is(tier.states))
                .map(|tier| tier.per_kg * weight),
            Self::SpecialHandling { flat, per_kg } => context
                .request
                .special_handling
                .then(|| flat.max(per_kg * weight)),
            Self::GreenTax { state, percent } => context
                .destination_state_is(&[*state])
                .then(|| context.base_freight * percent),
            Self::MinimumTopUp { threshold, on } => {
                let measured = on.measure(context, ledger);
                (measured < *threshold).then(|| threshold - measured)
            }
            Self::Fuel { percent, on } => Some(percent * on.measure(context, ledger)),
            Self::ReversePickup { fee } => context.request.reverse_pickup.then_some(*fee),
            Self::Demurrage {
                per_kg_per_day,
                free_days,
            } => {
                let billable = context.request.storage_days.saturating_sub(*free_days);
                (billable > 0).then(|| per_kg_per_day * weight * f64::from(billable))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Surcharge steps evaluated in order.
pub struct SurchargePipeline {
    steps: Vec<SurchargeStep>,
}

impl SurchargePipeline {
    /// Pipeline running the given steps in order.
    #[must_use]
    pub const fn new(steps: Vec<SurchargeStep>) -> Self {
        Self { steps }
    }

    /// Steps in evaluation order.
    #[must_use]
    pub fn steps(&self) -> &[SurchargeStep] {
        &self.steps
    }

    /// True when any step writes the given line.
    #[must_use]
    pub fn writes(&self, kind: SurchargeKind) -> bool {
        self.steps.iter().any(|step| step.kind() == kind)
    }

    /// True when the pipeline tops the running total up to a minimum.
    #[must_use]
    pub fn has_top_up(&self) -> bool {
        self.steps
            .iter()
            .any(|step| matches!(step, SurchargeStep::MinimumTopUp { .. }))
    }

    /// Evaluate every step, each line rounded as it is recorded.
    #[must_use]
    pub fn run(&self, context: &SurchargeContext<'_>) -> SurchargeLedger {
        let mut ledger = SurchargeLedger::new();
        for step in &self.steps {
            if let Some(amount) = step.amount(context, &ledger) {
                ledger.set(step.kind(), amount);
            }
        }
        ledger
    }
}
