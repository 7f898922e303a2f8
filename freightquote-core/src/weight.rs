//! Actual, volumetric, and chargeable weight.

use crate::model::ParcelItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a per-item volumetric weight is rounded before comparison with dead weight.
pub enum VolumetricRounding {
    /// Use the raw quotient.
    Exact,
    /// Round up to the next half kilogram.
    UpToHalfKg,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Carrier rule turning parcel items into a chargeable weight.
pub struct WeightRule {
    /// Cubic centimetres per volumetric kilogram.
    pub divisor: f64,
    /// Minimum chargeable weight in kilograms.
    pub floor_kg: f64,
    /// Per-item volumetric rounding.
    pub rounding: VolumetricRounding,
}

impl WeightRule {
    /// Rule with exact volumetric weights.
    #[must_use]
    pub const fn new(divisor: f64, floor_kg: f64) -> Self {
        Self {
            divisor,
            floor_kg,
            rounding: VolumetricRounding::Exact,
        }
    }

    /// Round each item's volumetric weight up to the next half kilogram.
    #[must_use]
    pub const fn rounded_to_half_kg(mut self) -> Self {
        self.rounding = VolumetricRounding::UpToHalfKg;
        self
    }

    /// Volumetric weight of one item after this rule's rounding.
    #[must_use]
    pub fn item_volumetric(&self, item: &ParcelItem) -> f64 {
        let raw = volumetric_weight(item, self.divisor);
        match self.rounding {
            VolumetricRounding::Exact => raw,
            VolumetricRounding::UpToHalfKg => (raw * 2.0).ceil() / 2.0,
        }
    }

    /// Sum of per-item maxima of dead and volumetric weight, floored at the minimum.
    ///
    /// The comparison is per item: a heavy small box does not absorb the volume
    /// of a light large one.
    #[must_use]
    pub fn chargeable(&self, items: &[ParcelItem]) -> f64 {
        let total: f64 = items
            .iter()
            .map(|item| item.weight_kg().max(self.item_volumetric(item)))
            .sum();
        self.floor_kg.max(total)
    }

    /// Summed volumetric weight of all items, unrounded.
    #[must_use]
    pub fn total_volumetric(&self, items: &[ParcelItem]) -> f64 {
        items
            .iter()
            .map(|item| volumetric_weight(item, self.divisor))
            .sum()
    }
}

/// Volumetric weight of one item for a divisor.
#[must_use]
pub fn volumetric_weight(item: &ParcelItem, divisor: f64) -> f64 {
    item.volume_cm3() / divisor
}

/// Summed dead weight of all items.
#[must_use]
pub fn actual_weight(items: &[ParcelItem]) -> f64 {
    items.iter().map(ParcelItem::weight_kg).sum()
}

/// Chargeable weight for a divisor and floor with exact volumetric weights.
#[must_use]
pub fn chargeable_weight(items: &[ParcelItem], divisor: f64, floor_kg: f64) -> f64 {
    WeightRule::new(divisor, floor_kg).chargeable(items)
}
