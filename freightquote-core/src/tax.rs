//! GST computation and total assembly.

use serde::{Deserialize, Serialize};

use crate::model::TaxMode;
use crate::money::round_money;
use crate::pipeline::SurchargeLedger;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// GST rates by tax mode.
pub struct TaxPolicy {
    /// Rate for [`TaxMode::Standard`].
    pub standard_rate: f64,
    /// Rate for [`TaxMode::Reduced`].
    pub reduced_rate: f64,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            standard_rate: 0.18,
            reduced_rate: 0.05,
        }
    }
}

impl TaxPolicy {
    /// Rate for a tax mode.
    #[must_use]
    pub const fn rate_for(&self, mode: TaxMode) -> f64 {
        match mode {
            TaxMode::Standard => self.standard_rate,
            TaxMode::Reduced => self.reduced_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Whether the carrier's rates already include GST.
pub enum TaxTreatment {
    /// GST is added on top of the pre-tax total.
    #[default]
    Exclusive,
    /// Rates already include GST; no tax line is added.
    Inclusive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Final figures of a quote.
pub struct Totals {
    /// Base freight plus surcharges.
    pub total_before_tax: f64,
    /// GST amount.
    pub tax_amount: f64,
    /// Amount payable.
    pub total_after_tax: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// How pre-tax totals turn into payable totals for one carrier.
pub struct TaxRule {
    /// Rates by mode.
    pub policy: TaxPolicy,
    /// Inclusive or exclusive pricing.
    pub treatment: TaxTreatment,
    /// Floor applied to the payable total, if any.
    pub final_minimum: Option<f64>,
}

impl TaxRule {
    /// Rule adding GST at the policy rates with no final floor.
    #[must_use]
    pub const fn exclusive(policy: TaxPolicy) -> Self {
        Self {
            policy,
            treatment: TaxTreatment::Exclusive,
            final_minimum: None,
        }
    }

    /// Rule for tariffs that already include GST.
    #[must_use]
    pub const fn inclusive(policy: TaxPolicy) -> Self {
        Self {
            policy,
            treatment: TaxTreatment::Inclusive,
            final_minimum: None,
        }
    }

    /// GST on a pre-tax subtotal, rounded.
    #[must_use]
    pub fn tax_on(&self, subtotal: f64, mode: TaxMode) -> f64 {
        match self.treatment {
            TaxTreatment::Exclusive => round_money(subtotal * self.policy.rate_for(mode)),
            TaxTreatment::Inclusive => 0.0,
        }
    }

    /// Totals for a base freight and its surcharge ledger.
    #[must_use]
    pub fn settle(&self, base_freight: f64, surcharges: &SurchargeLedger, mode: TaxMode) -> Totals {
        self.settle_subtotal(round_money(base_freight + surcharges.total()), mode)
    }

    /// Totals for an already rounded pre-tax subtotal.
    #[must_use]
    pub fn settle_subtotal(&self, total_before_tax: f64, mode: TaxMode) -> Totals {
        let tax_amount = self.tax_on(total_before_tax, mode);
        let mut total_after_tax = round_money(total_before_tax + tax_amount);
        if let Some(minimum) = self.final_minimum {
            total_after_tax = total_after_tax.max(minimum);
        }
        Totals {
            total_before_tax,
            tax_amount,
            total_after_tax,
        }
    }
}
