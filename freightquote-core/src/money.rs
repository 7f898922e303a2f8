//! Money and weight rounding.
//!
//! Amounts are rounded half-to-even on their exact binary value, so a float
//! stored slightly below a midpoint (`2.675`) rounds down while a true midpoint
//! (`0.125`) goes to the even neighbour.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::ports::QuoteError;

/// Round a monetary amount to two decimals.
///
/// Non-finite input is returned unchanged; callers reject it with [`ensure_finite`].
#[must_use]
pub fn round_money(amount: f64) -> f64 {
    round_places(amount, 2)
}

/// Round a weight in kilograms to three decimals for display.
#[must_use]
pub fn round_weight(kg: f64) -> f64 {
    round_places(kg, 3)
}

/// Reject NaN and infinite amounts produced while pricing.
///
/// # Errors
///
/// Returns [`QuoteError::NonFiniteAmount`] naming the stage that produced the value.
pub fn ensure_finite(stage: &'static str, amount: f64) -> Result<f64, QuoteError> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(QuoteError::NonFiniteAmount { stage })
    }
}

fn round_places(value: f64, places: u32) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    exact
        .round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
        .to_string()
        .parse()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_to_even_on_exact_midpoints() {
        assert_eq!(round_money(0.125), 0.12);
        assert_eq!(round_money(0.375), 0.38);
        assert_eq!(round_money(2.5), 2.5);
    }

    #[test]
    fn rounds_binary_value_below_midpoint_down() {
        // 2.675 is stored as 2.67499999...
        assert_eq!(round_money(2.675), 2.67);
        assert_eq!(round_money(145.152), 145.15);
        assert_eq!(round_money(0.18 * 806.4), 145.15);
    }

    #[test]
    fn keeps_negative_and_whole_amounts() {
        assert_eq!(round_money(450.0), 450.0);
        assert_eq!(round_money(-1.005), -1.0);
    }

    #[test]
    fn rounds_weights_to_three_places() {
        assert_eq!(round_weight(12.34567), 12.346);
        assert_eq!(round_weight(0.0), 0.0);
    }

    #[test]
    fn non_finite_values_pass_through_and_are_rejected() {
        assert!(round_money(f64::NAN).is_nan());
        assert_eq!(round_money(f64::INFINITY), f64::INFINITY);
        assert_eq!(
            ensure_finite("tax", f64::NAN),
            Err(QuoteError::NonFiniteAmount { stage: "tax" })
        );
        assert_eq!(ensure_finite("tax", 1.5), Ok(1.5));
    }
}
