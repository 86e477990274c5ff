//! Decimal money arithmetic used by order aggregation.
//!
//! Every monetary value is quantized to two places with round-half-up (midpoint away
//! from zero) at each step: line price and quantity before multiplying, the summed
//! subtotal, the freight, and the final total. Rounding only once at the end gives
//! different results for half-cent inputs, so the per-step rounding is kept exactly.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places money is quantized to
pub const MONEY_SCALE: u32 = 2;

/// Rounds `value` to two decimal places, halves away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// The two inputs of a line's extended price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineAmount {
    /// Captured unit price
    pub unit_price: Decimal,
    /// Quantity sold
    pub quantity: Decimal,
}

impl LineAmount {
    /// Creates a line amount from a price and quantity.
    #[must_use]
    pub const fn new(unit_price: Decimal, quantity: Decimal) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// Unit price times quantity, each rounded to two places first.
    ///
    /// The product itself is not rounded; [`subtotal_of`] rounds the sum.
    #[must_use]
    pub fn extended(&self) -> Decimal {
        round_money(self.unit_price) * round_money(self.quantity)
    }
}

/// Sums the extended prices of `lines` and rounds the sum to two places.
///
/// An empty iterator yields zero.
#[must_use]
pub fn subtotal_of<'a, I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = &'a LineAmount>,
{
    let sum: Decimal = lines.into_iter().map(LineAmount::extended).sum();
    round_money(sum)
}

/// Subtotal plus freight, both rounded, then rounded again. Missing freight is zero.
#[must_use]
pub fn total_of(subtotal: Decimal, freight: Option<Decimal>) -> Decimal {
    let freight = freight.unwrap_or(Decimal::ZERO);
    round_money(round_money(subtotal) + round_money(freight))
}

/// Formats a monetary value with exactly two decimals (e.g. `"23.02"`).
#[must_use]
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(5.555)), dec!(5.56));
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(3.004)), dec!(3.00));
        // Banker's rounding would give 2.02 here
        assert_eq!(round_money(dec!(2.025)), dec!(2.03));
    }

    #[test]
    fn test_round_money_negative_midpoint_away_from_zero() {
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_subtotal_of_no_lines_is_zero() {
        let lines: [LineAmount; 0] = [];
        assert_eq!(subtotal_of(&lines), dec!(0.00));
    }

    #[test]
    fn test_subtotal_rounds_each_value_before_multiplying() {
        let lines = [
            LineAmount::new(dec!(10.005), dec!(2)),
            LineAmount::new(dec!(3.004), dec!(1)),
        ];
        // (10.01 × 2.00) + (3.00 × 1.00)
        assert_eq!(subtotal_of(&lines), dec!(23.02));
    }

    #[test]
    fn test_subtotal_rounds_fractional_quantity() {
        let lines = [LineAmount::new(dec!(10.00), dec!(1.005))];
        // quantity 1.005 -> 1.01
        assert_eq!(subtotal_of(&lines), dec!(10.10));
    }

    #[test]
    fn test_subtotal_rounds_final_sum() {
        let lines = [LineAmount::new(dec!(10.01), dec!(2.01))];
        // 10.01 × 2.01 = 20.1201
        assert_eq!(subtotal_of(&lines), dec!(20.12));
    }

    #[test]
    fn test_total_adds_rounded_freight() {
        assert_eq!(total_of(dec!(23.02), Some(dec!(5.555))), dec!(28.58));
    }

    #[test]
    fn test_total_without_freight() {
        assert_eq!(total_of(dec!(23.02), None), dec!(23.02));
        assert_eq!(total_of(Decimal::ZERO, None), dec!(0.00));
    }

    #[test]
    fn test_per_step_rounding_differs_from_round_once() {
        let lines = [
            LineAmount::new(dec!(0.005), dec!(1)),
            LineAmount::new(dec!(0.005), dec!(1)),
        ];
        // Rounded per line: 0.01 + 0.01. Rounded once: round(0.010) = 0.01.
        assert_eq!(subtotal_of(&lines), dec!(0.02));
    }

    #[test]
    fn test_format_money_pads_to_two_places() {
        assert_eq!(format_money(dec!(0)), "0.00");
        assert_eq!(format_money(dec!(28.5)), "28.50");
        assert_eq!(format_money(dec!(5.555)), "5.56");
    }
}
