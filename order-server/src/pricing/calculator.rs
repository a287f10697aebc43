//! Price Calculator
//!
//! Computes order totals from the price snapshots taken at order
//! time. Uses rust_decimal for the card markup, stores i64 minor
//! currency units.

use rust_decimal::prelude::*;
use shared::models::PaymentMethod;

/// One cart line from the order snapshot
#[derive(Debug, Clone)]
pub struct PriceLine {
    /// Menu item unit price at order time, minor units
    pub unit_price: i64,
    pub quantity: i64,
    /// Chosen modifier price deltas, minor units
    pub modifier_prices: Vec<i64>,
}

impl PriceLine {
    /// Line base: (unit price + Σ modifier prices) × quantity
    pub fn base(&self) -> i64 {
        let unit = self.unit_price + self.modifier_prices.iter().sum::<i64>();
        unit * self.quantity
    }
}

/// Computed order totals, minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTotals {
    pub subtotal: i64,
    pub surcharge: i64,
    pub total: i64,
}

/// Price a cart for the given payment method.
///
/// CASH (or no method chosen yet): total = subtotal, surcharge 0.
/// CARD: each line is marked up 3%, rounded half-up to a whole minor
/// unit, then rounded up to the next multiple of 10. The markup
/// applies per line, not to the grand total.
pub fn price_order(lines: &[PriceLine], method: Option<PaymentMethod>) -> PriceTotals {
    let subtotal: i64 = lines.iter().map(PriceLine::base).sum();

    let total = match method {
        Some(PaymentMethod::Card) => lines.iter().map(|l| card_line_total(l.base())).sum(),
        _ => subtotal,
    };

    PriceTotals {
        subtotal,
        surcharge: total - subtotal,
        total,
    }
}

/// 3% card markup for one line
fn card_line_total(line_base: i64) -> i64 {
    let marked_up = Decimal::from(line_base) * Decimal::new(103, 2);
    let rounded = marked_up
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(line_base);
    round_up_to_ten(rounded)
}

fn round_up_to_ten(value: i64) -> i64 {
    // i64::div_ceil is unstable (int_roundings); this is its expansion for a positive divisor
    let quotient = value / 10;
    let quotient = if value % 10 > 0 { quotient + 1 } else { quotient };
    quotient * 10
}
