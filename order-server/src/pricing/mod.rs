//! Pricing Module
//!
//! Turns cart lines into order totals.

pub mod calculator;

pub use calculator::{PriceLine, PriceTotals, price_order};
