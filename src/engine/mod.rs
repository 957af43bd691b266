//! Pure computation engine for the average-cost trade ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Decimal, Order, Symbol};

pub mod analysis;
pub mod ledger;

pub use analysis::{MonthlyActivity, ProfitEstimate, Summary};
pub use ledger::LedgerEngine;

/// Engine configuration, passed in at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerConfig {
    /// Expected flat fee of a future sell order, used for break-even prices
    /// and as the default fee of profit estimates.
    pub average_fee: Decimal,
}

impl LedgerConfig {
    pub fn new(average_fee: Decimal) -> Self {
        Self { average_fee }
    }
}

/// Current position in one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsEntry {
    pub symbol: Symbol,
    pub quantity: i64,
    /// Weighted average cost per unit, fees included. Only buys move it.
    pub avg_cost: Decimal,
    pub total_cost: Decimal,
    /// Sale price per unit at which selling everything, after the average
    /// fee, nets zero.
    pub break_even_price: Decimal,
}

impl HoldingsEntry {
    pub(crate) fn refresh_break_even(&mut self, average_fee: Decimal) {
        self.break_even_price = (self.total_cost + average_fee) / Decimal::from_qty(self.quantity);
    }
}

/// Profit recognized by one sell order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizedProfitEntry {
    pub symbol: Symbol,
    pub date: NaiveDate,
    pub quantity: i64,
    pub avg_cost_at_sale: Decimal,
    pub avg_sale_price: Decimal,
    pub avg_profit_per_unit: Decimal,
    pub total_profit: Decimal,
}

/// What a successful `record_order` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderOutcome {
    pub order: Order,
    /// Present for sells only.
    pub realized: Option<RealizedProfitEntry>,
}
