//! Read-only views over a `LedgerEngine`.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{check_amount, Decimal, Order, OrderKind, Symbol};
use crate::error::LedgerError;

use super::{HoldingsEntry, LedgerEngine};

/// Money moved and profit realized in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyActivity {
    pub year: i32,
    pub month: u32,
    /// Sum of buy gross totals.
    pub spent: Decimal,
    /// Sum of sell gross totals.
    pub received: Decimal,
    /// None when nothing was realized that month.
    pub profit: Option<Decimal>,
}

/// Projected result of selling part or all of a holding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitEstimate {
    pub symbol: Symbol,
    pub quantity: i64,
    pub price_per_unit: Decimal,
    pub fees: Decimal,
    pub profit: Decimal,
    pub profit_per_unit: Decimal,
}

/// Snapshot of the whole ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub first_trade: Option<NaiveDate>,
    pub last_trade: Option<NaiveDate>,
    pub holdings: Vec<HoldingsEntry>,
    pub total_bought: Decimal,
    pub total_sold: Decimal,
    /// Cost basis of everything still held.
    pub total_custody: Decimal,
    pub total_realized_profit: Decimal,
}

impl LedgerEngine {
    pub fn purchase_orders(&self) -> Vec<&Order> {
        self.orders_of_kind(OrderKind::Buy)
    }

    pub fn sale_orders(&self) -> Vec<&Order> {
        self.orders_of_kind(OrderKind::Sell)
    }

    fn orders_of_kind(&self, kind: OrderKind) -> Vec<&Order> {
        self.history().iter().filter(|o| o.kind == kind).collect()
    }

    /// Spent/received per month of the trade history, with that month's
    /// realized profit joined on.
    pub fn monthly_activity(&self) -> Vec<MonthlyActivity> {
        let mut flows: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
        for order in self.history() {
            let (spent, received) = flows
                .entry((order.date.year(), order.date.month()))
                .or_default();
            match order.kind {
                OrderKind::Buy => *spent += order.gross_total,
                OrderKind::Sell => *received += order.gross_total,
            }
        }

        let mut profits: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
        for entry in self.realized() {
            *profits
                .entry((entry.date.year(), entry.date.month()))
                .or_default() += entry.total_profit;
        }

        flows
            .into_iter()
            .map(|((year, month), (spent, received))| MonthlyActivity {
                year,
                month,
                spent,
                received,
                profit: profits.get(&(year, month)).copied(),
            })
            .collect()
    }

    /// Project the profit of selling `quantity` units of `symbol` at
    /// `price_per_unit`.
    ///
    /// A missing or negative quantity sells the whole holding; missing or
    /// negative fees use the configured average fee.
    pub fn estimate_profit(
        &self,
        symbol: &str,
        price_per_unit: Decimal,
        quantity: Option<i64>,
        fees: Option<Decimal>,
    ) -> Result<ProfitEstimate, LedgerError> {
        if !price_per_unit.is_positive() {
            return Err(LedgerError::Validation(format!(
                "price per unit must be > 0, got {}",
                price_per_unit
            )));
        }
        check_amount("price per unit", price_per_unit)?;
        let symbol = Symbol::parse(symbol)?;
        let holding = self
            .holding(symbol.as_str())
            .ok_or_else(|| LedgerError::NotFound(format!("{} is not in holdings", symbol)))?;

        let quantity = match quantity {
            Some(q) if q >= 0 => q,
            _ => holding.quantity,
        };
        if quantity == 0 {
            return Err(LedgerError::Validation(
                "quantity must not be zero".to_string(),
            ));
        }
        if quantity > holding.quantity {
            return Err(LedgerError::InsufficientHoldings {
                symbol,
                requested: quantity,
                held: holding.quantity,
            });
        }
        let fees = match fees {
            Some(f) if !f.is_negative() => f,
            _ => self.average_fee(),
        };
        check_amount("fees", fees)?;

        let qty = Decimal::from_qty(quantity);
        let profit = (qty * price_per_unit - fees) - qty * holding.avg_cost;
        Ok(ProfitEstimate {
            symbol,
            quantity,
            price_per_unit,
            fees,
            profit,
            profit_per_unit: profit / qty,
        })
    }

    pub fn summary(&self) -> Summary {
        let history = self.history();
        Summary {
            first_trade: history.iter().map(|o| o.date).min(),
            last_trade: history.iter().map(|o| o.date).max(),
            holdings: self.holdings().cloned().collect(),
            total_bought: self.purchase_orders().iter().map(|o| o.gross_total).sum(),
            total_sold: self.sale_orders().iter().map(|o| o.gross_total).sum(),
            total_custody: self.holdings().map(|h| h.total_cost).sum(),
            total_realized_profit: self.realized().iter().map(|r| r.total_profit).sum(),
        }
    }
}
