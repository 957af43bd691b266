use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{
    check_amount, parse_trade_date, sort_orders, Decimal, Order, OrderKind, OrderOrderingKey,
    OrderRequest, Symbol,
};
use crate::error::LedgerError;

use super::{HoldingsEntry, LedgerConfig, OrderOutcome, RealizedProfitEntry};

/// Owns the trade history and the tables derived from it: holdings,
/// realized-profit history and the running realized profit.
///
/// `record_order` is the only mutation of the derived tables. Every other
/// operation is a read-only view, and `state_at` builds a fresh engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerEngine {
    config: LedgerConfig,
    history: Vec<Order>,
    holdings: BTreeMap<Symbol, HoldingsEntry>,
    realized: Vec<RealizedProfitEntry>,
    realized_profit: Decimal,
    legend: BTreeMap<Symbol, String>,
}

impl LedgerEngine {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Rebuild an engine by replaying `orders` in (date, kind) order.
    pub fn from_orders(config: LedgerConfig, orders: &[Order]) -> Result<Self, LedgerError> {
        let mut replay = orders.to_vec();
        sort_orders(&mut replay);

        let mut engine = Self::new(config);
        for order in &replay {
            engine.record_order_unsorted(&order.to_request())?;
        }
        engine.sort_tables();
        Ok(engine)
    }

    /// Record an order and re-sort the history tables.
    pub fn record_order(&mut self, request: &OrderRequest) -> Result<OrderOutcome, LedgerError> {
        let outcome = self.record_order_unsorted(request)?;
        self.sort_tables();
        Ok(outcome)
    }

    /// Record an order without re-sorting. Bulk loaders call `sort_tables`
    /// once at the end.
    ///
    /// The derived tables always equal a (date, kind) sorted replay of the
    /// history. An order that sorts after everything recorded so far is
    /// applied on top of the current tables; any other order rebuilds them by
    /// replay, and is rejected when that replay fails.
    pub fn record_order_unsorted(
        &mut self,
        request: &OrderRequest,
    ) -> Result<OrderOutcome, LedgerError> {
        let symbol = request.validate()?;
        let order = Order::from_validated(request, symbol);

        let realized = if self.sorts_last(&order) {
            match order.kind {
                OrderKind::Buy => {
                    self.apply_buy(&order);
                    None
                }
                OrderKind::Sell => {
                    self.check_can_sell(&order.symbol, order.quantity)?;
                    Some(self.apply_sell(&order)?)
                }
            }
        } else {
            self.rebuild_with(&order)?
        };
        self.history.push(order.clone());

        debug!(
            kind = %order.kind,
            symbol = %order.symbol,
            date = %order.date,
            quantity = order.quantity,
            gross_total = %order.gross_total,
            "Recorded order"
        );

        Ok(OrderOutcome { order, realized })
    }

    fn sorts_last(&self, order: &Order) -> bool {
        let key = OrderOrderingKey::from_order(order);
        self.history
            .iter()
            .all(|o| OrderOrderingKey::from_order(o) <= key)
    }

    /// Replace the derived tables with a sorted replay of the history plus
    /// `order`, placed where a stable sort puts it. Nothing changes on error.
    fn rebuild_with(&mut self, order: &Order) -> Result<Option<RealizedProfitEntry>, LedgerError> {
        let key = OrderOrderingKey::from_order(order);
        let mut replay = self.history.clone();
        sort_orders(&mut replay);
        let at = replay.partition_point(|o| OrderOrderingKey::from_order(o) <= key);
        replay.insert(at, order.clone());

        let mut rebuilt = LedgerEngine::new(self.config);
        let mut realized = None;
        for (i, o) in replay.iter().enumerate() {
            let outcome = rebuilt.record_order_unsorted(&o.to_request()).map_err(|e| {
                warn!(symbol = %order.symbol, date = %order.date, error = %e, "Rejected back-dated order");
                e
            })?;
            if i == at {
                realized = outcome.realized;
            }
        }

        debug!(orders = replay.len(), date = %order.date, "Rebuilt ledger for back-dated order");
        self.holdings = rebuilt.holdings;
        self.realized = rebuilt.realized;
        self.realized_profit = rebuilt.realized_profit;
        Ok(realized)
    }

    fn check_can_sell(&self, symbol: &Symbol, quantity: i64) -> Result<(), LedgerError> {
        let held = self.holdings.get(symbol).map(|h| h.quantity).unwrap_or(0);
        if quantity > held {
            warn!(symbol = %symbol, requested = quantity, held, "Rejected sell above holdings");
            return Err(LedgerError::InsufficientHoldings {
                symbol: symbol.clone(),
                requested: quantity,
                held,
            });
        }
        Ok(())
    }

    fn apply_buy(&mut self, order: &Order) {
        let average_fee = self.config.average_fee;
        let entry = self
            .holdings
            .entry(order.symbol.clone())
            .and_modify(|h| {
                // Weighted with the pre-update quantity and average.
                let old_qty = Decimal::from_qty(h.quantity);
                let new_qty = Decimal::from_qty(order.quantity);
                h.avg_cost =
                    (old_qty * h.avg_cost + new_qty * order.avg_unit_cost) / (old_qty + new_qty);
                h.quantity += order.quantity;
                h.total_cost += order.gross_total;
            })
            .or_insert_with(|| HoldingsEntry {
                symbol: order.symbol.clone(),
                quantity: order.quantity,
                avg_cost: order.avg_unit_cost,
                total_cost: order.gross_total,
                break_even_price: Decimal::zero(),
            });
        entry.refresh_break_even(average_fee);
    }

    fn apply_sell(&mut self, order: &Order) -> Result<RealizedProfitEntry, LedgerError> {
        let average_fee = self.config.average_fee;
        let holding = self
            .holdings
            .get_mut(&order.symbol)
            .ok_or_else(|| LedgerError::NotFound(format!("{} is not held", order.symbol)))?;

        let avg_profit_per_unit = order.avg_unit_cost - holding.avg_cost;
        let entry = RealizedProfitEntry {
            symbol: order.symbol.clone(),
            date: order.date,
            quantity: order.quantity,
            avg_cost_at_sale: holding.avg_cost,
            avg_sale_price: order.avg_unit_cost,
            avg_profit_per_unit,
            total_profit: Decimal::from_qty(order.quantity) * avg_profit_per_unit,
        };

        holding.quantity -= order.quantity;
        if holding.quantity == 0 {
            self.holdings.remove(&order.symbol);
        } else {
            holding.total_cost = Decimal::from_qty(holding.quantity) * holding.avg_cost;
            holding.refresh_break_even(average_fee);
        }

        self.realized_profit += entry.total_profit;
        self.realized.push(entry.clone());
        Ok(entry)
    }

    /// Sort the history by (date, kind) and realized profits by date.
    pub fn sort_tables(&mut self) {
        sort_orders(&mut self.history);
        self.realized.sort_by_key(|r| r.date);
    }

    /// The ledger as it stood at the end of `date`.
    ///
    /// Replays every order dated on or before `date` into a new engine with
    /// the same configuration and legend; `self` is not touched.
    pub fn state_at(&self, date: NaiveDate) -> Result<LedgerEngine, LedgerError> {
        let mut replay: Vec<Order> = self
            .history
            .iter()
            .filter(|o| o.date <= date)
            .cloned()
            .collect();
        sort_orders(&mut replay);

        let mut result = LedgerEngine::new(self.config);
        result.legend = self.legend.clone();
        for order in &replay {
            result.record_order_unsorted(&order.to_request())?;
        }
        result.sort_tables();
        Ok(result)
    }

    pub fn state_at_str(&self, date: &str) -> Result<LedgerEngine, LedgerError> {
        self.state_at(parse_trade_date(date)?)
    }

    pub fn add_legend(&mut self, symbol: &str, label: impl Into<String>) -> Result<(), LedgerError> {
        let symbol = Symbol::parse(symbol)?;
        self.legend.insert(symbol, label.into());
        Ok(())
    }

    pub fn lookup_legend(&self, symbol: &str) -> Result<&str, LedgerError> {
        let symbol = Symbol::parse(symbol)?;
        self.legend
            .get(&symbol)
            .map(String::as_str)
            .ok_or_else(|| LedgerError::NotFound(format!("no legend for {}", symbol)))
    }

    pub fn legend(&self) -> &BTreeMap<Symbol, String> {
        &self.legend
    }

    /// Recompute every holding's break-even price from the current fee.
    pub fn refresh_break_even_prices(&mut self) {
        let average_fee = self.config.average_fee;
        for holding in self.holdings.values_mut() {
            holding.refresh_break_even(average_fee);
        }
    }

    pub fn set_average_fee(&mut self, average_fee: Decimal) -> Result<(), LedgerError> {
        if average_fee.is_negative() {
            return Err(LedgerError::Validation(format!(
                "average fee must not be negative, got {}",
                average_fee
            )));
        }
        check_amount("average fee", average_fee)?;
        self.config.average_fee = average_fee;
        self.refresh_break_even_prices();
        Ok(())
    }

    pub fn average_fee(&self) -> Decimal {
        self.config.average_fee
    }

    pub fn config(&self) -> LedgerConfig {
        self.config
    }

    pub fn history(&self) -> &[Order] {
        &self.history
    }

    pub fn holdings(&self) -> impl Iterator<Item = &HoldingsEntry> {
        self.holdings.values()
    }

    pub fn holding(&self, symbol: &str) -> Option<&HoldingsEntry> {
        let symbol = Symbol::parse(symbol).ok()?;
        self.holdings.get(&symbol)
    }

    pub fn realized(&self) -> &[RealizedProfitEntry] {
        &self.realized
    }

    /// Sum of every realized profit so far.
    pub fn realized_profit(&self) -> Decimal {
        self.realized_profit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn day(m: u32, dd: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, m, dd).unwrap()
    }

    fn engine() -> LedgerEngine {
        LedgerEngine::new(LedgerConfig::new(d("2")))
    }

    #[test]
    fn test_first_buy_creates_holding_with_break_even() {
        let mut ledger = engine();
        ledger
            .record_order(&OrderRequest::buy("abc", day(1, 4), 10, d("10"), d("1")))
            .unwrap();

        let h = ledger.holding("ABC").unwrap();
        assert_eq!(h.quantity, 10);
        assert_eq!(h.avg_cost, d("10.1"));
        assert_eq!(h.total_cost, d("101"));
        // (101 + 2) / 10
        assert_eq!(h.break_even_price, d("10.3"));
    }

    #[test]
    fn test_failed_sell_leaves_state_untouched() {
        let mut ledger = engine();
        ledger
            .record_order(&OrderRequest::buy("ABC", day(1, 4), 10, d("10"), d("1")))
            .unwrap();
        let before = ledger.clone();

        let err = ledger
            .record_order(&OrderRequest::sell("ABC", day(1, 5), 11, d("10"), d("1")))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientHoldings {
                symbol: Symbol::parse("ABC").unwrap(),
                requested: 11,
                held: 10,
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_set_average_fee_refreshes_break_even() {
        let mut ledger = engine();
        ledger
            .record_order(&OrderRequest::buy("ABC", day(1, 4), 10, d("10"), d("1")))
            .unwrap();

        ledger.set_average_fee(d("9")).unwrap();

        assert_eq!(ledger.holding("ABC").unwrap().break_even_price, d("11"));
        assert!(ledger.set_average_fee(d("-1")).is_err());
        assert!(ledger.set_average_fee(d("1000000001")).is_err());
    }

    #[test]
    fn test_unsorted_recording_then_sort() {
        let mut ledger = engine();
        ledger
            .record_order_unsorted(&OrderRequest::buy("B", day(3, 1), 1, d("5"), d("1")))
            .unwrap();
        ledger
            .record_order_unsorted(&OrderRequest::buy("A", day(1, 1), 1, d("5"), d("1")))
            .unwrap();
        assert_eq!(ledger.history()[0].symbol.as_str(), "B");

        ledger.sort_tables();
        assert_eq!(ledger.history()[0].symbol.as_str(), "A");
    }

    #[test]
    fn test_legend_is_case_insensitive() {
        let mut ledger = engine();
        ledger.add_legend("itsa4", "Itausa").unwrap();
        assert_eq!(ledger.lookup_legend("ITSA4").unwrap(), "Itausa");
        assert!(matches!(
            ledger.lookup_legend("PETR4"),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn test_state_at_str_rejects_bad_date() {
        let ledger = engine();
        assert!(matches!(
            ledger.state_at_str("not a date"),
            Err(LedgerError::Validation(_))
        ));
    }
}
