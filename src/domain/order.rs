//! Orders: the immutable records of the trade history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_trade_date, Decimal, OrderKind, Symbol};
use crate::error::LedgerError;

/// Largest quantity a single order may carry.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Largest price per unit or fee a single order may carry. Together with
/// `MAX_QUANTITY` this keeps every running total far inside `Decimal` range.
pub const MAX_AMOUNT: i64 = 1_000_000_000;

/// A buy or sell request, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub kind: OrderKind,
    pub symbol: String,
    pub date: NaiveDate,
    pub quantity: i64,
    pub price_per_unit: Decimal,
    pub fees: Decimal,
}

impl OrderRequest {
    pub fn new(
        kind: OrderKind,
        symbol: impl Into<String>,
        date: NaiveDate,
        quantity: i64,
        price_per_unit: Decimal,
        fees: Decimal,
    ) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            date,
            quantity,
            price_per_unit,
            fees,
        }
    }

    pub fn buy(
        symbol: impl Into<String>,
        date: NaiveDate,
        quantity: i64,
        price_per_unit: Decimal,
        fees: Decimal,
    ) -> Self {
        Self::new(OrderKind::Buy, symbol, date, quantity, price_per_unit, fees)
    }

    pub fn sell(
        symbol: impl Into<String>,
        date: NaiveDate,
        quantity: i64,
        price_per_unit: Decimal,
        fees: Decimal,
    ) -> Self {
        Self::new(OrderKind::Sell, symbol, date, quantity, price_per_unit, fees)
    }

    /// Build a request from raw text fields, as typed at the shell or read
    /// from a file.
    pub fn parse(
        kind: &str,
        symbol: &str,
        date: &str,
        quantity: &str,
        price_per_unit: &str,
        fees: &str,
    ) -> Result<Self, LedgerError> {
        let kind = kind.parse::<OrderKind>()?;
        let date = parse_trade_date(date)?;
        let quantity = quantity.trim().parse::<i64>().map_err(|_| {
            LedgerError::Validation(format!("quantity '{}' is not an integer", quantity))
        })?;
        let price_per_unit = parse_decimal("price", price_per_unit)?;
        let fees = parse_decimal("fees", fees)?;
        Ok(Self::new(kind, symbol, date, quantity, price_per_unit, fees))
    }

    /// Check every field-level precondition and normalize the symbol.
    ///
    /// Holdings-dependent checks (sell quantity) are the engine's job.
    pub fn validate(&self) -> Result<Symbol, LedgerError> {
        let symbol = Symbol::parse(&self.symbol)?;
        if self.quantity <= 0 {
            return Err(LedgerError::Validation(format!(
                "quantity must be > 0, got {}",
                self.quantity
            )));
        }
        if self.quantity > MAX_QUANTITY {
            return Err(LedgerError::Validation(format!(
                "quantity must be <= {}, got {}",
                MAX_QUANTITY, self.quantity
            )));
        }
        if !self.price_per_unit.is_positive() {
            return Err(LedgerError::Validation(format!(
                "price per unit must be > 0, got {}",
                self.price_per_unit
            )));
        }
        if !self.fees.is_positive() {
            return Err(LedgerError::Validation(format!(
                "fees must be > 0, got {}",
                self.fees
            )));
        }
        check_amount("price per unit", self.price_per_unit)?;
        check_amount("fees", self.fees)?;
        Ok(symbol)
    }
}

pub(crate) fn check_amount(field: &str, value: Decimal) -> Result<(), LedgerError> {
    if value > Decimal::from_qty(MAX_AMOUNT) {
        return Err(LedgerError::Validation(format!(
            "{} must be <= {}, got {}",
            field, MAX_AMOUNT, value
        )));
    }
    Ok(())
}

pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, LedgerError> {
    Decimal::from_str_canonical(raw)
        .map_err(|e| LedgerError::Validation(format!("invalid {} '{}': {}", field, raw, e)))
}

/// A recorded order with its derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub kind: OrderKind,
    pub symbol: Symbol,
    pub date: NaiveDate,
    pub quantity: i64,
    pub price_per_unit: Decimal,
    pub fees: Decimal,
    /// quantity × price, plus fees for a buy, minus fees for a sell.
    pub gross_total: Decimal,
    /// gross_total / quantity.
    pub avg_unit_cost: Decimal,
}

impl Order {
    /// Derive the totals for an already validated request.
    pub(crate) fn from_validated(request: &OrderRequest, symbol: Symbol) -> Self {
        let qty = Decimal::from_qty(request.quantity);
        let signed_fees = Decimal::from_qty(request.kind.fee_sign()) * request.fees;
        let gross_total = qty * request.price_per_unit + signed_fees;
        Order {
            kind: request.kind,
            symbol,
            date: request.date,
            quantity: request.quantity,
            price_per_unit: request.price_per_unit,
            fees: request.fees,
            gross_total,
            avg_unit_cost: gross_total / qty,
        }
    }

    /// The request that reproduces this order when replayed.
    pub fn to_request(&self) -> OrderRequest {
        OrderRequest::new(
            self.kind,
            self.symbol.as_str(),
            self.date,
            self.quantity,
            self.price_per_unit,
            self.fees,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn day(y: i32, m: u32, dd: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, dd).unwrap()
    }

    #[test]
    fn test_buy_totals_include_fees() {
        let req = OrderRequest::buy("abc", day(2021, 1, 4), 10, d("10"), d("1"));
        let symbol = req.validate().unwrap();
        let order = Order::from_validated(&req, symbol);
        assert_eq!(order.symbol.as_str(), "ABC");
        assert_eq!(order.gross_total, d("101"));
        assert_eq!(order.avg_unit_cost, d("10.1"));
    }

    #[test]
    fn test_sell_totals_subtract_fees() {
        let req = OrderRequest::sell("ABC", day(2021, 2, 1), 5, d("18"), d("1"));
        let order = Order::from_validated(&req, req.validate().unwrap());
        assert_eq!(order.gross_total, d("89"));
        assert_eq!(order.avg_unit_cost, d("17.8"));
    }

    #[test]
    fn test_validate_rejects_non_positive_fields() {
        let base = OrderRequest::buy("ABC", day(2021, 1, 4), 10, d("10"), d("1"));

        let mut req = base.clone();
        req.quantity = 0;
        assert!(matches!(req.validate(), Err(LedgerError::Validation(_))));

        let mut req = base.clone();
        req.price_per_unit = d("-1");
        assert!(matches!(req.validate(), Err(LedgerError::Validation(_))));

        let mut req = base;
        req.fees = Decimal::zero();
        assert!(matches!(req.validate(), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_fields() {
        let base = OrderRequest::buy("ABC", day(2021, 1, 4), 10, d("10"), d("1"));

        let mut req = base.clone();
        req.quantity = i64::MAX;
        assert!(matches!(req.validate(), Err(LedgerError::Validation(_))));

        let mut req = base.clone();
        req.price_per_unit = d("100000000000");
        assert!(matches!(req.validate(), Err(LedgerError::Validation(_))));

        let mut req = base.clone();
        req.fees = d("1000000000.01");
        assert!(matches!(req.validate(), Err(LedgerError::Validation(_))));

        let mut req = base;
        req.quantity = MAX_QUANTITY;
        req.price_per_unit = Decimal::from_qty(MAX_AMOUNT);
        req.fees = Decimal::from_qty(MAX_AMOUNT);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_parse_from_text_fields() {
        let req = OrderRequest::parse("sell", "itsa4", "2021-05-10", "100", "9.87", "4.90").unwrap();
        assert_eq!(req.kind, OrderKind::Sell);
        assert_eq!(req.date, day(2021, 5, 10));
        assert_eq!(req.quantity, 100);
        assert_eq!(req.price_per_unit, d("9.87"));
    }

    #[test]
    fn test_parse_rejects_bad_date_and_numbers() {
        assert!(OrderRequest::parse("buy", "X", "2021-13-01", "1", "1", "1").is_err());
        assert!(OrderRequest::parse("buy", "X", "2021-01-01", "1.5", "1", "1").is_err());
        assert!(OrderRequest::parse("buy", "X", "2021-01-01", "1", "abc", "1").is_err());
        assert!(OrderRequest::parse("hold", "X", "2021-01-01", "1", "1", "1").is_err());
    }

    #[test]
    fn test_to_request_roundtrips_inputs() {
        let req = OrderRequest::buy("ABC", day(2021, 1, 4), 10, d("10"), d("1"));
        let order = Order::from_validated(&req, req.validate().unwrap());
        assert_eq!(order.to_request(), req);
    }
}
