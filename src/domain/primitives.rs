//! Domain primitives: Symbol, OrderKind, trade dates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Ticker symbol, always stored upper-cased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Normalize and validate a symbol.
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(LedgerError::Validation("symbol must not be empty".to_string()));
        }
        Ok(Symbol(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Order kind. Buy sorts before Sell on the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Buy,
    Sell,
}

impl OrderKind {
    /// Sign applied to fees in the gross total (+1 for Buy, -1 for Sell).
    pub fn fee_sign(&self) -> i64 {
        match self {
            OrderKind::Buy => 1,
            OrderKind::Sell => -1,
        }
    }
}

impl std::str::FromStr for OrderKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "b" | "compra" => Ok(OrderKind::Buy),
            "sell" | "s" | "venda" => Ok(OrderKind::Sell),
            other => Err(LedgerError::Validation(format!(
                "order kind must be buy or sell, got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderKind::Buy => f.pad("buy"),
            OrderKind::Sell => f.pad("sell"),
        }
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a calendar date, accepting ISO dates and a few common variants.
///
/// A time-of-day component is accepted and dropped; the ledger works at day
/// granularity.
pub fn parse_trade_date(raw: &str) -> Result<NaiveDate, LedgerError> {
    let raw = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt.date());
        }
    }
    Err(LedgerError::Validation(format!(
        "'{}' is not a valid calendar date",
        raw
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_is_normalized() {
        let sym = Symbol::parse("  petr4 ").unwrap();
        assert_eq!(sym.as_str(), "PETR4");
        assert_eq!(sym.to_string(), "PETR4");
    }

    #[test]
    fn test_empty_symbol_rejected() {
        assert!(matches!(Symbol::parse("   "), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_order_kind_parsing() {
        assert_eq!("BUY".parse::<OrderKind>().unwrap(), OrderKind::Buy);
        assert_eq!("venda".parse::<OrderKind>().unwrap(), OrderKind::Sell);
        assert!(matches!(
            "hold".parse::<OrderKind>(),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_buy_sorts_before_sell() {
        assert!(OrderKind::Buy < OrderKind::Sell);
    }

    #[test]
    fn test_order_kind_serialization() {
        assert_eq!(serde_json::to_string(&OrderKind::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&OrderKind::Sell).unwrap(), "\"sell\"");
    }

    #[test]
    fn test_parse_trade_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        assert_eq!(parse_trade_date("2021-03-15").unwrap(), expected);
        assert_eq!(parse_trade_date("2021/03/15").unwrap(), expected);
        assert_eq!(parse_trade_date("15/03/2021").unwrap(), expected);
        assert_eq!(parse_trade_date("2021-03-15T10:30:00").unwrap(), expected);
    }

    #[test]
    fn test_parse_trade_date_rejects_garbage() {
        assert!(matches!(
            parse_trade_date("2021-02-30"),
            Err(LedgerError::Validation(_))
        ));
        assert!(parse_trade_date("yesterday").is_err());
    }
}
