//! Domain types for the trade ledger.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: Symbol, OrderKind, trade-date parsing
//! - Order requests and recorded orders with their derived totals
//! - Stable (date, kind) ordering for the trade history

pub mod decimal;
pub mod order;
pub mod ordering;
pub mod primitives;

pub use decimal::Decimal;
pub(crate) use order::check_amount;
pub use order::{Order, OrderRequest, MAX_AMOUNT, MAX_QUANTITY};
pub use ordering::{sort_orders, OrderOrderingKey};
pub use primitives::{parse_trade_date, OrderKind, Symbol};
