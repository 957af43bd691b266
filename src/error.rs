use thiserror::Error;

use crate::domain::Symbol;

/// Failures of the ledger core. Any of these leaves the engine untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Insufficient holdings: requested {requested} of {symbol}, but only {held} held")]
    InsufficientHoldings {
        symbol: Symbol,
        requested: i64,
        held: i64,
    },
    #[error("Not found: {0}")]
    NotFound(String),
}
