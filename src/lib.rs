pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod report;
pub mod shell;
pub mod store;

pub use config::Config;
pub use domain::{Decimal, Order, OrderKind, OrderRequest, Symbol, MAX_AMOUNT, MAX_QUANTITY};
pub use engine::{
    HoldingsEntry, LedgerConfig, LedgerEngine, MonthlyActivity, OrderOutcome, ProfitEstimate,
    RealizedProfitEntry, Summary,
};
pub use error::LedgerError;
pub use store::{LedgerStore, StoreError};
