//! Line-oriented command shell over a `LedgerEngine`.
//!
//! Each input line parses into a [`Command`]; [`Shell::execute`] runs it and
//! returns the text to show. Errors never end the session.

use thiserror::Error;
use tracing::info;

use crate::domain::{parse_trade_date, Decimal, OrderRequest};
use crate::engine::LedgerEngine;
use crate::error::LedgerError;
use crate::report;
use crate::store::{LedgerStore, StoreError};

pub const GREETING: &str = "\
-----------------------------------------
tradebook: stock trade ledger
-----------------------------------------

  buy|sell SYMBOL DATE QTY PRICE FEES   record an order
  holdings | history | profits          show the ledger tables
  summary | monthly                     show reports
  help                                  list every command
";

pub const HELP: &str = "\
Commands:
  buy SYMBOL DATE QTY PRICE FEES     record a purchase
  sell SYMBOL DATE QTY PRICE FEES    record a sale
  history | buys | sells             trade history (all, purchases, sales)
  holdings                           current holdings
  profits                            realized profit per sale
  summary                            overall summary
  monthly                            spent/received/profit per month
  estimate SYMBOL PRICE [QTY] [FEES] projected profit of a sale
  at DATE                            summary of the ledger as of DATE
  legend SYMBOL [LABEL...]           show or set the label of SYMBOL
  fee [VALUE]                        show or set the average sell fee
  json                               summary as JSON
  save                               write history and legend to disk
  quit                               leave
";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Record(OrderRequest),
    History,
    Buys,
    Sells,
    Holdings,
    Profits,
    Summary,
    Monthly,
    Estimate {
        symbol: String,
        price_per_unit: Decimal,
        quantity: Option<i64>,
        fees: Option<Decimal>,
    },
    At(chrono::NaiveDate),
    ShowLegend(String),
    SetLegend(String, String),
    ShowFee,
    SetFee(Decimal),
    Json,
    Save,
    Quit,
}

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

fn usage(text: &str) -> ShellError {
    ShellError::Usage(format!("usage: {}", text))
}

fn parse_decimal_arg(name: &str, raw: &str) -> Result<Decimal, ShellError> {
    Decimal::from_str_canonical(raw)
        .map_err(|_| ShellError::Usage(format!("{} must be a number, got '{}'", name, raw)))
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, ShellError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (head.to_ascii_lowercase().as_str(), args) {
            ("help" | "?", []) => Command::Help,
            (kind @ ("buy" | "sell"), [symbol, date, qty, price, fees]) => {
                Command::Record(OrderRequest::parse(kind, symbol, date, qty, price, fees)?)
            }
            ("buy" | "sell", _) => return Err(usage("buy|sell SYMBOL DATE QTY PRICE FEES")),
            ("history", []) => Command::History,
            ("buys", []) => Command::Buys,
            ("sells", []) => Command::Sells,
            ("holdings", []) => Command::Holdings,
            ("profits", []) => Command::Profits,
            ("summary", []) => Command::Summary,
            ("monthly", []) => Command::Monthly,
            ("estimate", [symbol, price, rest @ ..]) if rest.len() <= 2 => {
                let quantity = rest
                    .first()
                    .map(|q| {
                        q.parse::<i64>().map_err(|_| {
                            ShellError::Usage(format!("QTY must be an integer, got '{}'", q))
                        })
                    })
                    .transpose()?;
                let fees = rest
                    .get(1)
                    .map(|f| parse_decimal_arg("FEES", f))
                    .transpose()?;
                Command::Estimate {
                    symbol: symbol.to_string(),
                    price_per_unit: parse_decimal_arg("PRICE", price)?,
                    quantity,
                    fees,
                }
            }
            ("estimate", _) => return Err(usage("estimate SYMBOL PRICE [QTY] [FEES]")),
            ("at", [date]) => Command::At(parse_trade_date(date)?),
            ("at", _) => return Err(usage("at DATE")),
            ("legend", [symbol]) => Command::ShowLegend(symbol.to_string()),
            ("legend", [symbol, label @ ..]) => {
                Command::SetLegend(symbol.to_string(), label.join(" "))
            }
            ("legend", _) => return Err(usage("legend SYMBOL [LABEL...]")),
            ("fee", []) => Command::ShowFee,
            ("fee", [value]) => Command::SetFee(parse_decimal_arg("VALUE", value)?),
            ("json", []) => Command::Json,
            ("save", []) => Command::Save,
            ("quit" | "exit" | "q", []) => Command::Quit,
            (other, _) => {
                return Err(ShellError::Usage(format!(
                    "unknown command '{}', type 'help'",
                    other
                )))
            }
        };
        Ok(Some(command))
    }
}

/// An engine plus the store it is saved to.
pub struct Shell {
    engine: LedgerEngine,
    store: Option<LedgerStore>,
}

impl Shell {
    pub fn new(engine: LedgerEngine, store: Option<LedgerStore>) -> Self {
        Self { engine, store }
    }

    pub fn engine(&self) -> &LedgerEngine {
        &self.engine
    }

    /// Parse and run one line.
    pub fn run_line(&mut self, line: &str) -> Result<Option<Reply>, ShellError> {
        match Command::parse(line)? {
            Some(command) => self.execute(command).map(Some),
            None => Ok(None),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply, ShellError> {
        let engine = &mut self.engine;
        let text = match command {
            Command::Help => HELP.to_string(),
            Command::Record(request) => {
                let outcome = engine.record_order(&request)?;
                let mut text = format!(
                    "recorded {} {} {} on {} (total {:.2})\n",
                    outcome.order.kind,
                    outcome.order.quantity,
                    outcome.order.symbol,
                    outcome.order.date,
                    outcome.order.gross_total
                );
                if let Some(realized) = outcome.realized {
                    text.push_str(&format!("realized profit {:.2}\n", realized.total_profit));
                }
                text
            }
            Command::History => report::format_history(engine.history()),
            Command::Buys => report::format_history(engine.purchase_orders()),
            Command::Sells => report::format_history(engine.sale_orders()),
            Command::Holdings => {
                let holdings: Vec<_> = engine.holdings().cloned().collect();
                report::format_holdings(&holdings)
            }
            Command::Profits => report::format_realized(engine.realized()),
            Command::Summary => report::format_summary(&engine.summary()),
            Command::Monthly => report::format_monthly_activity(&engine.monthly_activity()),
            Command::Estimate {
                symbol,
                price_per_unit,
                quantity,
                fees,
            } => {
                let estimate = engine.estimate_profit(&symbol, price_per_unit, quantity, fees)?;
                report::format_estimate(&estimate)
            }
            Command::At(date) => report::format_summary(&engine.state_at(date)?.summary()),
            Command::ShowLegend(symbol) => format!("{}\n", engine.lookup_legend(&symbol)?),
            Command::SetLegend(symbol, label) => {
                engine.add_legend(&symbol, label)?;
                "legend updated\n".to_string()
            }
            Command::ShowFee => format!("average fee: {}\n", engine.average_fee()),
            Command::SetFee(fee) => {
                engine.set_average_fee(fee)?;
                format!("average fee set to {}\n", fee)
            }
            Command::Json => format!("{}\n", serde_json::to_string_pretty(&engine.summary())?),
            Command::Save => match &self.store {
                Some(store) => {
                    store.save(engine)?;
                    info!(dir = %store.data_dir().display(), "Ledger saved");
                    format!("saved to {}\n", store.data_dir().display())
                }
                None => return Err(ShellError::Usage("no data directory configured".to_string())),
            },
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Output(text))
    }
}
