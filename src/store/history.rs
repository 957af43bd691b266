//! Trade history rows.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{LedgerStore, StoreError};
use crate::domain::{Order, OrderRequest};

/// One line of `history.csv`. Numbers stay text so that decimals round-trip
/// exactly.
#[derive(Debug, Serialize, Deserialize)]
struct OrderRow {
    kind: String,
    symbol: String,
    date: String,
    quantity: String,
    price_per_unit: String,
    fees: String,
    gross_total: String,
    avg_unit_cost: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        OrderRow {
            kind: order.kind.to_string(),
            symbol: order.symbol.to_string(),
            date: order.date.format("%Y-%m-%d").to_string(),
            quantity: order.quantity.to_string(),
            price_per_unit: order.price_per_unit.to_canonical_string(),
            fees: order.fees.to_canonical_string(),
            gross_total: order.gross_total.to_canonical_string(),
            avg_unit_cost: order.avg_unit_cost.to_canonical_string(),
        }
    }
}

impl LedgerStore {
    /// Read the stored history. Returns `None` when no file exists yet.
    ///
    /// Only the input columns are trusted; `gross_total` and `avg_unit_cost`
    /// are derived again from them.
    pub fn load_history(&self) -> Result<Option<Vec<Order>>, StoreError> {
        let path = self.history_path();
        let Some(bytes) = self.read_existing(&path)? else {
            return Ok(None);
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());

        let mut orders = Vec::new();
        for (idx, record) in reader.deserialize::<OrderRow>().enumerate() {
            let row = record.map_err(|e| StoreError::csv(&path, e))?;
            let row_error = |source| StoreError::Row {
                path: path.clone(),
                row: idx + 1,
                source,
            };
            let request = OrderRequest::parse(
                &row.kind,
                &row.symbol,
                &row.date,
                &row.quantity,
                &row.price_per_unit,
                &row.fees,
            )
            .map_err(row_error)?;
            let symbol = request.validate().map_err(row_error)?;
            orders.push(Order::from_validated(&request, symbol));
        }
        Ok(Some(orders))
    }

    /// Overwrite the stored history with `orders`.
    pub fn save_history(&self, orders: &[Order]) -> Result<(), StoreError> {
        let path = self.history_path();
        let mut writer = csv::Writer::from_writer(Vec::new());
        for order in orders {
            writer
                .serialize(OrderRow::from(order))
                .map_err(|e| StoreError::csv(&path, e))?;
        }
        // An empty table still gets its header line.
        if orders.is_empty() {
            writer
                .write_record([
                    "kind",
                    "symbol",
                    "date",
                    "quantity",
                    "price_per_unit",
                    "fees",
                    "gross_total",
                    "avg_unit_cost",
                ])
                .map_err(|e| StoreError::csv(&path, e))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::csv(&path, e))?;

        self.replace_file(&path, &bytes)?;
        info!(orders = orders.len(), path = %path.display(), "Saved trade history");
        Ok(())
    }
}
