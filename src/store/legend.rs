//! Symbol legend rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{LedgerStore, StoreError};
use crate::domain::Symbol;

#[derive(Debug, Serialize, Deserialize)]
struct LegendRow {
    symbol: String,
    label: String,
}

impl LedgerStore {
    /// Read the stored legend. Returns `None` when no file exists yet.
    pub fn load_legend(&self) -> Result<Option<BTreeMap<Symbol, String>>, StoreError> {
        let path = self.legend_path();
        let Some(bytes) = self.read_existing(&path)? else {
            return Ok(None);
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());

        let mut legend = BTreeMap::new();
        for (idx, record) in reader.deserialize::<LegendRow>().enumerate() {
            let row = record.map_err(|e| StoreError::csv(&path, e))?;
            let symbol = Symbol::parse(&row.symbol).map_err(|source| StoreError::Row {
                path: path.clone(),
                row: idx + 1,
                source,
            })?;
            legend.insert(symbol, row.label.trim().to_string());
        }
        Ok(Some(legend))
    }

    pub fn save_legend(&self, legend: &BTreeMap<Symbol, String>) -> Result<(), StoreError> {
        let path = self.legend_path();
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["symbol", "label"])
            .map_err(|e| StoreError::csv(&path, e))?;
        for (symbol, label) in legend {
            writer
                .write_record([symbol.as_str(), label.as_str()])
                .map_err(|e| StoreError::csv(&path, e))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::csv(&path, e))?;

        self.replace_file(&path, &bytes)?;
        info!(entries = legend.len(), path = %path.display(), "Saved symbol legend");
        Ok(())
    }
}
