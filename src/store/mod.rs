//! Symbol-keyed persistence for scored stock records.
//!
//! Backed by a fjall keyspace; upserts are idempotent across incremental
//! runs, so re-analyzing a symbol simply replaces its record.

use crate::core::record::StockRecord;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::fs;
use std::path::Path;
use tracing::debug;

const STOCKS_PARTITION: &str = "stocks";

pub struct StockStore {
    keyspace: Keyspace,
    stocks: PartitionHandle,
}

impl StockStore {
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let stocks = keyspace.open_partition(STOCKS_PARTITION, PartitionCreateOptions::default())?;

        Ok(Self { keyspace, stocks })
    }

    pub fn get(&self, symbol: &str) -> Result<Option<StockRecord>> {
        match self.stocks.get(symbol)? {
            Some(bytes) => {
                let record: StockRecord = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Corrupt record for symbol: {symbol}"))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    pub fn contains(&self, symbol: &str) -> Result<bool> {
        Ok(self.stocks.contains_key(symbol)?)
    }

    /// Inserts or replaces the record keyed by its symbol.
    pub fn upsert(&self, record: &StockRecord) -> Result<()> {
        debug!("Upserting record for {}", record.symbol);
        self.stocks
            .insert(&record.symbol, serde_json::to_vec(record)?)?;
        Ok(())
    }

    /// All stored records, unordered.
    pub fn all(&self) -> Result<Vec<StockRecord>> {
        let mut records = Vec::new();
        for item in self.stocks.iter() {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.stocks.len()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Flushes buffered writes to disk.
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    /// Writes a JSON snapshot of all records, best score first, for
    /// downstream consumers (dashboards, spreadsheets).
    pub fn export_snapshot(&self, path: &Path) -> Result<usize> {
        let mut records = self.all()?;
        records.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        let json = serde_json::to_string_pretty(&records)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
        Ok(records.len())
    }
}
