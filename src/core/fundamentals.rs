//! Market-data collaborator abstraction

use crate::core::record::RawFinancialRecord;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<RawFinancialRecord>;
}
