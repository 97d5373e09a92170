//! Fundamentals provider backed by a screener-export JSON endpoint.
//!
//! The scrape cycle, rate limiting and HTML parsing live behind this
//! endpoint; this client only speaks JSON.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::core::fundamentals::FundamentalsProvider;
use crate::core::record::RawFinancialRecord;
use crate::providers::util::with_retry;

const FETCH_RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 1500;

pub struct ScreenerApiProvider {
    base_url: String,
}

impl ScreenerApiProvider {
    pub fn new(base_url: &str) -> Self {
        ScreenerApiProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl FundamentalsProvider for ScreenerApiProvider {
    #[instrument(
        name = "FundamentalsFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch(&self, symbol: &str) -> Result<RawFinancialRecord> {
        let url = format!("{}/api/company/{}/", self.base_url, symbol);
        debug!("Requesting fundamentals from {}", url);

        let client = reqwest::Client::builder().user_agent("eqsift/0.2").build()?;
        let response = with_retry(|| client.get(&url).send(), FETCH_RETRIES, RETRY_DELAY_MS)
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let record: RawFinancialRecord = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse fundamentals for {}: {}", symbol, e))?;

        if record.symbol.is_empty() {
            return Err(anyhow!("Empty fundamentals payload for symbol: {}", symbol));
        }

        Ok(record)
    }
}
