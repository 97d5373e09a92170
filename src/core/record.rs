//! Domain types flowing through the screening pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of a scraped financial table. Values are ordered oldest to
/// newest and kept as text; parsing happens in the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRow {
    pub metric: String,
    #[serde(default)]
    pub values: Vec<String>,
}

pub type FinancialTable = Vec<MetricRow>;

/// Raw per-company payload as delivered by the market-data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFinancialRecord {
    pub symbol: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub ratios: HashMap<String, String>,
    #[serde(default)]
    pub pnl: FinancialTable,
    #[serde(default)]
    pub balance_sheet: FinancialTable,
    #[serde(default)]
    pub cash_flow: FinancialTable,
    #[serde(default)]
    pub shareholding: FinancialTable,
}

/// Typed numeric facts derived from a raw record.
///
/// `debt_to_equity`, `fii_pct` and `dii_pct` distinguish "parsed as zero"
/// (`Some(0.0)`) from "not found in the source" (`None`). Scoring takes the
/// unknown case at face value as 0.0 via the `*_or_zero` helpers, while the
/// persisted record keeps the `None` so a repair pass can re-fetch suspect
/// rows instead of guessing.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFinancials {
    pub symbol: String,
    pub company_name: String,
    pub about: String,
    pub sector: String,
    pub market_cap: f64,
    pub current_price: f64,
    pub roce: f64,
    pub pe: f64,
    pub pb: f64,
    pub debt_to_equity: Option<f64>,
    pub free_cash_flow: f64,
    pub revenue_cagr: f64,
    pub profit_cagr: f64,
    pub fii_pct: Option<f64>,
    pub dii_pct: Option<f64>,
}

impl NormalizedFinancials {
    pub fn debt_to_equity_or_zero(&self) -> f64 {
        self.debt_to_equity.unwrap_or(0.0)
    }

    /// Combined FII + DII holding, unknowns counted as zero.
    pub fn institutional_pct(&self) -> f64 {
        self.fii_pct.unwrap_or(0.0) + self.dii_pct.unwrap_or(0.0)
    }
}

/// Qualitative ratings supplied by the AI-analysis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitativeScores {
    pub customer_satisfaction: u8,
    pub moat: u8,
    pub tailwind: u8,
    pub management_quality: u8,
    #[serde(default)]
    pub notes: String,
}

/// Sub-scores on the 0-100 scale feeding the composite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub dcf_score: f64,
    pub growth_score: f64,
    pub roce_score: f64,
    pub fii_dii_de_score: f64,
    pub moat_score: f64,
    pub tailwind_score: f64,
    pub management_score: f64,
}

/// Fully scored per-symbol record as persisted in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub company_name: String,
    pub about: String,
    pub sector: String,
    pub broad_sector: String,
    pub market_cap: f64,
    pub current_price: f64,
    pub intrinsic_value: f64,
    pub shares_outstanding: f64,
    pub intrinsic_price_per_share: f64,
    pub roce: f64,
    pub pe: f64,
    pub pb: f64,
    pub debt_to_equity: Option<f64>,
    pub revenue_cagr: f64,
    pub free_cash_flow: f64,
    pub fii_pct: Option<f64>,
    pub dii_pct: Option<f64>,
    pub scores: SubScores,
    pub final_score: f64,
    pub portfolio_weight: f64,
    #[serde(default)]
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}
