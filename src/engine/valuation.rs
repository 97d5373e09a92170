//! Decaying-growth discounted cash flow valuation.

use anyhow::{Result, bail};

/// Growth decelerates by this factor every projection year, which pushes
/// far-year projections well below a flat-rate model.
const GROWTH_DECAY: f64 = 0.90;

/// Initial growth is capped regardless of how fast revenue compounded.
const MAX_INITIAL_GROWTH: f64 = 0.25;

/// Policy constants for the DCF model. Defaults carry a conservative bias:
/// 8% starting growth, 1.5% terminal growth, 18% discount over 10 years.
#[derive(Debug, Clone, Copy)]
pub struct DcfPolicy {
    pub default_growth: f64,
    pub terminal_growth: f64,
    pub discount_rate: f64,
    pub projection_years: u32,
}

impl Default for DcfPolicy {
    fn default() -> Self {
        DcfPolicy {
            default_growth: 0.08,
            terminal_growth: 0.015,
            discount_rate: 0.18,
            projection_years: 10,
        }
    }
}

impl DcfPolicy {
    /// Startup validation; violating these is a configuration error, not a
    /// runtime degradation. Excludes the terminal-value singularity.
    pub fn validate(&self) -> Result<()> {
        if self.projection_years == 0 {
            bail!("DCF projection horizon must be at least one year");
        }
        if self.discount_rate <= self.terminal_growth {
            bail!(
                "DCF discount rate ({}) must exceed terminal growth ({})",
                self.discount_rate,
                self.terminal_growth
            );
        }
        Ok(())
    }

    /// Growth input for a stock: positive revenue CAGR (percent) converted
    /// to a rate, else the conservative default.
    pub fn growth_input(&self, revenue_cagr_pct: f64) -> f64 {
        if revenue_cagr_pct > 0.0 {
            revenue_cagr_pct / 100.0
        } else {
            0.05
        }
    }

    pub fn intrinsic_value(&self, fcf: f64, initial_growth: f64) -> f64 {
        calculate_dcf(
            fcf,
            initial_growth,
            self.terminal_growth,
            self.discount_rate,
            self.projection_years,
        )
    }
}

/// Intrinsic enterprise value of a free cash flow stream.
///
/// FCF-negative businesses get no valuation (returns 0). Growth starts at
/// `initial_growth` (clamped to 25%) and decays 10% per year; each projected
/// cash flow is discounted one full period, and the terminal value by the
/// whole horizon.
pub fn calculate_dcf(
    fcf: f64,
    initial_growth: f64,
    terminal_growth: f64,
    discount_rate: f64,
    years: u32,
) -> f64 {
    if fcf <= 0.0 || years == 0 {
        return 0.0;
    }

    let mut growth = initial_growth.min(MAX_INITIAL_GROWTH);
    let mut projected = fcf;
    let mut discounted_sum = 0.0;

    for t in 1..=years {
        projected *= 1.0 + growth;
        discounted_sum += projected / (1.0 + discount_rate).powi(t as i32);
        growth *= GROWTH_DECAY;
    }

    let terminal_value = projected * (1.0 + terminal_growth) / (discount_rate - terminal_growth);
    let discounted_terminal = terminal_value / (1.0 + discount_rate).powi(years as i32);

    discounted_sum + discounted_terminal
}

/// Per-share view of an intrinsic enterprise value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationResult {
    pub intrinsic_enterprise_value: f64,
    pub shares_outstanding: f64,
    pub intrinsic_price_per_share: f64,
}

impl ValuationResult {
    pub fn from_intrinsic(intrinsic_value: f64, market_cap: f64, current_price: f64) -> Self {
        let shares = if current_price > 0.0 {
            (market_cap / current_price * 100.0).round() / 100.0
        } else {
            0.0
        };
        let per_share = if shares > 0.0 {
            (intrinsic_value / shares * 100.0).round() / 100.0
        } else {
            0.0
        };
        ValuationResult {
            intrinsic_enterprise_value: intrinsic_value,
            shares_outstanding: shares,
            intrinsic_price_per_share: per_share,
        }
    }
}
