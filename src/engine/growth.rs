//! Multi-year CAGR extraction over scraped income-statement rows.

use crate::core::record::FinancialTable;

/// Fixed bonus awarded when a loss-making start turns into a profit; a
/// geometric rate is undefined for a non-positive base.
const TURNAROUND_BONUS: f64 = 10.0;

fn aliases(label: &str) -> Vec<&str> {
    // Banks and NBFCs report top line as interest/income rather than sales
    if label.contains("Sales") {
        vec![label, "Revenue", "Income", "Interest"]
    } else {
        vec![label]
    }
}

/// Compound annual growth rate in percent over the last `years` periods of
/// the first usable matching row. Tries alias labels for sector-specific
/// income-statement naming. Returns 0.0 when no row yields a usable series.
pub fn compute_cagr(table: &FinancialTable, label: &str, years: usize) -> f64 {
    if years == 0 {
        return 0.0;
    }

    for alias in aliases(label) {
        let target = alias.to_lowercase();
        for row in table {
            if !row.metric.to_lowercase().contains(&target) {
                continue;
            }
            let values: Vec<f64> = row
                .values
                .iter()
                .filter(|v| !v.trim().is_empty())
                .map(|v| super::normalize::parse_numeric(v))
                .collect();
            if values.len() < years {
                continue;
            }

            let start = values[values.len() - years];
            let end = values[values.len() - 1];

            if start > 0.0 && end > 0.0 {
                let cagr = ((end / start).powf(1.0 / years as f64) - 1.0) * 100.0;
                // Fractional exponents on edge-case bases must not leak
                // NaN/inf into scores
                if cagr.is_finite() {
                    return cagr;
                }
            } else if end > start {
                return TURNAROUND_BONUS;
            }
        }
    }

    0.0
}
