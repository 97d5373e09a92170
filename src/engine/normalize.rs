//! Converts raw text-valued financial facts into typed numerics.
//!
//! Lookup misses degrade to defaults rather than failing; the only hard
//! boundary is a missing market cap or current price, which drops the
//! record entirely.

use crate::core::record::{FinancialTable, NormalizedFinancials, RawFinancialRecord};
use crate::engine::growth::compute_cagr;
use tracing::debug;

/// Fraction of net profit treated as free cash flow for capex-heavy but
/// profitable businesses.
const NP_TO_FCF_CONVERSION: f64 = 0.40;

/// Parses a scraped numeric string, stripping currency and percent markers
/// and thousands separators. Returns 0.0 on anything unparseable.
pub fn parse_numeric(text: &str) -> f64 {
    let cleaned = text
        .replace("Rs.", "")
        .replace("Cr.", "")
        .replace([',', '%'], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}

fn find_row<'a>(table: &'a FinancialTable, label: &str) -> Option<&'a crate::core::record::MetricRow> {
    let target = label.to_lowercase();
    table
        .iter()
        .find(|row| row.metric.to_lowercase().contains(&target))
}

fn row_values(row: &crate::core::record::MetricRow) -> Vec<f64> {
    row.values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_numeric(v))
        .collect()
}

/// Most recent (rightmost) value of the first row whose metric label
/// contains `label`, case-insensitively. `None` when no row matches or the
/// row has no non-empty values.
pub fn extract_latest(table: &FinancialTable, label: &str) -> Option<f64> {
    let row = find_row(table, label)?;
    row_values(row).last().copied()
}

/// Mean of the last `window` values of the matching row.
pub fn extract_average(table: &FinancialTable, label: &str, window: usize) -> Option<f64> {
    if window == 0 {
        return None;
    }
    let row = find_row(table, label)?;
    let values = row_values(row);
    if values.is_empty() {
        return None;
    }
    let sample = &values[values.len().saturating_sub(window)..];
    Some(sample.iter().sum::<f64>() / sample.len() as f64)
}

/// Derives debt-to-equity from balance sheet lines when the ratio panel
/// omits it. `None` when net worth is not positive.
pub fn derive_debt_to_equity(balance_sheet: &FinancialTable) -> Option<f64> {
    let borrowings = extract_latest(balance_sheet, "Borrowings").unwrap_or(0.0);
    let equity = extract_latest(balance_sheet, "Equity Capital").unwrap_or(0.0);
    let reserves = extract_latest(balance_sheet, "Reserves").unwrap_or(0.0);
    let net_worth = equity + reserves;
    if net_worth > 0.0 {
        Some((borrowings / net_worth * 100.0).round() / 100.0)
    } else {
        None
    }
}

fn ratio(raw: &RawFinancialRecord, label: &str) -> f64 {
    raw.ratios.get(label).map(|v| parse_numeric(v)).unwrap_or(0.0)
}

/// Free cash flow policy: financials use latest net profit as the proxy;
/// everyone else gets 3-period average operating cash flow minus average
/// capex, falling back to a conservative net-profit conversion when the
/// business is capex-heavy but profitable.
fn derive_free_cash_flow(raw: &RawFinancialRecord, latest_net_profit: f64) -> f64 {
    let sector = raw.sector.to_lowercase();
    if sector.contains("bank") || sector.contains("finance") {
        return latest_net_profit;
    }

    let cfo_avg = extract_average(&raw.cash_flow, "Cash from Operating Activity", 3).unwrap_or(0.0);
    let capex_avg = extract_average(&raw.cash_flow, "Fixed assets purchased", 3)
        .unwrap_or(0.0)
        .abs();
    let fcf = cfo_avg - capex_avg;
    if fcf <= 0.0 && latest_net_profit > 0.0 {
        latest_net_profit * NP_TO_FCF_CONVERSION
    } else {
        fcf
    }
}

/// Normalizes a raw record. Returns `None` when market cap or current price
/// is missing or zero; such records are dropped, not partially scored.
pub fn normalize(raw: &RawFinancialRecord) -> Option<NormalizedFinancials> {
    let market_cap = ratio(raw, "Market Cap");
    let current_price = ratio(raw, "Current Price");

    if market_cap <= 0.0 || current_price <= 0.0 {
        debug!(
            "Dropping {}: market_cap={} current_price={}",
            raw.symbol, market_cap, current_price
        );
        return None;
    }

    let roce = ratio(raw, "ROCE");
    let pe = ratio(raw, "Stock P/E");
    let book_value = ratio(raw, "Book Value");
    let pb = if book_value > 0.0 {
        (current_price / book_value * 100.0).round() / 100.0
    } else {
        0.0
    };

    // D/E: ratio panel first, balance sheet derivation as fallback. A panel
    // zero is indistinguishable from a miss, so it also goes through the
    // derivation; a derived value may legitimately be 0.0 (debt-free).
    let panel_de = ratio(raw, "Debt to Equity");
    let debt_to_equity = if panel_de != 0.0 {
        Some(panel_de)
    } else {
        derive_debt_to_equity(&raw.balance_sheet)
    };

    let revenue_cagr = compute_cagr(&raw.pnl, "Sales", 3);
    let profit_cagr = compute_cagr(&raw.pnl, "Net Profit", 3);

    let latest_net_profit = extract_latest(&raw.pnl, "Net Profit").unwrap_or(0.0);
    let free_cash_flow = derive_free_cash_flow(raw, latest_net_profit);

    let fii_pct = extract_latest(&raw.shareholding, "FIIs");
    let dii_pct = extract_latest(&raw.shareholding, "DIIs");

    Some(NormalizedFinancials {
        symbol: raw.symbol.clone(),
        company_name: if raw.company_name.is_empty() {
            raw.symbol.clone()
        } else {
            raw.company_name.clone()
        },
        about: raw.about.clone(),
        sector: if raw.sector.is_empty() {
            "Other".to_string()
        } else {
            raw.sector.clone()
        },
        market_cap,
        current_price,
        roce,
        pe,
        pb,
        debt_to_equity,
        free_cash_flow,
        revenue_cagr,
        profit_cagr,
        fii_pct,
        dii_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::MetricRow;
    use std::collections::HashMap;

    fn row(metric: &str, values: &[&str]) -> MetricRow {
        MetricRow {
            metric: metric.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_numeric_strips_markers() {
        assert_eq!(parse_numeric("Rs. 1,234.50 Cr."), 1234.5);
        assert_eq!(parse_numeric("23.4%"), 23.4);
        assert_eq!(parse_numeric(" 42 "), 42.0);
        assert_eq!(parse_numeric("-815"), -815.0);
    }

    #[test]
    fn test_parse_numeric_never_fails() {
        assert_eq!(parse_numeric(""), 0.0);
        assert_eq!(parse_numeric("N/A"), 0.0);
        assert_eq!(parse_numeric("--"), 0.0);
    }

    #[test]
    fn test_extract_latest_picks_rightmost_value() {
        let table = vec![
            row("Sales +", &["100", "120", "150"]),
            row("Net Profit +", &["10", "12", "18"]),
        ];
        assert_eq!(extract_latest(&table, "sales"), Some(150.0));
        assert_eq!(extract_latest(&table, "Net Profit"), Some(18.0));
        assert_eq!(extract_latest(&table, "EBITDA"), None);
    }

    #[test]
    fn test_extract_latest_skips_empty_cells() {
        let table = vec![row("Dividend Payout %", &["10", "12", ""])];
        assert_eq!(extract_latest(&table, "Dividend"), Some(12.0));
    }

    #[test]
    fn test_extract_average_window() {
        let table = vec![row("Cash from Operating Activity +", &["10", "20", "30", "40"])];
        assert_eq!(
            extract_average(&table, "Cash from Operating", 3),
            Some(30.0)
        );
        // Window larger than the series uses everything available
        assert_eq!(extract_average(&table, "Cash from Operating", 10), Some(25.0));
        assert_eq!(extract_average(&table, "Missing", 3), None);
    }

    #[test]
    fn test_derive_debt_to_equity() {
        let bs = vec![
            row("Equity Capital", &["50"]),
            row("Reserves", &["150"]),
            row("Borrowings +", &["100"]),
        ];
        assert_eq!(derive_debt_to_equity(&bs), Some(0.5));
    }

    #[test]
    fn test_derive_debt_to_equity_negative_net_worth() {
        let bs = vec![
            row("Equity Capital", &["50"]),
            row("Reserves", &["-80"]),
            row("Borrowings +", &["100"]),
        ];
        assert_eq!(derive_debt_to_equity(&bs), None);
    }

    fn raw_record(ratios: &[(&str, &str)]) -> RawFinancialRecord {
        RawFinancialRecord {
            symbol: "TEST".to_string(),
            company_name: "Test Industries Ltd".to_string(),
            about: String::new(),
            sector: "Specialty Chemicals".to_string(),
            ratios: ratios
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            pnl: vec![
                row("Sales +", &["100", "120", "150"]),
                row("Net Profit +", &["10", "12", "18"]),
            ],
            balance_sheet: vec![
                row("Equity Capital", &["10"]),
                row("Reserves", &["90"]),
                row("Borrowings +", &["25"]),
            ],
            cash_flow: vec![
                row("Cash from Operating Activity +", &["15", "20", "25"]),
                row("Fixed assets purchased", &["-5", "-5", "-5"]),
            ],
            shareholding: vec![row("FIIs +", &["12.5"]), row("DIIs +", &["20.0"])],
        }
    }

    #[test]
    fn test_normalize_complete_record() {
        let raw = raw_record(&[
            ("Market Cap", "1,500"),
            ("Current Price", "300"),
            ("ROCE", "22.5%"),
            ("Stock P/E", "25.1"),
            ("Book Value", "60"),
        ]);

        let fin = normalize(&raw).expect("valid record");
        assert_eq!(fin.market_cap, 1500.0);
        assert_eq!(fin.current_price, 300.0);
        assert_eq!(fin.roce, 22.5);
        assert_eq!(fin.pb, 5.0);
        // D/E derived from balance sheet: 25 / (10 + 90)
        assert_eq!(fin.debt_to_equity, Some(0.25));
        // FCF: avg CFO 20 - avg capex 5
        assert_eq!(fin.free_cash_flow, 15.0);
        assert_eq!(fin.fii_pct, Some(12.5));
        assert_eq!(fin.dii_pct, Some(20.0));
        assert!(fin.revenue_cagr > 0.0);
    }

    #[test]
    fn test_normalize_drops_record_without_market_cap() {
        let raw = raw_record(&[("Current Price", "300")]);
        assert!(normalize(&raw).is_none());

        let raw = raw_record(&[("Market Cap", "0"), ("Current Price", "300")]);
        assert!(normalize(&raw).is_none());
    }

    #[test]
    fn test_normalize_panel_de_wins_over_derivation() {
        let raw = raw_record(&[
            ("Market Cap", "1500"),
            ("Current Price", "300"),
            ("Debt to Equity", "0.80"),
        ]);
        let fin = normalize(&raw).unwrap();
        assert_eq!(fin.debt_to_equity, Some(0.8));
    }

    #[test]
    fn test_normalize_unknown_metrics_are_none() {
        let mut raw = raw_record(&[("Market Cap", "1500"), ("Current Price", "300")]);
        raw.shareholding.clear();
        raw.balance_sheet.clear();
        let fin = normalize(&raw).unwrap();
        assert_eq!(fin.fii_pct, None);
        assert_eq!(fin.dii_pct, None);
        assert_eq!(fin.debt_to_equity, None);
        assert_eq!(fin.institutional_pct(), 0.0);
        assert_eq!(fin.debt_to_equity_or_zero(), 0.0);
    }

    #[test]
    fn test_financials_use_net_profit_as_fcf() {
        let mut raw = raw_record(&[("Market Cap", "1500"), ("Current Price", "300")]);
        raw.sector = "Private Sector Bank".to_string();
        let fin = normalize(&raw).unwrap();
        assert_eq!(fin.free_cash_flow, 18.0);
    }

    #[test]
    fn test_capex_heavy_profitable_uses_np_conversion() {
        let mut raw = raw_record(&[("Market Cap", "1500"), ("Current Price", "300")]);
        raw.cash_flow = vec![
            row("Cash from Operating Activity +", &["5", "5", "5"]),
            row("Fixed assets purchased", &["-50", "-50", "-50"]),
        ];
        let fin = normalize(&raw).unwrap();
        // Latest net profit 18 * 0.40
        assert!((fin.free_cash_flow - 7.2).abs() < 1e-9);
    }
}
