//! Filters, ranks and weights scored candidates into the model portfolio.

use crate::core::record::StockRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Minimum composite score for a candidate to stay in the running. The
/// boundary is inclusive: exactly 40.00 is retained.
const MIN_FINAL_SCORE: f64 = 40.0;

/// Candidates priced more than 15% above intrinsic value are rejected,
/// but only when a valuation exists; unknown valuation never auto-rejects.
const OVERVALUATION_TOLERANCE: f64 = 1.15;

/// The portfolio holds at most this many positions.
const MAX_POSITIONS: usize = 150;

/// Ordered broad-sector keyword table, v1. First case-insensitive substring
/// match wins, so earlier entries take precedence; no match is "Others".
/// The ordering is part of the classification contract - do not sort.
const SECTOR_KEYWORDS: &[(&str, &str)] = &[
    ("financial", "Finance"),
    ("bank", "Finance"),
    ("insurance", "Finance"),
    ("nbfc", "Finance"),
    ("it", "Technology"),
    ("software", "Technology"),
    ("tech", "Technology"),
    ("pharmaceutical", "Healthcare"),
    ("healthcare", "Healthcare"),
    ("oils & gas", "Energy"),
    ("power", "Energy"),
    ("energy", "Energy"),
    ("auto", "Consumer"),
    ("retail", "Consumer"),
    ("fmcg", "Consumer"),
    ("consumer", "Consumer"),
    ("telecom", "Communication"),
    ("infrastructure", "Industrial"),
    ("industrial", "Industrial"),
    ("textile", "Industrial"),
    ("chemicals", "Industrial"),
];

/// Maps a free-text sector label to the broad taxonomy.
pub fn broad_sector(sector: &str) -> &'static str {
    let needle = sector.to_lowercase();
    SECTOR_KEYWORDS
        .iter()
        .find(|(keyword, _)| needle.contains(keyword))
        .map(|(_, broad)| *broad)
        .unwrap_or("Others")
}

/// Allocation input for a single scored stock.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub symbol: String,
    pub final_score: f64,
    pub current_price: f64,
    pub intrinsic_price_per_share: f64,
    pub roce: f64,
    pub debt_to_equity: f64,
    pub institutional_pct: f64,
    pub sector: String,
}

impl Candidate {
    pub fn from_record(record: &StockRecord) -> Self {
        Candidate {
            symbol: record.symbol.clone(),
            final_score: record.final_score,
            current_price: record.current_price,
            intrinsic_price_per_share: record.intrinsic_price_per_share,
            roce: record.roce,
            debt_to_equity: record.debt_to_equity.unwrap_or(0.0),
            institutional_pct: record.fii_pct.unwrap_or(0.0) + record.dii_pct.unwrap_or(0.0),
            sector: record.sector.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub symbol: String,
    pub weight: f64,
    pub broad_sector: String,
    pub conviction: f64,
}

fn passes_filters(c: &Candidate) -> bool {
    if c.final_score < MIN_FINAL_SCORE {
        return false;
    }
    if c.intrinsic_price_per_share > 0.0
        && c.current_price > c.intrinsic_price_per_share * OVERVALUATION_TOLERANCE
    {
        return false;
    }
    true
}

/// Conviction blends the composite score with a valuation-discount bonus,
/// a balance-sheet quality bonus and an institutional-ownership bonus.
pub fn conviction_score(c: &Candidate) -> f64 {
    let dcf_bonus = if c.intrinsic_price_per_share > 0.0 && c.current_price > 0.0 {
        let discount =
            (c.intrinsic_price_per_share - c.current_price) / c.intrinsic_price_per_share;
        (discount * 40.0).clamp(-10.0, 25.0)
    } else {
        0.0
    };

    let quality_bonus =
        (c.roce / 4.0).clamp(0.0, 10.0) + ((1.0 - c.debt_to_equity) * 5.0).clamp(-5.0, 5.0);

    let institutional_bonus = (c.institutional_pct / 5.0).clamp(0.0, 10.0);

    c.final_score + dcf_bonus + quality_bonus + institutional_bonus
}

/// Builds the weighted model portfolio: filter, rank by conviction,
/// truncate, then assign squared-proportional weights so capital
/// concentrates toward top conviction faster than linearly.
///
/// Empty input, an empty post-filter set, and zero total conviction mass
/// all produce a valid empty output.
pub fn allocate(candidates: &[Candidate]) -> Vec<AllocationResult> {
    let mut selected: Vec<(f64, &Candidate)> = candidates
        .iter()
        .filter(|c| passes_filters(c))
        .map(|c| (conviction_score(c), c))
        .collect();

    // Ties resolve by symbol so reruns over an unchanged universe are
    // byte-identical
    selected.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    selected.truncate(MAX_POSITIONS);

    let total_sq: f64 = selected.iter().map(|(score, _)| score * score).sum();
    if total_sq <= 0.0 {
        return Vec::new();
    }

    selected
        .into_iter()
        .map(|(score, c)| AllocationResult {
            symbol: c.symbol.clone(),
            weight: score * score / total_sq,
            broad_sector: broad_sector(&c.sector).to_string(),
            conviction: score,
        })
        .collect()
}
