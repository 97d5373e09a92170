//! Maps ratios and valuation into 0-100 sub-scores and the fixed-weight
//! composite score.

use crate::core::record::{NormalizedFinancials, QualitativeScores, SubScores};
use anyhow::{Result, bail};

/// Fixed composite weights. Must sum to exactly 1.00; validated at startup.
#[derive(Debug, Clone, Copy)]
pub struct CompositeWeights {
    pub dcf: f64,
    pub growth: f64,
    pub roce: f64,
    pub moat: f64,
    pub fii_dii_de: f64,
    pub tailwind: f64,
    pub management: f64,
}

pub const COMPOSITE_WEIGHTS: CompositeWeights = CompositeWeights {
    dcf: 0.30,
    growth: 0.20,
    roce: 0.10,
    moat: 0.15,
    fii_dii_de: 0.05,
    tailwind: 0.10,
    management: 0.10,
};

impl CompositeWeights {
    pub fn sum(&self) -> f64 {
        self.dcf + self.growth + self.roce + self.moat + self.fii_dii_de + self.tailwind
            + self.management
    }

    pub fn validate(&self) -> Result<()> {
        if (self.sum() - 1.0).abs() > 1e-9 {
            bail!("Composite score weights sum to {}, expected 1.00", self.sum());
        }
        Ok(())
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Builds the full sub-score set from normalized financials, the intrinsic
/// valuation and externally supplied qualitative ratings. The qualitative
/// inputs are merged verbatim; moat is the average of the two externally
/// rated dimensions.
pub fn compose_sub_scores(
    fin: &NormalizedFinancials,
    intrinsic_value: f64,
    qualitative: &QualitativeScores,
) -> SubScores {
    // Intrinsic value at 4x market cap saturates the DCF score
    let dcf_score = clamp_score(intrinsic_value / fin.market_cap * 25.0);
    let growth_score = clamp_score((fin.revenue_cagr + fin.profit_cagr) * 2.0);
    let roce_score = clamp_score(fin.roce * 2.0);

    let de_score = clamp_score(100.0 - fin.debt_to_equity_or_zero() * 50.0);
    let fii_dii_score = clamp_score(fin.institutional_pct());
    let fii_dii_de_score = (de_score + fii_dii_score) / 2.0;

    let moat_score = clamp_score(
        (qualitative.customer_satisfaction as f64 + qualitative.moat as f64) / 2.0,
    );

    SubScores {
        dcf_score,
        growth_score,
        roce_score,
        fii_dii_de_score,
        moat_score,
        tailwind_score: clamp_score(qualitative.tailwind as f64),
        management_score: clamp_score(qualitative.management_quality as f64),
    }
}

/// Fixed weighted sum of sub-scores, rounded to 2 decimals.
pub fn calculate_weighted_score(scores: &SubScores) -> f64 {
    let w = &COMPOSITE_WEIGHTS;
    let score = w.dcf * scores.dcf_score
        + w.growth * scores.growth_score
        + w.roce * scores.roce_score
        + w.moat * scores.moat_score
        + w.fii_dii_de * scores.fii_dii_de_score
        + w.tailwind * scores.tailwind_score
        + w.management * scores.management_score;
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_scores(value: f64) -> SubScores {
        SubScores {
            dcf_score: value,
            growth_score: value,
            roce_score: value,
            fii_dii_de_score: value,
            moat_score: value,
            tailwind_score: value,
            management_score: value,
        }
    }

    fn financials() -> NormalizedFinancials {
        NormalizedFinancials {
            symbol: "TEST".to_string(),
            company_name: "Test Industries Ltd".to_string(),
            about: String::new(),
            sector: "Specialty Chemicals".to_string(),
            market_cap: 1000.0,
            current_price: 100.0,
            roce: 30.0,
            pe: 25.0,
            pb: 4.0,
            debt_to_equity: Some(0.5),
            free_cash_flow: 80.0,
            revenue_cagr: 15.0,
            profit_cagr: 10.0,
            fii_pct: Some(12.0),
            dii_pct: Some(18.0),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!(COMPOSITE_WEIGHTS.validate().is_ok());
        assert!((COMPOSITE_WEIGHTS.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let broken = CompositeWeights {
            dcf: 0.50,
            ..COMPOSITE_WEIGHTS
        };
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_weighted_score_bounds() {
        assert_eq!(calculate_weighted_score(&uniform_scores(0.0)), 0.0);
        assert_eq!(calculate_weighted_score(&uniform_scores(100.0)), 100.0);
    }

    #[test]
    fn test_weighted_score_rounding() {
        let mut scores = uniform_scores(0.0);
        scores.dcf_score = 33.333;
        // 0.30 * 33.333 = 9.9999 -> 10.00
        assert_eq!(calculate_weighted_score(&scores), 10.0);
    }

    #[test]
    fn test_compose_sub_scores() {
        let qualitative = QualitativeScores {
            customer_satisfaction: 80,
            moat: 60,
            tailwind: 55,
            management_quality: 65,
            notes: String::new(),
        };
        let scores = compose_sub_scores(&financials(), 2000.0, &qualitative);

        // 2000 / 1000 * 25
        assert_eq!(scores.dcf_score, 50.0);
        // (15 + 10) * 2
        assert_eq!(scores.growth_score, 50.0);
        // 30 * 2, clamped ceiling not hit
        assert_eq!(scores.roce_score, 60.0);
        // de 0.5 -> 75; fii+dii 30 -> (75 + 30) / 2
        assert_eq!(scores.fii_dii_de_score, 52.5);
        assert_eq!(scores.moat_score, 70.0);
        assert_eq!(scores.tailwind_score, 55.0);
        assert_eq!(scores.management_score, 65.0);
    }

    #[test]
    fn test_dcf_score_saturates_at_4x_market_cap() {
        let qualitative = QualitativeScores {
            customer_satisfaction: 0,
            moat: 0,
            tailwind: 0,
            management_quality: 0,
            notes: String::new(),
        };
        let scores = compose_sub_scores(&financials(), 10_000.0, &qualitative);
        assert_eq!(scores.dcf_score, 100.0);
    }

    #[test]
    fn test_unknown_de_scores_at_face_value_zero() {
        let mut fin = financials();
        fin.debt_to_equity = None;
        fin.fii_pct = None;
        fin.dii_pct = None;
        let qualitative = QualitativeScores {
            customer_satisfaction: 0,
            moat: 0,
            tailwind: 0,
            management_quality: 0,
            notes: String::new(),
        };
        let scores = compose_sub_scores(&fin, 0.0, &qualitative);
        // de 0 -> 100, fii+dii 0 -> (100 + 0) / 2
        assert_eq!(scores.fii_dii_de_score, 50.0);
    }
}
