//! End-to-end screening runs: fetch, normalize, value, score, persist, and
//! the portfolio rebalance over stored records.

use anyhow::Result;
use chrono::Utc;
use futures::StreamExt;
use futures::stream;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cli::ui;
use crate::core::config::AppConfig;
use crate::core::fundamentals::FundamentalsProvider;
use crate::core::qualitative::QualitativeResolver;
use crate::core::record::{NormalizedFinancials, QualitativeScores, StockRecord};
use crate::engine::allocation::{self, AllocationResult, Candidate};
use crate::engine::normalize;
use crate::engine::score::{calculate_weighted_score, compose_sub_scores};
use crate::engine::valuation::{DcfPolicy, ValuationResult};
use crate::store::StockStore;

/// Tally of an analysis run. Skipped records failed normalization; failed
/// ones hit a provider or transport error and can be retried on a rerun.
#[derive(Debug, Default, PartialEq)]
pub struct AnalysisOutcome {
    pub analyzed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Assembles the persisted record for one stock from its normalized
/// financials and qualitative ratings. Pure; all I/O happens before this.
pub fn build_record(
    fin: &NormalizedFinancials,
    qualitative: &QualitativeScores,
    policy: &DcfPolicy,
) -> StockRecord {
    let growth = policy.growth_input(fin.revenue_cagr);
    let intrinsic_value = policy.intrinsic_value(fin.free_cash_flow, growth);
    let valuation =
        ValuationResult::from_intrinsic(intrinsic_value, fin.market_cap, fin.current_price);

    let scores = compose_sub_scores(fin, intrinsic_value, qualitative);
    let final_score = calculate_weighted_score(&scores);

    StockRecord {
        symbol: fin.symbol.clone(),
        company_name: fin.company_name.clone(),
        about: fin.about.clone(),
        sector: fin.sector.clone(),
        broad_sector: allocation::broad_sector(&fin.sector).to_string(),
        market_cap: fin.market_cap,
        current_price: fin.current_price,
        intrinsic_value,
        shares_outstanding: valuation.shares_outstanding,
        intrinsic_price_per_share: valuation.intrinsic_price_per_share,
        roce: fin.roce,
        pe: fin.pe,
        pb: fin.pb,
        debt_to_equity: fin.debt_to_equity,
        revenue_cagr: fin.revenue_cagr,
        free_cash_flow: fin.free_cash_flow,
        fii_pct: fin.fii_pct,
        dii_pct: fin.dii_pct,
        scores,
        final_score,
        portfolio_weight: 0.0,
        notes: qualitative.notes.clone(),
        updated_at: Utc::now(),
    }
}

async fn analyze_symbol(
    symbol: &str,
    fundamentals: &dyn FundamentalsProvider,
    resolver: &QualitativeResolver,
    policy: &DcfPolicy,
) -> Result<Option<StockRecord>> {
    let raw = fundamentals.fetch(symbol).await?;

    let Some(fin) = normalize::normalize(&raw) else {
        return Ok(None);
    };

    let qualitative = resolver.resolve(symbol).await;
    Ok(Some(build_record(&fin, &qualitative, policy)))
}

/// Analyzes every universe symbol not yet in the store. An interrupted run
/// resumes where it left off; already-stored symbols are never re-fetched.
pub async fn run_analysis(
    config: &AppConfig,
    store: &StockStore,
    fundamentals: Arc<dyn FundamentalsProvider>,
    resolver: Arc<QualitativeResolver>,
    policy: DcfPolicy,
) -> Result<AnalysisOutcome> {
    let mut pending = Vec::new();
    for symbol in &config.universe {
        if store.contains(symbol)? {
            debug!("Skipping {}: already analyzed", symbol);
        } else {
            pending.push(symbol.clone());
        }
    }

    if pending.is_empty() {
        info!("Nothing to analyze; all universe symbols are stored");
        return Ok(AnalysisOutcome::default());
    }

    let pb = ui::new_progress_bar(pending.len() as u64, true);
    pb.set_message("Analyzing stocks...");

    let mut results = stream::iter(pending.into_iter().map(|symbol| {
        let fundamentals = Arc::clone(&fundamentals);
        let resolver = Arc::clone(&resolver);
        let pb_clone = pb.clone();
        async move {
            let outcome =
                analyze_symbol(&symbol, fundamentals.as_ref(), &resolver, &policy).await;
            pb_clone.inc(1);
            (symbol, outcome)
        }
    }))
    .buffer_unordered(config.workers.max(1));

    let mut tally = AnalysisOutcome::default();
    while let Some((symbol, outcome)) = results.next().await {
        match outcome {
            Ok(Some(record)) => {
                store.upsert(&record)?;
                tally.analyzed += 1;
            }
            Ok(None) => {
                warn!("Skipping {}: incomplete fundamentals", symbol);
                tally.skipped += 1;
            }
            Err(e) => {
                warn!("Analysis failed for {}: {}", symbol, e);
                tally.failed += 1;
            }
        }
    }
    pb.finish_and_clear();

    store.persist()?;
    info!(
        "Analysis run complete: {} analyzed, {} skipped, {} failed",
        tally.analyzed, tally.skipped, tally.failed
    );
    Ok(tally)
}

/// Recomputes composite scores and sector tags from stored sub-scores, runs
/// the allocation, and rewrites every record's portfolio weight. Symbols
/// that fall out of the portfolio drop back to a zero weight.
pub fn run_rebalance(store: &StockStore) -> Result<Vec<AllocationResult>> {
    let mut records = store.all()?;
    if records.is_empty() {
        info!("Store is empty; nothing to rebalance");
        return Ok(Vec::new());
    }

    for record in &mut records {
        record.final_score = calculate_weighted_score(&record.scores);
        record.broad_sector = allocation::broad_sector(&record.sector).to_string();
    }

    let candidates: Vec<Candidate> = records.iter().map(Candidate::from_record).collect();
    let allocations = allocation::allocate(&candidates);

    let weights: HashMap<&str, f64> = allocations
        .iter()
        .map(|a| (a.symbol.as_str(), a.weight))
        .collect();

    let now = Utc::now();
    for record in &mut records {
        record.portfolio_weight = weights.get(record.symbol.as_str()).copied().unwrap_or(0.0);
        record.updated_at = now;
        store.upsert(record)?;
    }
    store.persist()?;

    info!(
        "Rebalance complete: {} of {} records allocated",
        allocations.len(),
        records.len()
    );
    Ok(allocations)
}
