pub mod cli;
pub mod core;
pub mod engine;
pub mod pipeline;
pub mod providers;
pub mod store;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::qualitative::{QualitativeProvider, QualitativeResolver};
use crate::engine::score::COMPOSITE_WEIGHTS;
use crate::engine::valuation::DcfPolicy;
use crate::providers::deepseek::DeepSeekProvider;
use crate::providers::screener_api::ScreenerApiProvider;
use crate::store::StockStore;

pub enum AppCommand {
    Analyze,
    Rebalance,
    Rankings { limit: Option<usize> },
    Portfolio,
    Export { path: Option<String> },
}

fn build_resolver(config: &AppConfig) -> QualitativeResolver {
    let provider: Option<Arc<dyn QualitativeProvider>> =
        config.providers.deepseek.as_ref().and_then(|deepseek| {
            let api_key = deepseek
                .api_key
                .clone()
                .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok())?;
            Some(Arc::new(DeepSeekProvider::new(
                &deepseek.base_url,
                &api_key,
                &deepseek.model,
            )) as Arc<dyn QualitativeProvider>)
        });

    if provider.is_none() {
        info!("No DeepSeek API key configured; using default qualitative profiles");
    }

    QualitativeResolver::new(config.curated_scores.clone(), provider)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("eqsift starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config with {} universe symbols", config.universe.len());

    COMPOSITE_WEIGHTS.validate()?;
    let policy = DcfPolicy::default();
    policy.validate()?;

    let store = StockStore::open(&config.default_data_path()?)?;

    match command {
        AppCommand::Analyze => {
            let base_url = config
                .providers
                .screener
                .as_ref()
                .map_or("https://www.screener.in", |p| p.base_url.as_str());
            let fundamentals = Arc::new(ScreenerApiProvider::new(base_url));
            let resolver = Arc::new(build_resolver(&config));

            pipeline::run_analysis(&config, &store, fundamentals, resolver, policy).await?;
            cli::rankings::run(&store, Some(20))
        }
        AppCommand::Rebalance => {
            pipeline::run_rebalance(&store)?;
            cli::portfolio::run(&store)
        }
        AppCommand::Rankings { limit } => cli::rankings::run(&store, limit),
        AppCommand::Portfolio => cli::portfolio::run(&store),
        AppCommand::Export { path } => {
            let path = path.map_or_else(|| PathBuf::from("stock_data.json"), PathBuf::from);
            let count = store.export_snapshot(&path)?;
            println!("Exported {} records to {}", count, path.display());
            Ok(())
        }
    }
}
