use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"---
# Symbols to analyze, as listed on the screener site
universe:
  - RELIANCE
  - TCS
  - HDFCBANK

# providers:
#   screener:
#     base_url: "https://www.screener.in"
#   deepseek:
#     base_url: "https://api.deepseek.com"
#     api_key: "sk-..."   # or set DEEPSEEK_API_KEY

# Hand-curated qualitative ratings; these skip the AI provider entirely
# curated_scores:
#   TCS:
#     customer_satisfaction: 88
#     moat: 90
#     tailwind: 72
#     management_quality: 92
#     notes: "Deep switching costs. Gold standard governance."

workers: 5
"#;

/// Creates a default configuration file with example content at the default location
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(&path)
}

/// Creates a default configuration file with example content at the specified path
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
