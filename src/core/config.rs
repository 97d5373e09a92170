use crate::core::record::QualitativeScores;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScreenerProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeepSeekProviderConfig {
    pub base_url: String,
    /// Key used directly when set; otherwise read from `DEEPSEEK_API_KEY`.
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub screener: Option<ScreenerProviderConfig>,
    pub deepseek: Option<DeepSeekProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            screener: Some(ScreenerProviderConfig {
                base_url: "https://www.screener.in".to_string(),
            }),
            deepseek: Some(DeepSeekProviderConfig {
                base_url: "https://api.deepseek.com".to_string(),
                api_key: None,
                model: default_model(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Symbols to screen. List maintenance itself is out of scope; edit the
    /// config or regenerate it from an index constituents file.
    pub universe: Vec<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Curated qualitative overrides keyed by symbol. Checked before the AI
    /// collaborator is called; the engine itself never sees symbols here.
    #[serde(default)]
    pub curated_scores: HashMap<String, QualitativeScores>,
    #[serde(default = "default_workers")]
    pub workers: usize,
    pub data_path: Option<String>,
}

fn default_workers() -> usize {
    5
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "eqsift")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "eqsift")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
