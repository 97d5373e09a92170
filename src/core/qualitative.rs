//! Qualitative-analysis collaborator abstraction
//!
//! The engine consumes `QualitativeScores` uniformly; symbol-specific
//! knowledge lives only in the resolver's injected override table.

use crate::core::record::QualitativeScores;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait QualitativeProvider: Send + Sync {
    async fn analyze(&self, symbol: &str) -> Result<QualitativeScores>;
}

/// Conservative profile used when no rating source is available.
pub fn default_profile() -> QualitativeScores {
    QualitativeScores {
        customer_satisfaction: 40,
        moat: 35,
        tailwind: 50,
        management_quality: 45,
        notes: "No distinct moat identified. Operates in a commoditised, competitive market. \
                Customer satisfaction is unremarkable. Management shows standard governance \
                without a track record of exceptional capital allocation."
            .to_string(),
    }
}

/// Resolves qualitative scores through an explicit fallback chain:
/// curated override, then the external provider, then the default profile.
pub struct QualitativeResolver {
    overrides: HashMap<String, QualitativeScores>,
    provider: Option<Arc<dyn QualitativeProvider>>,
}

impl QualitativeResolver {
    pub fn new(
        overrides: HashMap<String, QualitativeScores>,
        provider: Option<Arc<dyn QualitativeProvider>>,
    ) -> Self {
        // Override keys are matched case-insensitively on symbol
        let overrides = overrides
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        Self {
            overrides,
            provider,
        }
    }

    pub async fn resolve(&self, symbol: &str) -> QualitativeScores {
        if let Some(curated) = self.overrides.get(&symbol.to_uppercase()) {
            debug!("Using curated qualitative scores for {}", symbol);
            return curated.clone();
        }

        if let Some(provider) = &self.provider {
            match provider.analyze(symbol).await {
                Ok(scores) => return scores,
                Err(e) => {
                    debug!("Qualitative provider failed for {}: {}", symbol, e);
                }
            }
        } else {
            debug!("No qualitative provider configured for {}", symbol);
        }

        default_profile()
    }
}
