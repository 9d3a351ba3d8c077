use nexus_logging::nexus_warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Strategy;

/// Advisors only ever look at this much of an HTML sample.
pub const MAX_SAMPLE_CHARS: usize = 50_000;

/// Suggested locators for a site, as returned by a selector advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorPrediction {
    pub container: String,
    pub name: String,
    pub price: String,
    pub image: String,
    pub strategy_recommendation: Strategy,
    /// In `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
}

impl SelectorPrediction {
    /// What callers use when the advisor cannot answer.
    pub fn fallback() -> Self {
        Self {
            container: "div.product".to_string(),
            name: "h3".to_string(),
            price: ".price".to_string(),
            image: "img".to_string(),
            strategy_recommendation: Strategy::Dynamic,
            confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisorError {
    #[error("advisor unavailable: {0}")]
    Unavailable(String),
    #[error("advisor returned no usable answer: {0}")]
    InvalidAnswer(String),
}

/// External collaborator that proposes selectors from a page sample.
#[async_trait::async_trait]
pub trait SelectorAdvisor: Send + Sync {
    async fn suggest(&self, html: &str, url: &str) -> Result<SelectorPrediction, AdvisorError>;
}

/// Advisor failures are never fatal: any error yields [`SelectorPrediction::fallback`].
pub async fn suggest_or_default(
    advisor: &dyn SelectorAdvisor,
    html: &str,
    url: &str,
) -> SelectorPrediction {
    let sample = truncate_sample(html);
    match advisor.suggest(sample, url).await {
        Ok(mut prediction) => {
            prediction.confidence = prediction.confidence.clamp(0.0, 1.0);
            prediction
        }
        Err(err) => {
            nexus_warn!("Selector advisor failed for {}: {}", url, err);
            SelectorPrediction::fallback()
        }
    }
}

/// Canned answer for setups without an advisory service configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineAdvisor;

#[async_trait::async_trait]
impl SelectorAdvisor for OfflineAdvisor {
    async fn suggest(&self, _html: &str, _url: &str) -> Result<SelectorPrediction, AdvisorError> {
        Ok(SelectorPrediction {
            container: ".product-card".to_string(),
            name: ".product-title".to_string(),
            price: ".current-price".to_string(),
            image: "img.product-thumb".to_string(),
            strategy_recommendation: Strategy::Static,
            confidence: 0.85,
        })
    }
}

fn truncate_sample(html: &str) -> &str {
    match html.char_indices().nth(MAX_SAMPLE_CHARS) {
        Some((idx, _)) => &html[..idx],
        None => html,
    }
}
