use std::fmt;

use thiserror::Error;

pub type JobId = String;

/// How a site is scraped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteStrategy {
    /// Plain HTML parsing.
    Static,
    /// Headless browser.
    Dynamic,
    /// Direct JSON API.
    Api,
}

impl SiteStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            SiteStrategy::Static => "STATIC",
            SiteStrategy::Dynamic => "DYNAMIC",
            SiteStrategy::Api => "API",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "STATIC" => Some(SiteStrategy::Static),
            "DYNAMIC" => Some(SiteStrategy::Dynamic),
            "API" => Some(SiteStrategy::Api),
            _ => None,
        }
    }
}

impl fmt::Display for SiteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScraperStatus {
    #[default]
    Idle,
    Running,
    Error,
    /// Set by external schedulers only; the engine never writes it.
    Scheduled,
}

impl ScraperStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScraperStatus::Idle => "IDLE",
            ScraperStatus::Running => "RUNNING",
            ScraperStatus::Error => "ERROR",
            ScraperStatus::Scheduled => "SCHEDULED",
        }
    }
}

impl fmt::Display for ScraperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locators used to pull products out of a page (CSS) or payload (JSON path).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorSet {
    pub product_container: String,
    pub name: String,
    pub price: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    pub id: JobId,
    pub name: String,
    pub base_url: String,
    pub strategy: SiteStrategy,
    pub status: ScraperStatus,
    /// RFC3339 time of the last successful run.
    pub last_run: Option<String>,
    pub products_count: u64,
    /// Human readable, e.g. "Daily @ 03:00".
    pub schedule: String,
    pub selectors: SelectorSet,
}

/// Fields a configuration form may set. Runtime fields stay with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperDraft {
    pub name: String,
    pub base_url: String,
    pub strategy: SiteStrategy,
    pub schedule: String,
    pub selectors: SelectorSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("scraper name must not be empty")]
    EmptyName,
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
    #[error("selector `{0}` must not be empty")]
    EmptySelector(&'static str),
    #[error("container selector `{0}` is not valid CSS")]
    InvalidSelector(String),
}

impl ScraperDraft {
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::EmptyName);
        }
        let parsed = url::Url::parse(self.base_url.trim())
            .map_err(|err| DraftError::InvalidUrl(err.to_string()))?;
        if parsed.host_str().is_none() {
            return Err(DraftError::InvalidUrl("missing host".to_string()));
        }
        let container = self.selectors.product_container.trim();
        if container.is_empty() {
            return Err(DraftError::EmptySelector("productContainer"));
        }
        // API locators are JSON paths, not CSS.
        if self.strategy != SiteStrategy::Api && scraper::Selector::parse(container).is_err() {
            return Err(DraftError::InvalidSelector(container.to_string()));
        }
        Ok(())
    }

    pub(crate) fn apply_to(self, config: &mut ScraperConfig) {
        config.name = self.name.trim().to_string();
        config.base_url = self.base_url.trim().to_string();
        config.strategy = self.strategy;
        config.schedule = self.schedule;
        config.selectors = self.selectors;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Partial,
    Failed,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Success => "SUCCESS",
            RunOutcome::Partial => "PARTIAL",
            RunOutcome::Failed => "FAILED",
        }
    }
}

/// One row of run history. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRunResult {
    pub id: String,
    pub scraper_id: JobId,
    pub scraper_name: String,
    pub start_time: String,
    pub duration: String,
    pub items_scraped: u64,
    pub outcome: RunOutcome,
    pub error_details: Option<String>,
}

/// How a run ended, as reported back by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunCompletion {
    Succeeded {
        items: u64,
        started_at: String,
        finished_at: String,
        duration: String,
    },
    /// Cancelled by the operator. Leaves no trace in run history.
    Stopped,
    Failed {
        started_at: String,
        duration: String,
        detail: String,
    },
}
