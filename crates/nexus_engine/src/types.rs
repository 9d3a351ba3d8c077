use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    Static,
    Dynamic,
    Api,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Static => "STATIC",
            Strategy::Dynamic => "DYNAMIC",
            Strategy::Api => "API",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selectors {
    pub product_container: String,
    pub name: String,
    pub price: String,
    pub image: String,
}

/// One run's worth of job configuration. Serializes as the dispatch request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSpec {
    pub id: JobId,
    #[serde(skip)]
    pub name: String,
    pub url: String,
    pub strategy: Strategy,
    pub selectors: Selectors,
}

/// Body of a `POST /api/scrape` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DispatchReport {
    pub success: bool,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    BackendChecked {
        available: bool,
    },
    Log {
        job_id: JobId,
        line: LogLine,
    },
    RunFinished {
        job_id: JobId,
        completion: RunCompletion,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSource {
    Remote,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub items: u64,
    pub started_at: String,
    pub finished_at: String,
    pub duration: String,
    pub source: RunSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunCompletion {
    Succeeded(RunSummary),
    Stopped,
    Failed {
        started_at: String,
        duration: String,
        detail: String,
    },
}

/// A remote dispatch that did not produce a usable result. Always recovered by simulating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("server returned error (HTTP {0})")]
    HttpStatus(u16),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("scrape job failed on server")]
    Rejected,
}

/// Why a run stopped short of completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("stopped by user request")]
    Cancelled,
    #[error("{0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_spec_serializes_as_dispatch_body() {
        let spec = JobSpec {
            id: "1".to_string(),
            name: "not on the wire".to_string(),
            url: "https://www.rbpatel.com.fj".to_string(),
            strategy: Strategy::Dynamic,
            selectors: Selectors {
                product_container: ".product-item".to_string(),
                name: ".product-title".to_string(),
                price: ".price-current".to_string(),
                image: ".product-image img".to_string(),
            },
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "1",
                "url": "https://www.rbpatel.com.fj",
                "strategy": "DYNAMIC",
                "selectors": {
                    "productContainer": ".product-item",
                    "name": ".product-title",
                    "price": ".price-current",
                    "image": ".product-image img"
                }
            })
        );
    }

    #[test]
    fn report_tolerates_missing_count_and_log() {
        let report: DispatchReport = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!report.success);
        assert_eq!(report.count, 0);
        assert!(report.log.is_empty());
    }
}
