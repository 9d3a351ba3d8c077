use crate::{BackendStatus, JobId, JobRunResult, LogEntry, ScraperStatus, SiteStrategy};

/// Which button a scraper card offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Run,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub backend: BackendStatus,
    pub active_jobs: usize,
    pub total_products: u64,
    pub success_rate: Option<f64>,
    pub scrapers: Vec<ScraperRowView>,
    /// Most recent first.
    pub recent_runs: Vec<JobRunResult>,
    pub console_open: bool,
    pub console: Vec<LogEntry>,
    pub console_generation: u64,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperRowView {
    pub id: JobId,
    pub name: String,
    pub base_url: String,
    pub strategy: SiteStrategy,
    pub status: ScraperStatus,
    pub products_count: u64,
    pub last_run: Option<String>,
    pub schedule: String,
    pub can_configure: bool,
    pub action: RowAction,
}
