use crate::{JobId, SelectorSet, SiteStrategy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartRun(RunRequest),
    StopRun { job_id: JobId, name: String },
}

/// Snapshot of a scraper's configuration handed to the engine for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub job_id: JobId,
    pub name: String,
    pub base_url: String,
    pub strategy: SiteStrategy,
    pub selectors: SelectorSet,
}
