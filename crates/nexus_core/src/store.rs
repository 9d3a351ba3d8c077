use std::collections::VecDeque;

use crate::{
    DraftError, JobId, JobRunResult, RunCompletion, RunOutcome, ScraperConfig, ScraperDraft,
    ScraperStatus,
};

/// Per-scraper configuration plus mutable status and metrics, and the run history.
///
/// There is no delete. Updates are applied in the order they arrive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStateStore {
    jobs: Vec<ScraperConfig>,
    history: VecDeque<JobRunResult>,
    next_job_seq: u64,
    next_run_seq: u64,
}

impl JobStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store; `history` is expected most-recent-first.
    pub fn with_seed(jobs: Vec<ScraperConfig>, history: Vec<JobRunResult>) -> Self {
        let next_job_seq = jobs
            .iter()
            .filter_map(|job| job.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            jobs,
            history: history.into(),
            next_job_seq,
            next_run_seq: 0,
        }
    }

    pub fn jobs(&self) -> &[ScraperConfig] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&ScraperConfig> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Most recent first.
    pub fn history(&self) -> impl Iterator<Item = &JobRunResult> {
        self.history.iter()
    }

    pub fn create(&mut self, draft: ScraperDraft) -> Result<JobId, DraftError> {
        draft.validate()?;
        self.next_job_seq += 1;
        let mut config = ScraperConfig {
            id: self.next_job_seq.to_string(),
            name: String::new(),
            base_url: String::new(),
            strategy: draft.strategy,
            status: ScraperStatus::Idle,
            last_run: None,
            products_count: 0,
            schedule: String::new(),
            selectors: Default::default(),
        };
        draft.apply_to(&mut config);
        let id = config.id.clone();
        self.jobs.push(config);
        Ok(id)
    }

    /// Applies `f` to the job with `id`. Returns false if there is no such job.
    pub fn update<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut ScraperConfig),
    {
        match self.jobs.iter_mut().find(|job| job.id == id) {
            Some(job) => {
                f(job);
                true
            }
            None => false,
        }
    }

    /// Folds an engine-reported completion into status, metrics and history.
    pub fn complete_run(&mut self, id: &str, completion: RunCompletion) -> bool {
        let Some(job) = self.jobs.iter_mut().find(|job| job.id == id) else {
            return false;
        };

        let record = match completion {
            RunCompletion::Succeeded {
                items,
                started_at,
                finished_at,
                duration,
            } => {
                job.status = ScraperStatus::Idle;
                job.last_run = Some(finished_at);
                job.products_count += items;
                Some((started_at, duration, items, RunOutcome::Success, None))
            }
            RunCompletion::Stopped => {
                job.status = ScraperStatus::Idle;
                None
            }
            RunCompletion::Failed {
                started_at,
                duration,
                detail,
            } => {
                job.status = ScraperStatus::Error;
                Some((started_at, duration, 0, RunOutcome::Failed, Some(detail)))
            }
        };

        if let Some((start_time, duration, items_scraped, outcome, error_details)) = record {
            let scraper_id = job.id.clone();
            let scraper_name = job.name.clone();
            self.next_run_seq += 1;
            self.history.push_front(JobRunResult {
                id: format!("run-{}", self.next_run_seq),
                scraper_id,
                scraper_name,
                start_time,
                duration,
                items_scraped,
                outcome,
                error_details,
            });
        }
        true
    }

    pub fn active_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|job| job.status == ScraperStatus::Running)
            .count()
    }

    pub fn total_products(&self) -> u64 {
        self.jobs.iter().map(|job| job.products_count).sum()
    }

    /// Percentage of recorded runs that succeeded, `None` without history.
    pub fn success_rate(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        let succeeded = self
            .history
            .iter()
            .filter(|run| run.outcome == RunOutcome::Success)
            .count();
        Some(succeeded as f64 * 100.0 / self.history.len() as f64)
    }
}
