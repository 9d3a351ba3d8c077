use crate::view_model::{AppViewModel, RowAction, ScraperRowView};
use crate::{JobStateStore, LogSink, ScraperStatus};

/// What the operator is told about the remote execution service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendStatus {
    /// Health check still in flight.
    #[default]
    Unknown,
    Connected,
    Simulation,
}

/// Presentation-only state, kept apart from job and log state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct UiState {
    pub(crate) console_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    store: JobStateStore,
    console: LogSink,
    ui: UiState,
    backend: BackendStatus,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: JobStateStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &JobStateStore {
        &self.store
    }

    pub fn console(&self) -> &LogSink {
        &self.console
    }

    pub fn backend(&self) -> BackendStatus {
        self.backend
    }

    pub fn view(&self) -> AppViewModel {
        let scrapers = self
            .store
            .jobs()
            .iter()
            .map(|job| {
                let running = job.status == ScraperStatus::Running;
                ScraperRowView {
                    id: job.id.clone(),
                    name: job.name.clone(),
                    base_url: job.base_url.clone(),
                    strategy: job.strategy,
                    status: job.status,
                    products_count: job.products_count,
                    last_run: job.last_run.clone(),
                    schedule: job.schedule.clone(),
                    can_configure: !running,
                    action: if running { RowAction::Stop } else { RowAction::Run },
                }
            })
            .collect();

        AppViewModel {
            backend: self.backend,
            active_jobs: self.store.active_count(),
            total_products: self.store.total_products(),
            success_rate: self.store.success_rate(),
            scrapers,
            recent_runs: self.store.history().cloned().collect(),
            console_open: self.ui.console_open,
            console: self.console.snapshot(),
            console_generation: self.console.generation(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn store_mut(&mut self) -> &mut JobStateStore {
        &mut self.store
    }

    pub(crate) fn console_mut(&mut self) -> &mut LogSink {
        &mut self.console
    }

    pub(crate) fn ui_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    pub(crate) fn set_backend(&mut self, backend: BackendStatus) {
        self.backend = backend;
    }
}
