//! Nexus core: job state store, console log and the pure update state machine.
mod console;
mod effect;
mod msg;
mod state;
mod store;
mod types;
mod update;
mod view_model;

pub use console::{LogEntry, LogSink, Severity};
pub use effect::{Effect, RunRequest};
pub use msg::Msg;
pub use state::{AppState, BackendStatus};
pub use store::JobStateStore;
pub use types::{
    DraftError, JobId, JobRunResult, RunCompletion, RunOutcome, ScraperConfig, ScraperDraft,
    ScraperStatus, SelectorSet, SiteStrategy,
};
pub use update::update;
pub use view_model::{AppViewModel, RowAction, ScraperRowView};
