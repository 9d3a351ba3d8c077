//! Nexus engine: job registry, backend health check and the run pipeline.
mod advisor;
mod backend;
mod context;
mod engine;
mod health;
mod registry;
mod simulate;
mod types;

pub use advisor::{
    suggest_or_default, AdvisorError, OfflineAdvisor, SelectorAdvisor, SelectorPrediction,
    MAX_SAMPLE_CHARS,
};
pub use backend::{BackendSettings, RemoteBackend, ReqwestBackend, HEALTH_PATH, SCRAPE_PATH};
pub use engine::{
    format_duration, ChannelProgressSink, Engine, EngineHandle, EngineSettings, ProgressSink,
};
pub use health::{check_backend_health, Availability, BackendAvailability};
pub use registry::JobRegistry;
pub use simulate::{Pacing, SimulationSettings};
pub use types::{
    DispatchError, DispatchReport, EngineEvent, JobId, JobSpec, LogLine, RunCompletion,
    RunError, RunSource, RunSummary, Selectors, Severity, Strategy,
};
