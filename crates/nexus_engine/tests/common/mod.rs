#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use nexus_engine::{
    DispatchError, DispatchReport, EngineEvent, JobRegistry, JobSpec, LogLine, Pacing,
    ProgressSink, RemoteBackend, RunCompletion, Selectors, SimulationSettings, Strategy,
};

pub fn init_logging() {
    nexus_logging::initialize_for_tests();
}

pub fn job(id: &str, strategy: Strategy) -> JobSpec {
    JobSpec {
        id: id.to_string(),
        name: format!("Shop {id}"),
        url: "https://www.mh.com.fj".to_string(),
        strategy,
        selectors: Selectors {
            product_container: "div.product-card".to_string(),
            name: "h2.title".to_string(),
            price: "span.price".to_string(),
            image: "img".to_string(),
        },
    }
}

pub fn fast_simulation(seed: u64) -> SimulationSettings {
    SimulationSettings {
        pacing: Pacing::none(),
        seed: Some(seed),
        ..SimulationSettings::default()
    }
}

/// Records every event. Optionally stops a job when a line containing `trigger` appears.
#[derive(Default)]
pub struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
    stop_on: Option<(String, JobRegistry, String)>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stopping_on(trigger: &str, registry: JobRegistry, job_id: &str) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            stop_on: Some((trigger.to_string(), registry, job_id.to_string())),
        }
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::Log { line, .. } => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|line| line.message).collect()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages()
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }

    pub fn finished(&self) -> Vec<RunCompletion> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::RunFinished { completion, .. } => Some(completion),
                _ => None,
            })
            .collect()
    }

    /// Item counts reported by "Page i: Successfully extracted N items" lines.
    pub fn page_counts(&self) -> Vec<u64> {
        self.messages()
            .iter()
            .filter_map(|message| {
                let rest = message.split("Successfully extracted ").nth(1)?;
                rest.split_whitespace().next()?.parse().ok()
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        if let (Some((trigger, registry, job_id)), EngineEvent::Log { line, .. }) =
            (&self.stop_on, &event)
        {
            if line.message.contains(trigger.as_str()) {
                registry.stop(job_id);
            }
        }
        self.events.lock().unwrap().push(event);
    }
}

/// Scripted backend that counts calls.
pub struct FakeBackend {
    healthy: bool,
    response: Result<DispatchReport, DispatchError>,
    dispatches: AtomicUsize,
    stop_during_dispatch: Mutex<Option<(JobRegistry, String)>>,
}

impl FakeBackend {
    pub fn new(healthy: bool, response: Result<DispatchReport, DispatchError>) -> Arc<Self> {
        Arc::new(Self {
            healthy,
            response,
            dispatches: AtomicUsize::new(0),
            stop_during_dispatch: Mutex::new(None),
        })
    }

    pub fn succeeding(count: u64) -> Arc<Self> {
        Self::new(
            true,
            Ok(DispatchReport {
                success: true,
                count,
                log: vec!["[Server] crawled 2 categories".to_string()],
            }),
        )
    }

    pub fn stop_during_dispatch(&self, registry: JobRegistry, job_id: &str) {
        *self.stop_during_dispatch.lock().unwrap() = Some((registry, job_id.to_string()));
    }

    pub fn dispatches(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RemoteBackend for FakeBackend {
    async fn check_health(&self) -> bool {
        self.healthy
    }

    async fn dispatch(&self, _job: &JobSpec) -> Result<DispatchReport, DispatchError> {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        if let Some((registry, job_id)) = self.stop_during_dispatch.lock().unwrap().as_ref() {
            registry.stop(job_id);
        }
        self.response.clone()
    }
}
