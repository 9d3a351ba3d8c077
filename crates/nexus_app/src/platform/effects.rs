use nexus_core::{
    Effect, LogEntry, Msg, RunCompletion as CoreCompletion, RunRequest, SelectorSet,
    Severity as CoreSeverity, SiteStrategy,
};
use nexus_engine::{
    EngineEvent, EngineHandle, EngineSettings, JobSpec, LogLine, RunCompletion, Selectors,
    Severity, Strategy,
};
use nexus_logging::{nexus_debug, nexus_info};

/// Carries core effects to the engine and engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            engine: EngineHandle::new(settings),
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRun(request) => {
                    nexus_info!(
                        "StartRun job_id={} strategy={}",
                        request.job_id,
                        request.strategy
                    );
                    if !self.engine.run(job_spec(request)) {
                        nexus_debug!("Engine declined run request");
                    }
                }
                Effect::StopRun { job_id, name } => {
                    nexus_info!("StopRun job_id={}", job_id);
                    self.engine.stop(&job_id, &name);
                }
            }
        }
    }

    /// Everything the engine reported since the last call, oldest first.
    pub fn drain(&self) -> Vec<Msg> {
        std::iter::from_fn(|| self.engine.try_recv())
            .map(event_to_msg)
            .collect()
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

fn job_spec(request: RunRequest) -> JobSpec {
    JobSpec {
        id: request.job_id,
        name: request.name,
        url: request.base_url,
        strategy: map_strategy(request.strategy),
        selectors: map_selectors(request.selectors),
    }
}

fn map_strategy(strategy: SiteStrategy) -> Strategy {
    match strategy {
        SiteStrategy::Static => Strategy::Static,
        SiteStrategy::Dynamic => Strategy::Dynamic,
        SiteStrategy::Api => Strategy::Api,
    }
}

fn map_selectors(selectors: SelectorSet) -> Selectors {
    Selectors {
        product_container: selectors.product_container,
        name: selectors.name,
        price: selectors.price,
        image: selectors.image,
    }
}

fn map_line(line: LogLine) -> LogEntry {
    let severity = match line.severity {
        Severity::Info => CoreSeverity::Info,
        Severity::Success => CoreSeverity::Success,
        Severity::Error => CoreSeverity::Error,
    };
    LogEntry::new(line.timestamp, line.message, severity)
}

fn map_completion(completion: RunCompletion) -> CoreCompletion {
    match completion {
        RunCompletion::Succeeded(summary) => CoreCompletion::Succeeded {
            items: summary.items,
            started_at: summary.started_at,
            finished_at: summary.finished_at,
            duration: summary.duration,
        },
        RunCompletion::Stopped => CoreCompletion::Stopped,
        RunCompletion::Failed {
            started_at,
            duration,
            detail,
        } => CoreCompletion::Failed {
            started_at,
            duration,
            detail,
        },
    }
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::BackendChecked { available } => Msg::BackendChecked { available },
        EngineEvent::Log { line, .. } => Msg::LogEmitted(map_line(line)),
        EngineEvent::RunFinished { job_id, completion } => Msg::RunFinished {
            job_id,
            completion: map_completion(completion),
        },
    }
}
