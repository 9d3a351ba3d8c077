use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use nexus_logging::{nexus_error, nexus_info, nexus_warn};
use tokio::sync::mpsc as async_mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::context::{emit_line, RunContext};
use crate::health::{check_backend_health, Availability, BackendAvailability};
use crate::simulate::{run_simulation, SimulationSettings};
use crate::{
    BackendSettings, DispatchError, EngineEvent, JobId, JobRegistry, JobSpec, RemoteBackend,
    ReqwestBackend, RunCompletion, RunError, RunSource, RunSummary, Severity,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub backend: BackendSettings,
    pub simulation: SimulationSettings,
}

/// Runs jobs: remote dispatch when the backend is known to be up, local simulation otherwise.
pub struct Engine {
    backend: Arc<dyn RemoteBackend>,
    registry: JobRegistry,
    availability: BackendAvailability,
    simulation: SimulationSettings,
}

impl Engine {
    pub fn new(backend: Arc<dyn RemoteBackend>, simulation: SimulationSettings) -> Self {
        Self {
            backend,
            registry: JobRegistry::new(),
            availability: BackendAvailability::new(),
            simulation,
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn availability(&self) -> &BackendAvailability {
        &self.availability
    }

    /// One-shot startup health check; reports the result through the sink.
    pub async fn check_health(&self, sink: &dyn ProgressSink) -> bool {
        let available = check_backend_health(self.backend.as_ref(), &self.availability).await;
        sink.emit(EngineEvent::BackendChecked { available });
        available
    }

    /// Registers a run and announces it. Returns false if the job is running, or was
    /// stopped and has not wound down yet.
    pub fn begin(&self, job: &JobSpec, sink: &dyn ProgressSink) -> bool {
        if !self.registry.start(&job.id) {
            nexus_warn!("Ignoring run request for {}: previous run still in flight", job.id);
            return false;
        }
        nexus_info!("Run started job_id={} strategy={:?}", job.id, job.strategy);
        emit_line(
            sink,
            &job.id,
            Severity::Info,
            format!(
                "[System] Launching agent for {} ({})...",
                job.name,
                job.strategy.as_str()
            ),
        );
        true
    }

    /// Requests a cooperative stop. Silent when the job is not running.
    pub fn stop(&self, job_id: &str, name: &str, sink: &dyn ProgressSink) -> bool {
        if !self.registry.stop(job_id) {
            return false;
        }
        nexus_info!("Stop requested job_id={}", job_id);
        emit_line(
            sink,
            job_id,
            Severity::Error,
            format!("[System] Stopping scraper agent for {name}..."),
        );
        true
    }

    /// Drives a run registered with [`Engine::begin`] to its end and reports the completion.
    pub async fn execute(&self, job: &JobSpec, sink: &dyn ProgressSink) -> RunCompletion {
        let guard = FinishGuard {
            registry: &self.registry,
            job_id: &job.id,
        };
        let started_at = Utc::now().to_rfc3339();
        let clock = Instant::now();
        let ctx = RunContext::new(job, &self.registry, sink);

        let completion = match self.drive(&ctx).await {
            Ok((items, source)) => {
                nexus_info!("Run finished job_id={} items={} source={:?}", job.id, items, source);
                RunCompletion::Succeeded(RunSummary {
                    items,
                    started_at,
                    finished_at: Utc::now().to_rfc3339(),
                    duration: format_duration(clock.elapsed()),
                    source,
                })
            }
            Err(RunError::Cancelled) => {
                nexus_info!("Run stopped job_id={}", job.id);
                ctx.emit(Severity::Error, ctx.tagged("Process stopped by user request."));
                RunCompletion::Stopped
            }
            Err(RunError::Failed(detail)) => {
                nexus_error!("Run failed job_id={}: {}", job.id, detail);
                ctx.emit(
                    Severity::Error,
                    ctx.tagged(format_args!("Critical Error: {detail}")),
                );
                RunCompletion::Failed {
                    started_at,
                    duration: format_duration(clock.elapsed()),
                    detail,
                }
            }
        };

        drop(guard);
        sink.emit(EngineEvent::RunFinished {
            job_id: job.id.clone(),
            completion: completion.clone(),
        });
        completion
    }

    async fn drive(&self, ctx: &RunContext<'_>) -> Result<(u64, RunSource), RunError> {
        ctx.checkpoint()?;

        match self.availability.get() {
            Availability::Available => {
                ctx.emit(
                    Severity::Info,
                    "[System] Connected to backend server. Dispatching job...",
                );
                match self.dispatch_remote(ctx).await? {
                    Ok(items) => return Ok((items, RunSource::Remote)),
                    Err(err) => {
                        nexus_warn!("Dispatch failed job_id={}: {}", ctx.job.id, err);
                        ctx.emit(
                            Severity::Error,
                            format!("[Error] Backend failure: {err}. Falling back to simulation..."),
                        );
                    }
                }
            }
            Availability::Unavailable => {
                ctx.emit(
                    Severity::Info,
                    "[System] Backend unavailable. Starting realistic simulation...",
                );
            }
            Availability::Unknown => {
                ctx.emit(
                    Severity::Info,
                    "[System] Backend status unknown. Starting realistic simulation...",
                );
            }
        }

        let items = run_simulation(ctx, &self.simulation).await?;
        Ok((items, RunSource::Simulated))
    }

    /// Outer error: the run was cancelled. Inner error: fall back to simulation.
    async fn dispatch_remote(
        &self,
        ctx: &RunContext<'_>,
    ) -> Result<Result<u64, DispatchError>, RunError> {
        let outcome = self.backend.dispatch(ctx.job).await;
        // Stopped while the request was in flight: drop whatever came back.
        ctx.checkpoint()?;

        let report = match outcome {
            Ok(report) if report.success => report,
            Ok(_) => return Ok(Err(DispatchError::Rejected)),
            Err(err) => return Ok(Err(err)),
        };

        for line in report.log {
            ctx.emit(Severity::Info, line);
        }
        ctx.emit(
            Severity::Success,
            format!("[Server] Job finished. Scraped {} items.", report.count),
        );
        Ok(Ok(report.count))
    }
}

struct FinishGuard<'a> {
    registry: &'a JobRegistry,
    job_id: &'a str,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.registry.finish(self.job_id);
    }
}

/// Formats a run duration as `"{m}m {s}s"`.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

enum EngineCommand {
    Run(JobSpec),
}

/// Owns the engine thread. Runs are multiplexed on one current-thread runtime.
pub struct EngineHandle {
    engine: Arc<Engine>,
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: mpsc::Receiver<EngineEvent>,
    shutdown: CancellationToken,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Self {
        let backend = Arc::new(ReqwestBackend::new(settings.backend));
        Self::with_backend(backend, settings.simulation)
    }

    pub fn with_backend(backend: Arc<dyn RemoteBackend>, simulation: SimulationSettings) -> Self {
        let engine = Arc::new(Engine::new(backend, simulation));
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();

        let thread = {
            let engine = engine.clone();
            let event_tx = event_tx.clone();
            let shutdown = shutdown.clone();
            thread::spawn(move || run_engine_thread(engine, cmd_rx, event_tx, shutdown))
        };

        Self {
            engine,
            cmd_tx,
            event_tx,
            event_rx,
            shutdown,
            thread: Mutex::new(Some(thread)),
        }
    }

    /// Registers the job and queues its run. Returns false if a run of it is still in flight.
    pub fn run(&self, job: JobSpec) -> bool {
        let sink = ChannelProgressSink::new(self.event_tx.clone());
        if !self.engine.begin(&job, &sink) {
            return false;
        }
        let job_id = job.id.clone();
        if self.cmd_tx.send(EngineCommand::Run(job)).is_err() {
            nexus_error!("Engine thread is gone; cannot run {}", job_id);
            self.engine.registry().finish(&job_id);
            sink.emit(EngineEvent::RunFinished {
                job_id,
                completion: RunCompletion::Failed {
                    started_at: Utc::now().to_rfc3339(),
                    duration: format_duration(Duration::ZERO),
                    detail: "engine is shut down".to_string(),
                },
            });
            return false;
        }
        true
    }

    pub fn stop(&self, job_id: &str, name: &str) -> bool {
        let sink = ChannelProgressSink::new(self.event_tx.clone());
        self.engine.stop(job_id, name, &sink)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn availability(&self) -> Availability {
        self.engine.availability().get()
    }

    pub fn active_jobs(&self) -> Vec<JobId> {
        self.engine.registry().active_ids()
    }

    /// Stops accepting runs and waits for the engine thread to exit.
    /// In-flight runs are dropped with the runtime; later `run` calls report a failure.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let thread = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(thread) = thread {
            if thread.join().is_err() {
                nexus_error!("Engine thread panicked");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn run_engine_thread(
    engine: Arc<Engine>,
    mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    shutdown: CancellationToken,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            nexus_error!("Failed to start engine runtime: {}", err);
            return;
        }
    };

    runtime.block_on(async move {
        {
            let engine = engine.clone();
            let sink = ChannelProgressSink::new(event_tx.clone());
            tokio::spawn(async move {
                engine.check_health(&sink).await;
            });
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    nexus_info!("Engine shutting down");
                    break;
                }
                command = cmd_rx.recv() => match command {
                    Some(EngineCommand::Run(job)) => {
                        let engine = engine.clone();
                        let sink = ChannelProgressSink::new(event_tx.clone());
                        tokio::spawn(async move {
                            engine.execute(&job, &sink).await;
                        });
                    }
                    None => break,
                },
            }
        }
    });
}
