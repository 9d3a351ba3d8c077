use std::fmt::Display;

use chrono::Local;
use nexus_logging::nexus_debug;

use crate::{EngineEvent, JobRegistry, JobSpec, LogLine, ProgressSink, RunError, Severity};

/// What a run needs at hand: its job, the registry to poll and the sink to report to.
pub(crate) struct RunContext<'a> {
    pub(crate) job: &'a JobSpec,
    registry: &'a JobRegistry,
    sink: &'a dyn ProgressSink,
}

impl<'a> RunContext<'a> {
    pub(crate) fn new(job: &'a JobSpec, registry: &'a JobRegistry, sink: &'a dyn ProgressSink) -> Self {
        Self {
            job,
            registry,
            sink,
        }
    }

    /// Fails with [`RunError::Cancelled`] once the job has left the registry.
    pub(crate) fn checkpoint(&self) -> Result<(), RunError> {
        if self.registry.is_active(&self.job.id) {
            Ok(())
        } else {
            nexus_debug!("Job {} observed cancellation at checkpoint", self.job.id);
            Err(RunError::Cancelled)
        }
    }

    pub(crate) fn emit(&self, severity: Severity, message: impl Into<String>) {
        emit_line(self.sink, &self.job.id, severity, message);
    }

    /// Prefixes a message with the scraper name, as per-job pipeline lines are.
    pub(crate) fn tagged(&self, text: impl Display) -> String {
        format!("[{}] {}", self.job.name, text)
    }
}

pub(crate) fn emit_line(
    sink: &dyn ProgressSink,
    job_id: &str,
    severity: Severity,
    message: impl Into<String>,
) {
    sink.emit(EngineEvent::Log {
        job_id: job_id.to_string(),
        line: LogLine {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            severity,
        },
    });
}
