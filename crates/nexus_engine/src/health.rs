use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use nexus_logging::nexus_info;

use crate::RemoteBackend;

/// Result of the one-shot startup health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Health check has not resolved yet. Runs must not dispatch remotely.
    Unknown,
    Available,
    Unavailable,
}

const UNKNOWN: u8 = 0;
const AVAILABLE: u8 = 1;
const UNAVAILABLE: u8 = 2;

/// Process-lifetime cache of the health check result, shared by every run.
#[derive(Debug, Clone, Default)]
pub struct BackendAvailability {
    state: Arc<AtomicU8>,
}

impl BackendAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Availability {
        match self.state.load(Ordering::Acquire) {
            AVAILABLE => Availability::Available,
            UNAVAILABLE => Availability::Unavailable,
            _ => Availability::Unknown,
        }
    }

    /// Records the health check result. Only the first resolution sticks.
    pub fn resolve(&self, available: bool) -> Availability {
        let value = if available { AVAILABLE } else { UNAVAILABLE };
        let _ = self
            .state
            .compare_exchange(UNKNOWN, value, Ordering::AcqRel, Ordering::Acquire);
        self.get()
    }
}

/// Checks backend health once and caches the answer.
pub async fn check_backend_health(backend: &dyn RemoteBackend, availability: &BackendAvailability) -> bool {
    let healthy = backend.check_health().await;
    let resolved = availability.resolve(healthy);
    nexus_info!("Backend health check resolved: {:?}", resolved);
    resolved == Availability::Available
}
