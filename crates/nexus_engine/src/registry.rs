use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Active,
    /// Stop requested; the run has not reached its end yet.
    Stopping,
}

/// Jobs with a run in flight, and whether each run is meant to keep going.
///
/// A run polls [`JobRegistry::is_active`] at its checkpoints and winds down once that
/// turns false. The entry stays until the run itself calls [`JobRegistry::finish`], so
/// a new run of the same job cannot start while a stopped one is still winding down.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    runs: Arc<Mutex<HashMap<JobId, RunState>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a run. Returns false while any earlier run of the job is in flight.
    pub fn start(&self, job_id: &str) -> bool {
        let mut runs = self.lock();
        if runs.contains_key(job_id) {
            return false;
        }
        runs.insert(job_id.to_string(), RunState::Active);
        true
    }

    pub fn is_active(&self, job_id: &str) -> bool {
        self.lock().get(job_id) == Some(&RunState::Active)
    }

    /// True from [`JobRegistry::start`] until [`JobRegistry::finish`], stopped or not.
    pub fn is_in_flight(&self, job_id: &str) -> bool {
        self.lock().contains_key(job_id)
    }

    /// Requests a stop. Returns whether the job was active; repeated stops are no-ops.
    pub fn stop(&self, job_id: &str) -> bool {
        match self.lock().get_mut(job_id) {
            Some(state @ RunState::Active) => {
                *state = RunState::Stopping;
                true
            }
            _ => false,
        }
    }

    /// Drops the entry when a run ends, however it ends.
    pub fn finish(&self, job_id: &str) {
        self.lock().remove(job_id);
    }

    /// Jobs whose runs are meant to keep going, sorted.
    pub fn active_ids(&self) -> Vec<JobId> {
        let mut ids: Vec<_> = self
            .lock()
            .iter()
            .filter(|(_, state)| **state == RunState::Active)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, RunState>> {
        // Map operations cannot leave an entry half-updated.
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::JobRegistry;

    #[test]
    fn start_rejects_duplicates() {
        let registry = JobRegistry::new();
        assert!(registry.start("a"));
        assert!(!registry.start("a"));
        assert_eq!(registry.active_ids(), vec!["a".to_string()]);
    }

    #[test]
    fn stop_is_idempotent() {
        let registry = JobRegistry::new();
        registry.start("a");
        assert!(registry.stop("a"));
        assert!(!registry.stop("a"));
        assert!(!registry.is_active("a"));
        assert!(!registry.stop("missing"));
    }

    #[test]
    fn stopped_run_blocks_restart_until_finished() {
        let registry = JobRegistry::new();
        registry.start("a");
        registry.stop("a");
        assert!(registry.is_in_flight("a"));
        assert!(!registry.start("a"));
        assert!(registry.active_ids().is_empty());

        registry.finish("a");
        assert!(!registry.is_in_flight("a"));
        assert!(registry.start("a"));
        assert!(registry.is_active("a"));
    }

    #[test]
    fn clones_share_the_same_map() {
        let registry = JobRegistry::new();
        let other = registry.clone();
        registry.start("a");
        assert!(other.is_active("a"));
        other.finish("a");
        assert!(!registry.is_active("a"));
    }
}
