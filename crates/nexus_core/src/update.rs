use nexus_logging::{nexus_info, nexus_warn};

use crate::{AppState, BackendStatus, Effect, Msg, RunRequest, ScraperStatus};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RunClicked(job_id) => {
            let Some(job) = state.store().get(&job_id) else {
                return (state, Vec::new());
            };
            // At most one run per job.
            if job.status == ScraperStatus::Running {
                return (state, Vec::new());
            }
            let request = RunRequest {
                job_id: job.id.clone(),
                name: job.name.clone(),
                base_url: job.base_url.clone(),
                strategy: job.strategy,
                selectors: job.selectors.clone(),
            };
            state
                .store_mut()
                .update(&job_id, |job| job.status = ScraperStatus::Running);
            state.ui_mut().console_open = true;
            state.mark_dirty();
            vec![Effect::StartRun(request)]
        }
        Msg::StopClicked(job_id) => match state.store().get(&job_id) {
            Some(job) if job.status == ScraperStatus::Running => vec![Effect::StopRun {
                job_id: job.id.clone(),
                name: job.name.clone(),
            }],
            _ => Vec::new(),
        },
        Msg::ScraperSaved { editing, draft } => {
            match editing {
                Some(job_id) => {
                    let running = state
                        .store()
                        .get(&job_id)
                        .map(|job| job.status == ScraperStatus::Running);
                    match running {
                        None => nexus_warn!("Ignoring edit for unknown scraper {}", job_id),
                        Some(true) => {
                            nexus_warn!("Ignoring edit for scraper {} while it runs", job_id)
                        }
                        Some(false) => match draft.validate() {
                            Ok(()) => {
                                state
                                    .store_mut()
                                    .update(&job_id, |job| draft.apply_to(job));
                                state.mark_dirty();
                            }
                            Err(err) => {
                                nexus_warn!("Rejected configuration for {}: {}", job_id, err)
                            }
                        },
                    }
                }
                None => match state.store_mut().create(draft) {
                    Ok(job_id) => {
                        nexus_info!("Created scraper {}", job_id);
                        state.mark_dirty();
                    }
                    Err(err) => nexus_warn!("Rejected new scraper configuration: {}", err),
                },
            }
            Vec::new()
        }
        Msg::ConsoleToggled => {
            let ui = state.ui_mut();
            ui.console_open = !ui.console_open;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ConsoleCleared => {
            state.console_mut().clear();
            state.mark_dirty();
            Vec::new()
        }
        Msg::BackendChecked { available } => {
            state.set_backend(if available {
                BackendStatus::Connected
            } else {
                BackendStatus::Simulation
            });
            state.mark_dirty();
            Vec::new()
        }
        Msg::LogEmitted(entry) => {
            state.console_mut().append(entry);
            state.mark_dirty();
            Vec::new()
        }
        Msg::RunFinished { job_id, completion } => {
            if state.store_mut().complete_run(&job_id, completion) {
                state.mark_dirty();
            } else {
                nexus_warn!("Run finished for unknown scraper {}", job_id);
            }
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
