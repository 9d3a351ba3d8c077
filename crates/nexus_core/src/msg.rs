#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Configuration form saved. `editing` is `None` for a new scraper.
    ScraperSaved {
        editing: Option<crate::JobId>,
        draft: crate::ScraperDraft,
    },
    /// User clicked Run Now.
    RunClicked(crate::JobId),
    /// User clicked Stop.
    StopClicked(crate::JobId),
    /// User opened or closed the live console.
    ConsoleToggled,
    /// User cleared the live console.
    ConsoleCleared,
    /// Startup health check resolved.
    BackendChecked { available: bool },
    /// Engine emitted a console line.
    LogEmitted(crate::LogEntry),
    /// Engine finished a run.
    RunFinished {
        job_id: crate::JobId,
        completion: crate::RunCompletion,
    },
    /// Idle tick from the console loop; carries no change.
    Tick,
}
