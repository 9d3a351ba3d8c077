use chrono::{DateTime, Local};
use nexus_core::{AppViewModel, BackendStatus, LogEntry, RowAction, Severity};

/// Tracks what has already been written to the terminal.
#[derive(Debug, Default)]
pub struct ConsolePrinter {
    generation: u64,
    printed: usize,
    last_status: Option<String>,
}

impl ConsolePrinter {
    /// Console lines not yet shown. Hidden consoles keep their backlog for later.
    pub fn fresh_lines(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut out = Vec::new();
        if view.console_generation != self.generation {
            self.generation = view.console_generation;
            self.printed = 0;
            out.push("-- console cleared --".to_string());
        }
        if !view.console_open {
            return out;
        }
        if self.printed > view.console.len() {
            self.printed = 0;
        }
        out.extend(view.console[self.printed..].iter().map(console_line));
        self.printed = view.console.len();
        out
    }

    /// Summary line, only when it differs from the last one returned.
    pub fn status_change(&mut self, view: &AppViewModel) -> Option<String> {
        let status = status_line(view);
        if self.last_status.as_deref() == Some(status.as_str()) {
            return None;
        }
        self.last_status = Some(status.clone());
        Some(status)
    }
}

pub fn console_line(entry: &LogEntry) -> String {
    let marker = match entry.severity {
        Severity::Info => ' ',
        Severity::Success => '+',
        Severity::Error => '!',
    };
    format!("{} {} {}", entry.timestamp, marker, entry.message)
}

pub fn status_line(view: &AppViewModel) -> String {
    let backend = match view.backend {
        BackendStatus::Unknown => "checking backend",
        BackendStatus::Connected => "BACKEND CONNECTED",
        BackendStatus::Simulation => "SIMULATION MODE",
    };
    let rate = view
        .success_rate
        .map(|rate| format!("{rate:.1}%"))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "[{backend}] active {} | products {} | success {}",
        view.active_jobs, view.total_products, rate
    )
}

pub fn scrapers_table(view: &AppViewModel) -> String {
    let mut out = format!(
        "{:<4} {:<20} {:<8} {:<10} {:>9}  {:<16} {:<14} {}\n",
        "ID", "NAME", "STRATEGY", "STATUS", "PRODUCTS", "LAST RUN", "SCHEDULE", "ACTION"
    );
    for row in &view.scrapers {
        let action = match row.action {
            RowAction::Run => "run",
            RowAction::Stop => "stop",
        };
        out.push_str(&format!(
            "{:<4} {:<20} {:<8} {:<10} {:>9}  {:<16} {:<14} {}\n",
            row.id,
            row.name,
            row.strategy.as_str(),
            row.status.as_str(),
            row.products_count,
            row.last_run.as_deref().map(local_time).unwrap_or_else(|| "never".to_string()),
            row.schedule,
            action
        ));
    }
    out
}

pub fn history_table(view: &AppViewModel) -> String {
    let mut out = format!(
        "{:<10} {:<20} {:<16} {:>8} {:>7}  {:<8} {}\n",
        "RUN", "SCRAPER", "STARTED", "DURATION", "ITEMS", "RESULT", "DETAILS"
    );
    for run in &view.recent_runs {
        out.push_str(&format!(
            "{:<10} {:<20} {:<16} {:>8} {:>7}  {:<8} {}\n",
            run.id,
            run.scraper_name,
            local_time(&run.start_time),
            run.duration,
            run.items_scraped,
            run.outcome.as_str(),
            run.error_details.as_deref().unwrap_or("")
        ));
    }
    out
}

/// RFC3339 to local `YYYY-MM-DD HH:MM`; anything else is shown as given.
fn local_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(time) => time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}
