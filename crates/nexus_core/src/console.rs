#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Display-only; ordering is emission order.
    pub timestamp: String,
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    pub fn new(timestamp: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Append-only console log shared by all runs.
///
/// Entries keep emission order. There is no size bound; only the operator
/// clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogSink {
    entries: Vec<LogEntry>,
    generation: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.clone()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped on every clear so renderers can tell a clear from a no-op.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
