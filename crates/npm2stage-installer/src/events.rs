/// Receives progress text from the engine.
///
/// `progress` carries the step-by-step narration of an operation; `diagnostic`
/// carries notes about anomalies that did not stop it (skipped entries,
/// missing files tolerated during removal, rollback notices).
pub trait ProgressSink {
    fn progress(&mut self, message: &str);
    fn diagnostic(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Progress(String),
    Diagnostic(String),
}

impl ProgressEvent {
    pub fn message(&self) -> &str {
        match self {
            Self::Progress(message) | Self::Diagnostic(message) => message,
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn progress(&mut self, _message: &str) {}
    fn diagnostic(&mut self, _message: &str) {}
}

/// Keeps every event in arrival order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<ProgressEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::Diagnostic(message) => Some(message.as_str()),
                ProgressEvent::Progress(_) => None,
            })
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events
            .iter()
            .any(|event| event.message().contains(needle))
    }
}

impl ProgressSink for RecordingSink {
    fn progress(&mut self, message: &str) {
        self.events.push(ProgressEvent::Progress(message.to_string()));
    }

    fn diagnostic(&mut self, message: &str) {
        self.events
            .push(ProgressEvent::Diagnostic(message.to_string()));
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressEvent),
{
    fn progress(&mut self, message: &str) {
        self(ProgressEvent::Progress(message.to_string()));
    }

    fn diagnostic(&mut self, message: &str) {
        self(ProgressEvent::Diagnostic(message.to_string()));
    }
}
