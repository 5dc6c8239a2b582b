use crate::model::Severity;
use tracing::{info, warn};

/// Fire-and-forget user notices ("Nothing to undo", "Node removed").
pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Sends notices to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Warning | Severity::Error => warn!(severity = %severity, "{message}"),
            Severity::Info | Severity::Success => info!(severity = %severity, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

/// Queues notices for the UI shell to drain after each command.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Vec<Notice>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        LogNotifier.notify(message, severity);
        self.notices.push(Notice {
            message: message.to_string(),
            severity,
        });
    }
}
