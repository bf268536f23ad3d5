//! User-visible notifications

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Sink for user-visible messages (the UI status line, a test recorder, ...)
pub trait Notify {
    fn notify(&mut self, message: &str, severity: Severity);
}

