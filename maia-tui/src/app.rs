//! Application state management

use crate::theme::Theme;
use crate::widgets::SampleListState;
use maia_audio::{DeckState, Notify, Severity, TrackRole, TrackView};
use maia_input::Mode;
use std::time::{Duration, Instant};

/// How long a status-line toast stays visible
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

/// Everything the UI shows for one track
#[derive(Debug, Clone, Default)]
pub struct TrackPanel {
    /// Controls bound by the synchronizer (label, readout, status, volume)
    pub view: TrackView,
    /// Deck snapshot (waveform, position, duration)
    pub deck: DeckState,
}

pub struct AppState {
    pub original: TrackPanel,
    pub adversarial: TrackPanel,
    pub syncing: bool,
    /// False when the audio engine failed to start
    pub player_available: bool,

    pub mode: Mode,
    pub command_buffer: String,
    pub message: Option<String>,
    pub message_type: Severity,
    message_shown_at: Option<Instant>,
    pub show_help: bool,
    pub help_scroll: u16,

    pub samples: SampleListState,
    pub show_browser: bool,
    pub show_charts: bool,

    pub theme: Theme,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            original: TrackPanel::default(),
            adversarial: TrackPanel::default(),
            syncing: false,
            player_available: true,
            mode: Mode::Normal,
            command_buffer: String::new(),
            message: None,
            message_type: Severity::Info,
            message_shown_at: None,
            show_help: false,
            help_scroll: 0,
            samples: SampleListState::default(),
            show_browser: false,
            show_charts: true,
            theme: Theme::default(),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panel_mut(&mut self, role: TrackRole) -> &mut TrackPanel {
        match role {
            TrackRole::Original => &mut self.original,
            TrackRole::Adversarial => &mut self.adversarial,
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        if mode != Mode::Command {
            self.command_buffer.clear();
        }
        self.show_browser = mode == Mode::Browser;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0;
        }
    }

    pub fn help_scroll_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(3);
    }

    pub fn help_scroll_down(&mut self) {
        self.help_scroll = self.help_scroll.saturating_add(3);
    }

    pub fn toggle_charts(&mut self) {
        self.show_charts = !self.show_charts;
    }

    pub fn set_theme(&mut self, name: &str) {
        match Theme::by_name(name) {
            Some(theme) => {
                self.theme = theme;
                self.set_success(format!("Theme set to: {}", self.theme.name));
            }
            None => self.set_error(format!("Unknown theme: {}. Use green/amber/cyber", name)),
        }
    }

    pub fn clear_message(&mut self) {
        self.message = None;
        self.message_type = Severity::Info;
        self.message_shown_at = None;
    }

    /// Show a toast that expires `MESSAGE_TIMEOUT` after `now`
    pub fn show_message(&mut self, msg: impl Into<String>, severity: Severity, now: Instant) {
        self.message = Some(msg.into());
        self.message_type = severity;
        self.message_shown_at = Some(now);
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.show_message(msg, Severity::Info, Instant::now());
    }

    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.show_message(msg, Severity::Success, Instant::now());
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.show_message(msg, Severity::Warning, Instant::now());
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.show_message(msg, Severity::Error, Instant::now());
    }

    /// Drop the toast once it has been visible for `MESSAGE_TIMEOUT` (call each frame)
    pub fn expire_message(&mut self, now: Instant) {
        if let Some(shown_at) = self.message_shown_at {
            if now.saturating_duration_since(shown_at) >= MESSAGE_TIMEOUT {
                self.clear_message();
            }
        }
    }
}

impl Notify for AppState {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.show_message(message, severity, Instant::now());
    }
}

/// Main application wrapper
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires_after_timeout() {
        let mut state = AppState::new();
        let now = Instant::now();
        state.show_message("Failed to load original audio", Severity::Error, now);

        state.expire_message(now + Duration::from_millis(2900));
        assert_eq!(state.message.as_deref(), Some("Failed to load original audio"));
        assert_eq!(state.message_type, Severity::Error);

        state.expire_message(now + MESSAGE_TIMEOUT);
        assert!(state.message.is_none());
        assert_eq!(state.message_type, Severity::Info);
    }

    #[test]
    fn test_newer_toast_restarts_timer() {
        let mut state = AppState::new();
        let now = Instant::now();
        state.show_message("first", Severity::Info, now);
        state.show_message("second", Severity::Warning, now + Duration::from_secs(2));
        state.expire_message(now + Duration::from_secs(4));
        assert_eq!(state.message.as_deref(), Some("second"));
    }

    #[test]
    fn test_notify_sets_message() {
        let mut state = AppState::new();
        state.notify("Audio player unavailable", Severity::Warning);
        assert_eq!(state.message.as_deref(), Some("Audio player unavailable"));
        assert_eq!(state.message_type, Severity::Warning);
    }

    #[test]
    fn test_unknown_theme_keeps_current() {
        let mut state = AppState::new();
        state.set_theme("amber");
        assert_eq!(state.theme.name, "amber");
        state.set_theme("plaid");
        assert_eq!(state.theme.name, "amber");
        assert_eq!(state.message_type, Severity::Error);
    }

    #[test]
    fn test_mode_switch_clears_command_buffer() {
        let mut state = AppState::new();
        state.set_mode(Mode::Command);
        state.command_buffer.push_str("sam");
        state.set_mode(Mode::Browser);
        assert!(state.command_buffer.is_empty());
        assert!(state.show_browser);
        state.set_mode(Mode::Normal);
        assert!(!state.show_browser);
    }
}
