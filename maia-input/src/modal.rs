//! Modal state machine for vim-style input handling

use crate::commands::{parse_command, Command};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use maia_audio::TrackRole;

/// Volume step for `-`/`=` keys (percent)
const VOLUME_STEP: f32 = 5.0;
/// Seek step for arrow keys (seconds)
const NUDGE_STEP: f64 = 5.0;

/// Input modes (vim-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Command,
    Help,
    Browser,
}

impl Mode {
    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
            Mode::Help => "HELP",
            Mode::Browser => "SAMPLES",
        }
    }
}

/// Handles keyboard input and converts to commands
pub struct InputHandler {
    mode: Mode,
    command_buffer: String,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            command_buffer: String::new(),
        }
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get current command buffer (for display)
    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        match self.mode {
            Mode::Normal => self.handle_normal_mode(key),
            Mode::Command => self.handle_command_mode(key),
            Mode::Help => self.handle_help_mode(key),
            Mode::Browser => self.handle_browser_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            // Mode switching
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_buffer.clear();
                Some(Command::EnterCommandMode)
            }
            KeyCode::Char('?') => {
                self.mode = Mode::Help;
                Some(Command::ToggleHelp)
            }
            KeyCode::Char('/') | KeyCode::Char('o') => {
                self.mode = Mode::Browser;
                Some(Command::EnterBrowserMode)
            }

            // Playback
            KeyCode::Char(' ') | KeyCode::Char('s') => Some(Command::ToggleSync),
            KeyCode::Char('a') => Some(Command::TogglePlay(TrackRole::Original)),
            KeyCode::Char('A') | KeyCode::Char('b') => {
                Some(Command::TogglePlay(TrackRole::Adversarial))
            }

            // Volume: original on -/=, adversarial on _/+
            KeyCode::Char('-') => Some(Command::AdjustVolume(TrackRole::Original, -VOLUME_STEP)),
            KeyCode::Char('=') => Some(Command::AdjustVolume(TrackRole::Original, VOLUME_STEP)),
            KeyCode::Char('_') => {
                Some(Command::AdjustVolume(TrackRole::Adversarial, -VOLUME_STEP))
            }
            KeyCode::Char('+') => Some(Command::AdjustVolume(TrackRole::Adversarial, VOLUME_STEP)),

            // Seeking
            KeyCode::Char('h') | KeyCode::Left => Some(Command::Nudge(-NUDGE_STEP)),
            KeyCode::Char('l') | KeyCode::Right => Some(Command::Nudge(NUDGE_STEP)),
            KeyCode::Char('0') => Some(Command::JumpToTime(0.0)),
            KeyCode::Char(c @ '1'..='9') => Some(Command::JumpToRegion((c as u8 - b'0') as usize)),

            // Samples
            KeyCode::Char('n') | KeyCode::Down => Some(Command::NextSample),
            KeyCode::Char('p') | KeyCode::Up => Some(Command::PrevSample),

            KeyCode::Char('c') => Some(Command::ToggleCharts),

            // Quit
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }

            KeyCode::Esc => Some(Command::Cancel),

            _ => None,
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                let buffer = std::mem::take(&mut self.command_buffer);
                let command = parse_command(&buffer).unwrap_or_else(Command::Invalid);
                self.mode = if command == Command::ToggleHelp {
                    Mode::Help
                } else {
                    Mode::Normal
                };
                Some(command)
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.command_buffer.clear();
                Some(Command::EnterNormalMode)
            }
            KeyCode::Backspace => {
                self.command_buffer.pop();
                if self.command_buffer.is_empty() {
                    self.mode = Mode::Normal;
                    Some(Command::EnterNormalMode)
                } else {
                    None
                }
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
                None
            }
            _ => None,
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.mode = Mode::Normal;
                Some(Command::ToggleHelp)
            }
            KeyCode::Char('k') | KeyCode::Up => Some(Command::HelpScrollUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Command::HelpScrollDown),
            _ => None,
        }
    }

    fn handle_browser_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                Some(Command::EnterNormalMode)
            }

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => Some(Command::BrowserSelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Command::BrowserSelectPrev),
            KeyCode::Char('g') => Some(Command::BrowserSelectFirst),
            KeyCode::Char('G') => Some(Command::BrowserSelectLast),

            KeyCode::Enter => {
                self.mode = Mode::Normal;
                Some(Command::BrowserLoadSelected)
            }

            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
