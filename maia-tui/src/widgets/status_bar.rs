//! Status bar widget - mode indicator, command line, and toasts

use crate::theme::Theme;
use maia_audio::Severity;
use maia_input::Mode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Widget for displaying the status bar with mode and command input
pub struct StatusBarWidget<'a> {
    mode: Mode,
    command_buffer: &'a str,
    message: Option<&'a str>,
    message_type: Severity,
    syncing: bool,
    player_available: bool,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: Mode, command_buffer: &'a str, theme: &'a Theme) -> Self {
        Self {
            mode,
            command_buffer,
            message: None,
            message_type: Severity::Info,
            syncing: false,
            player_available: true,
            theme,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>, msg_type: Severity) -> Self {
        self.message = msg;
        self.message_type = msg_type;
        self
    }

    pub fn syncing(mut self, syncing: bool) -> Self {
        self.syncing = syncing;
        self
    }

    /// Without a player the sync slot reads "NO AUD"
    pub fn player_available(mut self, available: bool) -> Self {
        self.player_available = available;
        self
    }

    fn mode_style(&self) -> Style {
        match self.mode {
            Mode::Normal | Mode::Help => self.theme.highlight(),
            Mode::Command => Style::from(self.theme.accent),
            Mode::Browser => self.theme.adversarial_style(),
        }
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(10), // Mode indicator
            Constraint::Length(7),  // Sync indicator
            Constraint::Min(20),    // Command/message area
            Constraint::Length(24), // Help hint
        ])
        .split(area);

        let mode_line = Line::from(vec![
            Span::raw("["),
            Span::styled(self.mode.display_name(), self.mode_style()),
            Span::raw("]"),
        ]);
        Paragraph::new(mode_line).render(chunks[0], buf);

        let sync = if !self.player_available {
            Span::styled("NO AUD", self.theme.error())
        } else if self.syncing {
            Span::styled("SYNC ", self.theme.sync_glow())
        } else {
            Span::styled("---- ", self.theme.dim())
        };
        Paragraph::new(Line::from(sync)).render(chunks[1], buf);

        let content = if self.mode == Mode::Command {
            Line::from(vec![
                Span::styled(":", Style::from(self.theme.accent)),
                Span::styled(self.command_buffer, self.theme.normal()),
                Span::styled("█", self.theme.highlight()), // Cursor
            ])
        } else if let Some(msg) = self.message {
            let msg_style = match self.message_type {
                Severity::Info => self.theme.dim(),
                Severity::Success => self.theme.success(),
                Severity::Warning => Style::default().fg(self.theme.warning),
                Severity::Error => self.theme.error(),
            };
            Line::from(Span::styled(msg, msg_style))
        } else {
            Line::from(Span::styled(
                "Ready. Press ? for help, : for commands",
                self.theme.dim(),
            ))
        };
        Paragraph::new(content).render(chunks[2], buf);

        let help = match self.mode {
            Mode::Normal => "Space:sync  /:samples  ?",
            Mode::Command => "Enter:run  Esc:cancel",
            Mode::Browser => "j/k:nav  Enter:load",
            Mode::Help => "Esc:close help",
        };
        Paragraph::new(Line::from(Span::styled(help, self.theme.dim()))).render(chunks[3], buf);
    }
}

/// Help overlay widget with scrolling support
pub struct HelpWidget<'a> {
    theme: &'a Theme,
    scroll: u16,
}

impl<'a> HelpWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme, scroll: 0 }
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    fn help_lines() -> Vec<&'static str> {
        vec![
            "╔════════════════════════════════════════════════════════════════╗",
            "║           MAIA - Adversarial Audio A/B Player                  ║",
            "║                  ↑/↓ or j/k to scroll                          ║",
            "╠════════════════════════════════════════════════════════════════╣",
            "║ PLAYBACK                     ORIGINAL      ADVERSARIAL         ║",
            "║   Play/Pause                   a             A / b             ║",
            "║   Volume ±5%                  -/=           _/+                ║",
            "║                                                                ║",
            "║   Space / s     Synchronized playback from 0:00 (toggle)       ║",
            "║   h / l         Seek -5s / +5s (both tracks)                   ║",
            "║   0             Jump to start                                  ║",
            "║   1-9           Jump to inpainting region N                    ║",
            "╠────────────────────────────────────────────────────────────────╣",
            "║ SAMPLES                                                        ║",
            "║   n / p         Next / previous sample                         ║",
            "║   / or o        Open sample browser                            ║",
            "║     j / k       Navigate down / up                             ║",
            "║     g / G       Jump to first / last sample                    ║",
            "║     Enter       Load selected sample                           ║",
            "║   c             Toggle benchmark charts                        ║",
            "╠────────────────────────────────────────────────────────────────╣",
            "║ COMMANDS (:)                                                   ║",
            "║   :sample <n>         Load sample n (1-based)                  ║",
            "║   :vol o|a <0-100>    Set original / adversarial volume        ║",
            "║   :jump <secs|m:ss>   Seek both tracks                         ║",
            "║   :region <n>         Jump to inpainting region n              ║",
            "║   :sync               Toggle synchronized playback             ║",
            "║   :theme <name>       green / amber / cyber                    ║",
            "║   :q                  Quit                                     ║",
            "╠════════════════════════════════════════════════════════════════╣",
            "║               Press Esc or ? to close help                     ║",
            "║                    Ctrl-Q to quit MAIA                         ║",
            "╚════════════════════════════════════════════════════════════════╝",
        ]
    }
}

impl Widget for HelpWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear background
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                buf[(x, y)].set_char(' ').set_style(self.theme.normal());
            }
        }

        let help_text = Self::help_lines();
        let total_lines = help_text.len() as u16;
        let visible_lines = area.height.min(total_lines);

        // Clamp scroll to valid range
        let max_scroll = total_lines.saturating_sub(visible_lines);
        let scroll = self.scroll.min(max_scroll);

        let start_x = area.x + area.width.saturating_sub(68) / 2;

        for (i, line) in help_text
            .iter()
            .skip(scroll as usize)
            .take(visible_lines as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            for (j, ch) in line.chars().enumerate() {
                let x = start_x + j as u16;
                if x >= area.x + area.width {
                    break;
                }
                let style = if "║╔╗╚╝═╠╣─│".contains(ch) {
                    self.theme.border()
                } else {
                    self.theme.normal()
                };
                buf[(x, y)].set_char(ch).set_style(style);
            }
        }

        if total_lines > visible_lines {
            let indicator = format!(" [{}/{}] ", scroll + 1, max_scroll + 1);
            let indicator_x = area.x + area.width.saturating_sub(indicator.len() as u16 + 2);
            let indicator_y = area.y + area.height - 1;
            for (i, ch) in indicator.chars().enumerate() {
                let x = indicator_x + i as u16;
                if x < area.x + area.width {
                    buf[(x, indicator_y)].set_char(ch).set_style(self.theme.dim());
                }
            }
        }
    }
}
