//! Track widget - waveform, play label, time readout, and volume for one track

use crate::app::TrackPanel;
use crate::theme::Theme;
use maia_audio::{PlayLabel, TrackRole, TrackStatus};
use maia_library::Region;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Characters for vertical bar rendering (8 levels + empty)
const BAR_CHARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct TrackWidget<'a> {
    panel: &'a TrackPanel,
    role: TrackRole,
    theme: &'a Theme,
    regions: &'a [Region],
}

impl<'a> TrackWidget<'a> {
    pub fn new(panel: &'a TrackPanel, role: TrackRole, theme: &'a Theme) -> Self {
        Self {
            panel,
            role,
            theme,
            regions: &[],
        }
    }

    /// Tint these spans of the waveform
    pub fn regions(mut self, regions: &'a [Region]) -> Self {
        self.regions = regions;
        self
    }

    fn role_style(&self) -> Style {
        match self.role {
            TrackRole::Original => self.theme.original_style(),
            TrackRole::Adversarial => self.theme.adversarial_style(),
        }
    }

    fn render_status(&self) -> Span<'a> {
        match &self.panel.view.status {
            TrackStatus::Empty => Span::styled("No audio", self.theme.dim()),
            TrackStatus::Loading(percent) => Span::styled(
                format!("Loading {}%", percent),
                Style::default().fg(self.theme.warning),
            ),
            TrackStatus::Ready => Span::styled("Ready", self.theme.success()),
            TrackStatus::Error(msg) => Span::styled(format!("Error: {}", msg), self.theme.error()),
        }
    }

    fn render_waveform(&self, width: usize) -> Line<'a> {
        let deck = &self.panel.deck;
        let waveform = &deck.waveform_overview;

        // No track loaded - show empty line
        if deck.duration <= 0.0 || waveform.is_empty() {
            return Line::from(Span::styled("─".repeat(width), self.theme.dim()));
        }

        let progress = (deck.position / deck.duration).clamp(0.0, 1.0);
        let playhead_pos = (progress * width as f64) as usize;

        let spans = (0..width)
            .map(|i| {
                if i == playhead_pos {
                    return Span::styled("│", self.theme.highlight());
                }

                let track_progress = i as f64 / width as f64;
                let idx = (track_progress * waveform.len() as f64) as usize;
                let peak = waveform.get(idx).copied().unwrap_or(0.0);
                let char_idx = (peak.clamp(0.0, 1.0) * 8.0) as usize;
                let bar_char = BAR_CHARS[char_idx.min(8)];

                let secs = track_progress * deck.duration;
                let in_region = self.regions.iter().any(|r| r.contains(secs));
                let style = if in_region {
                    self.theme.region_style().add_modifier(Modifier::BOLD)
                } else if i < playhead_pos {
                    self.role_style()
                } else {
                    self.theme.waveform_style(true)
                };
                Span::styled(bar_char.to_string(), style)
            })
            .collect::<Vec<_>>();

        Line::from(spans)
    }

    /// Volume slider as a bar of `width` cells
    fn render_volume(&self, width: usize) -> Vec<Span<'a>> {
        let level = (self.panel.view.volume_percent / 100.0).clamp(0.0, 1.0);
        let filled = (level * width as f32).round() as usize;
        (0..width)
            .map(|i| {
                if i < filled {
                    Span::styled("█", self.theme.meter_style(i as f32 / width as f32))
                } else {
                    Span::styled("░", self.theme.dim())
                }
            })
            .collect()
    }
}

impl Widget for TrackWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = &self.panel.view;

        let (border_style, title_style) = if view.sync_active {
            (self.theme.sync_glow(), self.theme.sync_glow())
        } else {
            (self.theme.border(), self.role_style().add_modifier(Modifier::BOLD))
        };
        let title = if view.sync_active {
            format!(" ◆ {} ◆ ", self.role.name().to_uppercase())
        } else {
            format!("   {}   ", self.role.name().to_uppercase())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(title, title_style));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width < 20 {
            return;
        }

        let chunks = Layout::vertical([
            Constraint::Length(1), // Play label + name + status
            Constraint::Length(1), // Waveform
            Constraint::Length(1), // Readout + volume
        ])
        .split(inner);

        // Row 1: play label, file name, load status
        let label_style = if view.label == PlayLabel::Pause {
            self.theme.highlight()
        } else {
            self.theme.normal()
        };
        let name = self.panel.deck.track_name.as_deref().unwrap_or("No track loaded");
        let name_width = (inner.width as usize).saturating_sub(30);
        let truncated_name: String = name.chars().take(name_width).collect();
        let line = Line::from(vec![
            Span::styled(format!(" {} ", view.label.text()), label_style),
            Span::raw(" "),
            Span::styled(truncated_name, self.theme.normal()),
            Span::raw("  "),
            self.render_status(),
        ]);
        Paragraph::new(line).render(chunks[0], buf);

        // Row 2: waveform
        let waveform = self.render_waveform(inner.width as usize);
        Paragraph::new(waveform).render(chunks[1], buf);

        // Row 3: time readout and volume
        let meter_width = (inner.width as usize).saturating_sub(view.readout.len() + 14).min(30);
        let mut spans = vec![
            Span::styled(view.readout.clone(), self.theme.normal()),
            Span::raw(" │ "),
            Span::styled("VOL:", self.theme.dim()),
        ];
        spans.extend(self.render_volume(meter_width));
        spans.push(Span::styled(
            format!("{:4.0}%", view.volume_percent),
            self.theme.normal(),
        ));
        Paragraph::new(Line::from(spans)).render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maia_audio::{DeckState, TrackView};
    use std::sync::Arc;

    fn panel(sync_active: bool) -> TrackPanel {
        TrackPanel {
            view: TrackView {
                sync_active,
                readout: "0:10 / 0:30".into(),
                volume_percent: 80.0,
                ..TrackView::default()
            },
            deck: DeckState {
                position: 10.0,
                duration: 30.0,
                waveform_overview: Arc::new(vec![0.5; 100]),
                track_name: Some("blues_00_adversarial".into()),
                ..DeckState::default()
            },
        }
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_render_shows_readout_and_label() {
        let theme = Theme::default();
        let panel = panel(false);
        let area = Rect::new(0, 0, 60, 5);
        let mut buf = Buffer::empty(area);
        TrackWidget::new(&panel, TrackRole::Adversarial, &theme).render(area, &mut buf);

        assert!(row(&buf, 0).contains("ADVERSARIAL"));
        assert!(row(&buf, 1).contains("▶ Play"));
        assert!(row(&buf, 3).contains("0:10 / 0:30"));
        assert!(row(&buf, 3).contains("80%"));
    }

    #[test]
    fn test_sync_glow_marks_title() {
        let theme = Theme::default();
        let panel = panel(true);
        let area = Rect::new(0, 0, 60, 5);
        let mut buf = Buffer::empty(area);
        TrackWidget::new(&panel, TrackRole::Original, &theme).render(area, &mut buf);

        assert!(row(&buf, 0).contains("◆ ORIGINAL ◆"));
        assert_eq!(buf[(0, 0)].style().fg, Some(theme.accent));
    }

    #[test]
    fn test_region_cells_are_tinted() {
        let theme = Theme::default();
        let panel = panel(false);
        let regions = [Region::from([20.0, 25.0])];
        let area = Rect::new(0, 0, 32, 5);
        let mut buf = Buffer::empty(area);
        TrackWidget::new(&panel, TrackRole::Original, &theme)
            .regions(&regions)
            .render(area, &mut buf);

        // Inner width 30 → column 21 is 21s into a 30s track
        assert_eq!(buf[(22, 2)].style().fg, Some(theme.region));
        assert_ne!(buf[(5, 2)].style().fg, Some(theme.region));
    }
}
