//! Inpainting region timeline

use crate::theme::Theme;
use maia_library::Region;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Timeline length used before the original's duration is known
pub const FALLBACK_TOTAL_SECS: f64 = 30.0;

/// Timeline length for a track duration (0 = unknown)
pub fn timeline_total(duration: f64) -> f64 {
    if duration > 0.0 && duration.is_finite() {
        duration
    } else {
        FALLBACK_TOTAL_SECS
    }
}

/// Columns `[start, end)` a region occupies on a `width`-column timeline
///
/// Every region gets at least one column, even when shorter than a cell.
pub fn region_span(region: &Region, total: f64, width: usize) -> (usize, usize) {
    if width == 0 || total <= 0.0 {
        return (0, 0);
    }
    let to_col = |secs: f64| ((secs / total).clamp(0.0, 1.0) * width as f64) as usize;
    let start = to_col(region.start).min(width - 1);
    let end = to_col(region.end).max(start + 1).min(width);
    (start, end)
}

pub struct RegionTimelineWidget<'a> {
    regions: &'a [Region],
    theme: &'a Theme,
    /// Original's playhead (seconds)
    position: f64,
    /// Original's duration (seconds, 0 = unknown)
    duration: f64,
}

impl<'a> RegionTimelineWidget<'a> {
    pub fn new(regions: &'a [Region], theme: &'a Theme) -> Self {
        Self {
            regions,
            theme,
            position: 0.0,
            duration: 0.0,
        }
    }

    pub fn playhead(mut self, position: f64, duration: f64) -> Self {
        self.position = position;
        self.duration = duration;
        self
    }

    fn active_region(&self) -> Option<usize> {
        self.regions.iter().position(|r| r.contains(self.position))
    }

    fn render_timeline(&self, width: usize) -> Line<'a> {
        let total = timeline_total(self.duration);
        let active = self.active_region();

        let mut cells: Vec<Span<'a>> = (0..width)
            .map(|_| Span::styled("─", self.theme.dim()))
            .collect();

        for (i, region) in self.regions.iter().enumerate() {
            let (start, end) = region_span(region, total, width);
            let style = if Some(i) == active {
                self.theme.highlight()
            } else {
                self.theme.region_style().add_modifier(Modifier::BOLD)
            };
            for cell in cells.iter_mut().take(end).skip(start) {
                *cell = Span::styled("█", style);
            }
            // Number the region so keys 1-9 are discoverable
            if i < 9 {
                cells[start] = Span::styled(format!("{}", i + 1), style);
            }
        }

        if self.duration > 0.0 {
            let playhead = ((self.position / total).clamp(0.0, 1.0) * width as f64) as usize;
            if playhead < width {
                cells[playhead] = Span::styled("│", self.theme.highlight());
            }
        }

        Line::from(cells)
    }

    fn render_labels(&self) -> Line<'a> {
        if self.regions.is_empty() {
            return Line::from(Span::styled("No inpainting regions", self.theme.dim()));
        }
        let active = self.active_region();
        let mut spans = Vec::with_capacity(self.regions.len() * 2);
        for (i, region) in self.regions.iter().enumerate() {
            let style = if Some(i) == active {
                self.theme.highlight()
            } else {
                self.theme.normal()
            };
            spans.push(Span::styled(format!("[{}] {}", i + 1, region.label()), style));
            spans.push(Span::raw("  "));
        }
        Line::from(spans)
    }
}

impl Widget for RegionTimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" INPAINTING REGIONS ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 10 {
            return;
        }

        let timeline = self.render_timeline(inner.width as usize);
        Paragraph::new(timeline).render(Rect::new(inner.x, inner.y, inner.width, 1), buf);

        if inner.height >= 2 {
            let labels = self.render_labels();
            Paragraph::new(labels).render(Rect::new(inner.x, inner.y + 1, inner.width, 1), buf);
        }
    }
}
