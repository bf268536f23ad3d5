//! Sample selector - browse original/adversarial pairs from the catalog

use crate::theme::Theme;
use maia_library::Catalog;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget,
        Widget,
    },
};

/// Selection state for the sample list
#[derive(Debug, Clone, Default)]
pub struct SampleListState {
    count: usize,
    /// Highlighted row
    pub selected_index: usize,
    /// Sample currently loaded into the player
    pub current: Option<usize>,
    pub scroll_offset: usize,
}

impl SampleListState {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    pub fn select_next(&mut self) {
        if self.count > 0 && self.selected_index < self.count - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        if self.count > 0 {
            self.selected_index = self.count - 1;
        }
    }

    /// Highlight `index` if it exists
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.count {
            self.selected_index = index;
            true
        } else {
            false
        }
    }

    /// Mark `index` as loaded and highlight it
    pub fn set_current(&mut self, index: usize) {
        if self.select(index) {
            self.current = Some(index);
        }
    }

    /// Index after the loaded sample, if any
    pub fn next_index(&self) -> Option<usize> {
        let next = self.current.map_or(0, |c| c + 1);
        (next < self.count).then_some(next)
    }

    /// Index before the loaded sample, if any
    pub fn prev_index(&self) -> Option<usize> {
        self.current.and_then(|c| c.checked_sub(1))
    }

    /// Update scroll offset to keep selection visible
    fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        }
    }
}

pub struct SampleListWidget<'a> {
    catalog: &'a Catalog,
    state: &'a mut SampleListState,
    theme: &'a Theme,
    is_focused: bool,
}

impl<'a> SampleListWidget<'a> {
    pub fn new(catalog: &'a Catalog, state: &'a mut SampleListState, theme: &'a Theme) -> Self {
        Self {
            catalog,
            state,
            theme,
            is_focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.is_focused = focused;
        self
    }
}

impl Widget for SampleListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" SAMPLES [{}] ", self.catalog.len());
        let border_style = if self.is_focused {
            self.theme.border_active()
        } else {
            self.theme.border()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(title, self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 10 {
            return;
        }

        if self.catalog.is_empty() {
            Paragraph::new(Span::styled("No samples loaded", self.theme.dim())).render(inner, buf);
            return;
        }

        // Reserve space for scrollbar
        let list_width = inner.width.saturating_sub(1);
        let list_height = inner.height as usize;
        self.state.update_scroll(list_height);
        let scroll_offset = self.state.scroll_offset;

        for (i, sample) in self
            .catalog
            .samples()
            .iter()
            .enumerate()
            .skip(scroll_offset)
            .take(list_height)
        {
            let y = inner.y + (i - scroll_offset) as u16;
            let is_selected = i == self.state.selected_index;
            let is_current = Some(i) == self.state.current;

            let base_style = if is_selected {
                self.theme.highlight()
            } else {
                self.theme.normal()
            };
            let status_style = if is_selected {
                base_style
            } else if sample.attack_success {
                self.theme.success()
            } else {
                self.theme.error()
            };

            let marker = if is_current { "▶ " } else { "  " };
            let line = Line::from(vec![
                Span::styled(marker, base_style),
                Span::styled(sample.selector_label(i), status_style),
            ]);
            Paragraph::new(line).render(Rect::new(inner.x, y, list_width, 1), buf);
        }

        if self.catalog.len() > list_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .style(Style::default().fg(self.theme.fg_dim));
            let mut scrollbar_state = ScrollbarState::new(self.catalog.len()).position(scroll_offset);
            let scrollbar_area = Rect::new(inner.x + inner.width - 1, inner.y, 1, inner.height);
            StatefulWidget::render(scrollbar, scrollbar_area, buf, &mut scrollbar_state);
        }
    }
}
