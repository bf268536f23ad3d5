//! Attack info panel - predictions, confidence, and perceptual quality of a sample

use crate::theme::Theme;
use maia_library::Sample;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Confidence as a whole percentage, e.g. 0.874 → "87%"
pub fn format_confidence(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

pub struct AttackInfoWidget<'a> {
    sample: Option<&'a Sample>,
    theme: &'a Theme,
}

impl<'a> AttackInfoWidget<'a> {
    pub fn new(sample: Option<&'a Sample>, theme: &'a Theme) -> Self {
        Self { sample, theme }
    }

    fn lines(&self, sample: &'a Sample) -> Vec<Line<'a>> {
        let label = |text: &'a str| Span::styled(text, self.theme.dim());
        let status_style = if sample.attack_success {
            self.theme.success()
        } else {
            self.theme.error()
        };

        vec![
            Line::from(vec![
                label("Original:    "),
                Span::styled(sample.original_prediction.as_str(), self.theme.original_style()),
                Span::styled(
                    format!(" ({})", format_confidence(sample.original_confidence)),
                    self.theme.normal(),
                ),
            ]),
            Line::from(vec![
                label("Adversarial: "),
                Span::styled(
                    sample.adversarial_prediction.as_str(),
                    self.theme.adversarial_style(),
                ),
                Span::styled(
                    format!(" ({})", format_confidence(sample.adversarial_confidence)),
                    self.theme.normal(),
                ),
            ]),
            Line::from(vec![
                label("Attack:      "),
                Span::styled(sample.status_text(), status_style),
            ]),
            Line::from(vec![
                label("FAD "),
                Span::styled(format!("{:.2}", sample.metrics.fad), self.theme.normal()),
                label("  LSD "),
                Span::styled(format!("{:.2}", sample.metrics.lsd), self.theme.normal()),
                label("  MOS "),
                Span::styled(
                    format!("{}/5", sample.metrics.mos),
                    Style::from(self.theme.accent),
                ),
            ]),
        ]
    }
}

impl Widget for AttackInfoWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" ATTACK ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = match self.sample {
            Some(sample) => self.lines(sample),
            None => vec![Line::from(Span::styled("No sample loaded", self.theme.dim()))],
        };
        Paragraph::new(lines).render(inner, buf);
    }
}
