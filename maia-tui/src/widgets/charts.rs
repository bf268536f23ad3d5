//! Benchmark charts - attack success rate bars and ASR vs. MOS scatter

use crate::theme::Theme;
use maia_library::MetricsTable;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget,
    },
};

/// Benchmarks plotted in both charts
const WHITE_BOX: &str = "csi_whitebox";
const BLACK_BOX: &str = "csi_blackbox";

/// (method, ASR %) for the white-box then black-box methods
pub fn asr_bars(metrics: &MetricsTable) -> Vec<(String, f64)> {
    [WHITE_BOX, BLACK_BOX]
        .iter()
        .filter_map(|name| metrics.get(*name))
        .flat_map(|bench| bench.scores())
        .map(|score| (score.method.to_string(), score.asr))
        .collect()
}

/// (ASR, MOS) points split into white-box and black-box series
///
/// Methods without a MOS value are left out.
pub fn scatter_series(metrics: &MetricsTable) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let points = |name: &str| -> Vec<(f64, f64)> {
        metrics
            .get(name)
            .map(|bench| {
                bench
                    .scores()
                    .filter_map(|s| s.mos.map(|mos| (s.asr, mos)))
                    .collect()
            })
            .unwrap_or_default()
    };
    (points(WHITE_BOX), points(BLACK_BOX))
}

pub struct AsrChartWidget<'a> {
    metrics: &'a MetricsTable,
    theme: &'a Theme,
}

impl<'a> AsrChartWidget<'a> {
    pub fn new(metrics: &'a MetricsTable, theme: &'a Theme) -> Self {
        Self { metrics, theme }
    }
}

impl Widget for AsrChartWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" ATTACK SUCCESS RATE (%) ", self.theme.title()));

        let data = asr_bars(self.metrics);
        if data.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Span::styled("No metrics available", self.theme.dim())).render(inner, buf);
            return;
        }

        let white_box_count = self.metrics.get(WHITE_BOX).map_or(0, |b| b.scores().count());
        let bars: Vec<Bar> = data
            .iter()
            .enumerate()
            .map(|(i, (method, asr))| {
                let style = if i < white_box_count {
                    self.theme.original_style()
                } else {
                    self.theme.adversarial_style()
                };
                Bar::default()
                    .value(asr.round().max(0.0) as u64)
                    .text_value(format!("{:.1}", asr))
                    .label(Line::from(method.clone()))
                    .style(style)
            })
            .collect();

        let inner_width = area.width.saturating_sub(2) as usize;
        let bar_width = (inner_width / bars.len().max(1)).saturating_sub(1).clamp(3, 9) as u16;

        BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .max(100)
            .value_style(self.theme.highlight())
            .label_style(self.theme.normal())
            .render(area, buf);
    }
}

pub struct QualityScatterWidget<'a> {
    metrics: &'a MetricsTable,
    theme: &'a Theme,
}

impl<'a> QualityScatterWidget<'a> {
    pub fn new(metrics: &'a MetricsTable, theme: &'a Theme) -> Self {
        Self { metrics, theme }
    }
}

impl Widget for QualityScatterWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (white_box, black_box) = scatter_series(self.metrics);

        let datasets = vec![
            Dataset::default()
                .name("White-box")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(self.theme.original_style())
                .data(&white_box),
            Dataset::default()
                .name("Black-box")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(self.theme.adversarial_style())
                .data(&black_box),
        ];

        let axis_style = Style::default().fg(self.theme.fg_dim);
        Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border())
                    .title(Span::styled(" QUALITY vs SUCCESS ", self.theme.title())),
            )
            .x_axis(
                Axis::default()
                    .title(Span::styled("ASR %", axis_style))
                    .style(axis_style)
                    .bounds([0.0, 100.0])
                    .labels(["0", "50", "100"]),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("MOS", axis_style))
                    .style(axis_style)
                    .bounds([0.0, 5.0])
                    .labels(["0", "2.5", "5"]),
            )
            .render(area, buf);
    }
}
