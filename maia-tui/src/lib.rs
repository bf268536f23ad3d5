//! Terminal UI for MAIA - widgets, themes, and layout
//!
//! CRT-style interface for comparing original and adversarial audio side by side.

mod app;
mod theme;
pub mod widgets;

pub use app::{App, AppState, TrackPanel, MESSAGE_TIMEOUT};
pub use theme::{Theme, CRT_AMBER, CRT_GREEN, CYBERPUNK};
pub use widgets::status_bar::HelpWidget;
pub use widgets::{
    AsrChartWidget, AttackInfoWidget, QualityScatterWidget, RegionTimelineWidget,
    SampleListState, SampleListWidget, StatusBarWidget, TrackWidget,
};
