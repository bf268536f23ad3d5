//! UI Widgets for MAIA

mod attack;
mod charts;
mod regions;
mod samples;
pub mod status_bar;
mod track;

pub use attack::{format_confidence, AttackInfoWidget};
pub use charts::{asr_bars, scatter_series, AsrChartWidget, QualityScatterWidget};
pub use regions::{region_span, timeline_total, RegionTimelineWidget, FALLBACK_TOTAL_SECS};
pub use samples::{SampleListState, SampleListWidget};
pub use status_bar::StatusBarWidget;
pub use track::TrackWidget;
