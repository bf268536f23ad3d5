//! Sample library for MAIA - catalog, decoding, and configuration

mod catalog;
mod config;
mod loader;

pub use catalog::{
    BenchmarkMetrics, Catalog, CatalogError, MethodScore, MetricsTable, Region, Sample,
    SampleMetrics,
};
pub use config::Config;
pub use loader::{to_stereo, waveform_overview, LoadError, LoadedTrack, TrackLoader};
