//! Simple configuration persistence for MAIA
//!
//! Stores the data directory and player tuning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding `samples.json`, `metrics.json` and `audio/`
    pub data_dir: Option<PathBuf>,
    /// Volume applied to both tracks at startup (percent, 0-100)
    pub initial_volume: f32,
    /// Drift-correction poll period
    pub poll_interval_ms: u64,
    /// Drift above which the adversarial track is re-aligned
    pub drift_threshold_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            initial_volume: 80.0,
            poll_interval_ms: 100,
            drift_threshold_ms: 100,
        }
    }
}

impl Config {
    /// Fallback data directory when neither CLI nor config names one
    pub const DEFAULT_DATA_DIR: &'static str = "data";

    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("maia")
            .join("config.txt")
    }

    /// Data directory: CLI override, then config, then `./data`
    pub fn resolve_data_dir(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_DATA_DIR))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn drift_threshold_secs(&self) -> f64 {
        self.drift_threshold_ms as f64 / 1000.0
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "data_dir" => {
                    if !value.is_empty() {
                        config.data_dir = Some(PathBuf::from(value));
                    }
                }
                "initial_volume" => match value.parse::<f32>() {
                    Ok(v) if v.is_finite() => config.initial_volume = v.clamp(0.0, 100.0),
                    _ => tracing::warn!("Ignoring invalid initial_volume: {}", value),
                },
                "poll_interval_ms" => match value.parse::<u64>() {
                    Ok(v) if v > 0 => config.poll_interval_ms = v,
                    _ => tracing::warn!("Ignoring invalid poll_interval_ms: {}", value),
                },
                "drift_threshold_ms" => match value.parse::<u64>() {
                    Ok(v) => config.drift_threshold_ms = v,
                    Err(_) => tracing::warn!("Ignoring invalid drift_threshold_ms: {}", value),
                },
                _ => {} // Ignore unknown keys
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# MAIA Configuration".to_string());

        if let Some(ref dir) = self.data_dir {
            lines.push(format!("data_dir={}", dir.display()));
        }
        lines.push(format!("initial_volume={}", self.initial_volume));
        lines.push(format!("poll_interval_ms={}", self.poll_interval_ms));
        lines.push(format!("drift_threshold_ms={}", self.drift_threshold_ms));

        lines.join("\n")
    }
}
