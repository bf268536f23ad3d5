//! Sample catalog - the precomputed `samples.json` / `metrics.json` artifacts
//!
//! Both files are produced by the sample generator and are read-only here.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An inpainting region, stored as `[start, end]` seconds in JSON
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct Region {
    pub start: f64,
    pub end: f64,
}

impl From<[f64; 2]> for Region {
    fn from([start, end]: [f64; 2]) -> Self {
        Self { start, end }
    }
}

impl Region {
    /// Region length in seconds (never negative)
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whether `secs` falls inside the region (start inclusive, end exclusive)
    pub fn contains(&self, secs: f64) -> bool {
        secs >= self.start && secs < self.end
    }

    /// Tooltip text, e.g. "5.0-5.4s"
    pub fn label(&self) -> String {
        format!("{:.1}-{:.1}s", self.start, self.end)
    }
}

/// Per-sample perceptual quality metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct SampleMetrics {
    /// Frechet Audio Distance
    pub fad: f64,
    /// Log-Spectral Distance
    pub lsd: f64,
    /// Mean Opinion Score (out of 5)
    pub mos: f64,
}

/// One original/adversarial pair
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    pub id: String,
    pub genre: String,
    pub original_audio: String,
    pub adversarial_audio: String,
    pub original_prediction: String,
    pub adversarial_prediction: String,
    pub original_confidence: f64,
    pub adversarial_confidence: f64,
    #[serde(default)]
    pub inpainting_regions: Vec<Region>,
    pub attack_success: bool,
    #[serde(default)]
    pub metrics: SampleMetrics,
}

impl Sample {
    pub fn status_text(&self) -> &'static str {
        if self.attack_success {
            "Success"
        } else {
            "Failed"
        }
    }

    /// Label shown in the sample selector, e.g. "Blues #1 → Jazz (Success)"
    pub fn selector_label(&self, index: usize) -> String {
        format!(
            "{} #{} → {} ({})",
            self.genre,
            index + 1,
            self.adversarial_prediction,
            self.status_text()
        )
    }
}

#[derive(Deserialize)]
struct SamplesFile {
    samples: Vec<Sample>,
}

/// Results of one benchmark (e.g. `csi_whitebox`), column-oriented as in `metrics.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BenchmarkMetrics {
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub asr: Vec<f64>,
    #[serde(default)]
    pub fad: Vec<f64>,
    #[serde(default)]
    pub lsd: Vec<f64>,
    #[serde(default)]
    pub mos: Vec<f64>,
    /// Mean average precision (classification benchmarks)
    #[serde(default)]
    pub map: Vec<f64>,
    /// Accuracy (genre benchmarks)
    #[serde(default)]
    pub accuracy: Vec<f64>,
}

/// Row view of a single method in a benchmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodScore<'a> {
    pub method: &'a str,
    pub asr: f64,
    pub mos: Option<f64>,
}

impl BenchmarkMetrics {
    /// Iterate methods that have an ASR value
    pub fn scores(&self) -> impl Iterator<Item = MethodScore<'_>> {
        self.methods
            .iter()
            .zip(self.asr.iter())
            .enumerate()
            .map(|(i, (method, &asr))| MethodScore {
                method: method.as_str(),
                asr,
                mos: self.mos.get(i).copied(),
            })
    }
}

/// Benchmark name → results
pub type MetricsTable = BTreeMap<String, BenchmarkMetrics>;

/// Read-only sample collection plus benchmark metrics
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    data_dir: PathBuf,
    samples: Vec<Sample>,
    metrics: MetricsTable,
}

impl Catalog {
    pub const SAMPLES_FILE: &'static str = "samples.json";
    pub const METRICS_FILE: &'static str = "metrics.json";

    /// Load `samples.json` and `metrics.json` from `data_dir`
    ///
    /// A missing metrics file yields an empty table; the samples file is required.
    pub fn load(data_dir: &Path) -> Result<Self, CatalogError> {
        let samples_path = data_dir.join(Self::SAMPLES_FILE);
        let file: SamplesFile = read_json(&samples_path)?;

        let metrics_path = data_dir.join(Self::METRICS_FILE);
        let metrics = if metrics_path.exists() {
            read_json(&metrics_path)?
        } else {
            tracing::warn!("No metrics file at {}", metrics_path.display());
            MetricsTable::new()
        };

        tracing::info!(
            samples = file.samples.len(),
            benchmarks = metrics.len(),
            "Catalog loaded from {}",
            data_dir.display()
        );

        Ok(Self::from_parts(data_dir, file.samples, metrics))
    }

    pub fn from_parts(data_dir: &Path, samples: Vec<Sample>, metrics: MetricsTable) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            samples,
            metrics,
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn metrics(&self) -> &MetricsTable {
        &self.metrics
    }

    pub fn benchmark(&self, name: &str) -> Option<&BenchmarkMetrics> {
        self.metrics.get(name)
    }

    /// Resolve an audio reference from the catalog to a file path
    ///
    /// References are written relative to the site root (`data/audio/x.wav`), so a
    /// leading `data` component is dropped when the literal join does not exist.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            return path.to_path_buf();
        }

        let direct = self.data_dir.join(path);
        if direct.exists() {
            return direct;
        }

        match path.strip_prefix("data") {
            Ok(rest) => self.data_dir.join(rest),
            Err(_) => direct,
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES_JSON: &str = r#"{
      "samples": [
        {
          "id": "blues_00",
          "genre": "Blues",
          "original_audio": "data/audio/blues_00_original.wav",
          "adversarial_audio": "data/audio/blues_00_adversarial.wav",
          "original_prediction": "Blues",
          "adversarial_prediction": "Jazz",
          "original_confidence": 0.87,
          "adversarial_confidence": 0.61,
          "inpainting_regions": [[5.0, 5.4], [12.0, 12.3], [18.0, 18.5]],
          "attack_success": true,
          "metrics": { "fad": 11.42, "lsd": 1.73, "mos": 4.1 }
        },
        {
          "id": "classical_01",
          "genre": "Classical",
          "original_audio": "data/audio/classical_01_original.wav",
          "adversarial_audio": "data/audio/classical_01_adversarial.wav",
          "original_prediction": "Classical",
          "adversarial_prediction": "Classical",
          "original_confidence": 0.91,
          "adversarial_confidence": 0.52,
          "inpainting_regions": [[7.0, 7.3], [15.0, 15.5]],
          "attack_success": false,
          "metrics": { "fad": 12.01, "lsd": 1.66, "mos": 3.9 }
        }
      ]
    }"#;

    const METRICS_JSON: &str = r#"{
      "csi_whitebox": {
        "methods": ["PGD", "C&W", "MAIA-WB"],
        "asr": [82.1, 88.5, 92.8],
        "map": [0.619, 0.560, 0.488],
        "fad": [12.64, 12.11, 11.25],
        "lsd": [2.10, 1.94, 1.58],
        "mos": [3.1, 3.4, 4.0]
      },
      "mgc_blackbox": {
        "methods": ["NES", "ZOO", "MAIA-BB"],
        "asr": [65.7, 72.4, 77.9],
        "accuracy": [0.704, 0.654, 0.601],
        "mos": [2.5, 3.0]
      }
    }"#;

    fn write_catalog(dir: &Path, with_metrics: bool) {
        fs::write(dir.join(Catalog::SAMPLES_FILE), SAMPLES_JSON).unwrap();
        if with_metrics {
            fs::write(dir.join(Catalog::METRICS_FILE), METRICS_JSON).unwrap();
        }
    }

    #[test]
    fn test_load_generator_output() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), true);

        let catalog = Catalog::load(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let first = catalog.get(0).unwrap();
        assert_eq!(first.id, "blues_00");
        assert_eq!(first.inpainting_regions.len(), 3);
        assert_eq!(first.inpainting_regions[1], Region { start: 12.0, end: 12.3 });
        assert_eq!(first.metrics.mos, 4.1);

        let whitebox = catalog.benchmark("csi_whitebox").unwrap();
        assert_eq!(whitebox.methods.len(), 3);
        assert_eq!(whitebox.map[2], 0.488);
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn test_missing_metrics_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), false);

        let catalog = Catalog::load(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.metrics().is_empty());
    }

    #[test]
    fn test_missing_samples_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_malformed_samples_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(Catalog::SAMPLES_FILE), "{ \"samples\": [1, 2] }").unwrap();
        let err = Catalog::load(dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Json { .. }));
    }

    #[test]
    fn test_selector_label() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), false);
        let catalog = Catalog::load(dir.path()).unwrap();

        assert_eq!(
            catalog.get(0).unwrap().selector_label(0),
            "Blues #1 → Jazz (Success)"
        );
        assert_eq!(
            catalog.get(1).unwrap().selector_label(1),
            "Classical #2 → Classical (Failed)"
        );
    }

    #[test]
    fn test_scores_stop_at_shortest_column() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), true);
        let catalog = Catalog::load(dir.path()).unwrap();

        let scores: Vec<_> = catalog.benchmark("mgc_blackbox").unwrap().scores().collect();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].method, "NES");
        assert_eq!(scores[1].mos, Some(3.0));
        assert_eq!(scores[2].mos, None);
    }

    #[test]
    fn test_resolve_strips_site_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::from_parts(dir.path(), Vec::new(), MetricsTable::new());

        assert_eq!(
            catalog.resolve("data/audio/pop_00_original.wav"),
            dir.path().join("audio/pop_00_original.wav")
        );
        assert_eq!(
            catalog.resolve("audio/pop_00_original.wav"),
            dir.path().join("audio/pop_00_original.wav")
        );
    }

    #[test]
    fn test_resolve_prefers_existing_literal_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data/audio")).unwrap();
        fs::write(dir.path().join("data/audio/x.wav"), b"").unwrap();
        let catalog = Catalog::from_parts(dir.path(), Vec::new(), MetricsTable::new());

        assert_eq!(
            catalog.resolve("data/audio/x.wav"),
            dir.path().join("data/audio/x.wav")
        );
    }

    #[test]
    fn test_region_helpers() {
        let region = Region { start: 5.0, end: 5.4 };
        assert!(region.contains(5.0));
        assert!(region.contains(5.2));
        assert!(!region.contains(5.4));
        assert_eq!(region.label(), "5.0-5.4s");
        assert!((region.duration() - 0.4).abs() < 1e-9);
    }
}
