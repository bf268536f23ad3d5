//! In-memory transport and notification recorder for unit tests

use crate::notify::{Notify, Severity};
use crate::transport::Transport;
use std::path::{Path, PathBuf};

/// Transport that applies commands instantly and never emits events
#[derive(Debug, Default)]
pub struct MockTransport {
    pub playing: bool,
    pub position: f64,
    pub duration: f64,
    pub volume: f32,
    pub loads: Vec<PathBuf>,
    pub seeks: Vec<f64>,
}

impl MockTransport {
    pub fn loaded(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Simulate the decoder finishing (the caller delivers `Ready` itself)
    pub fn finish_load(&mut self, duration: f64) {
        self.duration = duration;
        self.position = 0.0;
    }
}

impl Transport for MockTransport {
    fn load(&mut self, source: &Path) {
        self.loads.push(source.to_path_buf());
        self.playing = false;
        self.position = 0.0;
        self.duration = 0.0;
    }

    fn play(&mut self) {
        if self.duration > 0.0 {
            if self.position >= self.duration {
                self.position = 0.0;
            }
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek_to(&mut self, fraction: f64) {
        self.seeks.push(fraction);
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.position = fraction * self.duration;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub messages: Vec<(String, Severity)>,
}

impl Notify for Recorder {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.messages.push((message.to_string(), severity));
    }
}
