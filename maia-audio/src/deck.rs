//! Deck implementation - in-memory playback of one decoded track

use maia_library::LoadedTrack;
use std::path::Path;
use std::sync::Arc;

/// Playback state for a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Deck snapshot for UI rendering
#[derive(Debug, Clone, Default)]
pub struct DeckState {
    pub position: f64, // seconds
    pub duration: f64, // seconds
    pub track_name: Option<String>,
    pub waveform_overview: Arc<Vec<f32>>, // pre-computed peaks for waveform display
}

/// A single deck holding decoded stereo audio
pub struct Deck {
    /// Audio samples (interleaved stereo) - Arc so snapshots and loads never copy
    samples: Arc<Vec<f32>>,
    /// Sample rate of loaded audio
    sample_rate: u32,
    /// Current playback position in frames
    position: f64,
    state: PlaybackState,
    volume: f32,
    track_name: Option<String>,
    /// Incremented on every load; results carrying an older value are stale
    generation: u64,
    waveform_overview: Arc<Vec<f32>>,
}

impl Deck {
    /// Create a new empty deck
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Arc::new(Vec::new()),
            sample_rate,
            position: 0.0,
            state: PlaybackState::Stopped,
            volume: 1.0,
            track_name: None,
            generation: 0,
            waveform_overview: Arc::new(Vec::new()),
        }
    }

    /// Drop the current audio and mark a new load as pending
    ///
    /// Returns the generation the decoded result must present to `install`.
    pub fn begin_load(&mut self, source: &Path) -> u64 {
        self.generation += 1;
        self.samples = Arc::new(Vec::new());
        self.waveform_overview = Arc::new(Vec::new());
        self.position = 0.0;
        self.state = PlaybackState::Stopped;
        self.track_name = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string());
        self.generation
    }

    /// Install decoded audio if `generation` is still the pending load
    pub fn install(&mut self, generation: u64, track: LoadedTrack) -> bool {
        if generation != self.generation {
            return false;
        }
        self.samples = Arc::new(track.samples);
        self.sample_rate = track.sample_rate;
        self.waveform_overview = Arc::new(track.waveform_overview);
        self.position = 0.0;
        self.state = PlaybackState::Stopped;
        true
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if deck has a track loaded
    pub fn is_loaded(&self) -> bool {
        !self.samples.is_empty()
    }

    fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Start playback; restarts from the top when parked at the end
    pub fn play(&mut self) {
        if !self.is_loaded() {
            return;
        }
        if self.position >= self.frames() as f64 {
            self.position = 0.0;
        }
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Set playback position in seconds
    pub fn seek(&mut self, position_secs: f64) {
        let max_frames = self.frames() as f64;
        let target = position_secs * self.sample_rate as f64;
        self.position = if target.is_finite() {
            target.clamp(0.0, max_frames)
        } else {
            0.0
        };
    }

    /// Seek to a fraction (0.0-1.0) of the duration
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek(fraction * self.duration());
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Get track duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Get current position in seconds
    pub fn position_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.position / self.sample_rate as f64
    }

    /// Get deck state for UI
    pub fn state(&self) -> DeckState {
        DeckState {
            position: self.position_secs(),
            duration: self.duration(),
            track_name: self.track_name.clone(),
            waveform_overview: self.waveform_overview.clone(),
        }
    }

    /// Render into a stereo interleaved buffer
    ///
    /// Returns true if the end of the track was reached during this buffer. The deck
    /// then parks at the end in `Stopped` state.
    pub fn process(&mut self, output: &mut [f32]) -> bool {
        if self.state != PlaybackState::Playing || self.samples.is_empty() {
            output.fill(0.0);
            return false;
        }

        let frames = self.frames();
        let mut finished = false;

        for frame in output.chunks_mut(2) {
            let pos = self.position as usize;

            if pos >= frames {
                if !finished {
                    finished = true;
                    self.state = PlaybackState::Stopped;
                    self.position = frames as f64;
                }
                frame.fill(0.0);
                continue;
            }

            let idx = pos * 2;
            frame[0] = self.samples[idx] * self.volume;
            if frame.len() > 1 {
                frame[1] = self.samples[idx + 1] * self.volume;
            }

            self.position += 1.0;
        }

        finished
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(48000)
    }
}
