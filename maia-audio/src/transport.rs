//! Transport abstraction - the play/pause/seek/volume surface of one track

use std::fmt;
use std::path::Path;

/// Which of the two compared tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackRole {
    Original,
    Adversarial,
}

impl TrackRole {
    pub const ALL: [TrackRole; 2] = [TrackRole::Original, TrackRole::Adversarial];

    pub fn name(self) -> &'static str {
        match self {
            TrackRole::Original => "original",
            TrackRole::Adversarial => "adversarial",
        }
    }

    pub fn other(self) -> Self {
        match self {
            TrackRole::Original => TrackRole::Adversarial,
            TrackRole::Adversarial => TrackRole::Original,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            TrackRole::Original => 0,
            TrackRole::Adversarial => 1,
        }
    }
}

impl fmt::Display for TrackRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Asynchronous notifications from a transport
///
/// Always delivered after the command that caused them returned.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Audio decoded; duration is now known
    Ready,
    /// Playback reached the end of the track
    Finish,
    Play,
    Pause,
    /// Periodic position update while playing (seconds)
    Progress(f64),
    /// Load progress in percent (0-100)
    Loading(u8),
    /// Load or decode failure
    Error(String),
}

/// Event tagged with the track it came from
#[derive(Debug, Clone, PartialEq)]
pub struct DeckEvent {
    pub role: TrackRole,
    pub event: TransportEvent,
}

/// Control surface of a decoded-audio player
///
/// Commands take effect immediately: `is_playing()` reflects a `play()` as soon as it
/// returns. Completion of `load` is reported later through `TransportEvent`s.
pub trait Transport {
    /// Discard the current audio and start loading `source`
    fn load(&mut self, source: &Path);
    fn play(&mut self);
    fn pause(&mut self);
    /// Seek to a fraction (0.0-1.0) of the track duration
    fn seek_to(&mut self, fraction: f64);
    fn is_playing(&self) -> bool;
    /// Current position in seconds
    fn current_time(&self) -> f64;
    /// Duration in seconds; 0.0 until loaded
    fn duration(&self) -> f64;
    /// Output volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32);
}
