//! Per-track control binding - play toggle, volume, time readout, load status

use crate::notify::{Notify, Severity};
use crate::transport::{TrackRole, Transport, TransportEvent};
use std::path::Path;

/// Play button label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayLabel {
    #[default]
    Play,
    Pause,
}

impl PlayLabel {
    pub fn text(self) -> &'static str {
        match self {
            PlayLabel::Play => "▶ Play",
            PlayLabel::Pause => "⏸ Pause",
        }
    }
}

/// Load status shown on the waveform
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackStatus {
    /// Nothing loaded yet
    #[default]
    Empty,
    Loading(u8),
    Ready,
    Error(String),
}

/// Display state bound to one track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackView {
    pub label: PlayLabel,
    pub status: TrackStatus,
    /// Highlighted while a synchronized session drives this track
    pub sync_active: bool,
    /// `elapsed / duration` readout
    pub readout: String,
    /// Volume slider position (0-100)
    pub volume_percent: f32,
}

impl Default for TrackView {
    fn default() -> Self {
        Self {
            label: PlayLabel::Play,
            status: TrackStatus::Empty,
            sync_active: false,
            readout: EMPTY_READOUT.to_string(),
            volume_percent: 100.0,
        }
    }
}

const EMPTY_READOUT: &str = "0:00 / 0:00";

/// Format seconds as `M:SS` (minutes unbounded, seconds floored)
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// One of the two compared tracks: a transport plus its bound controls
pub struct Track<T> {
    role: TrackRole,
    transport: T,
    view: TrackView,
}

impl<T: Transport> Track<T> {
    pub fn new(role: TrackRole, transport: T, volume_percent: f32) -> Self {
        let mut track = Self {
            role,
            transport,
            view: TrackView::default(),
        };
        track.set_volume(volume_percent);
        track
    }

    pub fn view(&self) -> &TrackView {
        &self.view
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[cfg(test)]
    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn current_time(&self) -> f64 {
        self.transport.current_time()
    }

    pub fn duration(&self) -> f64 {
        self.transport.duration()
    }

    /// Pause if playing, otherwise play from the current position
    ///
    /// Decides from the live transport state, so repeated calls alternate cleanly.
    pub fn toggle_play_pause(&mut self) {
        if self.transport.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn play(&mut self) {
        self.transport.play();
        if self.transport.is_playing() {
            self.view.label = PlayLabel::Pause;
        }
    }

    pub fn pause(&mut self) {
        self.transport.pause();
        self.view.label = PlayLabel::Play;
    }

    pub fn seek_to(&mut self, fraction: f64) {
        self.transport.seek_to(fraction);
        self.refresh_readout();
    }

    /// Set volume from a 0-100 slider value; out-of-range input is clamped
    pub fn set_volume(&mut self, percent: f32) {
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.view.volume_percent = percent;
        self.transport.set_volume(percent / 100.0);
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.set_volume(self.view.volume_percent + delta);
    }

    /// Replace the loaded audio; display state returns to its pre-load form
    pub fn load(&mut self, source: &Path) {
        self.view.label = PlayLabel::Play;
        self.view.status = TrackStatus::Loading(0);
        self.view.readout = EMPTY_READOUT.to_string();
        self.transport.load(source);
    }

    pub(crate) fn set_sync_active(&mut self, active: bool) {
        self.view.sync_active = active;
    }

    /// Re-render `elapsed / duration` from the transport
    pub fn refresh_readout(&mut self) {
        let duration = self.transport.duration();
        self.view.readout = if duration > 0.0 {
            format!(
                "{} / {}",
                format_time(self.transport.current_time()),
                format_time(duration)
            )
        } else {
            EMPTY_READOUT.to_string()
        };
    }

    /// Apply a transport event to the bound display state
    pub fn handle_event(&mut self, event: &TransportEvent, notify: &mut dyn Notify) {
        match event {
            TransportEvent::Ready => {
                self.view.status = TrackStatus::Ready;
                self.view.readout = format!("0:00 / {}", format_time(self.transport.duration()));
                tracing::info!("{} track ready ({:.2}s)", self.role, self.transport.duration());
            }
            TransportEvent::Play => self.view.label = PlayLabel::Pause,
            TransportEvent::Pause | TransportEvent::Finish => {
                self.view.label = PlayLabel::Play;
                self.refresh_readout();
            }
            TransportEvent::Progress(_) => self.refresh_readout(),
            TransportEvent::Loading(percent) => {
                self.view.status = if *percent < 100 {
                    TrackStatus::Loading(*percent)
                } else {
                    TrackStatus::Ready
                };
            }
            TransportEvent::Error(message) => {
                tracing::error!("Error in {} player: {}", self.role, message);
                self.view.status = TrackStatus::Error(message.clone());
                notify.notify(&format!("Failed to load {} audio", self.role), Severity::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, Recorder};

    fn track() -> Track<MockTransport> {
        Track::new(TrackRole::Original, MockTransport::loaded(30.0), 80.0)
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(3725.0), "62:05");
        assert_eq!(format_time(-4.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_initial_volume_applied() {
        let track = track();
        assert_eq!(track.transport().volume, 0.8);
        assert_eq!(track.view().volume_percent, 80.0);
    }

    #[test]
    fn test_volume_is_clamped_not_rejected() {
        let mut track = track();
        track.set_volume(150.0);
        assert_eq!(track.transport().volume, 1.0);
        assert_eq!(track.view().volume_percent, 100.0);

        track.set_volume(-20.0);
        assert_eq!(track.transport().volume, 0.0);

        track.set_volume(37.0);
        assert!((track.transport().volume - 0.37).abs() < 1e-6);

        track.adjust_volume(100.0);
        assert_eq!(track.transport().volume, 1.0);
    }

    #[test]
    fn test_toggle_reads_live_transport_state() {
        let mut track = track();
        track.toggle_play_pause();
        assert!(track.is_playing());
        assert_eq!(track.view().label, PlayLabel::Pause);

        // Transport stopped on its own; the cached label must not matter
        track.transport.playing = false;
        track.toggle_play_pause();
        assert!(track.is_playing());

        track.toggle_play_pause();
        assert!(!track.is_playing());
        assert_eq!(track.view().label, PlayLabel::Play);
    }

    #[test]
    fn test_readout_before_and_after_ready() {
        let mut track = Track::new(TrackRole::Adversarial, MockTransport::default(), 80.0);
        let mut recorder = Recorder::default();

        track.load(Path::new("data/audio/pop_00_adversarial.wav"));
        assert_eq!(track.view().readout, "0:00 / 0:00");
        assert_eq!(track.view().status, TrackStatus::Loading(0));

        track.transport.finish_load(32.4);
        track.handle_event(&TransportEvent::Ready, &mut recorder);
        assert_eq!(track.view().readout, "0:00 / 0:32");
        assert_eq!(track.view().status, TrackStatus::Ready);

        track.transport.position = 75.2;
        track.handle_event(&TransportEvent::Progress(75.2), &mut recorder);
        assert_eq!(track.view().readout, "1:15 / 0:32");
        assert!(recorder.messages.is_empty());
    }

    #[test]
    fn test_loading_progress_updates_status() {
        let mut track = track();
        let mut recorder = Recorder::default();
        track.handle_event(&TransportEvent::Loading(40), &mut recorder);
        assert_eq!(track.view().status, TrackStatus::Loading(40));
        track.handle_event(&TransportEvent::Loading(100), &mut recorder);
        assert_eq!(track.view().status, TrackStatus::Ready);
    }

    #[test]
    fn test_error_marks_track_and_notifies() {
        let mut track = track();
        let mut recorder = Recorder::default();
        track.handle_event(&TransportEvent::Error("bad header".into()), &mut recorder);

        assert_eq!(track.view().status, TrackStatus::Error("bad header".into()));
        assert_eq!(
            recorder.messages,
            vec![("Failed to load original audio".to_string(), Severity::Error)]
        );
    }

    #[test]
    fn test_pause_and_finish_restore_play_label() {
        let mut track = track();
        let mut recorder = Recorder::default();
        track.handle_event(&TransportEvent::Play, &mut recorder);
        assert_eq!(track.view().label, PlayLabel::Pause);
        track.handle_event(&TransportEvent::Finish, &mut recorder);
        assert_eq!(track.view().label, PlayLabel::Play);
    }
}
