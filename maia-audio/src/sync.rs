//! Dual-track synchronizer - lock-step A/B playback with drift correction
//!
//! The synchronizer owns the original and adversarial tracks. A sync session starts
//! both from zero and a poll timer periodically pulls the adversarial track back in
//! line with the original. The session ends when both tracks stop, when either one
//! finishes, when the user toggles sync off, on sample switch, or on shutdown.

use crate::notify::Notify;
use crate::track::Track;
use crate::transport::{TrackRole, Transport, TransportEvent};
use maia_library::{Catalog, Config};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("Sample {0} not found")]
    MissingSample(usize),
}

/// Timing parameters for sync sessions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    pub poll_interval: Duration,
    /// Drift (seconds) above which the adversarial track is re-seeked
    pub drift_threshold: f64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            drift_threshold: 0.1,
        }
    }
}

impl SyncSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            drift_threshold: config.drift_threshold_secs(),
        }
    }
}

/// Single-slot periodic deadline
#[derive(Debug, Clone)]
pub struct PollTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl PollTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arm the timer; an already armed timer is overwritten, never duplicated
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Consume one firing if the deadline has passed
    ///
    /// The next deadline follows the previous one; if the caller fell more than a
    /// period behind, it restarts from `now` instead of firing in a burst.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(deadline) if now >= deadline => {
                let mut next = deadline + self.period;
                if next <= now {
                    next = now + self.period;
                }
                self.next_due = Some(next);
                true
            }
            _ => false,
        }
    }
}

/// Active lock-step session; dropping it cancels its timer
#[derive(Debug)]
struct SyncSession {
    timer: PollTimer,
    started: Instant,
}

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// No session was active
    Idle,
    /// Both tracks had stopped; the session ended
    Ended,
    /// Adversarial track re-seeked to `fraction` of its duration
    Corrected { drift: f64, fraction: f64 },
    /// Drift over the threshold but the original's duration is unknown
    Skipped { drift: f64 },
    InSync { drift: f64 },
}

pub struct Synchronizer<T> {
    tracks: [Track<T>; 2],
    session: Option<SyncSession>,
    settings: SyncSettings,
    current_sample: Option<usize>,
}

impl<T: Transport> Synchronizer<T> {
    pub fn new(original: T, adversarial: T, settings: SyncSettings, initial_volume: f32) -> Self {
        Self {
            tracks: [
                Track::new(TrackRole::Original, original, initial_volume),
                Track::new(TrackRole::Adversarial, adversarial, initial_volume),
            ],
            session: None,
            settings,
            current_sample: None,
        }
    }

    pub fn track(&self, role: TrackRole) -> &Track<T> {
        &self.tracks[role.index()]
    }

    pub fn track_mut(&mut self, role: TrackRole) -> &mut Track<T> {
        &mut self.tracks[role.index()]
    }

    pub fn is_syncing(&self) -> bool {
        self.session.is_some()
    }

    #[cfg(test)]
    pub(crate) fn timer_armed(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.timer.is_armed())
    }

    /// Index of the sample most recently passed to `load_sample`
    pub fn current_sample(&self) -> Option<usize> {
        self.current_sample
    }

    fn any_playing(&self) -> bool {
        self.tracks.iter().any(|t| t.is_playing())
    }

    /// Start a session from zero, or stop everything if anything is playing
    pub fn toggle_sync(&mut self, now: Instant) {
        if self.any_playing() {
            for track in &mut self.tracks {
                track.pause();
            }
            self.end_session();
            tracing::info!("Synchronized playback stopped");
            return;
        }

        self.end_session();
        for track in &mut self.tracks {
            track.seek_to(0.0);
            track.play();
            track.set_sync_active(true);
        }

        let mut timer = PollTimer::new(self.settings.poll_interval);
        timer.start(now);
        self.session = Some(SyncSession {
            timer,
            started: now,
        });
        tracing::info!("Synchronized playback started");
    }

    /// Drive the poll timer; returns true if a poll ran
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = match self.session.as_mut() {
            Some(session) => session.timer.due(now),
            None => false,
        };
        if due {
            self.poll();
        }
        due
    }

    /// One timer firing: end the session if both stopped, otherwise correct drift
    pub fn poll(&mut self) -> PollOutcome {
        if self.session.is_none() {
            return PollOutcome::Idle;
        }

        if !self.any_playing() {
            self.end_session();
            return PollOutcome::Ended;
        }

        let original = &self.tracks[TrackRole::Original.index()];
        let pos_a = original.current_time();
        let dur_a = original.duration();
        let pos_b = self.tracks[TrackRole::Adversarial.index()].current_time();
        let drift = (pos_a - pos_b).abs();

        if drift <= self.settings.drift_threshold {
            return PollOutcome::InSync { drift };
        }
        if dur_a <= 0.0 {
            return PollOutcome::Skipped { drift };
        }

        let fraction = (pos_a / dur_a).clamp(0.0, 1.0);
        self.track_mut(TrackRole::Adversarial).seek_to(fraction);
        tracing::debug!("Drift {:.3}s, adversarial re-seeked to {:.4}", drift, fraction);
        PollOutcome::Corrected { drift, fraction }
    }

    /// Route a transport event to its track; a finish during sync stops the pair
    pub fn handle_event(&mut self, role: TrackRole, event: &TransportEvent, notify: &mut dyn Notify) {
        self.track_mut(role).handle_event(event, notify);

        if matches!(event, TransportEvent::Finish) && self.is_syncing() {
            self.track_mut(role.other()).pause();
            self.end_session();
            tracing::info!("{} track finished, synchronized playback ended", role);
        }
    }

    /// Switch both tracks to sample `index`
    ///
    /// Ends any sync session first. Volume is kept.
    pub fn load_sample(&mut self, catalog: &Catalog, index: usize) -> Result<(), PlayerError> {
        let Some(sample) = catalog.get(index) else {
            tracing::warn!("Sample {} not found ({} available)", index, catalog.len());
            return Err(PlayerError::MissingSample(index));
        };

        self.end_session();
        let original = catalog.resolve(&sample.original_audio);
        let adversarial = catalog.resolve(&sample.adversarial_audio);

        for track in &mut self.tracks {
            if track.is_playing() {
                track.pause();
            }
        }
        self.track_mut(TrackRole::Original).load(&original);
        self.track_mut(TrackRole::Adversarial).load(&adversarial);
        self.current_sample = Some(index);

        tracing::info!("Loaded sample {} ({})", index, sample.id);
        Ok(())
    }

    /// Seek both tracks to `seconds`, skipping any whose duration is not yet known
    pub fn jump_to_time(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        for track in &mut self.tracks {
            let duration = track.duration();
            if duration > 0.0 {
                track.seek_to((seconds / duration).clamp(0.0, 1.0));
            }
        }
    }

    /// End any session and pause both tracks
    pub fn shutdown(&mut self) {
        self.end_session();
        for track in &mut self.tracks {
            if track.is_playing() {
                track.pause();
            }
        }
    }

    fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!("Sync session ended after {:?}", session.started.elapsed());
            for track in &mut self.tracks {
                track.set_sync_active(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, Recorder};
    use crate::track::{PlayLabel, TrackStatus};
    use maia_library::{MetricsTable, Region, Sample, SampleMetrics};
    use std::path::{Path, PathBuf};

    const ORIGINAL: TrackRole = TrackRole::Original;
    const ADVERSARIAL: TrackRole = TrackRole::Adversarial;

    fn sync(dur_a: f64, dur_b: f64) -> Synchronizer<MockTransport> {
        Synchronizer::new(
            MockTransport::loaded(dur_a),
            MockTransport::loaded(dur_b),
            SyncSettings::default(),
            80.0,
        )
    }

    fn set_position(sync: &mut Synchronizer<MockTransport>, role: TrackRole, pos: f64) {
        sync.track_mut(role).transport_mut().position = pos;
    }

    fn position(sync: &Synchronizer<MockTransport>, role: TrackRole) -> f64 {
        sync.track(role).current_time()
    }

    fn sample(id: &str) -> Sample {
        Sample {
            id: id.to_string(),
            genre: "Blues".to_string(),
            original_audio: format!("/audio/{id}_original.wav"),
            adversarial_audio: format!("/audio/{id}_adversarial.wav"),
            original_prediction: "Blues".to_string(),
            adversarial_prediction: "Jazz".to_string(),
            original_confidence: 0.87,
            adversarial_confidence: 0.61,
            inpainting_regions: vec![Region::from([5.0, 5.4])],
            attack_success: true,
            metrics: SampleMetrics::default(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_parts(
            Path::new("/data"),
            vec![sample("blues_00"), sample("blues_01")],
            MetricsTable::new(),
        )
    }

    #[test]
    fn test_start_sync_plays_both_from_zero() {
        let mut sync = sync(30.0, 30.0);
        set_position(&mut sync, ORIGINAL, 12.0);
        set_position(&mut sync, ADVERSARIAL, 4.0);

        sync.toggle_sync(Instant::now());

        assert!(sync.is_syncing());
        assert!(sync.timer_armed());
        for role in TrackRole::ALL {
            assert!(sync.track(role).is_playing());
            assert_eq!(position(&sync, role), 0.0);
            assert!(sync.track(role).view().sync_active);
            assert_eq!(sync.track(role).view().label, PlayLabel::Pause);
        }
    }

    #[test]
    fn test_toggle_while_syncing_stops_both() {
        let mut sync = sync(30.0, 30.0);
        let start = Instant::now();
        sync.toggle_sync(start);
        sync.toggle_sync(start);

        assert!(!sync.is_syncing());
        assert!(!sync.timer_armed());
        for role in TrackRole::ALL {
            assert!(!sync.track(role).is_playing());
            assert!(!sync.track(role).view().sync_active);
        }

        // No further corrections after stopping
        set_position(&mut sync, ORIGINAL, 10.0);
        set_position(&mut sync, ADVERSARIAL, 2.0);
        assert!(!sync.tick(start + Duration::from_secs(1)));
        assert_eq!(position(&sync, ADVERSARIAL), 2.0);
        assert_eq!(sync.poll(), PollOutcome::Idle);
    }

    #[test]
    fn test_toggle_with_one_track_playing_pauses_it() {
        let mut sync = sync(30.0, 30.0);
        sync.track_mut(ADVERSARIAL).toggle_play_pause();
        sync.toggle_sync(Instant::now());
        assert!(!sync.is_syncing());
        assert!(!sync.track(ADVERSARIAL).is_playing());
    }

    #[test]
    fn test_drift_correction_uses_original_fraction() {
        let mut sync = sync(30.0, 32.0);
        let start = Instant::now();
        sync.toggle_sync(start);
        set_position(&mut sync, ORIGINAL, 10.0);
        set_position(&mut sync, ADVERSARIAL, 9.5);

        assert!(sync.tick(start + Duration::from_millis(100)));

        let expected = 10.0 / 30.0 * 32.0;
        assert!((position(&sync, ADVERSARIAL) - expected).abs() < 1e-9);
        assert_eq!(position(&sync, ORIGINAL), 10.0);
    }

    #[test]
    fn test_poll_reports_correction() {
        let mut sync = sync(30.0, 32.0);
        sync.toggle_sync(Instant::now());
        set_position(&mut sync, ORIGINAL, 10.0);
        set_position(&mut sync, ADVERSARIAL, 9.5);

        match sync.poll() {
            PollOutcome::Corrected { drift, fraction } => {
                assert!((drift - 0.5).abs() < 1e-9);
                assert!((fraction - 1.0 / 3.0).abs() < 1e-9);
            }
            other => panic!("expected correction, got {:?}", other),
        }
    }

    #[test]
    fn test_small_drift_is_left_alone() {
        let mut sync = sync(30.0, 32.0);
        sync.toggle_sync(Instant::now());
        set_position(&mut sync, ORIGINAL, 10.0);
        set_position(&mut sync, ADVERSARIAL, 9.95);
        let seeks_before = sync.track(ADVERSARIAL).transport().seeks.len();

        assert!(matches!(sync.poll(), PollOutcome::InSync { .. }));
        assert_eq!(position(&sync, ADVERSARIAL), 9.95);
        assert_eq!(sync.track(ADVERSARIAL).transport().seeks.len(), seeks_before);
    }

    #[test]
    fn test_drift_exactly_at_threshold_is_in_sync() {
        let mut sync = sync(30.0, 30.0);
        sync.toggle_sync(Instant::now());
        sync.settings.drift_threshold = 0.5;
        set_position(&mut sync, ORIGINAL, 1.0);
        set_position(&mut sync, ADVERSARIAL, 0.5);
        assert!(matches!(sync.poll(), PollOutcome::InSync { .. }));
    }

    #[test]
    fn test_original_is_never_corrected() {
        let mut sync = sync(30.0, 30.0);
        sync.toggle_sync(Instant::now());
        set_position(&mut sync, ORIGINAL, 3.0);
        set_position(&mut sync, ADVERSARIAL, 8.0);
        let seeks_before = sync.track(ORIGINAL).transport().seeks.len();

        sync.poll();
        assert_eq!(position(&sync, ORIGINAL), 3.0);
        assert_eq!(sync.track(ORIGINAL).transport().seeks.len(), seeks_before);
        assert!((position(&sync, ADVERSARIAL) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_original_duration_skips_correction() {
        let mut sync = sync(30.0, 30.0);
        sync.toggle_sync(Instant::now());
        sync.track_mut(ORIGINAL).transport_mut().duration = 0.0;
        set_position(&mut sync, ADVERSARIAL, 5.0);

        assert!(matches!(sync.poll(), PollOutcome::Skipped { .. }));
        assert_eq!(position(&sync, ADVERSARIAL), 5.0);
    }

    #[test]
    fn test_finished_check_precedes_correction() {
        let mut sync = sync(30.0, 30.0);
        sync.toggle_sync(Instant::now());
        set_position(&mut sync, ORIGINAL, 20.0);
        set_position(&mut sync, ADVERSARIAL, 2.0);
        sync.track_mut(ORIGINAL).transport_mut().playing = false;
        sync.track_mut(ADVERSARIAL).transport_mut().playing = false;

        assert_eq!(sync.poll(), PollOutcome::Ended);
        assert!(!sync.is_syncing());
        assert_eq!(position(&sync, ADVERSARIAL), 2.0);
        assert!(!sync.track(ORIGINAL).view().sync_active);
    }

    #[test]
    fn test_finish_event_pauses_other_track() {
        let mut sync = sync(30.0, 32.0);
        let mut recorder = Recorder::default();
        sync.toggle_sync(Instant::now());
        sync.track_mut(ORIGINAL).transport_mut().playing = false;

        sync.handle_event(ORIGINAL, &TransportEvent::Finish, &mut recorder);

        assert!(!sync.is_syncing());
        assert!(!sync.timer_armed());
        assert!(!sync.track(ADVERSARIAL).is_playing());
        for role in TrackRole::ALL {
            assert!(!sync.track(role).view().sync_active);
            assert_eq!(sync.track(role).view().label, PlayLabel::Play);
        }
    }

    #[test]
    fn test_finish_outside_sync_leaves_other_track_playing() {
        let mut sync = sync(30.0, 30.0);
        let mut recorder = Recorder::default();
        sync.track_mut(ORIGINAL).toggle_play_pause();
        sync.handle_event(ADVERSARIAL, &TransportEvent::Finish, &mut recorder);
        assert!(sync.track(ORIGINAL).is_playing());
    }

    #[test]
    fn test_tick_follows_poll_interval() {
        let mut sync = sync(30.0, 30.0);
        let start = Instant::now();
        sync.toggle_sync(start);

        assert!(!sync.tick(start + Duration::from_millis(50)));
        assert!(sync.tick(start + Duration::from_millis(100)));
        assert!(!sync.tick(start + Duration::from_millis(150)));
        assert!(sync.tick(start + Duration::from_millis(205)));
        // Deadline is relative to the previous one, not to the late firing
        assert!(sync.tick(start + Duration::from_millis(300)));
    }

    #[test]
    fn test_timer_resets_when_far_behind() {
        let start = Instant::now();
        let mut timer = PollTimer::new(Duration::from_millis(100));
        timer.start(start);
        assert!(timer.due(start + Duration::from_secs(2)));
        assert!(!timer.due(start + Duration::from_millis(2050)));
        assert!(timer.due(start + Duration::from_millis(2100)));
        assert!(timer.is_armed());
    }

    #[test]
    fn test_restart_does_not_duplicate_timer() {
        let mut sync = sync(30.0, 30.0);
        let start = Instant::now();
        sync.toggle_sync(start);
        sync.track_mut(ORIGINAL).transport_mut().playing = false;
        sync.track_mut(ADVERSARIAL).transport_mut().playing = false;

        // Both stopped without a poll; a new toggle replaces the stale session
        let later = start + Duration::from_millis(40);
        sync.toggle_sync(later);
        assert!(sync.is_syncing());
        assert!(!sync.tick(start + Duration::from_millis(100)));
        assert!(sync.tick(later + Duration::from_millis(100)));
    }

    #[test]
    fn test_load_sample_resets_views() {
        let catalog = catalog();
        let mut sync = sync(30.0, 30.0);
        let mut recorder = Recorder::default();
        sync.track_mut(ORIGINAL).set_volume(35.0);
        sync.handle_event(ORIGINAL, &TransportEvent::Ready, &mut recorder);
        sync.track_mut(ORIGINAL).toggle_play_pause();

        sync.load_sample(&catalog, 1).unwrap();

        assert_eq!(sync.current_sample(), Some(1));
        for role in TrackRole::ALL {
            let track = sync.track(role);
            assert!(!track.is_playing());
            assert_eq!(track.view().label, PlayLabel::Play);
            assert_eq!(track.view().readout, "0:00 / 0:00");
            assert_eq!(track.view().status, TrackStatus::Loading(0));
        }
        assert_eq!(
            sync.track(ORIGINAL).transport().loads,
            vec![PathBuf::from("/audio/blues_01_original.wav")]
        );
        assert_eq!(
            sync.track(ADVERSARIAL).transport().loads,
            vec![PathBuf::from("/audio/blues_01_adversarial.wav")]
        );
        assert_eq!(sync.track(ORIGINAL).view().volume_percent, 35.0);
    }

    #[test]
    fn test_loaded_sample_starts_at_zero_once_ready() {
        let catalog = catalog();
        let mut sync = sync(30.0, 30.0);
        let mut recorder = Recorder::default();
        set_position(&mut sync, ORIGINAL, 7.0);

        sync.load_sample(&catalog, 0).unwrap();
        for role in TrackRole::ALL {
            sync.track_mut(role).transport_mut().finish_load(30.0);
            sync.handle_event(role, &TransportEvent::Ready, &mut recorder);
            assert_eq!(position(&sync, role), 0.0);
            assert_eq!(sync.track(role).view().readout, "0:00 / 0:30");
        }
    }

    #[test]
    fn test_load_sample_while_syncing_ends_session() {
        let catalog = catalog();
        let mut sync = sync(30.0, 30.0);
        let start = Instant::now();
        sync.toggle_sync(start);

        sync.load_sample(&catalog, 0).unwrap();

        assert!(!sync.is_syncing());
        assert!(!sync.tick(start + Duration::from_secs(1)));
        assert!(!sync.track(ORIGINAL).view().sync_active);
    }

    #[test]
    fn test_missing_sample_changes_nothing() {
        let catalog = catalog();
        let mut sync = sync(30.0, 30.0);
        sync.toggle_sync(Instant::now());

        assert_eq!(
            sync.load_sample(&catalog, 7),
            Err(PlayerError::MissingSample(7))
        );
        assert!(sync.is_syncing());
        assert!(sync.track(ORIGINAL).is_playing());
        assert!(sync.track(ORIGINAL).transport().loads.is_empty());
        assert_eq!(sync.current_sample(), None);
    }

    #[test]
    fn test_jump_skips_unknown_duration() {
        let mut sync = sync(30.0, 0.0);
        sync.jump_to_time(12.0);
        assert!((position(&sync, ORIGINAL) - 12.0).abs() < 1e-9);
        assert_eq!(position(&sync, ADVERSARIAL), 0.0);
        assert!(sync.track(ADVERSARIAL).transport().seeks.is_empty());
    }

    #[test]
    fn test_jump_clamps_past_end() {
        let mut sync = sync(30.0, 20.0);
        sync.jump_to_time(25.0);
        assert!((position(&sync, ORIGINAL) - 25.0).abs() < 1e-9);
        assert!((position(&sync, ADVERSARIAL) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_event_only_affects_its_track() {
        let mut sync = sync(30.0, 30.0);
        let mut recorder = Recorder::default();
        sync.handle_event(ADVERSARIAL, &TransportEvent::Error("decode".into()), &mut recorder);

        assert!(matches!(sync.track(ADVERSARIAL).view().status, TrackStatus::Error(_)));
        assert_eq!(sync.track(ORIGINAL).view().status, TrackStatus::Empty);
        assert_eq!(recorder.messages.len(), 1);
        assert_eq!(recorder.messages[0].0, "Failed to load adversarial audio");
    }

    #[test]
    fn test_volume_out_of_range_clamps() {
        let mut sync = sync(30.0, 30.0);
        sync.track_mut(ORIGINAL).set_volume(150.0);
        assert_eq!(sync.track(ORIGINAL).transport().volume, 1.0);
        assert_eq!(sync.track(ADVERSARIAL).transport().volume, 0.8);
    }

    #[test]
    fn test_shutdown_pauses_and_cancels() {
        let mut sync = sync(30.0, 30.0);
        let start = Instant::now();
        sync.toggle_sync(start);
        sync.shutdown();

        assert!(!sync.is_syncing());
        assert!(!sync.timer_armed());
        assert!(!sync.track(ORIGINAL).is_playing());
        assert!(!sync.track(ADVERSARIAL).is_playing());
        assert!(!sync.tick(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config {
            poll_interval_ms: 250,
            drift_threshold_ms: 40,
            ..Config::default()
        };
        let settings = SyncSettings::from_config(&config);
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert!((settings.drift_threshold - 0.04).abs() < 1e-12);
    }
}
