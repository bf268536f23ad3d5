//! Audio engine - owns the output stream and mixes both decks

use crate::deck::Deck;
use crate::handle::DeckHandle;
use crate::transport::{DeckEvent, TrackRole, TransportEvent};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender};
use maia_library::TrackLoader;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors raised while bringing up audio output
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No audio output device found")]
    NoOutputDevice,
    #[error("Failed to get audio config: {0}")]
    Config(String),
    #[error("Failed to create audio stream: {0}")]
    BuildStream(String),
    #[error("Failed to start audio: {0}")]
    PlayStream(String),
    #[error("Failed to spawn audio thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Audio thread did not report readiness")]
    InitTimeout,
}

/// Interval between progress events for playing decks (~30fps)
const PROGRESS_INTERVAL: Duration = Duration::from_millis(33);
/// How long `start` waits for the audio thread to open the device
const INIT_TIMEOUT: Duration = Duration::from_secs(5);
/// Pre-allocated stereo buffer size (floats)
const MAX_BUFFER_SIZE: usize = 8192;

/// Mixing state held by the audio callback
struct EngineState {
    decks: [Arc<Mutex<Deck>>; 2],
    buffer_a: Vec<f32>,
    buffer_b: Vec<f32>,
}

impl EngineState {
    fn new(decks: [Arc<Mutex<Deck>>; 2]) -> Self {
        Self {
            decks,
            buffer_a: vec![0.0; MAX_BUFFER_SIZE],
            buffer_b: vec![0.0; MAX_BUFFER_SIZE],
        }
    }

    /// Render both decks into a stereo interleaved buffer
    ///
    /// Returns which decks reached their end during this buffer.
    fn process(&mut self, output: &mut [f32]) -> [bool; 2] {
        let len = output.len();
        if len > self.buffer_a.len() {
            self.buffer_a.resize(len, 0.0);
            self.buffer_b.resize(len, 0.0);
        }

        let buf_a = &mut self.buffer_a[..len];
        let buf_b = &mut self.buffer_b[..len];
        let mut finished = [false; 2];

        // try_lock: never block the real-time thread; a contended deck renders silence
        for (i, buf) in [buf_a, buf_b].into_iter().enumerate() {
            match self.decks[i].try_lock() {
                Some(mut deck) => finished[i] = deck.process(buf),
                None => buf.fill(0.0),
            }
        }

        for ((out, a), b) in output
            .iter_mut()
            .zip(self.buffer_a[..len].iter())
            .zip(self.buffer_b[..len].iter())
        {
            *out = (a + b).clamp(-1.0, 1.0);
        }

        finished
    }
}

/// Handle to the audio thread and its two decks
pub struct AudioEngine {
    decks: [Arc<Mutex<Deck>>; 2],
    event_tx: Sender<DeckEvent>,
    event_rx: Receiver<DeckEvent>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    sample_rate: u32,
}

impl AudioEngine {
    /// Open the default output device and start mixing
    ///
    /// Blocks until the audio thread reports success or failure, so a returned
    /// engine is always fully initialized.
    pub fn start() -> Result<Self, EngineError> {
        let decks = [
            Arc::new(Mutex::new(Deck::default())),
            Arc::new(Mutex::new(Deck::default())),
        ];
        // Buffer size of 1024 provides headroom for event bursts without saturation
        let (event_tx, event_rx) = bounded(1024);
        let (init_tx, init_rx) = bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread = thread::Builder::new().name("maia-audio".into()).spawn({
            let decks = decks.clone();
            let event_tx = event_tx.clone();
            let shutdown = shutdown.clone();
            move || run_audio_thread(decks, event_tx, init_tx, shutdown)
        })?;

        let sample_rate = match init_rx.recv_timeout(INIT_TIMEOUT) {
            Ok(Ok(rate)) => rate,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                // Joining could block on a hung device; a late thread sees the flag
                // in `report_ready` and closes the stream itself.
                shutdown.store(true, Ordering::SeqCst);
                return Err(EngineError::InitTimeout);
            }
        };

        tracing::info!("Audio engine running at {} Hz", sample_rate);

        Ok(Self {
            decks,
            event_tx,
            event_rx,
            shutdown,
            thread: Some(thread),
            sample_rate,
        })
    }

    /// Transport handle for one deck; decoded audio is resampled to the device rate
    pub fn deck(&self, role: TrackRole) -> DeckHandle {
        DeckHandle::new(
            role,
            self.decks[role.index()].clone(),
            self.event_tx.clone(),
            TrackLoader::with_sample_rate(self.sample_rate),
        )
    }

    /// Transport events from both decks
    pub fn events(&self) -> &Receiver<DeckEvent> {
        &self.event_rx
    }

    /// Stop the audio thread and wait for it
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
            tracing::info!("Audio engine stopped");
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_audio_thread(
    decks: [Arc<Mutex<Deck>>; 2],
    event_tx: Sender<DeckEvent>,
    init_tx: Sender<Result<u32, EngineError>>,
    shutdown: Arc<AtomicBool>,
) {
    let host = cpal::default_host();
    let device = match host.default_output_device() {
        Some(d) => d,
        None => {
            let _ = init_tx.send(Err(EngineError::NoOutputDevice));
            return;
        }
    };

    let config = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = init_tx.send(Err(EngineError::Config(e.to_string())));
            return;
        }
    };

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    let mut state = EngineState::new(decks.clone());
    // Stereo scratch for devices that are not exactly stereo
    let mut stereo_buffer = vec![0.0f32; MAX_BUFFER_SIZE];
    let callback_tx = event_tx.clone();

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let finished = if channels == 2 {
                state.process(data)
            } else {
                let frames = data.len() / channels.max(1);
                let stereo_len = frames * 2;
                if stereo_len > stereo_buffer.len() {
                    stereo_buffer.resize(stereo_len, 0.0);
                }
                let stereo = &mut stereo_buffer[..stereo_len];
                let finished = state.process(stereo);
                for (frame, lr) in data.chunks_mut(channels.max(1)).zip(stereo.chunks(2)) {
                    if channels == 1 {
                        frame[0] = (lr[0] + lr[1]) * 0.5;
                    } else {
                        frame.fill(0.0);
                        frame[0] = lr[0];
                        frame[1] = lr[1];
                    }
                }
                finished
            };

            for role in TrackRole::ALL {
                if finished[role.index()] {
                    let _ = callback_tx.try_send(DeckEvent {
                        role,
                        event: TransportEvent::Finish,
                    });
                }
            }
        },
        |err| {
            tracing::error!("Audio stream error: {}", err);
        },
        None,
    );

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = init_tx.send(Err(EngineError::BuildStream(e.to_string())));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = init_tx.send(Err(EngineError::PlayStream(e.to_string())));
        return;
    }

    if !report_ready(&init_tx, sample_rate, &shutdown) {
        tracing::warn!("Audio device opened after start-up timed out, closing it");
        return;
    }

    // Progress loop; the stream lives until shutdown
    let mut last_progress = Instant::now();
    while !shutdown.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(5));

        if last_progress.elapsed() < PROGRESS_INTERVAL {
            continue;
        }
        last_progress = Instant::now();

        for role in TrackRole::ALL {
            let position = {
                let deck = decks[role.index()].lock();
                deck.is_playing().then(|| deck.position_secs())
            };
            if let Some(position) = position {
                let _ = event_tx.try_send(DeckEvent {
                    role,
                    event: TransportEvent::Progress(position),
                });
            }
        }
    }

    drop(stream);
}

/// Hand the device rate to `AudioEngine::start`; false if it stopped waiting
fn report_ready(
    init_tx: &Sender<Result<u32, EngineError>>,
    sample_rate: u32,
    shutdown: &AtomicBool,
) -> bool {
    init_tx.send(Ok(sample_rate)).is_ok() && !shutdown.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maia_library::LoadedTrack;
    use std::path::Path;

    fn deck_with(value: f32, frames: usize) -> Arc<Mutex<Deck>> {
        let mut deck = Deck::new(1000);
        let generation = deck.begin_load(Path::new("x.wav"));
        deck.install(
            generation,
            LoadedTrack {
                samples: vec![value; frames * 2],
                sample_rate: 1000,
                waveform_overview: Vec::new(),
            },
        );
        deck.play();
        Arc::new(Mutex::new(deck))
    }

    #[test]
    fn test_mix_sums_and_clamps() {
        let mut state = EngineState::new([deck_with(0.75, 100), deck_with(0.5, 100)]);
        let mut out = vec![0.0; 8];
        let finished = state.process(&mut out);
        assert_eq!(finished, [false, false]);
        assert!(out.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_mix_reports_per_deck_finish() {
        let mut state = EngineState::new([deck_with(0.1, 2), deck_with(0.1, 100)]);
        let mut out = vec![0.0; 8];
        assert_eq!(state.process(&mut out), [true, false]);
    }

    #[test]
    fn test_locked_deck_renders_silence() {
        let a = deck_with(0.3, 100);
        let mut state = EngineState::new([a.clone(), deck_with(0.0, 100)]);
        let _guard = a.lock();
        let mut out = vec![1.0; 4];
        state.process(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_late_device_is_closed_after_timeout() {
        let shutdown = AtomicBool::new(false);
        let (tx, rx) = bounded(1);
        assert!(report_ready(&tx, 48000, &shutdown));
        assert_eq!(rx.try_recv().ok().and_then(Result::ok), Some(48000));

        // `start` gave up: flag raised, receiver still alive
        shutdown.store(true, Ordering::SeqCst);
        assert!(!report_ready(&tx, 48000, &shutdown));

        // `start` gave up and returned: receiver dropped
        let (tx, rx) = bounded(1);
        drop(rx);
        assert!(!report_ready(&tx, 48000, &AtomicBool::new(false)));
    }
}
