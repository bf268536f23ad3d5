//! `Transport` implementation over a deck shared with the audio thread

use crate::deck::{Deck, DeckState};
use crate::transport::{DeckEvent, TrackRole, Transport, TransportEvent};
use crossbeam_channel::Sender;
use maia_library::TrackLoader;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::thread;

/// Handle to one engine deck
///
/// Commands lock the deck briefly and apply immediately. Decoding happens on a
/// loader thread; its progress and outcome arrive as `DeckEvent`s.
#[derive(Clone)]
pub struct DeckHandle {
    role: TrackRole,
    deck: Arc<Mutex<Deck>>,
    events: Sender<DeckEvent>,
    loader: TrackLoader,
}

impl DeckHandle {
    pub(crate) fn new(
        role: TrackRole,
        deck: Arc<Mutex<Deck>>,
        events: Sender<DeckEvent>,
        loader: TrackLoader,
    ) -> Self {
        Self {
            role,
            deck,
            events,
            loader,
        }
    }

    /// Snapshot for rendering
    pub fn snapshot(&self) -> DeckState {
        self.deck.lock().state()
    }

    fn emit(&self, event: TransportEvent) {
        let _ = self.events.try_send(DeckEvent {
            role: self.role,
            event,
        });
    }
}

impl Transport for DeckHandle {
    fn load(&mut self, source: &Path) {
        let generation = self.deck.lock().begin_load(source);
        tracing::info!("Loading {} deck: {}", self.role, source.display());

        let role = self.role;
        let deck = self.deck.clone();
        let events = self.events.clone();
        let loader = self.loader;
        let path = source.to_path_buf();

        let spawned = thread::Builder::new()
            .name(format!("maia-load-{}", role))
            .spawn(move || {
                let send = |event| {
                    let _ = events.try_send(DeckEvent { role, event });
                };
                let is_current = || deck.lock().generation() == generation;

                let result = loader.load_with_progress(&path, |percent| {
                    if is_current() {
                        send(TransportEvent::Loading(percent));
                    }
                });

                match result {
                    Ok(track) => {
                        if deck.lock().install(generation, track) {
                            send(TransportEvent::Ready);
                        } else {
                            tracing::debug!("Discarding stale load of {}", path.display());
                        }
                    }
                    Err(e) => {
                        if is_current() {
                            tracing::error!("Failed to load {}: {}", path.display(), e);
                            send(TransportEvent::Error(e.to_string()));
                        }
                    }
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn loader thread: {}", e);
            self.emit(TransportEvent::Error(e.to_string()));
        }
    }

    fn play(&mut self) {
        let started = {
            let mut deck = self.deck.lock();
            deck.play();
            deck.is_playing()
        };
        if started {
            self.emit(TransportEvent::Play);
        }
    }

    fn pause(&mut self) {
        let was_playing = {
            let mut deck = self.deck.lock();
            let was_playing = deck.is_playing();
            deck.pause();
            was_playing
        };
        if was_playing {
            self.emit(TransportEvent::Pause);
        }
    }

    fn seek_to(&mut self, fraction: f64) {
        self.deck.lock().seek_to_fraction(fraction);
    }

    fn is_playing(&self) -> bool {
        self.deck.lock().is_playing()
    }

    fn current_time(&self) -> f64 {
        self.deck.lock().position_secs()
    }

    fn duration(&self) -> f64 {
        self.deck.lock().duration()
    }

    fn set_volume(&mut self, volume: f32) {
        self.deck.lock().set_volume(volume);
    }
}
