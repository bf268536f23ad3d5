//! Audio engine for MAIA - decks, transports, and synchronized A/B playback
//!
//! This module provides the playback pipeline:
//! - Deck: in-memory playback of one decoded track
//! - AudioEngine: cpal output stream mixing the original and adversarial decks
//! - Track: per-track controls bound to a `Transport`
//! - Synchronizer: lock-step playback of both tracks with drift correction

mod deck;
mod engine;
mod handle;
mod notify;
mod sync;
mod track;
mod transport;

#[cfg(test)]
mod testing;

pub use deck::{Deck, DeckState};
pub use engine::{AudioEngine, EngineError};
pub use handle::DeckHandle;
pub use notify::{Notify, Severity};
pub use sync::{PlayerError, PollOutcome, PollTimer, SyncSettings, Synchronizer};
pub use track::{format_time, PlayLabel, Track, TrackStatus, TrackView};
pub use transport::{DeckEvent, TrackRole, Transport, TransportEvent};
