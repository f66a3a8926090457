//! Aria Player - Playback Queue Engine
//!
//! Platform-agnostic playback queue management for Aria Player.
//!
//! This crate provides:
//! - Dual-lane queue (default + priority) with stable per-entry identity
//! - Queue composition and contiguous-run grouping for the UI
//! - Transport state (play/pause, repeat, shuffle, speed, volume, mute,
//!   crossfade duration, dual-buffer slot, seek requests)
//! - Index reconciliation: the current track keeps playing across
//!   arbitrary inserts, removals, and reorders
//! - Synchronous projection-based subscriptions with caller-supplied
//!   equality
//!
//! # Architecture
//!
//! `aria-playback` is completely platform-agnostic: no audio I/O, no UI
//! toolkit, no storage dependency. The catalog service supplies [`Song`]
//! records; the audio engine consumes the current/next pair, the active
//! buffer slot, and seek requests; the UI consumes the composed and
//! grouped views. The composition root owns a single [`QueueEngine`] and
//! hands it by reference to those collaborators - there is no global
//! instance, and every operation is synchronous and total.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use aria_playback::{Placement, QueueEngine, Song};
//! use std::time::Duration;
//!
//! let mut engine = QueueEngine::new();
//!
//! let song = Song {
//!     id: "track1".to_string(),
//!     name: "My Song".to_string(),
//!     artist: "Artist Name".to_string(),
//!     album: Some("Album Name".to_string()),
//!     album_artist: None,
//!     genre: None,
//!     duration: Some(Duration::from_secs(180)),
//!     user_favorite: false,
//!     user_rating: None,
//! };
//!
//! engine.enqueue(vec![song], Placement::Now);
//! assert_eq!(engine.index(), Some(0));
//!
//! // Control playback
//! engine.pause();
//! engine.play(None);
//! engine.next();
//! ```
//!
//! # Example: Observing State
//!
//! ```rust
//! use aria_playback::{EngineState, QueueEngine};
//!
//! let mut engine = QueueEngine::default();
//!
//! // Fires only when the current track's identity changes, no matter how
//! // much unrelated engine state moves underneath.
//! engine.subscribe_changed(
//!     |state: &EngineState| state.current_song().map(|s| s.entry_id),
//!     |new, old| println!("track changed: {:?} -> {:?}", old, new),
//! );
//!
//! engine.set_volume(60); // quiet: the projection did not change
//! ```
//!
//! # Example: Restoring Settings
//!
//! ```rust
//! use aria_playback::{QueueEngine, RepeatMode};
//!
//! let mut engine = QueueEngine::new();
//! engine.set_repeat(RepeatMode::All);
//!
//! // Only transport settings survive a restart; lanes start empty.
//! let settings = engine.settings();
//! let restored = QueueEngine::with_settings(settings);
//! assert_eq!(restored.settings().repeat, RepeatMode::All);
//! assert!(restored.is_empty());
//! ```

mod manager;
mod queue;
mod shuffle;
mod subscription;
mod transport;
pub mod types;
mod view;
mod volume;

// Public exports
pub use manager::{AdvanceOutcome, EngineState, QueueEngine};
pub use subscription::SubscriptionId;
pub use types::{
    Edge, GroupKey, PlayStatus, Placement, PlayerSettings, PlayerSlot, QueueEntryId, QueueGroup,
    QueueMode, QueueSong, RepeatMode, SeekRequest, ShuffleMode, Song,
};
