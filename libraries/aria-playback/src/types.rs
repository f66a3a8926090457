//! Core types for the playback queue engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Catalog song record supplied by the library service
///
/// The queue engine treats this as an opaque immutable value: it copies
/// fields for display and grouping but never mutates them or talks to the
/// catalog itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Stable catalog identifier
    pub id: String,

    /// Track title
    pub name: String,

    /// Artist name
    pub artist: String,

    /// Album name (optional)
    pub album: Option<String>,

    /// Album artist (optional, falls back to `artist` in most UIs)
    pub album_artist: Option<String>,

    /// Genre (optional)
    pub genre: Option<String>,

    /// Track duration, if the catalog knows it
    pub duration: Option<Duration>,

    /// Whether the user has favorited this song
    pub user_favorite: bool,

    /// User rating (0-5), if any
    pub user_rating: Option<u8>,
}

/// Queue entry identifier
///
/// Process-unique, generated when a song is adopted into the queue and
/// never reused. The same catalog song can sit in the queue several times;
/// each occurrence gets its own entry id, and all reorder/removal
/// operations key on it. The catalog `Song::id` is NOT a safe lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueEntryId(Uuid);

impl QueueEntryId {
    /// Generate a fresh entry id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for QueueEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A song adopted into the queue
///
/// `Song` plus the entry id that makes this occurrence unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSong {
    /// Identity of this queue occurrence
    pub entry_id: QueueEntryId,

    /// The underlying catalog song
    pub song: Song,
}

impl QueueSong {
    /// Adopt a catalog song into the queue with a fresh entry id
    pub fn adopt(song: Song) -> Self {
        Self {
            entry_id: QueueEntryId::generate(),
            song,
        }
    }
}

/// Playback status
///
/// There is no Stopped or Loading state; load latency belongs to the audio
/// engine. "Nothing to play" is signaled by an empty selection instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayStatus {
    /// Currently playing
    Playing,

    /// Paused (or nothing selected)
    Paused,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop when the queue ends
    #[default]
    Off,

    /// Loop the current track only
    One,

    /// Loop the entire queue
    All,
}

/// Shuffle mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShuffleMode {
    /// Play in queue order
    #[default]
    Off,

    /// Permute the play order while keeping the lane structure intact
    Track,
}

/// Queue mode
///
/// A transport-level setting: it selects the composition rule and the lane
/// that insertion operations target by default. It is not a queue field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueueMode {
    /// Single-lane playback from the default lane
    #[default]
    Default,

    /// The priority lane plays first, ahead of the default lane
    Priority,
}

/// Where `enqueue` places new songs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Play immediately
    Now,

    /// Play right after the current track
    Next,

    /// Append to the end of the active lane
    Last,
}

/// Which side of an anchor entry an insertion lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Immediately before the anchor
    Top,

    /// Immediately after the anchor
    Bottom,
}

/// Dual-buffer playback slot
///
/// One of two logical audio buffers. The active slot plays while the audio
/// engine preloads the upcoming track into the other; advancing toggles
/// them. Unrelated to the lane/priority distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerSlot {
    /// First buffer slot
    #[default]
    One,

    /// Second buffer slot
    Two,
}

impl PlayerSlot {
    /// The other slot
    pub fn other(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }
}

/// Song attribute the grouped queue view keys on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// Group by album name
    Album,

    /// Group by album artist
    AlbumArtist,

    /// Group by artist
    Artist,

    /// Group by genre
    Genre,
}

impl GroupKey {
    /// The grouping value of a song for this key
    ///
    /// Missing optional attributes group under the empty string.
    pub fn value<'a>(&self, song: &'a Song) -> &'a str {
        match self {
            GroupKey::Album => song.album.as_deref().unwrap_or(""),
            GroupKey::AlbumArtist => song.album_artist.as_deref().unwrap_or(""),
            GroupKey::Artist => &song.artist,
            GroupKey::Genre => song.genre.as_deref().unwrap_or(""),
        }
    }
}

/// One contiguous run in the grouped queue view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueGroup {
    /// Group label (attribute value, or the fixed lane name in priority mode)
    pub name: String,

    /// Number of consecutive entries in the run
    pub count: usize,
}

/// A seek request for the audio engine
///
/// Tagged with a strictly monotonic token so that two requests for the
/// same timestamp are still observable as distinct events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekRequest {
    /// Monotonic request token
    pub token: u64,

    /// Target position within the current track
    pub position: Duration,
}

/// Transport settings that survive a restart
///
/// Lane contents are session-only and are deliberately absent: a cold
/// start always begins with an empty queue. The persistence medium and
/// format are the caller's concern; this is just the serializable slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Repeat mode
    pub repeat: RepeatMode,

    /// Shuffle mode
    pub shuffle: ShuffleMode,

    /// Queue mode
    pub queue_mode: QueueMode,

    /// Playback speed (0.5-2.0)
    pub speed: f32,

    /// Volume level (0-100)
    pub volume: u8,

    /// Mute state
    pub muted: bool,

    /// Crossfade duration in milliseconds (0-10000)
    pub crossfade_ms: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            repeat: RepeatMode::Off,
            shuffle: ShuffleMode::Off,
            queue_mode: QueueMode::Default,
            speed: 1.0,
            volume: 80,
            muted: false,
            crossfade_ms: 0,
        }
    }
}
