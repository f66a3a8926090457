//! Transport state
//!
//! The playback position within the composed order plus every knob the
//! audio engine reads: status, repeat/shuffle/queue mode, dual-buffer slot,
//! speed, volume, crossfade duration, seek requests, and the last reported
//! progress timestamp. Everything here is total: setters clamp, nothing
//! panics, and "nothing selected" is `index == None`.
//!
//! Index *transitions* (next/previous/advance and post-mutation
//! reconciliation) live in the engine, which knows the queue length; this
//! module owns the state and its clamping rules.

use crate::types::{
    PlayStatus, PlayerSettings, PlayerSlot, QueueMode, RepeatMode, SeekRequest, ShuffleMode,
};
use crate::volume::Volume;
use std::time::Duration;

/// Playback speed bounds
const SPEED_MIN: f32 = 0.5;
const SPEED_MAX: f32 = 2.0;

/// Crossfade duration ceiling (10 seconds)
const CROSSFADE_MAX_MS: u32 = 10_000;

#[derive(Debug, Clone)]
pub(crate) struct Transport {
    /// Position in the play order; `None` means nothing selected
    pub(crate) index: Option<usize>,

    /// Active dual-buffer slot
    pub(crate) slot: PlayerSlot,

    pub(crate) status: PlayStatus,
    pub(crate) repeat: RepeatMode,
    pub(crate) shuffle: ShuffleMode,
    pub(crate) queue_mode: QueueMode,

    /// Playback speed, clamped to 0.5-2.0
    speed: f32,

    pub(crate) volume: Volume,

    /// Crossfade duration in milliseconds, clamped to 0-10000
    crossfade_ms: u32,

    /// Monotonic seek token source
    seek_counter: u64,

    /// The most recent seek request, if any
    seek_request: Option<SeekRequest>,

    /// Last progress timestamp reported by the audio engine
    pub(crate) position: Duration,
}

impl Transport {
    pub(crate) fn new(settings: &PlayerSettings) -> Self {
        Self {
            index: None,
            slot: PlayerSlot::One,
            status: PlayStatus::Paused,
            repeat: settings.repeat,
            shuffle: settings.shuffle,
            queue_mode: settings.queue_mode,
            speed: clamp_speed(settings.speed),
            volume: {
                let mut volume = Volume::new(settings.volume);
                volume.set_muted(settings.muted);
                volume
            },
            crossfade_ms: settings.crossfade_ms.min(CROSSFADE_MAX_MS),
            seek_counter: 0,
            seek_request: None,
            position: Duration::ZERO,
        }
    }

    /// Snapshot of the settings that survive a restart
    pub(crate) fn settings(&self) -> PlayerSettings {
        PlayerSettings {
            repeat: self.repeat,
            shuffle: self.shuffle,
            queue_mode: self.queue_mode,
            speed: self.speed,
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            crossfade_ms: self.crossfade_ms,
        }
    }

    pub(crate) fn speed(&self) -> f32 {
        self.speed
    }

    /// Set playback speed, clamped; non-finite input is ignored
    pub(crate) fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() {
            self.speed = clamp_speed(speed);
        }
    }

    pub(crate) fn crossfade_ms(&self) -> u32 {
        self.crossfade_ms
    }

    pub(crate) fn set_crossfade_ms(&mut self, crossfade_ms: u32) {
        self.crossfade_ms = crossfade_ms.min(CROSSFADE_MAX_MS);
    }

    pub(crate) fn seek_request(&self) -> Option<SeekRequest> {
        self.seek_request
    }

    /// Record a seek request with a fresh token
    ///
    /// Repeating the same timestamp still produces a new token, so a
    /// cooperating audio engine observes every request as a distinct
    /// event and re-seeks even to its current position.
    pub(crate) fn request_seek(&mut self, position: Duration) -> SeekRequest {
        self.seek_counter += 1;
        let request = SeekRequest {
            token: self.seek_counter,
            position,
        };
        self.seek_request = Some(request);
        request
    }

    /// Drop the selection: nothing to play
    pub(crate) fn park(&mut self) {
        self.index = None;
        self.status = PlayStatus::Paused;
    }

    pub(crate) fn toggle_slot(&mut self) {
        self.slot = self.slot.other();
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(&PlayerSettings::default())
    }
}

fn clamp_speed(speed: f32) -> f32 {
    speed.clamp(SPEED_MIN, SPEED_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_parked() {
        let transport = Transport::default();
        assert_eq!(transport.index, None);
        assert_eq!(transport.status, PlayStatus::Paused);
        assert_eq!(transport.slot, PlayerSlot::One);
    }

    #[test]
    fn speed_clamps() {
        let mut transport = Transport::default();

        transport.set_speed(0.1);
        assert_eq!(transport.speed(), 0.5);

        transport.set_speed(5.0);
        assert_eq!(transport.speed(), 2.0);

        transport.set_speed(1.25);
        assert_eq!(transport.speed(), 1.25);

        transport.set_speed(f32::NAN);
        assert_eq!(transport.speed(), 1.25);
    }

    #[test]
    fn crossfade_clamps_to_ten_seconds() {
        let mut transport = Transport::default();

        transport.set_crossfade_ms(60_000);
        assert_eq!(transport.crossfade_ms(), 10_000);

        transport.set_crossfade_ms(3_000);
        assert_eq!(transport.crossfade_ms(), 3_000);
    }

    #[test]
    fn seek_tokens_are_monotonic_even_for_equal_timestamps() {
        let mut transport = Transport::default();

        let first = transport.request_seek(Duration::from_secs(30));
        let second = transport.request_seek(Duration::from_secs(30));

        assert_eq!(first.position, second.position);
        assert!(second.token > first.token);
        assert_eq!(transport.seek_request(), Some(second));
    }

    #[test]
    fn restored_settings_are_clamped() {
        let settings = PlayerSettings {
            speed: 9.0,
            volume: 200,
            crossfade_ms: 99_999,
            ..PlayerSettings::default()
        };

        let transport = Transport::new(&settings);

        assert_eq!(transport.speed(), 2.0);
        assert_eq!(transport.volume.level(), 100);
        assert_eq!(transport.crossfade_ms(), 10_000);
    }

    #[test]
    fn settings_round_trip() {
        let settings = PlayerSettings {
            repeat: RepeatMode::All,
            shuffle: ShuffleMode::Track,
            queue_mode: QueueMode::Priority,
            speed: 1.5,
            volume: 30,
            muted: true,
            crossfade_ms: 2_500,
        };

        let transport = Transport::new(&settings);
        assert_eq!(transport.settings(), settings);
    }

    #[test]
    fn park_clears_selection_and_pauses() {
        let mut transport = Transport::default();
        transport.index = Some(4);
        transport.status = PlayStatus::Playing;

        transport.park();

        assert_eq!(transport.index, None);
        assert_eq!(transport.status, PlayStatus::Paused);
    }
}
