//! Queue engine - core orchestration
//!
//! [`QueueEngine`] is the single owned entry point for the playback queue:
//! the application's composition root creates one and hands it by reference
//! to the UI and the audio engine. There is no global instance.
//!
//! Every mutation goes through one commit point: snapshot the previous
//! state, apply the mutation, notify subscribers. Structural mutations
//! additionally run index reconciliation exactly once - the captured
//! pre-mutation current entry is relocated by identity in the new play
//! order, so the reported "current track" survives arbitrary reordering.

use crate::queue::{DualQueue, Lane};
use crate::shuffle;
use crate::subscription::{Subscribers, SubscriptionId};
use crate::transport::Transport;
use crate::types::{
    Edge, GroupKey, PlayStatus, Placement, PlayerSettings, PlayerSlot, QueueEntryId, QueueGroup,
    QueueMode, QueueSong, RepeatMode, SeekRequest, ShuffleMode, Song,
};
use crate::view;
use std::time::Duration;
use tracing::{debug, warn};

/// What the audio engine needs after an automatic track transition
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    /// The track now playing, if any
    pub current: Option<QueueSong>,

    /// The track that will play after it (preload candidate)
    pub next: Option<QueueSong>,

    /// The buffer slot that just went inactive and should be refilled
    pub refill_slot: PlayerSlot,
}

/// Snapshot of everything the engine owns
///
/// Subscribers project slices out of this; all read accessors live here so
/// a projection function and a direct caller see exactly the same surface.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub(crate) queue: DualQueue,
    pub(crate) transport: Transport,
}

impl EngineState {
    pub(crate) fn new() -> Self {
        Self {
            queue: DualQueue::new(),
            transport: Transport::default(),
        }
    }

    fn with_settings(settings: &PlayerSettings) -> Self {
        Self {
            queue: DualQueue::new(),
            transport: Transport::new(settings),
        }
    }

    // ===== Read projections =====

    /// The flattened queue view (priority lane first in priority mode)
    pub fn composed(&self) -> Vec<&QueueSong> {
        view::composed(&self.queue, self.transport.queue_mode)
    }

    /// The order the transport steps through (shuffle-aware)
    pub fn play_order(&self) -> Vec<&QueueSong> {
        view::play_order(&self.queue, self.transport.queue_mode, self.transport.shuffle)
    }

    /// Contiguous-run grouping of the composed view
    pub fn grouped(&self, key: GroupKey) -> Vec<QueueGroup> {
        view::grouped(&self.queue, self.transport.queue_mode, key)
    }

    /// Number of entries across both lanes
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Position in the play order; `None` means nothing selected
    pub fn index(&self) -> Option<usize> {
        self.transport.index
    }

    /// The currently selected track
    pub fn current_song(&self) -> Option<&QueueSong> {
        self.entry_at(self.transport.index?)
    }

    /// The track that will play after the current one, honoring repeat
    pub fn next_song(&self) -> Option<&QueueSong> {
        let len = self.play_len();
        if len == 0 {
            return None;
        }
        let index = self.transport.index?;

        match self.transport.repeat {
            RepeatMode::One => self.entry_at(index),
            _ if index + 1 < len => self.entry_at(index + 1),
            RepeatMode::All => self.entry_at(0),
            _ => None,
        }
    }

    pub fn status(&self) -> PlayStatus {
        self.transport.status
    }

    pub fn repeat(&self) -> RepeatMode {
        self.transport.repeat
    }

    pub fn shuffle_mode(&self) -> ShuffleMode {
        self.transport.shuffle
    }

    pub fn queue_mode(&self) -> QueueMode {
        self.transport.queue_mode
    }

    /// Active dual-buffer slot
    pub fn slot(&self) -> PlayerSlot {
        self.transport.slot
    }

    pub fn speed(&self) -> f32 {
        self.transport.speed()
    }

    /// Volume level (0-100)
    pub fn volume_level(&self) -> u8 {
        self.transport.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.transport.volume.is_muted()
    }

    /// Linear gain for the audio engine (0.0 when muted)
    pub fn gain(&self) -> f32 {
        self.transport.volume.gain()
    }

    /// Crossfade duration in milliseconds
    pub fn crossfade_ms(&self) -> u32 {
        self.transport.crossfade_ms()
    }

    /// Last progress timestamp reported by the audio engine
    pub fn position(&self) -> Duration {
        self.transport.position
    }

    /// Most recent seek request, if any
    pub fn seek_request(&self) -> Option<SeekRequest> {
        self.transport.seek_request()
    }

    /// Transport settings that survive a restart
    pub fn settings(&self) -> PlayerSettings {
        self.transport.settings()
    }

    // ===== Internal helpers =====

    fn play_len(&self) -> usize {
        // Both orders have the same length; the permutation never adds or
        // drops entries.
        self.queue.len()
    }

    fn entry_at(&self, index: usize) -> Option<&QueueSong> {
        self.play_order().into_iter().nth(index)
    }

    fn position_of(&self, id: QueueEntryId) -> Option<usize> {
        self.play_order().iter().position(|s| s.entry_id == id)
    }

    fn current_entry_id(&self) -> Option<QueueEntryId> {
        self.current_song().map(|s| s.entry_id)
    }

    fn active_lane(&self) -> Lane {
        match self.transport.queue_mode {
            QueueMode::Default => Lane::Default,
            QueueMode::Priority => Lane::Priority,
        }
    }

    /// Run a structural mutation with the invariant bookkeeping around it:
    /// shuffle permutation repair, then index reconciliation - exactly
    /// once, against the fully mutated state.
    fn structural(&mut self, mutate: impl FnOnce(&mut Self)) {
        let previous_current = self.current_entry_id();
        let previous_index = self.transport.index;

        mutate(self);

        if self.transport.shuffle == ShuffleMode::Track {
            self.queue.sync_shuffled(previous_current);
        }
        self.reconcile(previous_current, previous_index);
    }

    /// Relocate the pre-mutation current entry in the new play order
    ///
    /// If the entry was removed, the old index clamps to the last valid
    /// position. An empty queue parks the transport.
    fn reconcile(&mut self, previous_current: Option<QueueEntryId>, previous_index: Option<usize>) {
        let len = self.play_len();
        if len == 0 {
            self.transport.park();
            return;
        }

        if let Some(id) = previous_current {
            if let Some(position) = self.position_of(id) {
                self.transport.index = Some(position);
                return;
            }
        }

        self.transport.index = previous_index.map(|index| index.min(len - 1));
    }

    // ===== Enqueue placements =====

    fn enqueue_now(&mut self, songs: Vec<QueueSong>) {
        match self.transport.queue_mode {
            QueueMode::Default => {
                let first_id = songs[0].entry_id;
                self.queue.replace_default(songs);
                if self.transport.shuffle == ShuffleMode::Track {
                    let order = shuffle::seeded_with_first(Some(first_id), &self.queue.default_ids());
                    self.queue.set_shuffled(order);
                }
                self.transport.index = Some(0);
            }
            QueueMode::Priority => {
                let shuffle_anchor = self.current_entry_id();
                let mut rest = songs;
                let first = rest.remove(0);
                let first_id = first.entry_id;

                // The first song lands right after the play head in its
                // lane; with no play head it seeds the priority lane.
                match shuffle_anchor.and_then(|id| self.queue.locate(id)) {
                    Some((lane, position)) => self.queue.insert_at(lane, position + 1, vec![first]),
                    None => self.queue.insert_at(Lane::Priority, 0, vec![first]),
                }
                self.queue.push_back(Lane::Default, rest);

                if self.transport.shuffle == ShuffleMode::Track {
                    self.queue.sync_shuffled(shuffle_anchor);
                }
                self.transport.index = self.position_of(first_id);
            }
        }

        self.transport.status = PlayStatus::Playing;
        self.transport.slot = PlayerSlot::One;
    }

    fn enqueue_next(&mut self, songs: Vec<QueueSong>) {
        self.structural(|state| {
            let current = state.current_entry_id();
            match current.and_then(|id| state.queue.locate(id)) {
                Some((lane, position)) => state.queue.insert_at(lane, position + 1, songs),
                None => {
                    let lane = state.active_lane();
                    state.queue.insert_at(lane, 0, songs);
                }
            }
        });
    }

    fn enqueue_last(&mut self, songs: Vec<QueueSong>) {
        self.structural(|state| {
            let lane = state.active_lane();
            state.queue.push_back(lane, songs);
        });
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

/// The playback queue engine
///
/// Owns the dual-lane queue, the transport state, and the subscriber list.
/// All operations are synchronous and total: missing anchors no-op,
/// out-of-range input clamps, and the only "nothing to play" signal is an
/// empty selection. Callers serialize access; the engine holds no locks.
pub struct QueueEngine {
    state: EngineState,
    subscribers: Subscribers,
}

impl QueueEngine {
    /// Create an empty engine with default transport settings
    pub fn new() -> Self {
        Self::with_settings(PlayerSettings::default())
    }

    /// Create an empty engine from restored transport settings
    ///
    /// Lane contents never survive a restart; only the transport slice is
    /// restored, clamped on the way in.
    pub fn with_settings(settings: PlayerSettings) -> Self {
        Self {
            state: EngineState::with_settings(&settings),
            subscribers: Subscribers::new(),
        }
    }

    /// Read access to the full engine state
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// One commit: snapshot, mutate, notify.
    fn commit<R>(&mut self, mutate: impl FnOnce(&mut EngineState) -> R) -> R {
        let previous = self.state.clone();
        let result = mutate(&mut self.state);
        self.subscribers.notify(&previous, &self.state);
        result
    }

    // ===== Queue mutations =====

    /// Add catalog songs to the queue
    ///
    /// Fresh entry ids are attached, so the same song can be enqueued any
    /// number of times. Placement semantics depend on the queue mode; see
    /// [`Placement`].
    pub fn enqueue(&mut self, songs: Vec<Song>, placement: Placement) {
        if songs.is_empty() {
            return;
        }
        debug!("enqueue {} song(s), placement {:?}", songs.len(), placement);

        self.commit(|state| {
            let adopted: Vec<QueueSong> = songs.into_iter().map(QueueSong::adopt).collect();
            match placement {
                Placement::Now => state.enqueue_now(adopted),
                Placement::Next => state.enqueue_next(adopted),
                Placement::Last => state.enqueue_last(adopted),
            }
        });
    }

    /// Insert songs next to an existing entry
    ///
    /// No-op if the anchor is gone - a drag target can legitimately vanish
    /// between drag start and drop.
    pub fn insert_relative(&mut self, songs: Vec<Song>, anchor: QueueEntryId, edge: Edge) {
        if songs.is_empty() {
            return;
        }
        if self.state.queue.locate(anchor).is_none() {
            warn!("insert_relative: anchor {} not found, dropping insert", anchor);
            return;
        }

        self.commit(|state| {
            state.structural(|s| {
                let adopted: Vec<QueueSong> = songs.into_iter().map(QueueSong::adopt).collect();
                if let Some((lane, position)) = s.queue.locate(anchor) {
                    let at = match edge {
                        Edge::Top => position,
                        Edge::Bottom => position + 1,
                    };
                    s.queue.insert_at(lane, at, adopted);
                }
            });
        });
    }

    /// Delete entries from both lanes
    pub fn remove(&mut self, ids: &[QueueEntryId]) {
        if ids.is_empty() {
            return;
        }
        debug!("remove {} entr(ies)", ids.len());

        self.commit(|state| {
            state.structural(|s| s.queue.remove_ids(ids));
        });
    }

    /// Move entries to the top of the queue view as one contiguous block
    pub fn move_to_top(&mut self, ids: &[QueueEntryId]) {
        if ids.is_empty() {
            return;
        }

        self.commit(|state| {
            state.structural(|s| {
                let block = s.queue.extract(ids);
                if block.is_empty() {
                    return;
                }
                let lane = s.active_lane();
                s.queue.insert_at(lane, 0, block);
            });
        });
    }

    /// Move entries to the bottom of the queue view as one contiguous block
    pub fn move_to_bottom(&mut self, ids: &[QueueEntryId]) {
        if ids.is_empty() {
            return;
        }

        self.commit(|state| {
            state.structural(|s| {
                let block = s.queue.extract(ids);
                // Bottom of the composed view is the default lane's end in
                // both modes.
                s.queue.push_back(Lane::Default, block);
            });
        });
    }

    /// Move entries to right after the current track, regardless of mode
    pub fn move_to_next(&mut self, ids: &[QueueEntryId]) {
        if ids.is_empty() {
            return;
        }

        self.commit(|state| {
            state.structural(|s| {
                let current = s.current_entry_id();
                let block = s.queue.extract(ids);
                if block.is_empty() {
                    return;
                }
                match current.and_then(|id| s.queue.locate(id)) {
                    Some((lane, position)) => s.queue.insert_at(lane, position + 1, block),
                    None => {
                        let lane = s.active_lane();
                        s.queue.insert_at(lane, 0, block);
                    }
                }
            });
        });
    }

    /// Move entries next to an anchor entry as one contiguous block
    ///
    /// No-op if the anchor is gone or is itself part of the moved block.
    pub fn move_to(&mut self, ids: &[QueueEntryId], anchor: QueueEntryId, edge: Edge) {
        if ids.is_empty() {
            return;
        }
        if ids.contains(&anchor) {
            debug!("move_to: anchor {} is part of the moved block, ignoring", anchor);
            return;
        }
        if self.state.queue.locate(anchor).is_none() {
            warn!("move_to: anchor {} not found, dropping move", anchor);
            return;
        }

        self.commit(|state| {
            state.structural(|s| {
                let block = s.queue.extract(ids);
                if block.is_empty() {
                    return;
                }
                if let Some((lane, position)) = s.queue.locate(anchor) {
                    let at = match edge {
                        Edge::Top => position,
                        Edge::Bottom => position + 1,
                    };
                    s.queue.insert_at(lane, at, block);
                }
            });
        });
    }

    /// Empty both lanes and drop the selection
    pub fn clear(&mut self) {
        debug!("clear queue");
        self.commit(|state| {
            state.queue.clear();
            state.transport.park();
        });
    }

    /// Set shuffle mode
    ///
    /// Enabling track-shuffle generates a fresh permutation of the default
    /// lane with the current entry (if it sits in that lane) pinned first.
    /// Disabling leaves the permutation in place, unused.
    pub fn set_shuffle(&mut self, mode: ShuffleMode) {
        if self.state.transport.shuffle == mode {
            return;
        }
        debug!("set shuffle {:?}", mode);

        self.commit(|state| {
            let previous_current = state.current_entry_id();
            let previous_index = state.transport.index;
            state.transport.shuffle = mode;

            if mode == ShuffleMode::Track {
                let anchor = previous_current
                    .filter(|id| matches!(state.queue.locate(*id), Some((Lane::Default, _))));
                let order = shuffle::seeded_with_first(anchor, &state.queue.default_ids());
                state.queue.set_shuffled(order);
            }

            state.reconcile(previous_current, previous_index);
        });
    }

    /// Switch between default and priority queue mode
    ///
    /// Lane contents migrate so the flattened queue view is identical
    /// immediately before and after the switch.
    pub fn switch_mode(&mut self, mode: QueueMode) {
        if self.state.transport.queue_mode == mode {
            return;
        }
        debug!("switch queue mode {:?}", mode);

        self.commit(|state| {
            state.structural(|s| {
                match mode {
                    QueueMode::Priority => s.queue.merge_default_into_priority(),
                    QueueMode::Default => s.queue.merge_priority_into_default(),
                }
                s.transport.queue_mode = mode;
            });
        });
    }

    // ===== Transport =====

    /// Start or resume playback
    ///
    /// With a target entry, jumps there first; a missing target no-ops.
    /// With no target and nothing selected, playback starts at the head of
    /// the play order. On an empty queue this does nothing.
    pub fn play(&mut self, target: Option<QueueEntryId>) {
        self.commit(|state| match target {
            Some(id) => match state.position_of(id) {
                Some(position) => {
                    state.transport.index = Some(position);
                    state.transport.status = PlayStatus::Playing;
                }
                None => warn!("play: entry {} not found", id),
            },
            None => {
                if state.queue.is_empty() {
                    return;
                }
                if state.transport.index.is_none() {
                    state.transport.index = Some(0);
                }
                state.transport.status = PlayStatus::Playing;
            }
        });
    }

    /// Pause playback; the selection and position stay put
    pub fn pause(&mut self) {
        self.commit(|state| state.transport.status = PlayStatus::Paused);
    }

    /// Step to the next track
    ///
    /// Clamps at the end of the queue (wraps under repeat-all); stepping
    /// past the end parks the status at paused. The buffer slot toggles on
    /// every call.
    pub fn next(&mut self) {
        self.commit(|state| {
            state.transport.toggle_slot();

            let len = state.play_len();
            if len == 0 {
                state.transport.park();
                return;
            }

            let transport = &mut state.transport;
            match transport.index {
                None => transport.index = Some(0),
                Some(index) if index + 1 < len => transport.index = Some(index + 1),
                Some(index) => {
                    if transport.repeat == RepeatMode::All {
                        transport.index = Some(0);
                    } else {
                        transport.index = Some(index.min(len - 1));
                        transport.status = PlayStatus::Paused;
                    }
                }
            }
        });
    }

    /// Step to the previous track, clamped at the head
    pub fn previous(&mut self) {
        self.commit(|state| {
            let len = state.play_len();
            if len == 0 {
                state.transport.park();
                return;
            }

            let transport = &mut state.transport;
            transport.index = Some(match transport.index {
                None => 0,
                Some(index) => index.saturating_sub(1).min(len - 1),
            });
        });
    }

    /// Natural end-of-track transition, fired by the audio engine
    ///
    /// Applies the repeat policy, toggles the buffer slot, and reports the
    /// new current/next pair plus the now-inactive slot to refill.
    pub fn auto_advance(&mut self) -> AdvanceOutcome {
        self.commit(|state| {
            let refill_slot = state.transport.slot;
            state.transport.toggle_slot();

            let len = state.play_len();
            if len == 0 {
                state.transport.park();
                return AdvanceOutcome {
                    current: None,
                    next: None,
                    refill_slot,
                };
            }

            let new_index = match (state.transport.index, state.transport.repeat) {
                (Some(index), RepeatMode::One) => index.min(len - 1),
                (Some(index), _) if index + 1 < len => index + 1,
                (Some(_), RepeatMode::All) => 0,
                (Some(index), _) => {
                    // Ran off the end: park on the last track
                    state.transport.status = PlayStatus::Paused;
                    index.min(len - 1)
                }
                (None, _) => 0,
            };
            state.transport.index = Some(new_index);

            AdvanceOutcome {
                current: state.entry_at(new_index).cloned(),
                next: state.next_song().cloned(),
                refill_slot,
            }
        })
    }

    /// Request an absolute seek within the current track
    ///
    /// Every call yields a fresh token, even for a repeated timestamp.
    pub fn seek(&mut self, position: Duration) -> SeekRequest {
        self.commit(|state| state.transport.request_seek(position))
    }

    /// Relative seek forward, clamped to one second before the end
    ///
    /// No-op when the current track's duration is unknown.
    pub fn step_forward(&mut self, delta: Duration) {
        self.commit(|state| {
            let Some(duration) = state.current_song().and_then(|s| s.song.duration) else {
                return;
            };
            let ceiling = duration.saturating_sub(Duration::from_secs(1));
            let target = (state.transport.position + delta).min(ceiling);
            state.transport.position = target;
            state.transport.request_seek(target);
        });
    }

    /// Relative seek backward, clamped to the start
    ///
    /// No-op when the current track's duration is unknown.
    pub fn step_backward(&mut self, delta: Duration) {
        self.commit(|state| {
            if state.current_song().and_then(|s| s.song.duration).is_none() {
                return;
            }
            let target = state.transport.position.saturating_sub(delta);
            state.transport.position = target;
            state.transport.request_seek(target);
        });
    }

    /// Progress report from the audio engine
    pub fn set_position(&mut self, position: Duration) {
        self.commit(|state| state.transport.position = position);
    }

    /// Set volume level (0-100, clamped)
    pub fn set_volume(&mut self, level: u8) {
        self.commit(|state| state.transport.volume.set_level(level));
    }

    /// Set mute state
    pub fn set_muted(&mut self, muted: bool) {
        self.commit(|state| state.transport.volume.set_muted(muted));
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.commit(|state| state.transport.volume.toggle_mute());
    }

    /// Set playback speed (0.5-2.0, clamped)
    pub fn set_speed(&mut self, speed: f32) {
        self.commit(|state| state.transport.set_speed(speed));
    }

    /// Set crossfade duration in milliseconds (0-10000, clamped)
    pub fn set_crossfade_ms(&mut self, crossfade_ms: u32) {
        self.commit(|state| state.transport.set_crossfade_ms(crossfade_ms));
    }

    /// Set repeat mode
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.commit(|state| state.transport.repeat = mode);
    }

    // ===== State queries =====

    /// The flattened queue view
    pub fn composed(&self) -> Vec<&QueueSong> {
        self.state.composed()
    }

    /// The shuffle-aware play order
    pub fn play_order(&self) -> Vec<&QueueSong> {
        self.state.play_order()
    }

    /// Contiguous-run grouping of the queue view
    pub fn grouped(&self, key: GroupKey) -> Vec<QueueGroup> {
        self.state.grouped(key)
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.state.index()
    }

    pub fn current_song(&self) -> Option<&QueueSong> {
        self.state.current_song()
    }

    pub fn next_song(&self) -> Option<&QueueSong> {
        self.state.next_song()
    }

    pub fn status(&self) -> PlayStatus {
        self.state.status()
    }

    /// Whether anything would play after the current track
    pub fn has_next(&self) -> bool {
        self.state.next_song().is_some()
    }

    /// Whether a previous step would move the selection
    pub fn has_previous(&self) -> bool {
        matches!(self.state.index(), Some(index) if index > 0)
    }

    /// Transport settings that survive a restart
    pub fn settings(&self) -> PlayerSettings {
        self.state.settings()
    }

    // ===== Subscriptions =====

    /// Observe a projected slice of engine state
    ///
    /// `project` picks the slice, `unchanged` suppresses notifications
    /// (return true when old and new are equivalent), `on_change` runs
    /// synchronously after each commit that changed the slice, with
    /// `(new, previous)`.
    pub fn subscribe<T, P, E, F>(&mut self, project: P, unchanged: E, on_change: F) -> SubscriptionId
    where
        T: 'static,
        P: Fn(&EngineState) -> T + 'static,
        E: Fn(&T, &T) -> bool + 'static,
        F: FnMut(&T, &T) + 'static,
    {
        self.subscribers.insert(project, unchanged, on_change)
    }

    /// Observe a projected slice with `PartialEq` change detection
    pub fn subscribe_changed<T, P, F>(&mut self, project: P, on_change: F) -> SubscriptionId
    where
        T: PartialEq + 'static,
        P: Fn(&EngineState) -> T + 'static,
        F: FnMut(&T, &T) + 'static,
    {
        self.subscribe(project, |old, new| old == new, on_change)
    }

    /// Drop a subscription; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

impl Default for QueueEngine {
    fn default() -> Self {
        Self::new()
    }
}
