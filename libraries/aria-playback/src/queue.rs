//! Dual-lane queue store
//!
//! Holds the two ordered lanes plus the shuffle permutation:
//!
//! ```text
//! Priority lane (play these next, regardless of position):
//!   - Track B (user added)
//!   - Track C (user added)
//! ─────────────────────────────
//! Default lane (the normal play order):
//!   - Track D
//!   - Track E
//! ```
//!
//! All structural primitives live here. Index math is always lane-local
//! and clamps to `[0, lane.len()]`; lanes can be mutated independently by
//! concurrent drag operations on different views, so a flattened global
//! index would go stale between drag start and drop.

use crate::shuffle;
use crate::types::{QueueEntryId, QueueSong};
use std::collections::HashSet;

/// Which lane an entry sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lane {
    /// The "play next, regardless of position" override lane
    Priority,

    /// The normal play order
    Default,
}

/// Two-lane queue with a shuffle permutation on the side
#[derive(Debug, Clone, Default)]
pub(crate) struct DualQueue {
    /// The normal play order
    default: Vec<QueueSong>,

    /// The override lane
    priority: Vec<QueueSong>,

    /// Shuffle permutation of the default lane's entry ids.
    /// Exact permutation while track-shuffle is active; inert otherwise.
    shuffled: Vec<QueueEntryId>,
}

impl DualQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // ===== Lane access =====

    pub(crate) fn default_lane(&self) -> &[QueueSong] {
        &self.default
    }

    pub(crate) fn priority_lane(&self) -> &[QueueSong] {
        &self.priority
    }

    fn lane_mut(&mut self, lane: Lane) -> &mut Vec<QueueSong> {
        match lane {
            Lane::Priority => &mut self.priority,
            Lane::Default => &mut self.default,
        }
    }

    /// Total number of entries across both lanes
    pub(crate) fn len(&self) -> usize {
        self.default.len() + self.priority.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.default.is_empty() && self.priority.is_empty()
    }

    /// Find an entry by id, priority lane first
    pub(crate) fn locate(&self, id: QueueEntryId) -> Option<(Lane, usize)> {
        if let Some(pos) = self.priority.iter().position(|s| s.entry_id == id) {
            return Some((Lane::Priority, pos));
        }
        self.default
            .iter()
            .position(|s| s.entry_id == id)
            .map(|pos| (Lane::Default, pos))
    }

    // ===== Structural primitives =====

    /// Insert a block at a lane-local position, clamped to `[0, lane.len()]`
    pub(crate) fn insert_at(&mut self, lane: Lane, index: usize, songs: Vec<QueueSong>) {
        let lane = self.lane_mut(lane);
        let at = index.min(lane.len());
        lane.splice(at..at, songs);
    }

    /// Append a block to the end of a lane
    pub(crate) fn push_back(&mut self, lane: Lane, songs: Vec<QueueSong>) {
        self.lane_mut(lane).extend(songs);
    }

    /// Replace the entire default lane
    pub(crate) fn replace_default(&mut self, songs: Vec<QueueSong>) {
        self.default = songs;
    }

    /// Delete matching entries from both lanes
    pub(crate) fn remove_ids(&mut self, ids: &[QueueEntryId]) {
        let doomed: HashSet<QueueEntryId> = ids.iter().copied().collect();
        self.priority.retain(|s| !doomed.contains(&s.entry_id));
        self.default.retain(|s| !doomed.contains(&s.entry_id));
    }

    /// Extract matching entries from both lanes as one contiguous block
    ///
    /// The block preserves the entries' relative order in the composed
    /// view: priority-lane matches first, then default-lane matches, each
    /// in lane order. Ids not present are skipped.
    pub(crate) fn extract(&mut self, ids: &[QueueEntryId]) -> Vec<QueueSong> {
        let wanted: HashSet<QueueEntryId> = ids.iter().copied().collect();
        let mut block = Vec::with_capacity(wanted.len());

        for lane in [&mut self.priority, &mut self.default] {
            let mut keep = Vec::with_capacity(lane.len());
            for song in lane.drain(..) {
                if wanted.contains(&song.entry_id) {
                    block.push(song);
                } else {
                    keep.push(song);
                }
            }
            *lane = keep;
        }

        block
    }

    /// Empty both lanes and the shuffle permutation
    pub(crate) fn clear(&mut self) {
        self.default.clear();
        self.priority.clear();
        self.shuffled.clear();
    }

    // ===== Mode-switch migration =====

    /// Default → Priority: the whole default lane becomes the head of the
    /// priority lane, so the flattened order is unchanged.
    pub(crate) fn merge_default_into_priority(&mut self) {
        let mut merged = std::mem::take(&mut self.default);
        merged.append(&mut self.priority);
        self.priority = merged;
    }

    /// Priority → Default: the whole priority lane moves to the front of
    /// the default lane, so the flattened order is unchanged.
    pub(crate) fn merge_priority_into_default(&mut self) {
        let mut merged = std::mem::take(&mut self.priority);
        merged.append(&mut self.default);
        self.default = merged;
    }

    // ===== Shuffle permutation =====

    pub(crate) fn default_ids(&self) -> Vec<QueueEntryId> {
        self.default.iter().map(|s| s.entry_id).collect()
    }

    pub(crate) fn shuffled(&self) -> &[QueueEntryId] {
        &self.shuffled
    }

    pub(crate) fn set_shuffled(&mut self, order: Vec<QueueEntryId>) {
        self.shuffled = order;
    }

    /// Re-establish the permutation invariant after a structural mutation
    ///
    /// Drops ids that left the default lane. If new ids joined the lane,
    /// everything past the current position (the already-played prefix
    /// plus the current track, when `current` is in the permutation) is
    /// reshuffled together with them; the prefix never moves. Pure
    /// removals keep the surviving order untouched.
    pub(crate) fn sync_shuffled(&mut self, current: Option<QueueEntryId>) {
        let pool: HashSet<QueueEntryId> = self.default.iter().map(|s| s.entry_id).collect();
        self.shuffled.retain(|id| pool.contains(id));

        let present: HashSet<QueueEntryId> = self.shuffled.iter().copied().collect();
        let missing: Vec<QueueEntryId> = self
            .default
            .iter()
            .map(|s| s.entry_id)
            .filter(|id| !present.contains(id))
            .collect();
        if missing.is_empty() {
            return;
        }

        let fixed_len = current
            .and_then(|id| self.shuffled.iter().position(|x| *x == id))
            .map_or(0, |pos| pos + 1);
        self.shuffled.extend(missing);
        shuffle::reshuffle_tail(&mut self.shuffled, fixed_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Song;
    use std::time::Duration;

    fn entry(id: &str) -> QueueSong {
        QueueSong::adopt(Song {
            id: id.to_string(),
            name: format!("Song {}", id),
            artist: "Test Artist".to_string(),
            album: Some("Test Album".to_string()),
            album_artist: None,
            genre: None,
            duration: Some(Duration::from_secs(180)),
            user_favorite: false,
            user_rating: None,
        })
    }

    fn catalog_ids(lane: &[QueueSong]) -> Vec<&str> {
        lane.iter().map(|s| s.song.id.as_str()).collect()
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = DualQueue::new();
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn insert_at_clamps_to_lane_length() {
        let mut queue = DualQueue::new();
        queue.push_back(Lane::Default, vec![entry("1"), entry("2")]);

        // Far past the end lands at the end, not a panic
        queue.insert_at(Lane::Default, 99, vec![entry("3")]);

        assert_eq!(catalog_ids(queue.default_lane()), vec!["1", "2", "3"]);
    }

    #[test]
    fn insert_at_middle_keeps_order() {
        let mut queue = DualQueue::new();
        queue.push_back(Lane::Default, vec![entry("1"), entry("3")]);

        queue.insert_at(Lane::Default, 1, vec![entry("2a"), entry("2b")]);

        assert_eq!(catalog_ids(queue.default_lane()), vec!["1", "2a", "2b", "3"]);
    }

    #[test]
    fn locate_prefers_priority_lane() {
        let mut queue = DualQueue::new();
        queue.push_back(Lane::Default, vec![entry("d")]);
        queue.push_back(Lane::Priority, vec![entry("p")]);

        let p_id = queue.priority_lane()[0].entry_id;
        let d_id = queue.default_lane()[0].entry_id;

        assert_eq!(queue.locate(p_id), Some((Lane::Priority, 0)));
        assert_eq!(queue.locate(d_id), Some((Lane::Default, 0)));
        assert_eq!(queue.locate(QueueEntryId::generate()), None);
    }

    #[test]
    fn remove_ids_hits_both_lanes() {
        let mut queue = DualQueue::new();
        queue.push_back(Lane::Default, vec![entry("1"), entry("2")]);
        queue.push_back(Lane::Priority, vec![entry("3")]);

        let ids = vec![
            queue.default_lane()[0].entry_id,
            queue.priority_lane()[0].entry_id,
        ];
        queue.remove_ids(&ids);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.default_lane()[0].song.id, "2");
        assert!(queue.priority_lane().is_empty());
    }

    #[test]
    fn extract_preserves_composed_order() {
        let mut queue = DualQueue::new();
        queue.push_back(Lane::Priority, vec![entry("p1"), entry("p2")]);
        queue.push_back(Lane::Default, vec![entry("d1"), entry("d2"), entry("d3")]);

        // Ask for them in scrambled order; block comes back composed-order
        let ids = vec![
            queue.default_lane()[2].entry_id,
            queue.priority_lane()[1].entry_id,
            queue.default_lane()[0].entry_id,
        ];
        let block = queue.extract(&ids);

        assert_eq!(
            block.iter().map(|s| s.song.id.as_str()).collect::<Vec<_>>(),
            vec!["p2", "d1", "d3"]
        );
        assert_eq!(catalog_ids(queue.priority_lane()), vec!["p1"]);
        assert_eq!(catalog_ids(queue.default_lane()), vec!["d2"]);
    }

    #[test]
    fn extract_skips_unknown_ids() {
        let mut queue = DualQueue::new();
        queue.push_back(Lane::Default, vec![entry("1")]);

        let block = queue.extract(&[QueueEntryId::generate()]);

        assert!(block.is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn mode_migration_round_trip_keeps_flat_order() {
        let mut queue = DualQueue::new();
        queue.push_back(Lane::Priority, vec![entry("p1")]);
        queue.push_back(Lane::Default, vec![entry("d1"), entry("d2")]);

        queue.merge_priority_into_default();
        assert!(queue.priority_lane().is_empty());
        assert_eq!(catalog_ids(queue.default_lane()), vec!["p1", "d1", "d2"]);

        queue.merge_default_into_priority();
        assert!(queue.default_lane().is_empty());
        assert_eq!(catalog_ids(queue.priority_lane()), vec!["p1", "d1", "d2"]);
    }

    #[test]
    fn sync_shuffled_is_permutation_of_default_lane() {
        let mut queue = DualQueue::new();
        queue.push_back(Lane::Default, vec![entry("1"), entry("2"), entry("3")]);
        queue.sync_shuffled(None);

        let pool: HashSet<QueueEntryId> = queue.default_ids().into_iter().collect();
        let permuted: HashSet<QueueEntryId> = queue.shuffled().iter().copied().collect();
        assert_eq!(pool, permuted);
        assert_eq!(queue.shuffled().len(), 3);
    }

    #[test]
    fn sync_shuffled_keeps_prefix_through_current() {
        let mut queue = DualQueue::new();
        let songs: Vec<QueueSong> = (0..6).map(|i| entry(&i.to_string())).collect();
        queue.push_back(Lane::Default, songs);
        queue.set_shuffled(queue.default_ids());

        let current = queue.shuffled()[2];
        let prefix: Vec<QueueEntryId> = queue.shuffled()[..3].to_vec();

        queue.push_back(Lane::Default, vec![entry("new")]);
        queue.sync_shuffled(Some(current));

        assert_eq!(&queue.shuffled()[..3], prefix.as_slice());
        assert_eq!(queue.shuffled().len(), 7);
    }

    #[test]
    fn sync_shuffled_pure_removal_is_stable() {
        let mut queue = DualQueue::new();
        let songs: Vec<QueueSong> = (0..5).map(|i| entry(&i.to_string())).collect();
        queue.push_back(Lane::Default, songs);
        queue.set_shuffled(queue.default_ids());

        let victim = queue.shuffled()[1];
        let expected: Vec<QueueEntryId> = queue
            .shuffled()
            .iter()
            .copied()
            .filter(|id| *id != victim)
            .collect();

        queue.remove_ids(&[victim]);
        queue.sync_shuffled(None);

        assert_eq!(queue.shuffled(), expected.as_slice());
    }
}
