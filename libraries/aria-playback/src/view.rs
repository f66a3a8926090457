//! Queue view composition
//!
//! Projections over the dual-lane store: the flattened composed order the
//! UI lists, the play order the transport indexes into, and the grouped
//! summary view. All read-only; the store owns the mutations.

use crate::queue::DualQueue;
use crate::types::{GroupKey, QueueGroup, QueueMode, QueueSong, ShuffleMode};
use std::collections::HashMap;

/// The single flattened queue view
///
/// Priority mode concatenates `priority ++ default`; default mode is the
/// default lane alone (the priority lane is empty by construction while in
/// default mode, because mode switches migrate lane contents).
pub(crate) fn composed<'a>(queue: &'a DualQueue, mode: QueueMode) -> Vec<&'a QueueSong> {
    match mode {
        QueueMode::Default => queue.default_lane().iter().collect(),
        QueueMode::Priority => queue
            .priority_lane()
            .iter()
            .chain(queue.default_lane().iter())
            .collect(),
    }
}

/// The order the transport actually steps through
///
/// Identical to [`composed`] except that while track-shuffle is active the
/// default-lane pool is traversed in the shuffle permutation. The priority
/// lane is never shuffled.
pub(crate) fn play_order<'a>(
    queue: &'a DualQueue,
    mode: QueueMode,
    shuffle: ShuffleMode,
) -> Vec<&'a QueueSong> {
    if shuffle == ShuffleMode::Off {
        return composed(queue, mode);
    }

    let by_id: HashMap<_, &QueueSong> = queue
        .default_lane()
        .iter()
        .map(|s| (s.entry_id, s))
        .collect();
    let pool = queue.shuffled().iter().filter_map(|id| by_id.get(id).copied());

    match mode {
        QueueMode::Default => pool.collect(),
        QueueMode::Priority => queue.priority_lane().iter().chain(pool).collect(),
    }
}

/// Contiguous-run grouping of the composed view
///
/// One group per run of equal attribute values, not one per distinct
/// value: an album that appears twice non-contiguously yields two groups.
/// In priority mode attribute grouping is meaningless (two unrelated lanes
/// are concatenated), so the two fixed lane spans are reported instead.
pub(crate) fn grouped(queue: &DualQueue, mode: QueueMode, key: GroupKey) -> Vec<QueueGroup> {
    if mode == QueueMode::Priority {
        return vec![
            QueueGroup {
                name: "Priority".to_string(),
                count: queue.priority_lane().len(),
            },
            QueueGroup {
                name: "Default".to_string(),
                count: queue.default_lane().len(),
            },
        ];
    }

    let mut groups: Vec<QueueGroup> = Vec::new();
    for song in composed(queue, mode) {
        let value = key.value(&song.song);
        match groups.last_mut() {
            Some(last) if last.name == value => last.count += 1,
            _ => groups.push(QueueGroup {
                name: value.to_string(),
                count: 1,
            }),
        }
    }
    groups
}
