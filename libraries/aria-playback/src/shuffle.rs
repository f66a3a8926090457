//! Shuffle permutation helpers
//!
//! Track-shuffle never reorders the lanes themselves; it maintains a
//! permutation of the default lane's entry ids that the play order follows
//! while the mode is active. These helpers produce and repair that
//! permutation with Fisher-Yates.

use crate::types::QueueEntryId;
use rand::seq::SliceRandom;
use rand::thread_rng;

/// A fresh random permutation of the given ids
pub(crate) fn permutation_of(ids: &[QueueEntryId]) -> Vec<QueueEntryId> {
    let mut out = ids.to_vec();
    out.shuffle(&mut thread_rng());
    out
}

/// A fresh permutation with one entry pinned to the front
///
/// Used when shuffle is switched on mid-playback: the current entry leads
/// and the rest of the pool still plays exactly once in random order. If
/// `head` is absent from the pool, this is a plain permutation.
pub(crate) fn seeded_with_first(
    head: Option<QueueEntryId>,
    ids: &[QueueEntryId],
) -> Vec<QueueEntryId> {
    match head {
        Some(head) if ids.contains(&head) => {
            let mut rest: Vec<QueueEntryId> =
                ids.iter().copied().filter(|id| *id != head).collect();
            rest.shuffle(&mut thread_rng());

            let mut out = Vec::with_capacity(ids.len());
            out.push(head);
            out.extend(rest);
            out
        }
        _ => permutation_of(ids),
    }
}

/// Reshuffle everything past the first `fixed_len` entries in place
///
/// The fixed prefix is what the listener has already played (plus the
/// current track); it must never move.
pub(crate) fn reshuffle_tail(order: &mut [QueueEntryId], fixed_len: usize) {
    let fixed_len = fixed_len.min(order.len());
    order[fixed_len..].shuffle(&mut thread_rng());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(n: usize) -> Vec<QueueEntryId> {
        (0..n).map(|_| QueueEntryId::generate()).collect()
    }

    #[test]
    fn permutation_preserves_all_ids() {
        let pool = ids(10);
        let shuffled = permutation_of(&pool);

        assert_eq!(shuffled.len(), pool.len());
        let original: HashSet<QueueEntryId> = pool.iter().copied().collect();
        let permuted: HashSet<QueueEntryId> = shuffled.iter().copied().collect();
        assert_eq!(original, permuted);
    }

    #[test]
    fn seeded_permutation_pins_head() {
        let pool = ids(20);
        let head = pool[7];

        let shuffled = seeded_with_first(Some(head), &pool);

        assert_eq!(shuffled[0], head);
        assert_eq!(shuffled.len(), pool.len());
        let permuted: HashSet<QueueEntryId> = shuffled.iter().copied().collect();
        assert_eq!(permuted.len(), pool.len());
    }

    #[test]
    fn seeded_permutation_with_foreign_head_falls_back() {
        let pool = ids(5);
        let foreign = QueueEntryId::generate();

        let shuffled = seeded_with_first(Some(foreign), &pool);

        assert_eq!(shuffled.len(), pool.len());
        assert!(!shuffled.contains(&foreign));
    }

    #[test]
    fn reshuffle_tail_keeps_prefix_fixed() {
        let pool = ids(30);
        let mut order = pool.clone();

        reshuffle_tail(&mut order, 10);

        assert_eq!(&order[..10], &pool[..10]);
        let tail: HashSet<QueueEntryId> = order[10..].iter().copied().collect();
        let expected: HashSet<QueueEntryId> = pool[10..].iter().copied().collect();
        assert_eq!(tail, expected);
    }

    #[test]
    fn reshuffle_tail_past_end_is_noop() {
        let pool = ids(3);
        let mut order = pool.clone();

        reshuffle_tail(&mut order, 8);

        assert_eq!(order, pool);
    }
}
