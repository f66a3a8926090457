//! Reactive subscription layer
//!
//! Lets the UI and the audio engine observe narrow slices of engine state
//! without polling. Each subscriber supplies a projection (which slice it
//! cares about) and an equality predicate (when to stay quiet); after every
//! committed mutation the engine calls [`Subscribers::notify`] and each
//! listener whose projection actually changed runs synchronously, in
//! registration order, with the new and previous values.
//!
//! This is a plain observer list: no scheduler, no deferred delivery.
//! Listeners are type-erased behind `Box<dyn FnMut>` so the engine stays a
//! concrete, non-generic type.

use crate::manager::EngineState;

/// Handle for removing a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ErasedListener = Box<dyn FnMut(&EngineState, &EngineState)>;

/// Ordered observer list
pub(crate) struct Subscribers {
    entries: Vec<(SubscriptionId, ErasedListener)>,
    next_id: u64,
}

impl Subscribers {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a projection-based listener
    ///
    /// `project` extracts the observed slice, `unchanged` returns true when
    /// the notification should be suppressed, `on_change` receives
    /// `(new, previous)`.
    pub(crate) fn insert<T, P, E, F>(
        &mut self,
        project: P,
        unchanged: E,
        mut on_change: F,
    ) -> SubscriptionId
    where
        T: 'static,
        P: Fn(&EngineState) -> T + 'static,
        E: Fn(&T, &T) -> bool + 'static,
        F: FnMut(&T, &T) + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);

        self.entries.push((
            id,
            Box::new(move |previous, current| {
                let old = project(previous);
                let new = project(current);
                if !unchanged(&old, &new) {
                    on_change(&new, &old);
                }
            }),
        ));

        id
    }

    /// Remove a subscription; returns false if the id was already gone
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Fire all listeners against a committed state transition
    pub(crate) fn notify(&mut self, previous: &EngineState, current: &EngineState) {
        for (_, listener) in &mut self.entries {
            listener(previous, current);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn state_with_volume(level: u8) -> EngineState {
        let mut state = EngineState::new();
        state.transport.volume.set_level(level);
        state
    }

    #[test]
    fn listener_fires_with_new_and_previous_values() {
        let mut subscribers = Subscribers::new();
        let seen: Rc<RefCell<Vec<(u8, u8)>>> = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        subscribers.insert(
            |state: &EngineState| state.volume_level(),
            |a, b| a == b,
            move |new, old| sink.borrow_mut().push((*new, *old)),
        );

        subscribers.notify(&state_with_volume(40), &state_with_volume(70));

        assert_eq!(seen.borrow().as_slice(), &[(70, 40)]);
    }

    #[test]
    fn equality_suppresses_unrelated_changes() {
        let mut subscribers = Subscribers::new();
        let fired = Rc::new(RefCell::new(0usize));

        let sink = Rc::clone(&fired);
        subscribers.insert(
            |state: &EngineState| state.volume_level(),
            |a, b| a == b,
            move |_, _| *sink.borrow_mut() += 1,
        );

        // Volume identical; only speed differs between the two states
        let previous = state_with_volume(50);
        let mut current = state_with_volume(50);
        current.transport.set_speed(1.5);

        subscribers.notify(&previous, &current);
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let mut subscribers = Subscribers::new();
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        subscribers.insert(
            |state: &EngineState| state.volume_level(),
            |_, _| false,
            move |_, _| first.borrow_mut().push("first"),
        );

        let second = Rc::clone(&order);
        subscribers.insert(
            |state: &EngineState| state.volume_level(),
            |_, _| false,
            move |_, _| second.borrow_mut().push("second"),
        );

        subscribers.notify(&state_with_volume(10), &state_with_volume(20));

        assert_eq!(order.borrow().as_slice(), &["first", "second"]);
    }

    #[test]
    fn removed_listener_stops_firing() {
        let mut subscribers = Subscribers::new();
        let fired = Rc::new(RefCell::new(0usize));

        let sink = Rc::clone(&fired);
        let id = subscribers.insert(
            |state: &EngineState| state.volume_level(),
            |_, _| false,
            move |_, _| *sink.borrow_mut() += 1,
        );

        assert!(subscribers.remove(id));
        assert!(!subscribers.remove(id));
        assert_eq!(subscribers.len(), 0);

        subscribers.notify(&state_with_volume(10), &state_with_volume(20));
        assert_eq!(*fired.borrow(), 0);
    }
}
