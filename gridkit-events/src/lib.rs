//! # gridkit-events — cancellable hook dispatch
//!
//! Listeners register against a *phase* (any `Copy + Eq + Hash` key) and
//! receive a mutable reference to the event context when that phase is
//! dispatched. Dispatch is synchronous and runs listeners in registration
//! order on the calling thread.
//!
//! A context that implements [`Cancellable`] lets any listener veto the
//! built-in step the caller was about to perform. The veto is read by the
//! caller right after [`EventDispatcher::dispatch`] returns; it does not stop
//! the remaining listeners of the same phase from running.
//!
//! ```ignore
//! let mut hooks = EventDispatcher::<Phase, MyEvent>::new();
//! hooks.subscribe(Phase::Before, |event| event.prevent_default());
//!
//! let mut event = MyEvent::default();
//! if !hooks.dispatch(Phase::Before, &mut event) {
//!     run_default_step(&mut event);
//! }
//! hooks.dispatch(Phase::After, &mut event);
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

type Handler<E> = Arc<dyn Fn(&mut E) + Send + Sync>;

/// An event context carrying a "default prevented" flag.
pub trait Cancellable {
    /// Ask the dispatcher's caller to skip its built-in step.
    fn prevent_default(&mut self);

    fn is_default_prevented(&self) -> bool;
}

/// Phase-keyed registry of synchronous listeners.
///
/// `EventDispatcher` is cheap to clone (listeners are shared behind `Arc`)
/// and can be shared read-only across threads once registration is done.
pub struct EventDispatcher<P, E> {
    handlers: HashMap<P, Vec<Handler<E>>>,
}

impl<P, E> EventDispatcher<P, E>
where
    P: Copy + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a listener for `phase`.
    ///
    /// Listeners of the same phase run in the order they were registered.
    pub fn subscribe<F>(&mut self, phase: P, handler: F) -> &mut Self
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.handlers
            .entry(phase)
            .or_default()
            .push(Arc::new(handler));
        self
    }

    /// Number of listeners registered for `phase`.
    pub fn listener_count(&self, phase: P) -> usize {
        self.handlers.get(&phase).map_or(0, Vec::len)
    }

    pub fn has_listeners(&self, phase: P) -> bool {
        self.listener_count(phase) > 0
    }
}

impl<P, E> EventDispatcher<P, E>
where
    P: Copy + Eq + Hash + Debug,
    E: Cancellable,
{
    /// Run every listener of `phase` against `event`.
    ///
    /// Returns `true` when the default action has been prevented, either by
    /// one of these listeners or earlier.
    pub fn dispatch(&self, phase: P, event: &mut E) -> bool {
        if let Some(subs) = self.handlers.get(&phase) {
            tracing::trace!(?phase, listeners = subs.len(), "dispatching grid hook");
            for handler in subs {
                handler(event);
            }
        }
        event.is_default_prevented()
    }
}

impl<P, E> Clone for EventDispatcher<P, E>
where
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<P, E> Default for EventDispatcher<P, E>
where
    P: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

pub mod prelude {
    //! Re-exports of the most commonly used hook types.
    pub use crate::{Cancellable, EventDispatcher};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Phase {
        Before,
        After,
    }

    #[derive(Default)]
    struct TestEvent {
        trail: Vec<&'static str>,
        prevented: bool,
    }

    impl Cancellable for TestEvent {
        fn prevent_default(&mut self) {
            self.prevented = true;
        }

        fn is_default_prevented(&self) -> bool {
            self.prevented
        }
    }

    #[test]
    fn test_dispatch_without_listeners() {
        let hooks = EventDispatcher::<Phase, TestEvent>::new();
        let mut event = TestEvent::default();
        assert!(!hooks.dispatch(Phase::Before, &mut event));
        assert!(event.trail.is_empty());
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let mut hooks = EventDispatcher::<Phase, TestEvent>::new();
        hooks
            .subscribe(Phase::Before, |e| e.trail.push("first"))
            .subscribe(Phase::Before, |e| e.trail.push("second"))
            .subscribe(Phase::After, |e| e.trail.push("after"));

        let mut event = TestEvent::default();
        hooks.dispatch(Phase::Before, &mut event);
        assert_eq!(event.trail, vec!["first", "second"]);
        assert_eq!(hooks.listener_count(Phase::Before), 2);
        assert_eq!(hooks.listener_count(Phase::After), 1);
    }

    #[test]
    fn test_prevent_default_does_not_stop_siblings() {
        let mut hooks = EventDispatcher::<Phase, TestEvent>::new();
        hooks
            .subscribe(Phase::Before, |e| e.prevent_default())
            .subscribe(Phase::Before, |e| e.trail.push("still runs"));

        let mut event = TestEvent::default();
        assert!(hooks.dispatch(Phase::Before, &mut event));
        assert_eq!(event.trail, vec!["still runs"]);
    }

    #[test]
    fn test_clone_shares_listeners() {
        let mut hooks = EventDispatcher::<Phase, TestEvent>::new();
        hooks.subscribe(Phase::After, |e| e.trail.push("x"));
        let copy = hooks.clone();
        assert!(copy.has_listeners(Phase::After));
        assert!(!copy.has_listeners(Phase::Before));
    }
}
