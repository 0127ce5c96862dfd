// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Action bridge: relays named events from the status surface to a single
// controller callback.
//
// The bridge is a single-slot registry. Registering replaces the previous
// callback; unregistering empties the slot and later events are dropped.
// Delivery is synchronous on whichever thread the platform uses.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contentbridge_core::types::ActionEvent;
use tracing::{debug, info};

/// Callback invoked for every relayed event.
pub type ActionCallback = Arc<dyn Fn(&ActionEvent) + Send + Sync>;

/// Single-subscriber relay between platform events and the controller.
///
/// Share it with `Arc`; the platform side calls [`ActionBridge::dispatch`],
/// the controller calls [`ActionBridge::register`].
#[derive(Default)]
pub struct ActionBridge {
    slot: Mutex<Option<ActionCallback>>,
}

impl ActionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback`, replacing any previous one.
    pub fn register<F>(&self, callback: F)
    where
        F: Fn(&ActionEvent) + Send + Sync + 'static,
    {
        let replaced = self.slot().replace(Arc::new(callback)).is_some();
        info!(replaced, "action callback registered");
    }

    /// Remove the callback. Returns whether one was registered.
    pub fn unregister(&self) -> bool {
        let removed = self.slot().take().is_some();
        info!(removed, "action callback unregistered");
        removed
    }

    pub fn is_registered(&self) -> bool {
        self.slot().is_some()
    }

    /// Deliver a platform event. Returns `false` if nobody was listening.
    ///
    /// The callback runs after the slot lock is released, so it may register
    /// or unregister from inside the call.
    pub fn dispatch(&self, name: &str) -> bool {
        let callback = self.slot().clone();
        match callback {
            Some(callback) => {
                debug!(action = name, "dispatching action");
                callback(&ActionEvent::new(name));
                true
            }
            None => {
                debug!(action = name, "no action callback registered, event dropped");
                false
            }
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ActionCallback>> {
        // The guarded value is a plain Option; a panic elsewhere cannot leave
        // it half-written.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ActionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBridge")
            .field("registered", &self.is_registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&ActionEvent) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |event: &ActionEvent| {
            sink.lock().unwrap().push(event.name.clone());
        })
    }

    #[test]
    fn registered_callback_receives_event_once() {
        let bridge = ActionBridge::new();
        let (seen, callback) = recorder();
        bridge.register(callback);

        assert!(bridge.dispatch("NEXT"));
        assert_eq!(*seen.lock().unwrap(), vec!["NEXT".to_string()]);
    }

    #[test]
    fn unregistered_bridge_drops_events() {
        let bridge = ActionBridge::new();
        let (seen, callback) = recorder();
        bridge.register(callback);

        assert!(bridge.unregister());
        assert!(!bridge.dispatch("NEXT"));
        assert!(seen.lock().unwrap().is_empty());
        assert!(!bridge.unregister(), "second unregister finds nothing");
    }

    #[test]
    fn last_register_wins() {
        let bridge = ActionBridge::new();
        let (first, c1) = recorder();
        let (second, c2) = recorder();
        bridge.register(c1);
        bridge.register(c2);

        bridge.dispatch("PLAY");
        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), vec!["PLAY".to_string()]);
    }

    #[test]
    fn unknown_names_are_forwarded_verbatim_in_order() {
        let bridge = ActionBridge::new();
        let (seen, callback) = recorder();
        bridge.register(callback);

        for name in ["PAUSE", "SHOW_AD", "", "next"] {
            bridge.dispatch(name);
        }
        assert_eq!(*seen.lock().unwrap(), vec!["PAUSE", "SHOW_AD", "", "next"]);
    }

    #[test]
    fn callback_may_unregister_itself() {
        let bridge = Arc::new(ActionBridge::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let inner_bridge = Arc::clone(&bridge);
        let inner_calls = Arc::clone(&calls);
        bridge.register(move |_| {
            inner_calls.fetch_add(1, Ordering::SeqCst);
            inner_bridge.unregister();
        });

        assert!(bridge.dispatch("PLAY"));
        assert!(!bridge.dispatch("PLAY"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delivery_from_another_thread() {
        let bridge = Arc::new(ActionBridge::new());
        let (seen, callback) = recorder();
        bridge.register(callback);

        let platform = Arc::clone(&bridge);
        std::thread::spawn(move || {
            platform.dispatch("NEXT");
        })
        .join()
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["NEXT".to_string()]);
    }
}
