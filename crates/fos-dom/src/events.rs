//! DOM Events
//!
//! Listener registration and propagation-path computation. Listeners are
//! recorded by `HandlerId`; the embedder owns the callables behind the IDs.

use std::collections::HashMap;

use crate::NodeId;

/// Something listeners can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Window,
}

/// Event handler function ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u64);

/// Check if an event type bubbles
pub fn bubbles(event_type: &str) -> bool {
    !matches!(
        event_type,
        "focus" | "blur" | "scroll" | "load" | "unload" | "mouseenter" | "mouseleave"
    )
}

/// Event instance handed to listeners
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: Option<EventTarget>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    pub fn new(event_type: &str, target: NodeId) -> Self {
        let bubbles = bubbles(event_type);
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: None,
            bubbles,
            cancelable: bubbles,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation after the current target's listeners
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    handler: HandlerId,
    capture: bool,
}

/// Listener registry keyed by target and event type
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<(EventTarget, String), Vec<Registration>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener; returns false if the same registration already exists
    pub fn add(&mut self, target: EventTarget, event_type: &str, handler: HandlerId, capture: bool) -> bool {
        let registration = Registration { handler, capture };
        let entry = self
            .listeners
            .entry((target, event_type.to_string()))
            .or_default();
        if entry.contains(&registration) {
            return false;
        }
        entry.push(registration);
        true
    }

    /// Remove a listener; returns whether anything was removed
    pub fn remove(&mut self, target: EventTarget, event_type: &str, handler: HandlerId, capture: bool) -> bool {
        let key = (target, event_type.to_string());
        let Some(entry) = self.listeners.get_mut(&key) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|r| !(r.handler == handler && r.capture == capture));
        let removed = entry.len() < before;
        if entry.is_empty() {
            self.listeners.remove(&key);
        }
        removed
    }

    /// Number of listeners on a target for an event type
    pub fn count(&self, target: EventTarget, event_type: &str) -> usize {
        self.listeners
            .get(&(target, event_type.to_string()))
            .map_or(0, Vec::len)
    }

    /// Total number of registrations
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn phase(&self, target: EventTarget, event_type: &str, capture: Option<bool>) -> impl Iterator<Item = (EventTarget, HandlerId)> + '_ {
        self.listeners
            .get(&(target, event_type.to_string()))
            .into_iter()
            .flatten()
            .filter(move |r| capture.is_none_or(|c| r.capture == c))
            .map(move |r| (target, r.handler))
    }

    /// Order listeners along a propagation path.
    ///
    /// `path` runs from the outermost target down to the event target.
    /// Capture listeners fire outermost first, then every listener on the
    /// target (capture before non-capture), then non-capture listeners
    /// innermost first if the event bubbles.
    pub fn dispatch_order(&self, path: &[EventTarget], event_type: &str) -> Vec<(EventTarget, HandlerId)> {
        let Some((&target, ancestors)) = path.split_last() else {
            return Vec::new();
        };

        let mut order = Vec::new();
        for &ancestor in ancestors {
            order.extend(self.phase(ancestor, event_type, Some(true)));
        }
        order.extend(self.phase(target, event_type, Some(true)));
        order.extend(self.phase(target, event_type, Some(false)));
        if bubbles(event_type) {
            for &ancestor in ancestors.iter().rev() {
                order.extend(self.phase(ancestor, event_type, Some(false)));
            }
        }
        order
    }
}
