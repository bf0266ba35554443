//! Element context and listener bookkeeping
//!
//! Callbacks receive an [`ElementContext`] for the element they belong to.
//! It gives access to the host and to the `on`/`off` listener helpers.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use fos_dom::{Event, EventTarget, HandlerId, NodeId};

use crate::{ComponentError, Handler, Host};

/// Shared event callback; two listeners are equal when they share the closure
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&mut ElementContext<'_>, &mut Event)>);

impl Listener {
    pub fn new(callback: impl Fn(&mut ElementContext<'_>, &mut Event) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn ptr_eq(&self, other: &Listener) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn call(&self, cx: &mut ElementContext<'_>, event: &mut Event) {
        (self.0)(cx, event)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum BindingKind {
    /// A catalog handler bound at construction
    Handler(Handler),
    /// A listener added through `on` / `target_on`
    Custom(Listener),
}

/// A listener registered with the host on behalf of a component
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub owner: NodeId,
    pub target: EventTarget,
    pub event: String,
    pub capture: bool,
    pub kind: BindingKind,
}

impl Binding {
    fn is_custom(&self, target: EventTarget, event: &str, capture: bool, listener: &Listener) -> bool {
        self.target == target
            && self.event == event
            && self.capture == capture
            && matches!(&self.kind, BindingKind::Custom(l) if l.ptr_eq(listener))
    }
}

/// Handler IDs handed to the host, mapped back to what they stand for
#[derive(Debug, Default)]
pub(crate) struct ListenerTable {
    next_id: u64,
    bindings: HashMap<HandlerId, Binding>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, binding: Binding) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        self.bindings.insert(id, binding);
        id
    }

    /// Record a catalog handler of `owner`
    pub fn bind(&mut self, owner: NodeId, handler: Handler, capture: bool) -> HandlerId {
        self.insert(Binding {
            owner,
            target: EventTarget::Node(owner),
            event: handler.event_name().to_string(),
            capture,
            kind: BindingKind::Handler(handler),
        })
    }

    /// Record a custom listener; `None` if the same one is already recorded
    pub fn add(&mut self, owner: NodeId, target: EventTarget, event: &str, capture: bool, listener: &Listener) -> Option<HandlerId> {
        if self.find(target, event, capture, listener).is_some() {
            return None;
        }
        Some(self.insert(Binding {
            owner,
            target,
            event: event.to_string(),
            capture,
            kind: BindingKind::Custom(listener.clone()),
        }))
    }

    /// Forget a custom listener, returning its ID
    pub fn remove(&mut self, target: EventTarget, event: &str, capture: bool, listener: &Listener) -> Option<HandlerId> {
        let id = self.find(target, event, capture, listener)?;
        self.bindings.remove(&id);
        Some(id)
    }

    fn find(&self, target: EventTarget, event: &str, capture: bool, listener: &Listener) -> Option<HandlerId> {
        self.bindings
            .iter()
            .find(|(_, binding)| binding.is_custom(target, event, capture, listener))
            .map(|(id, _)| *id)
    }

    /// Forget every binding owned by `owner`
    pub fn release(&mut self, owner: NodeId) -> Vec<(HandlerId, Binding)> {
        let ids: Vec<HandlerId> = self
            .bindings
            .iter()
            .filter(|(_, binding)| binding.owner == owner)
            .map(|(id, _)| *id)
            .collect();
        let mut released: Vec<_> = ids
            .into_iter()
            .filter_map(|id| self.bindings.remove(&id).map(|binding| (id, binding)))
            .collect();
        released.sort_by_key(|(id, _)| *id);
        released
    }

    pub fn get(&self, id: HandlerId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

/// Reject event names the host cannot register
pub(crate) fn validate_event_name(event: &str) -> Result<(), ComponentError> {
    if event.is_empty() || event.chars().any(char::is_whitespace) {
        return Err(ComponentError::InvalidArgumentType {
            what: "event name",
            value: event.to_string(),
        });
    }
    Ok(())
}

fn validate_query(query: &str) -> Result<(), ComponentError> {
    if query.trim().is_empty() {
        return Err(ComponentError::InvalidArgumentType {
            what: "selector query",
            value: query.to_string(),
        });
    }
    Ok(())
}

/// The element a callback runs for, plus the host it lives in
pub struct ElementContext<'a> {
    node: NodeId,
    host: &'a mut dyn Host,
    listeners: &'a mut ListenerTable,
    capture: bool,
}

impl<'a> ElementContext<'a> {
    pub(crate) fn new(node: NodeId, host: &'a mut dyn Host, listeners: &'a mut ListenerTable, capture: bool) -> Self {
        Self {
            node,
            host,
            listeners,
            capture,
        }
    }

    /// The component's element
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn host(&self) -> &(dyn Host + 'a) {
        &*self.host
    }

    pub fn host_mut(&mut self) -> &mut (dyn Host + 'a) {
        &mut *self.host
    }

    /// First element inside the component matching `query`
    pub fn select(&self, query: &str) -> Result<Option<NodeId>, ComponentError> {
        validate_query(query)?;
        Ok(self.host.query_selector(self.node, query)?)
    }

    /// Every element inside the component matching `query`
    pub fn select_all(&self, query: &str) -> Result<Vec<NodeId>, ComponentError> {
        validate_query(query)?;
        Ok(self.host.query_selector_all(self.node, query)?)
    }

    /// Whether any part of the element's box lies vertically inside the viewport
    pub fn is_on_screen(&self) -> bool {
        let rect = self.host.bounding_client_rect(self.node);
        rect.top() < self.host.viewport_height() && rect.bottom() >= 0.0
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.host.get_attribute(self.node, name)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), ComponentError> {
        Ok(self.host.set_attribute(self.node, name, value)?)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Result<Option<String>, ComponentError> {
        Ok(self.host.remove_attribute(self.node, name)?)
    }

    /// Listen for `event` on the component's element
    pub fn on(&mut self, event: &str, listener: &Listener) -> Result<(), ComponentError> {
        self.target_on(EventTarget::Node(self.node), event, listener)
    }

    /// Stop listening for `event` on the component's element
    pub fn off(&mut self, event: &str, listener: &Listener) -> Result<(), ComponentError> {
        self.target_off(EventTarget::Node(self.node), event, listener)
    }

    /// Listen for `event` on any target, the window included.
    ///
    /// Adding the same listener twice is a no-op.
    pub fn target_on(&mut self, target: EventTarget, event: &str, listener: &Listener) -> Result<(), ComponentError> {
        validate_event_name(event)?;
        if let Some(id) = self.listeners.add(self.node, target, event, self.capture, listener) {
            self.host.add_listener(target, event, id, self.capture);
            tracing::trace!("{} listens for {} on {:?}", self.node, event, target);
        }
        Ok(())
    }

    /// Remove a listener added with [`target_on`](Self::target_on); unknown listeners are ignored
    pub fn target_off(&mut self, target: EventTarget, event: &str, listener: &Listener) -> Result<(), ComponentError> {
        validate_event_name(event)?;
        if let Some(id) = self.listeners.remove(target, event, self.capture, listener) {
            self.host.remove_listener(target, event, id, self.capture);
        }
        Ok(())
    }
}

impl fmt::Debug for ElementContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementContext")
            .field("node", &self.node)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}
