//! Host platform seam
//!
//! Everything the component layer needs from the environment. The fOS
//! [`Document`] implements it; another embedder can too.

use fos_dom::{
    DOMRect, Document, DomError, EventTarget, HandlerId, LifecycleCallbackInfo,
    MutationObserverInit, MutationRecord, NodeId, ObserverId,
};

pub trait Host {
    /// Define `selector` as a custom element name
    fn register_component(&mut self, selector: &str, observed_attributes: &[&str]) -> Result<(), DomError>;

    /// Replace the children of `node` with parsed markup
    fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<(), DomError>;

    fn query_selector(&self, scope: NodeId, query: &str) -> Result<Option<NodeId>, DomError>;

    fn query_selector_all(&self, scope: NodeId, query: &str) -> Result<Vec<NodeId>, DomError>;

    /// Returns false if the same registration already exists
    fn add_listener(&mut self, target: EventTarget, event: &str, handler: HandlerId, capture: bool) -> bool;

    fn remove_listener(&mut self, target: EventTarget, event: &str, handler: HandlerId, capture: bool) -> bool;

    /// Listeners to run, in order, for an event fired at `target`
    fn dispatch_path(&self, target: NodeId, event: &str) -> Vec<(EventTarget, HandlerId)>;

    /// Whether a style element tagged `marker="selector"` exists
    fn has_style(&self, marker: &str, selector: &str) -> bool;

    fn append_style(&mut self, marker: &str, selector: &str, css: &str) -> Result<(), DomError>;

    /// Start a mutation watch on `node`
    fn observe(&mut self, node: NodeId, options: MutationObserverInit) -> Result<ObserverId, DomError>;

    fn unobserve(&mut self, observer: ObserverId);

    fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord>;

    /// Pending custom element reactions, oldest first
    fn take_callbacks(&mut self) -> Vec<LifecycleCallbackInfo>;

    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError>;

    fn text_content(&self, node: NodeId) -> String;

    fn bounding_client_rect(&self, node: NodeId) -> DOMRect;

    fn viewport_height(&self) -> f64;
}

impl Host for Document {
    fn register_component(&mut self, selector: &str, observed_attributes: &[&str]) -> Result<(), DomError> {
        self.define_custom_element(selector, observed_attributes)
    }

    fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<(), DomError> {
        Document::set_inner_html(self, node, markup)
    }

    fn query_selector(&self, scope: NodeId, query: &str) -> Result<Option<NodeId>, DomError> {
        Document::query_selector(self, scope, query)
    }

    fn query_selector_all(&self, scope: NodeId, query: &str) -> Result<Vec<NodeId>, DomError> {
        Document::query_selector_all(self, scope, query)
    }

    fn add_listener(&mut self, target: EventTarget, event: &str, handler: HandlerId, capture: bool) -> bool {
        Document::add_listener(self, target, event, handler, capture)
    }

    fn remove_listener(&mut self, target: EventTarget, event: &str, handler: HandlerId, capture: bool) -> bool {
        Document::remove_listener(self, target, event, handler, capture)
    }

    fn dispatch_path(&self, target: NodeId, event: &str) -> Vec<(EventTarget, HandlerId)> {
        Document::dispatch_path(self, target, event)
    }

    fn has_style(&self, marker: &str, selector: &str) -> bool {
        self.style_with_marker(marker, selector).is_some()
    }

    fn append_style(&mut self, marker: &str, selector: &str, css: &str) -> Result<(), DomError> {
        Document::append_style(self, marker, selector, css).map(|_| ())
    }

    fn observe(&mut self, node: NodeId, options: MutationObserverInit) -> Result<ObserverId, DomError> {
        let observer = self.create_observer();
        if let Err(err) = Document::observe(self, observer, node, options) {
            self.disconnect_observer(observer);
            return Err(err);
        }
        Ok(observer)
    }

    fn unobserve(&mut self, observer: ObserverId) {
        self.disconnect_observer(observer);
    }

    fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        Document::take_records(self, observer)
    }

    fn take_callbacks(&mut self) -> Vec<LifecycleCallbackInfo> {
        Document::take_callbacks(self)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        Document::tag_name(self, node)
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        Document::get_attribute(self, node, name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        Document::set_attribute(self, node, name, value)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Document::remove_attribute(self, node, name)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.tree().text_content(node)
    }

    fn bounding_client_rect(&self, node: NodeId) -> DOMRect {
        Document::bounding_client_rect(self, node)
    }

    fn viewport_height(&self) -> f64 {
        self.viewport().height
    }
}
