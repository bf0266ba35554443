//! Document - High-level document API
//!
//! Every mutation goes through `Document` so mutation observers and custom
//! element reactions see it. Reactions are queued, never run inline; the
//! embedder drains them with [`Document::take_callbacks`].

use std::collections::{HashMap, HashSet};

use crate::custom_elements::{CallbackQueue, CustomElementRegistry, LifecycleCallback, LifecycleCallbackInfo};
use crate::events::{EventTarget, HandlerId, ListenerRegistry};
use crate::geometry::{DOMRect, Viewport};
use crate::observer::{MutationObserver, MutationObserverInit, MutationRecord, ObserverId};
use crate::query::Selector;
use crate::{DomError, DomTree, NodeId, parser};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    custom_elements: CustomElementRegistry,
    callbacks: CallbackQueue,
    /// Custom elements that already received their `Upgrade` reaction
    upgraded: HashSet<NodeId>,
    listeners: ListenerRegistry,
    observers: Vec<MutationObserver>,
    next_observer: u32,
    layout: HashMap<NodeId, DOMRect>,
    viewport: Viewport,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        for (parent, child) in [(NodeId::ROOT, html), (html, head), (html, body)] {
            tree.attach_fresh(parent, child);
        }

        Self {
            tree,
            html_element: html,
            head_element: head,
            body_element: body,
            custom_elements: CustomElementRegistry::new(),
            callbacks: CallbackQueue::new(),
            upgraded: HashSet::new(),
            listeners: ListenerRegistry::new(),
            observers: Vec::new(),
            next_observer: 1,
            layout: HashMap::new(),
            viewport: Viewport::default(),
        }
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.custom_elements
    }

    // ---------------------------------------------------------------------
    // Node creation and tree mutation
    // ---------------------------------------------------------------------

    /// Create a detached element, upgrading it right away if its tag is defined
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = self.tree.create_element(tag);
        let defined = self
            .tree
            .tag_name(id)
            .is_some_and(|tag| self.custom_elements.is_defined(tag));
        if defined {
            self.enqueue_upgrade(id);
        }
        id
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.create_text(text)
    }

    /// Append `child` to `parent`, moving it if it is attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.check_insert(parent, child)?;
        let was_connected = self.tree.is_connected(child);

        if let Some(old_parent) = self.tree.parent(child) {
            let (previous, next) = self.tree.siblings_of(child);
            self.tree.detach(child);
            self.record(MutationRecord::child_list(old_parent, Vec::new(), vec![child], previous, next));
        }

        let previous = self.tree.children(parent).last().copied();
        self.tree.append_child(parent, child)?;
        self.record(MutationRecord::child_list(parent, vec![child], Vec::new(), previous, None));

        self.after_move(child, was_connected);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let was_connected = self.tree.is_connected(child);
        let (previous, next) = self.tree.siblings_of(child);
        self.tree.remove_child(parent, child)?;
        self.record(MutationRecord::child_list(parent, Vec::new(), vec![child], previous, next));
        self.after_move(child, was_connected);
        Ok(())
    }

    /// Replace every child of an element with parsed markup
    pub fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<(), DomError> {
        self.tree.get(node).ok_or(DomError::UnknownNode(node))?;
        let context = self
            .tree
            .tag_name(node)
            .ok_or(DomError::NotAnElement(node))?
            .to_string();
        let was_connected = self.tree.is_connected(node);
        let added = parser::parse_fragment(&mut self.tree, &context, markup)?;
        let removed = self.tree.children(node).to_vec();

        for &child in &removed {
            self.tree.detach(child);
        }
        for &child in &added {
            self.tree.append_child(node, child)?;
        }
        self.record(MutationRecord::child_list(node, added.clone(), removed.clone(), None, None));

        for child in removed {
            self.after_move(child, was_connected);
        }
        for child in added {
            self.after_move(child, false);
        }
        Ok(())
    }

    /// Take a node over from another document.
    ///
    /// The node is detached first; upgraded custom elements in its subtree
    /// receive `Adopted`.
    pub fn adopt_node(&mut self, node: NodeId) -> Result<(), DomError> {
        self.tree.get(node).ok_or(DomError::UnknownNode(node))?;
        if let Some(parent) = self.tree.parent(node) {
            self.remove_child(parent, node)?;
        }
        for id in self.subtree(node) {
            if self.upgraded.contains(&id) {
                self.callbacks
                    .enqueue(LifecycleCallbackInfo::new(LifecycleCallback::Adopted, id));
            }
        }
        Ok(())
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.tree.tag_name(node)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.is_connected(node)
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.get_attribute(node, name)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let old = self.tree.set_attribute(node, name, value)?;
        self.record(MutationRecord::attributes(node, name, old.clone()));
        self.attribute_changed(node, name, old, Some(value.to_string()));
        Ok(())
    }

    /// Remove an attribute; returns the removed value
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let old = self.tree.remove_attribute(node, name)?;
        if old.is_some() {
            self.record(MutationRecord::attributes(node, name, old.clone()));
            self.attribute_changed(node, name, old.clone(), None);
        }
        Ok(old)
    }

    /// Replace the character data of a text or comment node
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let old = self.tree.set_text(node, text)?;
        self.record(MutationRecord::character_data(node, old));
        Ok(())
    }

    fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut nodes = vec![node];
        nodes.extend(self.tree.descendants(node));
        nodes
    }

    // ---------------------------------------------------------------------
    // Custom elements
    // ---------------------------------------------------------------------

    /// Define a custom element and upgrade existing connected instances
    pub fn define_custom_element(&mut self, name: &str, observed_attributes: &[&str]) -> Result<(), DomError> {
        self.custom_elements.define(name, observed_attributes)?;

        let candidates: Vec<NodeId> = self
            .tree
            .descendants(NodeId::ROOT)
            .into_iter()
            .filter(|id| self.tree.tag_name(*id) == Some(name) && !self.upgraded.contains(id))
            .collect();
        for id in candidates {
            self.enqueue_upgrade(id);
            self.callbacks
                .enqueue(LifecycleCallbackInfo::new(LifecycleCallback::Connected, id));
        }
        Ok(())
    }

    /// Drain pending custom element reactions in the order they were queued
    pub fn take_callbacks(&mut self) -> Vec<LifecycleCallbackInfo> {
        self.callbacks.drain()
    }

    pub fn is_upgraded(&self, node: NodeId) -> bool {
        self.upgraded.contains(&node)
    }

    fn enqueue_upgrade(&mut self, node: NodeId) {
        self.upgraded.insert(node);
        self.callbacks
            .enqueue(LifecycleCallbackInfo::new(LifecycleCallback::Upgrade, node));
    }

    /// Queue connect/disconnect reactions after `root` moved
    fn after_move(&mut self, root: NodeId, was_connected: bool) {
        let now_connected = self.tree.is_connected(root);
        for node in self.subtree(root) {
            let Some(defined) = self
                .tree
                .tag_name(node)
                .map(|tag| self.custom_elements.is_defined(tag))
            else {
                continue;
            };

            if !self.upgraded.contains(&node) {
                if defined && now_connected {
                    self.enqueue_upgrade(node);
                    self.callbacks
                        .enqueue(LifecycleCallbackInfo::new(LifecycleCallback::Connected, node));
                }
                continue;
            }

            if was_connected {
                self.callbacks
                    .enqueue(LifecycleCallbackInfo::new(LifecycleCallback::Disconnected, node));
            }
            if now_connected {
                self.callbacks
                    .enqueue(LifecycleCallbackInfo::new(LifecycleCallback::Connected, node));
            }
        }
    }

    fn attribute_changed(&mut self, node: NodeId, name: &str, old: Option<String>, new: Option<String>) {
        if !self.upgraded.contains(&node) {
            return;
        }
        let observed = self
            .tree
            .tag_name(node)
            .and_then(|tag| self.custom_elements.get(tag))
            .is_some_and(|definition| definition.observes(name));
        if observed {
            self.callbacks
                .enqueue(LifecycleCallbackInfo::attribute_changed(node, name, old, new));
        }
    }

    // ---------------------------------------------------------------------
    // Mutation observers
    // ---------------------------------------------------------------------

    pub fn create_observer(&mut self) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(MutationObserver::new(id));
        id
    }

    pub fn observe(&mut self, observer: ObserverId, target: NodeId, options: MutationObserverInit) -> Result<(), DomError> {
        self.tree.get(target).ok_or(DomError::UnknownNode(target))?;
        if let Some(entry) = self.observers.iter_mut().find(|o| o.id() == observer) {
            entry.observe(target, options);
        }
        Ok(())
    }

    /// Stop an observer and forget it
    pub fn disconnect_observer(&mut self, observer: ObserverId) {
        if let Some(entry) = self.observers.iter_mut().find(|o| o.id() == observer) {
            entry.disconnect();
        }
        self.observers.retain(|o| o.id() != observer);
    }

    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .iter_mut()
            .find(|o| o.id() == observer)
            .map(MutationObserver::take_records)
            .unwrap_or_default()
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn record(&mut self, record: MutationRecord) {
        let tree = &self.tree;
        for observer in &mut self.observers {
            observer.offer(tree, &record);
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn query_selector(&self, scope: NodeId, query: &str) -> Result<Option<NodeId>, DomError> {
        Ok(Selector::parse(query)?.query_first(&self.tree, scope))
    }

    pub fn query_selector_all(&self, scope: NodeId, query: &str) -> Result<Vec<NodeId>, DomError> {
        Ok(Selector::parse(query)?.query_all(&self.tree, scope))
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    pub fn add_listener(&mut self, target: EventTarget, event_type: &str, handler: HandlerId, capture: bool) -> bool {
        self.listeners.add(target, event_type, handler, capture)
    }

    pub fn remove_listener(&mut self, target: EventTarget, event_type: &str, handler: HandlerId, capture: bool) -> bool {
        self.listeners.remove(target, event_type, handler, capture)
    }

    pub fn listener_count(&self, target: EventTarget, event_type: &str) -> usize {
        self.listeners.count(target, event_type)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Listeners to invoke, in order, for an event fired at `target`.
    ///
    /// The window takes part in propagation only for connected targets.
    pub fn dispatch_path(&self, target: NodeId, event_type: &str) -> Vec<(EventTarget, HandlerId)> {
        let mut path = Vec::new();
        if self.tree.is_connected(target) {
            path.push(EventTarget::Window);
        }
        path.extend(self.tree.ancestors(target).into_iter().rev().map(EventTarget::Node));
        path.push(EventTarget::Node(target));
        self.listeners.dispatch_order(&path, event_type)
    }

    // ---------------------------------------------------------------------
    // Style sheets
    // ---------------------------------------------------------------------

    /// `<style>` element in head carrying `marker="value"`
    pub fn style_with_marker(&self, marker: &str, value: &str) -> Option<NodeId> {
        self.styles()
            .into_iter()
            .find(|&id| self.tree.get_attribute(id, marker) == Some(value))
    }

    /// Append a marked `<style>` element holding `css` to head
    pub fn append_style(&mut self, marker: &str, value: &str, css: &str) -> Result<NodeId, DomError> {
        let style = self.tree.create_element("style");
        self.tree.set_attribute(style, marker, value)?;
        let text = self.tree.create_text(css);
        self.tree.append_child(style, text)?;
        self.append_child(self.head_element, style)?;
        Ok(style)
    }

    /// Every `<style>` element in head, in document order
    pub fn styles(&self) -> Vec<NodeId> {
        self.tree
            .children(self.head_element)
            .iter()
            .copied()
            .filter(|&id| self.tree.tag_name(id) == Some("style"))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    /// Record the layout box of a node
    pub fn set_layout_rect(&mut self, node: NodeId, rect: DOMRect) {
        self.layout.insert(node, rect);
    }

    /// Bounding box of a node; nodes without layout report an empty rect
    pub fn bounding_client_rect(&self, node: NodeId) -> DOMRect {
        self.layout.get(&node).copied().unwrap_or_default()
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport { width, height };
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::MutationType;

    fn kinds(doc: &mut Document) -> Vec<(LifecycleCallback, NodeId)> {
        doc.take_callbacks()
            .into_iter()
            .map(|info| (info.callback, info.element))
            .collect()
    }

    #[test]
    fn test_skeleton() {
        let doc = Document::new();
        assert_eq!(doc.tree().tag_name(doc.document_element()), Some("html"));
        assert_eq!(doc.tree().parent(doc.head()), Some(doc.document_element()));
        assert_eq!(doc.tree().parent(doc.body()), Some(doc.document_element()));
        assert_eq!(doc.tree().children(doc.document_element()), &[doc.head(), doc.body()]);
        assert_eq!(doc.tree().children(NodeId::ROOT), &[doc.document_element()]);
        assert!(doc.is_connected(doc.body()));
    }

    #[test]
    fn test_inner_html_parses_in_element_context() {
        let mut doc = Document::new();
        let row = doc.create_element("tr");
        doc.append_child(doc.body(), row).unwrap();
        doc.set_inner_html(row, "<td class=\"cell\">x</td><td>y</td>").unwrap();

        let cells = doc.query_selector_all(row, "td").unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(doc.get_attribute(cells[0], "class"), Some("cell"));
        assert_eq!(doc.tree().text_content(row), "xy");
    }

    #[test]
    fn test_inner_html_keeps_spacing() {
        let mut doc = Document::new();
        let host = doc.create_element("div");
        doc.set_inner_html(host, "  <b>a</b> <b>b</b>\n").unwrap();

        assert_eq!(doc.tree().text_content(host), "  a b\n");
        assert_eq!(doc.tree().children(host).len(), 4);
    }

    #[test]
    fn test_dynamic_creation_upgrades_then_connects() {
        let mut doc = Document::new();
        doc.define_custom_element("app-card", &[]).unwrap();

        let card = doc.create_element("app-card");
        assert_eq!(kinds(&mut doc), vec![(LifecycleCallback::Upgrade, card)]);

        doc.append_child(doc.body(), card).unwrap();
        assert_eq!(kinds(&mut doc), vec![(LifecycleCallback::Connected, card)]);

        doc.remove_child(doc.body(), card).unwrap();
        assert_eq!(kinds(&mut doc), vec![(LifecycleCallback::Disconnected, card)]);
    }

    #[test]
    fn test_define_upgrades_existing_connected_elements() {
        let mut doc = Document::new();
        let early = doc.create_element("app-late");
        let detached = doc.create_element("app-late");
        doc.append_child(doc.body(), early).unwrap();
        assert!(doc.take_callbacks().is_empty());

        doc.define_custom_element("app-late", &[]).unwrap();
        assert_eq!(
            kinds(&mut doc),
            vec![(LifecycleCallback::Upgrade, early), (LifecycleCallback::Connected, early)]
        );

        // Disconnected candidates upgrade once they get connected
        doc.append_child(doc.body(), detached).unwrap();
        assert_eq!(
            kinds(&mut doc),
            vec![(LifecycleCallback::Upgrade, detached), (LifecycleCallback::Connected, detached)]
        );
    }

    #[test]
    fn test_move_within_document_reconnects() {
        let mut doc = Document::new();
        doc.define_custom_element("app-move", &[]).unwrap();
        let first = doc.create_element("div");
        let second = doc.create_element("div");
        doc.append_child(doc.body(), first).unwrap();
        doc.append_child(doc.body(), second).unwrap();
        let el = doc.create_element("app-move");
        doc.append_child(first, el).unwrap();
        doc.take_callbacks();

        doc.append_child(second, el).unwrap();
        assert_eq!(
            kinds(&mut doc),
            vec![(LifecycleCallback::Disconnected, el), (LifecycleCallback::Connected, el)]
        );
    }

    #[test]
    fn test_attribute_changed_respects_filter() {
        let mut doc = Document::new();
        doc.define_custom_element("app-dialog", &["open"]).unwrap();
        let dialog = doc.create_element("app-dialog");
        doc.take_callbacks();

        doc.set_attribute(dialog, "class", "x").unwrap();
        assert!(doc.take_callbacks().is_empty());

        doc.set_attribute(dialog, "open", "").unwrap();
        doc.remove_attribute(dialog, "open").unwrap();
        let callbacks = doc.take_callbacks();
        assert_eq!(callbacks.len(), 2);
        assert_eq!(callbacks[0].new_value.as_deref(), Some(""));
        assert_eq!(callbacks[1].old_value.as_deref(), Some(""));
        assert_eq!(callbacks[1].new_value, None);
    }

    #[test]
    fn test_adopt_node() {
        let mut doc = Document::new();
        doc.define_custom_element("app-adopt", &[]).unwrap();
        let el = doc.create_element("app-adopt");
        doc.append_child(doc.body(), el).unwrap();
        doc.take_callbacks();

        doc.adopt_node(el).unwrap();
        assert_eq!(
            kinds(&mut doc),
            vec![(LifecycleCallback::Disconnected, el), (LifecycleCallback::Adopted, el)]
        );
        assert!(!doc.tree().is_connected(el));
    }

    #[test]
    fn test_inner_html_records_single_child_list() {
        let mut doc = Document::new();
        let host = doc.create_element("div");
        doc.append_child(doc.body(), host).unwrap();
        doc.set_inner_html(host, "<em>old</em>").unwrap();

        let observer = doc.create_observer();
        doc.observe(observer, host, MutationObserverInit {
            child_list: true,
            ..Default::default()
        })
        .unwrap();
        doc.set_inner_html(host, "<p>a</p><p>b</p>").unwrap();

        let records = doc.take_records(observer);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mutation_type, MutationType::ChildList);
        assert_eq!(records[0].added_nodes.len(), 2);
        assert_eq!(records[0].removed_nodes.len(), 1);
        assert_eq!(doc.query_selector_all(host, "p").unwrap().len(), 2);
    }

    #[test]
    fn test_inner_html_rejects_text_nodes() {
        let mut doc = Document::new();
        let text = doc.create_text("plain");
        assert_eq!(doc.set_inner_html(text, "<p></p>"), Err(DomError::NotAnElement(text)));
    }

    #[test]
    fn test_styles_with_marker() {
        let mut doc = Document::new();
        assert!(doc.style_with_marker("application", "app-x").is_none());

        let style = doc.append_style("application", "app-x", "app-x{color:red}").unwrap();
        assert_eq!(doc.style_with_marker("application", "app-x"), Some(style));
        assert_eq!(doc.tree().text_content(style), "app-x{color:red}");
        assert_eq!(doc.styles().len(), 1);
    }

    #[test]
    fn test_dispatch_path_includes_window_when_connected() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        doc.add_listener(EventTarget::Window, "click", HandlerId(1), true);
        doc.add_listener(EventTarget::Node(button), "click", HandlerId(2), false);

        assert_eq!(doc.dispatch_path(button, "click"), vec![(EventTarget::Node(button), HandlerId(2))]);

        doc.append_child(doc.body(), button).unwrap();
        assert_eq!(
            doc.dispatch_path(button, "click"),
            vec![(EventTarget::Window, HandlerId(1)), (EventTarget::Node(button), HandlerId(2))]
        );
    }

    #[test]
    fn test_geometry_defaults() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        assert_eq!(doc.bounding_client_rect(el), DOMRect::default());

        doc.set_layout_rect(el, DOMRect::from_xywh(0.0, 10.0, 5.0, 5.0));
        doc.set_viewport(1024.0, 768.0);
        assert_eq!(doc.bounding_client_rect(el).bottom(), 15.0);
        assert_eq!(doc.viewport().height, 768.0);
    }
}
