//! Component runtime
//!
//! Owns the host and the registry state. Registration goes through
//! [`Runtime::import`]; instances are created and driven by
//! [`Runtime::process`], which drains the host's custom element reactions
//! and the mutation records of watched instances.

use std::collections::{BTreeMap, HashMap};

use fos_dom::{
    Document, Event, EventTarget, HandlerId, LifecycleCallback, LifecycleCallbackInfo,
    MutationObserverInit, NodeId, ObserverId,
};

use crate::component::AnyComponent;
use crate::context::{BindingKind, ListenerTable, validate_event_name};
use crate::{
    Component, ComponentClass, ComponentConfig, ComponentError, ElementContext, Handler, Host,
    RegistryState, naming, styles,
};

/// Instance lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, never attached
    Unattached,
    Attached,
    /// Detached; may be attached again
    Detached,
}

struct Instance {
    selector: String,
    component: Box<dyn AnyComponent>,
    lifecycle: Lifecycle,
    bound: Vec<Handler>,
    watch: Option<ObserverId>,
}

/// Options for the mutation watch of an instance
fn watch_everything() -> MutationObserverInit {
    MutationObserverInit {
        child_list: true,
        attributes: true,
        character_data: true,
        subtree: true,
        attribute_old_value: true,
        character_data_old_value: true,
        attribute_filter: None,
    }
}

pub struct Runtime<H: Host = Document> {
    host: H,
    state: RegistryState,
    config: ComponentConfig,
    /// Registered classes by selector
    classes: HashMap<String, ComponentClass>,
    instances: BTreeMap<NodeId, Instance>,
    listeners: ListenerTable,
}

impl<H: Host> Runtime<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, ComponentConfig::default())
    }

    pub fn with_config(host: H, config: ComponentConfig) -> Self {
        Self::with_state(host, config, RegistryState::new())
    }

    /// Start from an existing registry state
    pub fn with_state(host: H, config: ComponentConfig, state: RegistryState) -> Self {
        Self {
            host,
            state,
            config,
            classes: HashMap::new(),
            instances: BTreeMap::new(),
            listeners: ListenerTable::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access; run [`process`](Self::process) after mutating
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    /// Register classes in order, stopping at the first failure.
    ///
    /// Classes registered before a failure stay registered. Instances the
    /// host creates for successfully registered classes are processed
    /// before returning.
    pub fn import(&mut self, classes: &[ComponentClass]) -> Result<Vec<String>, ComponentError> {
        let mut selectors = Vec::with_capacity(classes.len());
        for class in classes {
            selectors.push(self.register_class(*class)?);
        }
        self.process()?;
        Ok(selectors)
    }

    /// Register a single component type
    pub fn register<T: Component>(&mut self) -> Result<String, ComponentError> {
        let selector = self.register_class(ComponentClass::of::<T>())?;
        self.process()?;
        Ok(selector)
    }

    fn register_class(&mut self, class: ComponentClass) -> Result<String, ComponentError> {
        let selector = naming::reserve_selector(&mut self.state, &self.config, class.name(), class.selector())?;

        if let Some(css) = class.styles() {
            styles::install_styles(&mut self.state, &mut self.host, &self.config, &selector, css)?;
        }

        if let Err(err) = self.host.register_component(&selector, class.observed_attributes()) {
            tracing::warn!("Host rejected <{}> for {}: {}", selector, class.name(), err);
            return Err(err.into());
        }

        tracing::info!(
            "Registered <{}> for {} ({} handlers)",
            selector,
            class.name(),
            class.handlers().len()
        );
        self.classes.insert(selector.clone(), class);
        Ok(selector)
    }

    /// Registered class for a selector
    pub fn class(&self, selector: &str) -> Option<&ComponentClass> {
        self.classes.get(selector)
    }

    /// Run pending lifecycle callbacks and forward mutation records until both queues are empty.
    ///
    /// A failing callback does not stop the rest of the queue; the first
    /// error is returned once everything else has run.
    pub fn process(&mut self) -> Result<(), ComponentError> {
        let mut first_error = None;
        loop {
            let callbacks = self.host.take_callbacks();
            let records = self.take_mutation_records();
            if callbacks.is_empty() && records.is_empty() {
                break;
            }

            for info in callbacks {
                let (callback, node) = (info.callback, info.element);
                if let Err(err) = self.run_callback(info) {
                    tracing::warn!("{:?} for {} failed: {}", callback, node, err);
                    first_error.get_or_insert(err);
                }
            }
            for (node, record) in records {
                self.with_instance(node, |component, cx| component.mutation(cx, &record));
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn take_mutation_records(&mut self) -> Vec<(NodeId, fos_dom::MutationRecord)> {
        let watches: Vec<(NodeId, ObserverId)> = self
            .instances
            .iter()
            .filter_map(|(node, instance)| instance.watch.map(|watch| (*node, watch)))
            .collect();

        let mut records = Vec::new();
        for (node, watch) in watches {
            records.extend(self.host.take_records(watch).into_iter().map(|record| (node, record)));
        }
        records
    }

    fn run_callback(&mut self, info: LifecycleCallbackInfo) -> Result<(), ComponentError> {
        let node = info.element;
        if info.callback == LifecycleCallback::Upgrade {
            return self.construct(node);
        }

        let lifecycle = match info.callback {
            LifecycleCallback::Connected => Some(Lifecycle::Attached),
            LifecycleCallback::Disconnected => Some(Lifecycle::Detached),
            _ => None,
        };
        if let (Some(lifecycle), Some(instance)) = (lifecycle, self.instances.get_mut(&node)) {
            instance.lifecycle = lifecycle;
        }

        let handled = self.with_instance(node, |component, cx| match info.callback {
            LifecycleCallback::Connected => component.connect(cx),
            LifecycleCallback::Disconnected => component.disconnect(cx),
            LifecycleCallback::Adopted => component.adopt(cx),
            LifecycleCallback::AttributeChanged => component.attribute_changed(
                cx,
                info.attribute_name.as_deref().unwrap_or_default(),
                info.old_value.as_deref(),
                info.new_value.as_deref(),
            ),
            LifecycleCallback::Upgrade => {}
        });
        if handled.is_none() {
            tracing::warn!("{:?} for {} without a component instance", info.callback, node);
        }
        Ok(())
    }

    /// Create the instance for a freshly upgraded element
    fn construct(&mut self, node: NodeId) -> Result<(), ComponentError> {
        if self.instances.contains_key(&node) {
            tracing::warn!("{} is already a component instance", node);
            return Ok(());
        }
        let Some((selector, class)) = self
            .host
            .tag_name(node)
            .and_then(|tag| self.classes.get_key_value(tag))
            .map(|(selector, class)| (selector.clone(), *class))
        else {
            tracing::warn!("Upgrade of {} has no registered class", node);
            return Ok(());
        };

        let component = class.instantiate();

        if let Some(template) = class.template().filter(|t| !t.is_empty()) {
            self.host.set_inner_html(node, template)?;
        }

        // Fallible steps first; nothing is bound for an element that fails
        let watch = if class.watches_mutations() {
            Some(self.host.observe(node, watch_everything())?)
        } else {
            None
        };

        let capture = self.config.capture;
        let mut bound = Vec::with_capacity(class.handlers().len());
        for handler in class.handlers().iter() {
            let id = self.listeners.bind(node, handler, capture);
            self.host
                .add_listener(EventTarget::Node(node), handler.event_name(), id, capture);
            bound.push(handler);
        }

        tracing::debug!(
            "Constructed <{}> on {}: {} handlers bound, watching mutations: {}",
            selector,
            node,
            bound.len(),
            watch.is_some()
        );
        self.instances.insert(
            node,
            Instance {
                selector,
                component,
                lifecycle: Lifecycle::Unattached,
                bound,
                watch,
            },
        );
        Ok(())
    }

    fn with_instance<R>(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut dyn AnyComponent, &mut ElementContext<'_>) -> R,
    ) -> Option<R> {
        let instance = self.instances.get_mut(&node)?;
        let mut cx = ElementContext::new(node, &mut self.host, &mut self.listeners, self.config.capture);
        Some(f(instance.component.as_mut(), &mut cx))
    }

    /// Fire an event at `target` and run the listeners the host selects.
    ///
    /// `stop_propagation` stops delivery after the current target's
    /// listeners. Callbacks queued by the listeners are processed before
    /// returning.
    pub fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<Event, ComponentError> {
        validate_event_name(event_type)?;
        let mut event = Event::new(event_type, target);
        let order = self.host.dispatch_path(target, event_type);

        let mut current = None;
        for (current_target, id) in order {
            if event.is_propagation_stopped() && current != Some(current_target) {
                break;
            }
            current = Some(current_target);
            event.current_target = Some(current_target);
            self.invoke(id, &mut event);
        }

        self.process()?;
        Ok(event)
    }

    fn invoke(&mut self, id: HandlerId, event: &mut Event) {
        // Listeners removed earlier in this dispatch are skipped
        let Some(binding) = self.listeners.get(id) else {
            return;
        };
        let owner = binding.owner;
        let kind = binding.kind.clone();
        match kind {
            BindingKind::Handler(handler) => {
                self.with_instance(owner, |component, cx| component.handle(handler, cx, event));
            }
            BindingKind::Custom(listener) => {
                let mut cx = ElementContext::new(owner, &mut self.host, &mut self.listeners, self.config.capture);
                listener.call(&mut cx, event);
            }
        }
    }

    /// Drop an instance: stop its mutation watch and remove its listeners
    pub fn discard(&mut self, node: NodeId) -> Result<(), ComponentError> {
        let instance = self
            .instances
            .remove(&node)
            .ok_or(ComponentError::UnknownInstance(node))?;

        if let Some(watch) = instance.watch {
            self.host.unobserve(watch);
        }
        for (id, binding) in self.listeners.release(node) {
            self.host
                .remove_listener(binding.target, &binding.event, id, binding.capture);
        }
        tracing::debug!("Discarded <{}> on {}", instance.selector, node);
        Ok(())
    }

    /// The component on `node`, if it is a `T`
    pub fn instance<T: Component>(&self, node: NodeId) -> Option<&T> {
        self.instances.get(&node)?.component.as_any().downcast_ref()
    }

    pub fn instance_mut<T: Component>(&mut self, node: NodeId) -> Option<&mut T> {
        self.instances
            .get_mut(&node)?
            .component
            .as_any_mut()
            .downcast_mut()
    }

    /// Run `f` with the component on `node` and a context for its element
    pub fn with_component<T: Component, R>(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut T, &mut ElementContext<'_>) -> R,
    ) -> Result<R, ComponentError> {
        let result = self
            .with_instance(node, |component, cx| {
                component.as_any_mut().downcast_mut::<T>().map(|component| f(component, cx))
            })
            .flatten()
            .ok_or(ComponentError::UnknownInstance(node))?;
        self.process()?;
        Ok(result)
    }

    /// Handlers bound to the instance on `node`, in catalog order
    pub fn bound_handlers(&self, node: NodeId) -> Option<&[Handler]> {
        self.instances.get(&node).map(|i| i.bound.as_slice())
    }

    pub fn lifecycle(&self, node: NodeId) -> Option<Lifecycle> {
        self.instances.get(&node).map(|i| i.lifecycle)
    }

    /// Selector of the instance on `node`
    pub fn selector_of(&self, node: NodeId) -> Option<&str> {
        self.instances.get(&node).map(|i| i.selector.as_str())
    }

    /// Whether the instance on `node` has an active mutation watch
    pub fn is_watching(&self, node: NodeId) -> bool {
        self.instances.get(&node).is_some_and(|i| i.watch.is_some())
    }

    /// Live instances in node order
    pub fn instances(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.instances.keys().copied()
    }

    /// Listener registrations the runtime holds with the host
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<H: Host + std::fmt::Debug> std::fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("host", &self.host)
            .field("state", &self.state)
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .field("instances", &self.instances.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandlerSet, import};
    use fos_dom::MutationRecord;

    #[derive(Default)]
    struct ClickApplication {
        clicks: u32,
        connects: u32,
    }

    impl Component for ClickApplication {
        const HANDLERS: HandlerSet = HandlerSet::of(&[Handler::Click]);

        fn on_connect(&mut self, _cx: &mut ElementContext<'_>) {
            self.connects += 1;
        }

        fn on_click(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {
            self.clicks += 1;
        }
    }

    #[derive(Default)]
    struct WatchApplication {
        seen: Vec<MutationRecord>,
    }

    impl Component for WatchApplication {
        const TEMPLATE: Option<&'static str> = Some("<span>0</span>");
        const WATCH_MUTATIONS: bool = true;

        fn on_mutation(&mut self, _cx: &mut ElementContext<'_>, record: &MutationRecord) {
            self.seen.push(record.clone());
        }
    }

    fn mount(runtime: &mut Runtime, tag: &str) -> NodeId {
        let doc = runtime.host_mut();
        let node = doc.create_element(tag);
        doc.append_child(doc.body(), node).unwrap();
        runtime.process().unwrap();
        node
    }

    #[test]
    fn test_register_and_construct() {
        let mut runtime = Runtime::new(Document::new());
        assert_eq!(runtime.register::<ClickApplication>().unwrap(), "app-click");

        let node = mount(&mut runtime, "app-click");
        assert_eq!(runtime.lifecycle(node), Some(Lifecycle::Attached));
        assert_eq!(runtime.bound_handlers(node), Some(&[Handler::Click][..]));
        assert_eq!(runtime.instance::<ClickApplication>(node).unwrap().connects, 1);
        assert!(runtime.instance::<WatchApplication>(node).is_none());
    }

    #[test]
    fn test_dispatch_reaches_bound_handler() {
        let mut runtime = Runtime::new(Document::new());
        import!(runtime, ClickApplication).unwrap();
        let node = mount(&mut runtime, "app-click");

        runtime.dispatch_event(node, "click").unwrap();
        runtime.dispatch_event(node, "click").unwrap();
        runtime.dispatch_event(node, "keydown").unwrap();
        assert_eq!(runtime.instance::<ClickApplication>(node).unwrap().clicks, 2);
    }

    #[test]
    fn test_template_then_watch() {
        let mut runtime = Runtime::new(Document::new());
        runtime.register::<WatchApplication>().unwrap();
        let node = mount(&mut runtime, "app-watch");

        // Rendering the template happens before the watch starts
        assert!(runtime.instance::<WatchApplication>(node).unwrap().seen.is_empty());
        assert!(runtime.is_watching(node));

        runtime.host_mut().set_attribute(node, "data-x", "1").unwrap();
        runtime.process().unwrap();
        let seen = &runtime.instance::<WatchApplication>(node).unwrap().seen;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].attribute_name.as_deref(), Some("data-x"));
    }

    #[test]
    fn test_discard() {
        let mut runtime = Runtime::new(Document::new());
        runtime.register::<ClickApplication>().unwrap();
        runtime.register::<WatchApplication>().unwrap();
        let clicker = mount(&mut runtime, "app-click");
        let watcher = mount(&mut runtime, "app-watch");

        runtime.discard(clicker).unwrap();
        runtime.discard(watcher).unwrap();
        assert_eq!(runtime.host().listener_count(EventTarget::Node(clicker), "click"), 0);
        assert_eq!(runtime.host().observer_count(), 0);
        assert_eq!(runtime.listener_count(), 0);
        assert_eq!(runtime.discard(clicker), Err(ComponentError::UnknownInstance(clicker)));
    }

    #[test]
    fn test_with_component() {
        let mut runtime = Runtime::new(Document::new());
        runtime.register::<ClickApplication>().unwrap();
        let node = mount(&mut runtime, "app-click");

        let clicks = runtime
            .with_component::<ClickApplication, _>(node, |component, cx| {
                cx.set_attribute("clicked", "no").unwrap();
                component.clicks
            })
            .unwrap();
        assert_eq!(clicks, 0);
        assert_eq!(runtime.host().get_attribute(node, "clicked"), Some("no"));
        assert!(runtime.with_component::<WatchApplication, _>(node, |_, _| ()).is_err());
    }
}
