//! The component interface
//!
//! A component type declares its selector, styles and template as
//! associated constants and overrides the callbacks it cares about. Every
//! callback defaults to doing nothing. Event handlers are only attached for
//! the handlers listed in [`Component::HANDLERS`].

use std::any::{Any, type_name};
use std::fmt;

use fos_dom::{Event, MutationRecord};

use crate::{ElementContext, Handler, HandlerSet};

pub trait Component: Default + 'static {
    /// Explicit selector; derived from the class name when absent
    const SELECTOR: Option<&'static str> = None;

    /// Style text; the scope placeholder (`:app` by default) becomes the selector
    const STYLES: Option<&'static str> = None;

    /// Markup rendered into every new instance
    const TEMPLATE: Option<&'static str> = None;

    /// Catalog handlers to attach to every instance
    const HANDLERS: HandlerSet = HandlerSet::EMPTY;

    /// Watch the instance subtree and forward records to [`on_mutation`](Self::on_mutation)
    const WATCH_MUTATIONS: bool = false;

    /// Attributes reported to [`on_attribute_changed`](Self::on_attribute_changed); empty reports all
    const OBSERVED_ATTRIBUTES: &'static [&'static str] = &[];

    /// Class name used to derive the selector; the type name without its path
    fn class_name() -> &'static str {
        short_type_name(type_name::<Self>())
    }

    /// Element attached to the document
    fn on_connect(&mut self, _cx: &mut ElementContext<'_>) {}

    /// Element detached from the document
    fn on_disconnect(&mut self, _cx: &mut ElementContext<'_>) {}

    /// Element moved to a new document
    fn on_adopt(&mut self, _cx: &mut ElementContext<'_>) {}

    fn on_attribute_changed(
        &mut self,
        _cx: &mut ElementContext<'_>,
        _name: &str,
        _old_value: Option<&str>,
        _new_value: Option<&str>,
    ) {
    }

    fn on_mutation(&mut self, _cx: &mut ElementContext<'_>, _record: &MutationRecord) {}

    fn on_click(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_mouse_over(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_double_click(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_mouse_down(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_mouse_move(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_mouse_out(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_mouse_up(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_wheel(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_context_menu(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}

    fn on_key_down(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_key_press(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_key_up(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}

    fn on_drag(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_drag_end(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_drag_enter(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_drag_leave(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_drag_over(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_drag_start(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_drop(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_scroll(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}

    fn on_copy(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_cut(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_paste(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}

    fn on_blur(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_focus(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}

    fn on_touch_cancel(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_touch_end(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_touch_move(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
    fn on_touch_start(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {}
}

/// `a::b::Name<c::D>` -> `Name`
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Object-safe view of a [`Component`] used by the runtime
pub(crate) trait AnyComponent {
    fn handle(&mut self, handler: Handler, cx: &mut ElementContext<'_>, event: &mut Event);
    fn connect(&mut self, cx: &mut ElementContext<'_>);
    fn disconnect(&mut self, cx: &mut ElementContext<'_>);
    fn adopt(&mut self, cx: &mut ElementContext<'_>);
    fn attribute_changed(&mut self, cx: &mut ElementContext<'_>, name: &str, old: Option<&str>, new: Option<&str>);
    fn mutation(&mut self, cx: &mut ElementContext<'_>, record: &MutationRecord);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponent for T {
    fn handle(&mut self, handler: Handler, cx: &mut ElementContext<'_>, event: &mut Event) {
        match handler {
            Handler::Click => self.on_click(cx, event),
            Handler::MouseOver => self.on_mouse_over(cx, event),
            Handler::DoubleClick => self.on_double_click(cx, event),
            Handler::MouseDown => self.on_mouse_down(cx, event),
            Handler::MouseMove => self.on_mouse_move(cx, event),
            Handler::MouseOut => self.on_mouse_out(cx, event),
            Handler::MouseUp => self.on_mouse_up(cx, event),
            Handler::Wheel => self.on_wheel(cx, event),
            Handler::ContextMenu => self.on_context_menu(cx, event),
            Handler::KeyDown => self.on_key_down(cx, event),
            Handler::KeyPress => self.on_key_press(cx, event),
            Handler::KeyUp => self.on_key_up(cx, event),
            Handler::Drag => self.on_drag(cx, event),
            Handler::DragEnd => self.on_drag_end(cx, event),
            Handler::DragEnter => self.on_drag_enter(cx, event),
            Handler::DragLeave => self.on_drag_leave(cx, event),
            Handler::DragOver => self.on_drag_over(cx, event),
            Handler::DragStart => self.on_drag_start(cx, event),
            Handler::Drop => self.on_drop(cx, event),
            Handler::Scroll => self.on_scroll(cx, event),
            Handler::Copy => self.on_copy(cx, event),
            Handler::Cut => self.on_cut(cx, event),
            Handler::Paste => self.on_paste(cx, event),
            Handler::Blur => self.on_blur(cx, event),
            Handler::Focus => self.on_focus(cx, event),
            Handler::TouchCancel => self.on_touch_cancel(cx, event),
            Handler::TouchEnd => self.on_touch_end(cx, event),
            Handler::TouchMove => self.on_touch_move(cx, event),
            Handler::TouchStart => self.on_touch_start(cx, event),
        }
    }

    fn connect(&mut self, cx: &mut ElementContext<'_>) {
        self.on_connect(cx)
    }

    fn disconnect(&mut self, cx: &mut ElementContext<'_>) {
        self.on_disconnect(cx)
    }

    fn adopt(&mut self, cx: &mut ElementContext<'_>) {
        self.on_adopt(cx)
    }

    fn attribute_changed(&mut self, cx: &mut ElementContext<'_>, name: &str, old: Option<&str>, new: Option<&str>) {
        self.on_attribute_changed(cx, name, old, new)
    }

    fn mutation(&mut self, cx: &mut ElementContext<'_>, record: &MutationRecord) {
        self.on_mutation(cx, record)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn construct<T: Component>() -> Box<dyn AnyComponent> {
    Box::new(T::default())
}

/// Type-erased description of a component type
#[derive(Clone, Copy)]
pub struct ComponentClass {
    name: &'static str,
    selector: Option<&'static str>,
    styles: Option<&'static str>,
    template: Option<&'static str>,
    handlers: HandlerSet,
    watch_mutations: bool,
    observed_attributes: &'static [&'static str],
    factory: fn() -> Box<dyn AnyComponent>,
}

impl ComponentClass {
    pub fn of<T: Component>() -> Self {
        Self {
            name: T::class_name(),
            selector: T::SELECTOR,
            styles: T::STYLES,
            template: T::TEMPLATE,
            handlers: T::HANDLERS,
            watch_mutations: T::WATCH_MUTATIONS,
            observed_attributes: T::OBSERVED_ATTRIBUTES,
            factory: construct::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn selector(&self) -> Option<&'static str> {
        self.selector
    }

    pub fn styles(&self) -> Option<&'static str> {
        self.styles
    }

    pub fn template(&self) -> Option<&'static str> {
        self.template
    }

    pub fn handlers(&self) -> HandlerSet {
        self.handlers
    }

    pub fn watches_mutations(&self) -> bool {
        self.watch_mutations
    }

    pub fn observed_attributes(&self) -> &'static [&'static str] {
        self.observed_attributes
    }

    pub(crate) fn instantiate(&self) -> Box<dyn AnyComponent> {
        (self.factory)()
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("selector", &self.selector)
            .field("handlers", &self.handlers)
            .field("watch_mutations", &self.watch_mutations)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct WidgetApplication;

    impl Component for WidgetApplication {}

    #[derive(Default)]
    struct Generic<T>(std::marker::PhantomData<T>);

    impl<T: Default + 'static> Component for Generic<T> {
        const SELECTOR: Option<&'static str> = Some("x-generic");
        const HANDLERS: HandlerSet = HandlerSet::of(&[Handler::KeyUp]);
    }

    #[test]
    fn test_class_name() {
        assert_eq!(WidgetApplication::class_name(), "WidgetApplication");
        assert_eq!(Generic::<Vec<u8>>::class_name(), "Generic");
        assert_eq!(short_type_name("plain"), "plain");
    }

    #[test]
    fn test_component_class() {
        let class = ComponentClass::of::<Generic<u8>>();
        assert_eq!(class.selector(), Some("x-generic"));
        assert!(class.handlers().contains(Handler::KeyUp));
        assert!(!class.watches_mutations());

        let instance = class.instantiate();
        assert!(instance.as_any().is::<Generic<u8>>());
    }
}
