//! Handler catalog
//!
//! The fixed, ordered table of host events a component may handle, grouped
//! by family: pointer, keyboard, drag, clipboard, focus, touch.

use std::fmt;

/// One catalog entry: a host event and the override point that handles it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Handler {
    // Mouse
    Click,
    MouseOver,
    DoubleClick,
    MouseDown,
    MouseMove,
    MouseOut,
    MouseUp,
    Wheel,
    ContextMenu,
    // Keyboard
    KeyDown,
    KeyPress,
    KeyUp,
    // Drag
    Drag,
    DragEnd,
    DragEnter,
    DragLeave,
    DragOver,
    DragStart,
    Drop,
    Scroll,
    // Clipboard
    Copy,
    Cut,
    Paste,
    // Focus
    Blur,
    Focus,
    // Touch
    TouchCancel,
    TouchEnd,
    TouchMove,
    TouchStart,
}

/// Every handler in attachment order
pub const CATALOG: [Handler; 29] = [
    Handler::Click,
    Handler::MouseOver,
    Handler::DoubleClick,
    Handler::MouseDown,
    Handler::MouseMove,
    Handler::MouseOut,
    Handler::MouseUp,
    Handler::Wheel,
    Handler::ContextMenu,
    Handler::KeyDown,
    Handler::KeyPress,
    Handler::KeyUp,
    Handler::Drag,
    Handler::DragEnd,
    Handler::DragEnter,
    Handler::DragLeave,
    Handler::DragOver,
    Handler::DragStart,
    Handler::Drop,
    Handler::Scroll,
    Handler::Copy,
    Handler::Cut,
    Handler::Paste,
    Handler::Blur,
    Handler::Focus,
    Handler::TouchCancel,
    Handler::TouchEnd,
    Handler::TouchMove,
    Handler::TouchStart,
];

impl Handler {
    /// Host event name
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::MouseOver => "mouseover",
            Self::DoubleClick => "dblclick",
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseOut => "mouseout",
            Self::MouseUp => "mouseup",
            Self::Wheel => "wheel",
            Self::ContextMenu => "contextmenu",
            Self::KeyDown => "keydown",
            Self::KeyPress => "keypress",
            Self::KeyUp => "keyup",
            Self::Drag => "drag",
            Self::DragEnd => "dragend",
            Self::DragEnter => "dragenter",
            Self::DragLeave => "dragleave",
            Self::DragOver => "dragover",
            Self::DragStart => "dragstart",
            Self::Drop => "drop",
            Self::Scroll => "scroll",
            Self::Copy => "copy",
            Self::Cut => "cut",
            Self::Paste => "paste",
            Self::Blur => "blur",
            Self::Focus => "focus",
            Self::TouchCancel => "touchcancel",
            Self::TouchEnd => "touchend",
            Self::TouchMove => "touchmove",
            Self::TouchStart => "touchstart",
        }
    }

    /// Name of the [`Component`](crate::Component) method handling this event
    pub const fn override_name(self) -> &'static str {
        match self {
            Self::Click => "on_click",
            Self::MouseOver => "on_mouse_over",
            Self::DoubleClick => "on_double_click",
            Self::MouseDown => "on_mouse_down",
            Self::MouseMove => "on_mouse_move",
            Self::MouseOut => "on_mouse_out",
            Self::MouseUp => "on_mouse_up",
            Self::Wheel => "on_wheel",
            Self::ContextMenu => "on_context_menu",
            Self::KeyDown => "on_key_down",
            Self::KeyPress => "on_key_press",
            Self::KeyUp => "on_key_up",
            Self::Drag => "on_drag",
            Self::DragEnd => "on_drag_end",
            Self::DragEnter => "on_drag_enter",
            Self::DragLeave => "on_drag_leave",
            Self::DragOver => "on_drag_over",
            Self::DragStart => "on_drag_start",
            Self::Drop => "on_drop",
            Self::Scroll => "on_scroll",
            Self::Copy => "on_copy",
            Self::Cut => "on_cut",
            Self::Paste => "on_paste",
            Self::Blur => "on_blur",
            Self::Focus => "on_focus",
            Self::TouchCancel => "on_touch_cancel",
            Self::TouchEnd => "on_touch_end",
            Self::TouchMove => "on_touch_move",
            Self::TouchStart => "on_touch_start",
        }
    }

    /// Look up the handler for a host event name
    pub fn from_event_name(name: &str) -> Option<Self> {
        CATALOG.iter().copied().find(|h| h.event_name() == name)
    }

    const fn bit(self) -> u32 {
        1 << self as u32
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Set of handlers a component opts into
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HandlerSet(u32);

impl HandlerSet {
    pub const EMPTY: HandlerSet = HandlerSet(0);

    /// Build a set in const context
    pub const fn of(handlers: &[Handler]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < handlers.len() {
            bits |= handlers[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn with(self, handler: Handler) -> Self {
        Self(self.0 | handler.bit())
    }

    pub const fn contains(self, handler: Handler) -> bool {
        self.0 & handler.bit() != 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in catalog order
    pub fn iter(self) -> impl Iterator<Item = Handler> {
        CATALOG.into_iter().filter(move |h| self.contains(*h))
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Handler> for HandlerSet {
    fn from_iter<I: IntoIterator<Item = Handler>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}
