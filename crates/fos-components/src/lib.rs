//! fOS Components - managed custom elements
//!
//! A component is a Rust type implementing [`Component`]. Registering it
//! reserves a unique selector, installs its scoped stylesheet once and
//! defines the selector with the host. The [`Runtime`] then drives every
//! instance the host creates: it renders the template, binds only the
//! handlers the component declared, forwards lifecycle callbacks and, on
//! request, mutation records.
//!
//! # Example
//! ```rust,ignore
//! use fos_components::{Component, Handler, HandlerSet, Runtime, import};
//!
//! #[derive(Default)]
//! struct CounterApplication { clicks: u32 }
//!
//! impl Component for CounterApplication {
//!     const HANDLERS: HandlerSet = HandlerSet::of(&[Handler::Click]);
//!     fn on_click(&mut self, _cx: &mut ElementContext<'_>, _event: &mut Event) {
//!         self.clicks += 1;
//!     }
//! }
//!
//! let mut runtime = Runtime::new(fos_dom::Document::new());
//! import!(runtime, CounterApplication)?;
//! ```

mod catalog;
mod component;
mod config;
mod context;
mod host;
mod naming;
mod runtime;
mod state;
mod styles;

pub use catalog::{CATALOG, Handler, HandlerSet};
pub use component::{Component, ComponentClass};
pub use config::ComponentConfig;
pub use context::{ElementContext, Listener};
pub use host::Host;
pub use naming::{derive_selector, is_valid_selector, reserve_selector};
pub use runtime::{Lifecycle, Runtime};
pub use state::RegistryState;
pub use styles::{install_styles, minify, scope_styles};

// Types component authors see in callback signatures
pub use fos_dom::{DomError, Event, EventTarget, MutationRecord, MutationType, NodeId};

/// Component layer errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    #[error("class name \"{name}\" must be letters ending in \"{suffix}\"")]
    InvalidClassName { name: String, suffix: String },

    #[error("selector \"{0}\" must start with letters, a hyphen, then a letter or digit")]
    InvalidSelectorFormat(String),

    #[error("selector \"{0}\" is already taken")]
    SelectorAlreadyTaken(String),

    #[error("invalid {what}: {value:?}")]
    InvalidArgumentType { what: &'static str, value: String },

    #[error("styles for \"{0}\" cannot be placed in a style element")]
    InvalidStyleType(String),

    #[error("no component instance on node {0}")]
    UnknownInstance(NodeId),

    #[error(transparent)]
    Host(#[from] DomError),
}

/// Register component types with a runtime, in order, stopping at the first failure.
///
/// Expands to `runtime.import(&[ComponentClass::of::<T>(), ...])`.
#[macro_export]
macro_rules! import {
    ($runtime:expr, $($component:ty),+ $(,)?) => {
        $runtime.import(&[$($crate::ComponentClass::of::<$component>()),+])
    };
}
