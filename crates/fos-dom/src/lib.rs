//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree plus the host facilities custom elements depend on:
//! an element registry with lifecycle callbacks, event listeners, mutation
//! observers, selector queries and element geometry.

mod document;
mod parser;
mod tree;

pub mod custom_elements;
pub mod events;
pub mod geometry;
pub mod observer;
pub mod query;

use std::fmt;

pub use custom_elements::{
    CallbackQueue, CustomElementDefinition, CustomElementRegistry, LifecycleCallback,
    LifecycleCallbackInfo,
};
pub use document::Document;
pub use events::{Event, EventTarget, HandlerId, ListenerRegistry};
pub use geometry::{DOMRect, Viewport};
pub use observer::{MutationObserver, MutationObserverInit, MutationRecord, MutationType, ObserverId};
pub use query::Selector;
pub use tree::{Attribute, DomTree, ElementData, Node, NodeData};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Arena index of this node
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// DOM errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("\"{0}\" is not a valid custom element name")]
    InvalidName(String),

    #[error("custom element \"{0}\" is already defined")]
    AlreadyDefined(String),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("\"{0}\" is not a valid selector")]
    InvalidSelector(String),

    #[error("markup could not be parsed: {0}")]
    Markup(String),
}
