//! DOM Tree (arena-based allocation)
//!
//! Nodes live in a single `Vec` and refer to each other by `NodeId`.
//! Detached nodes stay in the arena; a node is connected when its parent
//! chain reaches the document node.

use crate::{DomError, NodeId};

/// DOM Node
#[derive(Debug)]
pub struct Node {
    /// Parent node (None if detached or the document itself)
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    fn can_have_children(&self) -> bool {
        matches!(self.data, NodeData::Document | NodeData::Element(_))
    }
}

/// Node-specific data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercased tag name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, returning the previous value
    pub fn set_attr(&mut self, name: &str, value: &str) -> Option<String> {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            return Some(std::mem::replace(&mut attr.value, value.to_string()));
        }
        self.attrs.push(Attribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        None
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(index).value)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.get_mut(id).ok_or(DomError::UnknownNode(id))
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node; empty for unknown nodes
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)
            .and_then(Node::as_element)
            .map(|e| e.tag.as_str())
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// True if `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// True if the node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.contains(NodeId::ROOT, id)
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    /// Descendants in document (pre-)order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Previous and next sibling of a node
    pub fn siblings_of(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let Some(parent) = self.parent(id) else {
            return (None, None);
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&c| c == id) {
            Some(i) => (
                i.checked_sub(1).map(|p| siblings[p]),
                siblings.get(i + 1).copied(),
            ),
            None => (None, None),
        }
    }

    /// Validate that `child` may be appended to `parent`
    pub fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.node(parent)?;
        self.node(child)?;
        if !parent_node.can_have_children() || child == NodeId::ROOT || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Detach a node from its parent, returning the former parent
    pub fn detach(&mut self, child: NodeId) -> Option<NodeId> {
        let parent = self.parent(child)?;
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = None;
        }
        Some(parent)
    }

    /// Link a freshly created, parentless element under `parent`.
    ///
    /// Skips the hierarchy checks: `child` must have no parent and must not
    /// be an ancestor of `parent`.
    pub(crate) fn attach_fresh(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.check_insert(parent, child).is_ok() && self.parent(child).is_none());
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Set an attribute, returning the previous value
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: &str,
    ) -> Result<Option<String>, DomError> {
        let element = self
            .node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?;
        Ok(element.set_attr(name, value))
    }

    /// Remove an attribute, returning the removed value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let element = self
            .node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?;
        Ok(element.remove_attr(name))
    }

    /// Replace the character data of a text or comment node, returning the old data
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<String, DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(data) | NodeData::Comment(data) => {
                Ok(std::mem::replace(data, text.to_string()))
            }
            _ => Err(DomError::HierarchyRequest { parent: id, child: id }),
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(text) = self.get(node).and_then(Node::as_text) {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
