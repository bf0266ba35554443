//! Markup fragment parsing
//!
//! Uses html5ever's fragment parser with the receiving element as context
//! and converts the RcDom result into arena nodes. The fragment parser
//! puts the parsed nodes under a synthetic `<html>` root.

use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, QualName, ns, parse_fragment as parse_html_fragment};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::{DomError, DomTree, NodeId};

/// Parse markup as the content of a `context` element, returning the
/// detached top-level nodes
pub(crate) fn parse_fragment(tree: &mut DomTree, context: &str, markup: &str) -> Result<Vec<NodeId>, DomError> {
    let context_name = QualName::new(None, ns!(html), LocalName::from(context));
    let dom = parse_html_fragment(RcDom::default(), Default::default(), context_name, Vec::new(), false)
        .from_utf8()
        .read_from(&mut markup.as_bytes())
        .map_err(|err| DomError::Markup(err.to_string()))?;

    let mut roots = Vec::new();
    if let Some(root) = fragment_root(&dom.document) {
        for child in root.children.borrow().iter() {
            if let Some(id) = convert_node(child, tree)? {
                roots.push(id);
            }
        }
    }

    tracing::trace!("Parsed <{}> fragment into {} top-level nodes", context, roots.len());
    Ok(roots)
}

/// The synthetic `<html>` element holding the fragment
fn fragment_root(document: &Handle) -> Option<Handle> {
    document
        .children
        .borrow()
        .iter()
        .find(|child| element_name(child) == Some("html"))
        .cloned()
}

fn element_name(handle: &Handle) -> Option<&str> {
    match &handle.data {
        RcNodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

fn convert_node(handle: &Handle, tree: &mut DomTree) -> Result<Option<NodeId>, DomError> {
    match &handle.data {
        RcNodeData::Text { contents } => Ok(Some(tree.create_text(&contents.borrow()))),
        RcNodeData::Comment { contents } => Ok(Some(tree.create_comment(&contents.to_string()))),
        RcNodeData::Element { name, attrs, .. } => {
            let id = tree.create_element(&name.local);
            for attr in attrs.borrow().iter() {
                tree.set_attribute(id, &attr.name.local, &attr.value)?;
            }
            for child in handle.children.borrow().iter() {
                if let Some(child_id) = convert_node(child, tree)? {
                    tree.append_child(id, child_id)?;
                }
            }
            Ok(Some(id))
        }
        _ => Ok(None),
    }
}
