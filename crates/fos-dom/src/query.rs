//! Selector queries
//!
//! The subset of selectors needed by querySelector / querySelectorAll:
//! `*`, type, `#id`, `.class`, `[attr]` and `[attr=value]` compounds joined
//! by descendant or child combinators, with comma-separated lists.

use std::iter::Peekable;
use std::str::Chars;

use crate::{DomError, DomTree, NodeId};

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    /// Compounds left to right; each carries the combinator to its left
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(element) = tree.get(node).and_then(|n| n.as_element()) else {
            return false;
        };
        if self.tag.as_ref().is_some_and(|tag| *tag != element.tag) {
            return false;
        }
        if self.id.as_ref().is_some_and(|id| element.id() != Some(id.as_str())) {
            return false;
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|(name, value)| match (element.get_attr(name), value) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.matches_from(tree, node, self.parts.len() - 1)
    }

    fn matches_from(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|parent| self.matches_from(tree, parent, index - 1)),
            Combinator::Descendant => tree
                .ancestors(node)
                .into_iter()
                .any(|ancestor| self.matches_from(tree, ancestor, index - 1)),
        }
    }
}

impl Selector {
    /// Parse a selector list
    pub fn parse(text: &str) -> Result<Self, DomError> {
        let invalid = || DomError::InvalidSelector(text.to_string());
        let alternatives = split_list(text)
            .into_iter()
            .map(|part| parse_complex(part).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;
        if alternatives.is_empty() {
            return Err(invalid());
        }
        Ok(Self { alternatives })
    }

    /// Check if an element matches any alternative
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(tree, node))
    }

    /// First matching descendant of `scope` in document order
    pub fn query_first(&self, tree: &DomTree, scope: NodeId) -> Option<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .find(|&node| self.matches(tree, node))
    }

    /// All matching descendants of `scope` in document order
    pub fn query_all(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .filter(|&node| self.matches(tree, node))
            .collect()
    }
}

/// Split on commas outside attribute brackets and quotes
fn split_list(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_complex(text: &str) -> Option<ComplexSelector> {
    let mut chars = text.trim().chars().peekable();
    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;

    loop {
        if skip_whitespace(&mut chars) && !parts.is_empty() {
            pending.get_or_insert(Combinator::Descendant);
        }
        match chars.peek() {
            None => break,
            Some('>') => {
                if parts.is_empty() || pending == Some(Combinator::Child) {
                    return None;
                }
                chars.next();
                pending = Some(Combinator::Child);
                continue;
            }
            Some(_) => {}
        }
        let compound = parse_compound(&mut chars)?;
        parts.push((pending.take().unwrap_or(Combinator::Descendant), compound));
    }

    if parts.is_empty() || pending == Some(Combinator::Child) {
        return None;
    }
    Some(ComplexSelector { parts })
}

fn parse_compound(chars: &mut Peekable<Chars<'_>>) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut any = false;

    while let Some(&c) = chars.peek() {
        match c {
            '*' => {
                if any {
                    return None;
                }
                chars.next();
            }
            '#' => {
                chars.next();
                compound.id = Some(parse_ident(chars)?);
            }
            '.' => {
                chars.next();
                compound.classes.push(parse_ident(chars)?);
            }
            '[' => {
                chars.next();
                compound.attributes.push(parse_attribute(chars)?);
            }
            c if is_ident_char(c) => {
                if any {
                    return None;
                }
                compound.tag = Some(parse_ident(chars)?.to_ascii_lowercase());
            }
            c if c.is_whitespace() || c == '>' => break,
            _ => return None,
        }
        any = true;
    }

    any.then_some(compound)
}

fn parse_attribute(chars: &mut Peekable<Chars<'_>>) -> Option<(String, Option<String>)> {
    skip_whitespace(chars);
    let name = parse_ident(chars)?;
    skip_whitespace(chars);
    let value = if chars.peek() == Some(&'=') {
        chars.next();
        skip_whitespace(chars);
        let value = match chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next()? {
                        c if c == quote => break,
                        c => value.push(c),
                    }
                }
                value
            }
            _ => parse_ident(chars)?,
        };
        skip_whitespace(chars);
        Some(value)
    } else {
        None
    };
    (chars.next()? == ']').then_some((name, value))
}

fn parse_ident(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    (!ident.is_empty()).then_some(ident)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) -> bool {
    let mut skipped = false;
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
        skipped = true;
    }
    skipped
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
