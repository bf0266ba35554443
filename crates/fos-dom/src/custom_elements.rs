//! Custom Elements
//!
//! Custom element registry and the lifecycle callback queue the embedder
//! drains to run element reactions.

use std::collections::HashMap;

use crate::{DomError, NodeId};

/// Custom elements registry
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<String, CustomElementDefinition>,
    /// Names in definition order
    order: Vec<String>,
}

/// Custom element definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomElementDefinition {
    pub name: String,
    /// Attributes that trigger `AttributeChanged`; empty observes all of them
    pub observed_attributes: Vec<String>,
}

impl CustomElementDefinition {
    pub fn observes(&self, attribute: &str) -> bool {
        self.observed_attributes.is_empty()
            || self.observed_attributes.iter().any(|a| a == attribute)
    }
}

/// Custom element lifecycle callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCallback {
    /// Element became an instance of its definition
    Upgrade,
    Connected,
    Disconnected,
    Adopted,
    AttributeChanged,
}

/// Lifecycle callback info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleCallbackInfo {
    pub callback: LifecycleCallback,
    pub element: NodeId,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl LifecycleCallbackInfo {
    pub fn new(callback: LifecycleCallback, element: NodeId) -> Self {
        Self {
            callback,
            element,
            attribute_name: None,
            old_value: None,
            new_value: None,
        }
    }

    pub fn attribute_changed(
        element: NodeId,
        name: &str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            callback: LifecycleCallback::AttributeChanged,
            element,
            attribute_name: Some(name.to_string()),
            old_value,
            new_value,
        }
    }
}

/// Pending callback queue for batch processing
#[derive(Debug, Default)]
pub struct CallbackQueue {
    callbacks: Vec<LifecycleCallbackInfo>,
}

impl CallbackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, info: LifecycleCallbackInfo) {
        self.callbacks.push(info);
    }

    pub fn drain(&mut self) -> Vec<LifecycleCallbackInfo> {
        std::mem::take(&mut self.callbacks)
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a custom element
    pub fn define(&mut self, name: &str, observed_attributes: &[&str]) -> Result<(), DomError> {
        if !Self::is_valid_name(name) {
            return Err(DomError::InvalidName(name.to_string()));
        }

        if self.definitions.contains_key(name) {
            return Err(DomError::AlreadyDefined(name.to_string()));
        }

        let definition = CustomElementDefinition {
            name: name.to_string(),
            observed_attributes: observed_attributes.iter().map(|a| a.to_string()).collect(),
        };
        self.definitions.insert(name.to_string(), definition);
        self.order.push(name.to_string());

        tracing::debug!("Defined custom element <{}>", name);
        Ok(())
    }

    /// Get element definition
    pub fn get(&self, name: &str) -> Option<&CustomElementDefinition> {
        self.definitions.get(name)
    }

    /// Check if element is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Defined names in definition order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Validate custom element name
    pub fn is_valid_name(name: &str) -> bool {
        // Must contain hyphen
        if !name.contains('-') {
            return false;
        }

        // Must start with lowercase letter
        if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return false;
        }

        const RESERVED: &[&str] = &[
            "annotation-xml",
            "color-profile",
            "font-face",
            "font-face-src",
            "font-face-uri",
            "font-face-format",
            "font-face-name",
            "missing-glyph",
        ];
        if RESERVED.contains(&name) {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
    }
}
