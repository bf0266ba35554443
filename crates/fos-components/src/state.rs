//! Registry state
//!
//! The selectors reserved so far and the selectors whose stylesheet is
//! installed. Both sets only grow.

use std::collections::HashSet;

use crate::ComponentError;

#[derive(Debug, Clone, Default)]
pub struct RegistryState {
    /// Reserved selectors in registration order
    selectors: Vec<String>,
    reserved: HashSet<String>,
    installed_styles: HashSet<String>,
}

impl RegistryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a selector; a selector can be reserved exactly once
    pub fn reserve(&mut self, selector: &str) -> Result<(), ComponentError> {
        if !self.reserved.insert(selector.to_string()) {
            return Err(ComponentError::SelectorAlreadyTaken(selector.to_string()));
        }
        self.selectors.push(selector.to_string());
        Ok(())
    }

    pub fn is_reserved(&self, selector: &str) -> bool {
        self.reserved.contains(selector)
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    pub fn has_styles(&self, selector: &str) -> bool {
        self.installed_styles.contains(selector)
    }

    pub(crate) fn mark_styles_installed(&mut self, selector: &str) {
        self.installed_styles.insert(selector.to_string());
    }

    pub fn installed_style_count(&self) -> usize {
        self.installed_styles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_once() {
        let mut state = RegistryState::new();
        assert!(state.reserve("app-one").is_ok());
        assert!(state.reserve("app-two").is_ok());
        assert_eq!(
            state.reserve("app-one"),
            Err(ComponentError::SelectorAlreadyTaken("app-one".to_string()))
        );
        assert_eq!(state.selectors(), &["app-one".to_string(), "app-two".to_string()]);
    }

    #[test]
    fn test_states_are_independent() {
        let mut first = RegistryState::new();
        let second = RegistryState::new();
        first.reserve("app-shared").unwrap();
        assert!(first.is_reserved("app-shared"));
        assert!(!second.is_reserved("app-shared"));
    }
}
