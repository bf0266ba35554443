//! Selector naming
//!
//! Every component class gets one selector: the explicit one it declares,
//! or one derived from its class name (`WidgetApplication` -> `app-widget`).

use crate::{ComponentConfig, ComponentError, RegistryState};

/// Check the selector shape: letters, a hyphen, then a letter or digit
pub fn is_valid_selector(selector: &str) -> bool {
    let letters = selector
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    let mut rest = selector.bytes().skip(letters);
    letters > 0 && rest.next() == Some(b'-') && rest.next().is_some_and(|b| b.is_ascii_alphanumeric())
}

/// Derive a selector from a class name ending in the configured suffix.
///
/// Only the trailing suffix is stripped; earlier occurrences stay in the stem.
pub fn derive_selector(config: &ComponentConfig, class_name: &str) -> Result<String, ComponentError> {
    let stem = class_name
        .strip_suffix(config.class_suffix.as_str())
        .filter(|stem| !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_alphabetic()))
        .ok_or_else(|| ComponentError::InvalidClassName {
            name: class_name.to_string(),
            suffix: config.class_suffix.clone(),
        })?;
    Ok(format!("{}{}", config.derived_prefix, stem.to_ascii_lowercase()))
}

/// Pick and reserve the selector for a class
pub fn reserve_selector(
    state: &mut RegistryState,
    config: &ComponentConfig,
    class_name: &str,
    explicit: Option<&str>,
) -> Result<String, ComponentError> {
    let selector = match explicit {
        Some(selector) if is_valid_selector(selector) => selector.to_string(),
        Some(selector) => return Err(ComponentError::InvalidSelectorFormat(selector.to_string())),
        None => derive_selector(config, class_name)?,
    };

    if let Err(err) = state.reserve(&selector) {
        tracing::warn!("Rejected {}: {}", class_name, err);
        return Err(err);
    }
    tracing::debug!("Reserved <{}> for {}", selector, class_name);
    Ok(selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_shape() {
        assert!(is_valid_selector("word-word"));
        assert!(is_valid_selector("x-1"));
        assert!(is_valid_selector("todo-list-item"));
        assert!(!is_valid_selector("widget"));
        assert!(!is_valid_selector("-widget"));
        assert!(!is_valid_selector("widget-"));
        assert!(!is_valid_selector("1x-widget"));
        assert!(!is_valid_selector("app--x"));
        assert!(!is_valid_selector(""));
    }

    #[test]
    fn test_derive_selector() {
        let config = ComponentConfig::default();
        assert_eq!(derive_selector(&config, "WidgetApplication").unwrap(), "app-widget");
        assert_eq!(derive_selector(&config, "TodoListApplication").unwrap(), "app-todolist");
        // Only the trailing suffix is removed
        assert_eq!(
            derive_selector(&config, "ApplicationFooApplication").unwrap(),
            "app-applicationfoo"
        );

        for bad in ["Widget", "Application", "", "Todo2Application", "ApplicationX"] {
            assert!(
                matches!(derive_selector(&config, bad), Err(ComponentError::InvalidClassName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_custom_suffix() {
        let config = ComponentConfig {
            class_suffix: "Widget".to_string(),
            derived_prefix: "ui-".to_string(),
            ..Default::default()
        };
        assert_eq!(derive_selector(&config, "ButtonWidget").unwrap(), "ui-button");
    }

    #[test]
    fn test_reserve_selector() {
        let config = ComponentConfig::default();
        let mut state = RegistryState::new();

        assert_eq!(
            reserve_selector(&mut state, &config, "MenuApplication", None).unwrap(),
            "app-menu"
        );
        assert_eq!(
            reserve_selector(&mut state, &config, "Anything", Some("my-menu")).unwrap(),
            "my-menu"
        );
        assert_eq!(
            reserve_selector(&mut state, &config, "OtherApplication", Some("app-menu")),
            Err(ComponentError::SelectorAlreadyTaken("app-menu".to_string()))
        );
        assert_eq!(
            reserve_selector(&mut state, &config, "OtherApplication", Some("")),
            Err(ComponentError::InvalidSelectorFormat(String::new()))
        );
    }

    #[test]
    fn test_explicit_selector_skips_class_name_check() {
        let config = ComponentConfig::default();
        let mut state = RegistryState::new();
        assert!(reserve_selector(&mut state, &config, "NotSuffixed", Some("x-ok")).is_ok());
    }
}
