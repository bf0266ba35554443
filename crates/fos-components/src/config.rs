//! Component configuration

/// Component layer configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentConfig {
    /// Suffix a class name must carry when no explicit selector is given
    pub class_suffix: String,

    /// Prefix of selectors derived from class names
    pub derived_prefix: String,

    /// Token in style text replaced by the component's selector
    pub scope_placeholder: String,

    /// Attribute tagging installed `<style>` elements with their selector
    pub style_marker: String,

    /// Deliver bound handlers and `on`/`off` listeners in the capture phase
    pub capture: bool,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            class_suffix: "Application".to_string(),
            derived_prefix: "app-".to_string(),
            scope_placeholder: ":app".to_string(),
            style_marker: "application".to_string(),
            capture: true,
        }
    }
}
