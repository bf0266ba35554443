//! Scoped stylesheet installation
//!
//! Style text is minified, the scope placeholder is replaced with the
//! component's selector and the result is appended to the document head as
//! a `<style>` element tagged with that selector. Each selector is
//! installed at most once.

use crate::{ComponentConfig, ComponentError, Host, RegistryState};

/// Collapse whitespace runs outside string literals to one space.
///
/// Quoted literals (`'...'` or `"..."`, with backslash escapes) are copied
/// verbatim. Leading and trailing whitespace is dropped.
pub fn minify(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars();
    let mut space = false;

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            space = true;
            continue;
        }
        if space && !out.is_empty() {
            out.push(' ');
        }
        space = false;
        out.push(c);

        if c == '"' || c == '\'' {
            while let Some(inner) = chars.next() {
                out.push(inner);
                if inner == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if inner == c {
                    break;
                }
            }
        }
    }
    out
}

/// Minify style text and scope it to `selector`
pub fn scope_styles(css: &str, placeholder: &str, selector: &str) -> String {
    let minified = minify(css);
    let scoped = if placeholder.is_empty() {
        minified
    } else {
        minified.replace(placeholder, selector)
    };
    scoped.trim().to_string()
}

fn fits_style_element(css: &str) -> bool {
    !css.contains('\0') && !css.to_ascii_lowercase().contains("</style")
}

/// Install the styles of `selector` unless they are already present.
///
/// Returns whether a stylesheet was appended. Empty style text is a no-op.
pub fn install_styles(
    state: &mut RegistryState,
    host: &mut dyn Host,
    config: &ComponentConfig,
    selector: &str,
    css: &str,
) -> Result<bool, ComponentError> {
    if selector.is_empty() {
        return Err(ComponentError::InvalidArgumentType {
            what: "selector",
            value: selector.to_string(),
        });
    }
    if css.trim().is_empty() {
        return Ok(false);
    }
    if !fits_style_element(css) {
        return Err(ComponentError::InvalidStyleType(selector.to_string()));
    }

    if state.has_styles(selector) || host.has_style(&config.style_marker, selector) {
        state.mark_styles_installed(selector);
        tracing::debug!("Styles for <{}> already installed", selector);
        return Ok(false);
    }

    let scoped = scope_styles(css, &config.scope_placeholder, selector);
    host.append_style(&config.style_marker, selector, &scoped)?;
    state.mark_styles_installed(selector);
    tracing::debug!("Installed {} bytes of styles for <{}>", scoped.len(), selector);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::Document;

    #[test]
    fn test_minify_preserves_quoted_whitespace() {
        assert_eq!(minify(":app { color: 'a   b' }"), ":app { color: 'a   b' }");
        assert_eq!(minify("  a\n\n  {\tb:  c }  "), "a { b: c }");
        assert_eq!(minify("a::after { content: \"x \\\"  y\" }"), "a::after { content: \"x \\\"  y\" }");
    }

    #[test]
    fn test_minify_unterminated_quote() {
        assert_eq!(minify("a { content: 'open   "), "a { content: 'open   ");
    }

    #[test]
    fn test_scope_styles() {
        assert_eq!(
            scope_styles("\n  :app { color: 'a   b' }\n  :app  p { margin:  0 }\n", ":app", "app-widget"),
            "app-widget { color: 'a   b' } app-widget p { margin: 0 }"
        );
    }

    #[test]
    fn test_install_once() {
        let mut state = RegistryState::new();
        let mut doc = Document::new();
        let config = ComponentConfig::default();

        for _ in 0..5 {
            install_styles(&mut state, &mut doc, &config, "app-card", ":app { color: red }").unwrap();
        }

        assert_eq!(doc.styles().len(), 1);
        let style = doc.style_with_marker("application", "app-card").unwrap();
        assert_eq!(doc.tree().text_content(style), "app-card { color: red }");
        assert!(state.has_styles("app-card"));
    }

    #[test]
    fn test_existing_marker_skips_install() {
        let mut state = RegistryState::new();
        let mut doc = Document::new();
        let config = ComponentConfig::default();
        doc.append_style("application", "app-card", "prebuilt").unwrap();

        assert!(!install_styles(&mut state, &mut doc, &config, "app-card", ":app{}").unwrap());
        assert_eq!(doc.styles().len(), 1);
    }

    #[test]
    fn test_empty_styles_are_noop() {
        let mut state = RegistryState::new();
        let mut doc = Document::new();
        let config = ComponentConfig::default();

        assert!(!install_styles(&mut state, &mut doc, &config, "app-card", "  \n ").unwrap());
        assert!(doc.styles().is_empty());
        assert!(!state.has_styles("app-card"));
    }

    #[test]
    fn test_invalid_arguments() {
        let mut state = RegistryState::new();
        let mut doc = Document::new();
        let config = ComponentConfig::default();

        assert!(matches!(
            install_styles(&mut state, &mut doc, &config, "", "a{}"),
            Err(ComponentError::InvalidArgumentType { what: "selector", .. })
        ));
        assert_eq!(
            install_styles(&mut state, &mut doc, &config, "app-x", "a{}</STYLE><script>"),
            Err(ComponentError::InvalidStyleType("app-x".to_string()))
        );
        assert_eq!(
            install_styles(&mut state, &mut doc, &config, "app-x", "a{}\0"),
            Err(ComponentError::InvalidStyleType("app-x".to_string()))
        );
    }
}
