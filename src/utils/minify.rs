//! HTML minification, applied to every page when `[build] minify` is set.

use crate::config::SiteConfig;
use std::borrow::Cow;

/// Minify a page if the configuration asks for it.
///
/// Returns `Cow::Borrowed` if minify is disabled, `Cow::Owned` if minified.
pub fn minify_page<'a>(html: &'a str, config: &SiteConfig) -> Cow<'a, [u8]> {
    if config.build.minify {
        Cow::Owned(minify_html_inner(html.as_bytes()))
    } else {
        Cow::Borrowed(html.as_bytes())
    }
}

/// Minify HTML content using `minify_html` crate.
///
/// Highlighted code relies on exact whitespace inside `<pre>`, which
/// minify-html leaves untouched.
fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html, &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_minify(enabled: bool) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.minify = enabled;
        config
    }

    #[test]
    fn test_minify_removes_whitespace() {
        let html = "<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let result = minify_page(html, &config_with_minify(true));
        let result = String::from_utf8_lossy(&result);

        assert!(!result.contains("\n  "));
        assert!(result.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_minify_disabled_is_borrowed() {
        let html = "<html>\n  <body>\n  </body>\n</html>";
        let result = minify_page(html, &config_with_minify(false));

        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, html.as_bytes());
    }

    #[test]
    fn test_minify_keeps_pre_whitespace() {
        let html = "<main><pre><code>a\n    b\n</code></pre></main>";
        let result = minify_page(html, &config_with_minify(true));
        let result = String::from_utf8_lossy(&result);

        assert!(result.contains("a\n    b\n"));
    }
}
