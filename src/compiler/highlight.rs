//! Class-based syntax highlighting for fenced code blocks.
//!
//! Output carries syntect scope classes (`<span class="source rust">`),
//! styled by the site's `styles/highlight.css`; no inline colors.

use super::markdown::RenderError;
use crate::log;
use rustc_hash::FxHashMap;
use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

/// Fence tags understood out of the box and the grammar each one uses.
///
/// The bundled syntax set has no TypeScript grammar, so TypeScript and JSX
/// flavors use JavaScript.
pub const DEFAULT_LANGUAGES: &[(&str, &str)] = &[
    ("typescript", "JavaScript"),
    ("ts", "JavaScript"),
    ("tsx", "JavaScript"),
    ("jsx", "JavaScript"),
    ("javascript", "JavaScript"),
    ("js", "JavaScript"),
    ("bash", "Bourne Again Shell (bash)"),
    ("sh", "Bourne Again Shell (bash)"),
    ("shell", "Bourne Again Shell (bash)"),
    ("json", "JSON"),
    ("rust", "Rust"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("yaml", "YAML"),
];

/// Explicit tag → grammar registry over one loaded [`SyntaxSet`].
pub struct Highlighter {
    syntaxes: SyntaxSet,
    /// Tag → grammar name, only for grammars present in `syntaxes`.
    languages: FxHashMap<String, String>,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::with_languages(DEFAULT_LANGUAGES)
    }

    /// Register exactly `languages`; tags whose grammar is missing are
    /// logged and left out.
    pub fn with_languages(languages: &[(&str, &str)]) -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let mut registered = FxHashMap::default();

        for &(tag, grammar) in languages {
            let found = syntaxes
                .find_syntax_by_name(grammar)
                .or_else(|| syntaxes.find_syntax_by_token(grammar));
            match found {
                Some(syntax) => {
                    registered.insert(tag.to_owned(), syntax.name.clone());
                }
                None => log!("warn"; "no grammar `{grammar}` for `{tag}` code blocks"),
            }
        }

        Self {
            syntaxes,
            languages: registered,
        }
    }

    /// Grammar registered for a fence tag.
    pub fn syntax(&self, tag: &str) -> Option<&SyntaxReference> {
        let name = self.languages.get(tag)?;
        self.syntaxes.find_syntax_by_name(name)
    }

    /// Highlight `code` as a complete `<pre><code>` block.
    pub fn highlight(&self, tag: &str, code: &str) -> Result<String, RenderError> {
        let syntax = self
            .syntax(tag)
            .ok_or_else(|| RenderError::UnsupportedLanguage(tag.to_owned()))?;

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| RenderError::Highlight {
                    tag: tag.to_owned(),
                    message: e.to_string(),
                })?;
        }

        Ok(format!(
            "<pre class=\"language-{tag}\"><code class=\"language-{tag}\">{}</code></pre>\n",
            generator.finalize()
        ))
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let highlighter = Highlighter::new();
        for (tag, _) in DEFAULT_LANGUAGES {
            assert!(highlighter.syntax(tag).is_some(), "{tag} not registered");
        }
        assert!(highlighter.syntax("cobol").is_none());
    }

    #[test]
    fn test_typescript_uses_javascript() {
        let highlighter = Highlighter::new();
        assert_eq!(highlighter.syntax("ts").unwrap().name, "JavaScript");
    }

    #[test]
    fn test_highlight_wraps_with_language_class() {
        let html = Highlighter::new().highlight("rust", "fn main() {}\n").unwrap();

        assert!(html.starts_with("<pre class=\"language-rust\"><code class=\"language-rust\">"));
        assert!(html.ends_with("</code></pre>\n"));
        assert!(html.contains("<span class=\"source rust\">"));
        assert!(!html.contains("style="));
    }

    #[test]
    fn test_highlight_escapes_code() {
        let html = Highlighter::new().highlight("html", "<b>&</b>\n").unwrap();
        assert!(html.contains("&lt;"));
        assert!(html.contains("&amp;"));
    }

    #[test]
    fn test_highlight_unsupported() {
        let err = Highlighter::new().highlight("cobol", "DISPLAY 'HI'.").unwrap_err();
        assert_eq!(err, RenderError::UnsupportedLanguage("cobol".into()));
    }

    #[test]
    fn test_with_languages_skips_missing_grammar() {
        let highlighter =
            Highlighter::with_languages(&[("json", "JSON"), ("x", "No Such Grammar")]);
        assert!(highlighter.syntax("json").is_some());
        assert!(highlighter.syntax("x").is_none());
    }
}
