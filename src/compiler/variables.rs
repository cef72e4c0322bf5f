//! `{{ name }}` placeholders in document source.
//!
//! Fenced code blocks pass through untouched, fence lines included, so
//! documents can show the placeholder syntax itself. Indented code blocks
//! are not protected.

use super::markdown::fenced_ranges;
use crate::config::{IMAGE_BASE_PATH_VAR, SiteConfig};
use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("valid regex"));

pub type Variables = BTreeMap<String, String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubstituteError {
    #[error("unknown variable `{name}` on line {line}")]
    UnknownVariable { name: String, line: usize },
}

/// `[variables]` plus the built-in image base path for one build target.
pub fn site_variables(config: &SiteConfig, image_base_path: &str) -> Variables {
    let mut vars = config.variables.clone();
    vars.insert(IMAGE_BASE_PATH_VAR.to_owned(), image_base_path.to_owned());
    vars
}

/// Replace every placeholder outside fenced code with its value.
///
/// Fenced regions come from the same parser the renderer uses, so fences
/// nested in block quotes or list items are honored too. Line endings and
/// all other text are preserved byte for byte.
pub fn substitute(text: &str, vars: &Variables) -> Result<String, SubstituteError> {
    let fenced = fenced_ranges(text);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut line = 1;

    for m in PLACEHOLDER.find_iter(text) {
        if fenced.iter().any(|r| r.start < m.end() && m.start() < r.end) {
            continue;
        }

        line += text[last..m.start()].matches('\n').count();
        let name = text[m.start() + 2..m.end() - 2].trim();
        let value = vars
            .get(name)
            .ok_or_else(|| SubstituteError::UnknownVariable {
                name: name.to_owned(),
                line,
            })?;

        out.push_str(&text[last..m.start()]);
        out.push_str(value);
        last = m.end();
    }
    out.push_str(&text[last..]);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_substitute_skips_fenced_code() {
        let text = "Hi {{name}}! \n```\n{{name}}\n```";
        let out = substitute(text, &vars(&[("name", "Sam")])).unwrap();
        assert_eq!(out, "Hi Sam! \n```\n{{name}}\n```");
    }

    #[test]
    fn test_substitute_trims_and_repeats() {
        let out = substitute("{{ a }}-{{a}}-{{b }}", &vars(&[("a", "1"), ("b", "2")])).unwrap();
        assert_eq!(out, "1-1-2");
    }

    #[test]
    fn test_substitute_unknown_variable() {
        let err = substitute("ok\nstill ok\n{{missing}}", &vars(&[])).unwrap_err();
        assert_eq!(
            err,
            SubstituteError::UnknownVariable {
                name: "missing".into(),
                line: 3
            }
        );
    }

    #[test]
    fn test_substitute_preserves_line_endings() {
        let out = substitute("a {{x}}\r\nb\r\n", &vars(&[("x", "y")])).unwrap();
        assert_eq!(out, "a y\r\nb\r\n");
    }

    #[test]
    fn test_substitute_tilde_fence() {
        let text = "~~~~ text\n{{x}}\n~~~\n{{x}}\n~~~~\n{{x}}\n";
        let out = substitute(text, &vars(&[("x", "!")])).unwrap();
        // A shorter closing run does not end a longer fence.
        assert_eq!(out, "~~~~ text\n{{x}}\n~~~\n{{x}}\n~~~~\n!\n");
    }

    #[test]
    fn test_substitute_mismatched_marker_does_not_close() {
        let text = "```\n~~~\n{{x}}\n```\n{{x}}";
        let out = substitute(text, &vars(&[("x", "!")])).unwrap();
        assert_eq!(out, "```\n~~~\n{{x}}\n```\n!");
    }

    #[test]
    fn test_substitute_deeply_indented_is_not_a_fence() {
        let out = substitute("    ```\n{{x}}", &vars(&[("x", "!")])).unwrap();
        assert_eq!(out, "    ```\n!");
    }

    #[test]
    fn test_substitute_skips_fence_in_blockquote() {
        let text = "> ```\n> {{name}}\n> ```\n{{name}}\n";
        let out = substitute(text, &vars(&[("name", "Sam")])).unwrap();
        assert_eq!(out, "> ```\n> {{name}}\n> ```\nSam\n");

        let undefined = "> ```\n> {{undefined}}\n> ```";
        assert!(substitute(undefined, &vars(&[])).is_ok());
    }

    #[test]
    fn test_substitute_skips_fence_in_list_item() {
        let text = "1.  step {{name}}\n\n    ```\n    {{name}}\n    ```\n";
        let out = substitute(text, &vars(&[("name", "Sam")])).unwrap();
        assert_eq!(out, "1.  step Sam\n\n    ```\n    {{name}}\n    ```\n");

        let text = "- item\n\n  ```sh\n  echo {{name}}\n  ```\n";
        assert_eq!(substitute(text, &vars(&[])).unwrap(), text);
    }

    #[test]
    fn test_substitute_line_after_fence() {
        let err = substitute("```\n{{a}}\n```\n\n{{b}}", &vars(&[])).unwrap_err();
        assert_eq!(
            err,
            SubstituteError::UnknownVariable {
                name: "b".into(),
                line: 5
            }
        );
    }

    #[test]
    fn test_substitute_unclosed_fence_runs_to_end() {
        let out = substitute("```\n{{x}}\n", &vars(&[])).unwrap();
        assert_eq!(out, "```\n{{x}}\n");
    }

    #[test]
    fn test_site_variables() {
        let mut config = SiteConfig::default();
        config.variables.insert("author".into(), "Ada".into());

        let vars = site_variables(&config, "https://cdn.example.com");
        assert_eq!(vars["author"], "Ada");
        assert_eq!(vars[IMAGE_BASE_PATH_VAR], "https://cdn.example.com");
    }
}
