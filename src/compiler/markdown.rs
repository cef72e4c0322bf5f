//! Markdown to HTML with highlighted code and classed headings.
//!
//! Two constructs are rewritten on the pulldown-cmark event stream before
//! serialization:
//!
//! | Construct                 | Output                                         |
//! |---------------------------|------------------------------------------------|
//! | fenced code with a tag    | [`Highlighter`] block, unknown tag is an error |
//! | heading level `n`         | `<hn class="mdHeader mdHeadern">`              |
//!
//! The whole stream is transformed before any HTML is written, so a failing
//! document produces no output at all.

use super::highlight::Highlighter;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unsupported code block language `{0}`")]
    UnsupportedLanguage(String),

    #[error("failed to highlight `{tag}` code block: {message}")]
    Highlight { tag: String, message: String },
}

pub struct Markdown<'h> {
    highlighter: &'h Highlighter,
}

impl<'h> Markdown<'h> {
    pub fn new(highlighter: &'h Highlighter) -> Self {
        Self { highlighter }
    }

    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let mut parser = Parser::new_ext(markdown, options());
        let mut events = Vec::new();

        while let Some(event) = parser.next() {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    self.code_block(info, &mut parser, &mut events)?;
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    let inner = collect_until(&mut parser, |e| {
                        matches!(e, Event::End(TagEnd::Heading(_)))
                    });
                    let mut body = String::new();
                    html::push_html(&mut body, inner.into_iter());

                    let n = level as usize;
                    let heading =
                        format!("<h{n} class=\"mdHeader mdHeader{n}\">{}</h{n}>\n", body.trim());
                    events.push(Event::Html(heading.into()));
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        Ok(out)
    }

    fn code_block<'a>(
        &self,
        info: CowStr<'a>,
        parser: &mut Parser<'a>,
        events: &mut Vec<Event<'a>>,
    ) -> Result<(), RenderError> {
        let tag = language_tag(&info).map(str::to_owned);
        let inner = collect_until(parser, |e| matches!(e, Event::End(TagEnd::CodeBlock)));

        let Some(tag) = tag else {
            events.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))));
            events.extend(inner);
            events.push(Event::End(TagEnd::CodeBlock));
            return Ok(());
        };

        let code: String = inner
            .iter()
            .filter_map(|e| match e {
                Event::Text(text) => Some(text.as_ref()),
                _ => None,
            })
            .collect();

        let html = self.highlighter.highlight(&tag, &code)?;
        events.push(Event::Html(html.into()));
        Ok(())
    }
}

/// Byte ranges of every fenced code block, fences included, wherever it is
/// nested (block quotes, list items).
pub fn fenced_ranges(markdown: &str) -> Vec<Range<usize>> {
    Parser::new_ext(markdown, options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => Some(range),
            _ => None,
        })
        .collect()
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// First word of a fence info string (`rust,ignore` → `rust`).
fn language_tag(info: &str) -> Option<&str> {
    info.split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .filter(|tag| !tag.is_empty())
}

/// Consume events up to and including the first one matching `is_end`,
/// returning everything before it.
fn collect_until<'a>(
    parser: &mut Parser<'a>,
    is_end: impl Fn(&Event<'a>) -> bool,
) -> Vec<Event<'a>> {
    let mut inner = Vec::new();
    for event in parser.by_ref() {
        if is_end(&event) {
            break;
        }
        inner.push(event);
    }
    inner
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> Result<String, RenderError> {
        let highlighter = Highlighter::new();
        Markdown::new(&highlighter).render(md)
    }

    #[test]
    fn test_heading_classes() {
        let html = render("# Hello *world*\n\n### Third\n").unwrap();
        assert!(html.contains("<h1 class=\"mdHeader mdHeader1\">Hello <em>world</em></h1>"));
        assert!(html.contains("<h3 class=\"mdHeader mdHeader3\">Third</h3>"));
    }

    #[test]
    fn test_highlighted_code_block() {
        let html = render("```rust\nlet x = 1;\n```\n").unwrap();
        assert!(html.contains("<pre class=\"language-rust\"><code class=\"language-rust\">"));
        assert!(html.contains("<span class=\"source rust\">"));
    }

    #[test]
    fn test_info_string_extra_words() {
        let html = render("```json title=\"x\"\n{}\n```\n").unwrap();
        assert!(html.contains("language-json"));
    }

    #[test]
    fn test_untagged_code_block_is_plain() {
        let html = render("```\n<b>\n```\n").unwrap();
        assert_eq!(html, "<pre><code>&lt;b&gt;\n</code></pre>\n");
    }

    #[test]
    fn test_indented_code_block_is_plain() {
        let html = render("para\n\n    let x = 1;\n").unwrap();
        assert!(html.contains("<pre><code>let x = 1;\n</code></pre>"));
    }

    #[test]
    fn test_unsupported_language_emits_nothing() {
        let highlighter = Highlighter::with_languages(&[
            ("typescript", "JavaScript"),
            ("bash", "Bourne Again Shell (bash)"),
            ("json", "JSON"),
        ]);
        let markdown = Markdown::new(&highlighter);

        let result = markdown.render("# Title\n\n```cobol\nDISPLAY 'HI'.\n```\n");
        assert_eq!(result, Err(RenderError::UnsupportedLanguage("cobol".into())));
    }

    #[test]
    fn test_extensions_enabled() {
        let html = render("| a |\n|---|\n| 1 |\n\n~~gone~~\n\n- [x] done\n").unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_fenced_ranges_nested() {
        let md = "intro\n\n> ```\n> quoted\n> ```\n\n    indented\n";
        let ranges = fenced_ranges(md);
        assert_eq!(ranges.len(), 1);
        assert!(md[ranges[0].clone()].contains("quoted"));
        assert!(!md[ranges[0].clone()].contains("indented"));
    }

    #[test]
    fn test_language_tag() {
        assert_eq!(language_tag("rust"), Some("rust"));
        assert_eq!(language_tag("rust,ignore"), Some("rust"));
        assert_eq!(language_tag("sh   extra"), Some("sh"));
        assert_eq!(language_tag(""), None);
    }
}
