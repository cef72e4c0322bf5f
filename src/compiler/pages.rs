//! Full HTML pages: one per document plus the home page.
//!
//! Every page shares the configured head, header and footer fragments and
//! adds its own stylesheets. Links are relative, so the output directory
//! can be served from any path.

use crate::config::SiteConfig;
use crate::data::Document;
use crate::utils::date::format_date;
use quick_xml::escape::escape;
use std::fmt::Write;

const PAGE_STYLES: &[&str] = &["styles/highlight.css", "styles/page.css"];
const HOME_STYLES: &[&str] = &["styles/home.css"];

/// Page for one document around its rendered body.
pub fn document_page(config: &SiteConfig, doc: &Document, body: &str) -> String {
    let mut main = String::new();
    let class = if doc.draft { " class=\"draft\"" } else { "" };
    let _ = write!(main, "<main{class}><div class=\"innerContainer\">");

    let _ = write!(
        main,
        "<span class=\"postDate\">{}</span>",
        format_date(doc.date_added)
    );
    if let Some(modified) = doc.date_modified {
        let _ = write!(
            main,
            "<span class=\"postDate postUpdated\">Updated {}</span>",
            format_date(modified)
        );
    }
    if doc.draft {
        main.push_str("<div class=\"draftBanner\">Draft: not committed yet</div>");
    }

    main.push_str(body);
    main.push_str("</div></main>");

    shell(config, &doc.title(), PAGE_STYLES, &main)
}

/// `index.html`: every document in the given order.
pub fn home_page(config: &SiteConfig, docs: &[Document]) -> String {
    let mut main = String::from("<main><div class=\"innerContainer\"><div class=\"postsList\">");

    for doc in docs {
        let class = if doc.draft {
            "postItem postItemDraft"
        } else {
            "postItem"
        };
        let _ = write!(
            main,
            "<div class=\"{class}\"><a class=\"postLink\" href=\"{}\">{}</a><span class=\"postDate\">{}</span></div>",
            escape(doc.slug().as_str()),
            doc.title(),
            format_date(doc.date_added)
        );
    }

    main.push_str("</div></div></main>");
    shell(config, &escape(config.site.title.as_str()), HOME_STYLES, &main)
}

/// `title` must already be HTML-escaped.
fn shell(config: &SiteConfig, title: &str, styles: &[&str], main: &str) -> String {
    let site = &config.site;
    let mut html = String::with_capacity(main.len() + 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str(&site.head);
    html.push('\n');
    for href in styles {
        let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{href}\" />");
    }
    html.push_str("</head>\n<body>\n");
    html.push_str(&site.header);
    html.push('\n');
    html.push_str(main);
    html.push('\n');
    html.push_str(&site.footer);
    html.push_str("\n</body>\n</html>\n");

    html
}
