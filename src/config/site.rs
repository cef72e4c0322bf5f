//! `[site]` and `[images]` section configuration.
//!
//! Shared HTML fragments and the two image base paths.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in gitmark.toml - opaque HTML fragments shared by every page.
///
/// # Example
/// ```toml
/// [site]
/// title = "Notes"
/// head = '<link rel="stylesheet" href="styles/base.css" />'
/// header = '<header class="header">...</header>'
/// footer = '<footer class="footer">...</footer>'
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    /// Used for the `<title>` of the home page.
    #[serde(default = "defaults::site::title")]
    #[educe(Default = defaults::site::title())]
    pub title: String,

    /// Inserted first in every page, before page-specific stylesheets.
    #[serde(default = "defaults::site::head")]
    #[educe(Default = defaults::site::head())]
    pub head: String,

    #[serde(default = "defaults::site::header")]
    #[educe(Default = defaults::site::header())]
    pub header: String,

    #[serde(default = "defaults::site::footer")]
    #[educe(Default = defaults::site::footer())]
    pub footer: String,
}

/// `[images]` section - where documents should load images from.
///
/// Exposed to documents as the `{{ imageBasePath }}` variable.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    /// Locally served base path, used by the development build.
    #[serde(default = "defaults::images::local")]
    #[educe(Default = defaults::images::local())]
    pub local: String,

    /// Externally hosted base path, used by the production build.
    /// Falls back to `local` when unset.
    #[serde(default = "defaults::images::remote")]
    #[educe(Default = defaults::images::remote())]
    pub remote: Option<String>,
}

impl ImagesConfig {
    pub fn production(&self) -> &str {
        self.remote.as_deref().unwrap_or(&self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_site_fragments_override() {
        let config: SiteConfig = toml::from_str(
            r#"
            [site]
            header = "<header>hi</header>"
        "#,
        )
        .unwrap();

        assert_eq!(config.site.header, "<header>hi</header>");
        assert!(config.site.footer.contains("<footer"));
    }

    #[test]
    fn test_images_production_fallback() {
        let config: SiteConfig = toml::from_str("").unwrap();
        assert_eq!(config.images.production(), "assets/images");

        let config: SiteConfig = toml::from_str(
            r#"
            [images]
            remote = "https://cdn.example.com/img"
        "#,
        )
        .unwrap();
        assert_eq!(config.images.production(), "https://cdn.example.com/img");
        assert_eq!(config.images.local, "assets/images");
    }

    #[test]
    fn test_unknown_field_rejection() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
            [images]
            cdn = "nope"
        "#,
        );
        assert!(result.is_err());
    }
}
