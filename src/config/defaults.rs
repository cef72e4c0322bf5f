//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization and by
//! `educe` for the matching `Default` impls.

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn title() -> String {
        "gitmark".into()
    }

    pub fn head() -> String {
        concat!(
            r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#,
            "\n",
            r#"<link rel="stylesheet" href="styles/base.css" />"#,
            "\n",
        )
        .into()
    }

    pub fn header() -> String {
        concat!(
            r#"<header class="header">"#,
            r#"<div class="innerContainer headerInnerContainer">"#,
            r#"<a href="index.html" class="headerLink navLink navLogo">Home</a>"#,
            "</div></header>",
        )
        .into()
    }

    pub fn footer() -> String {
        concat!(
            r#"<footer class="footer"><div class="innerContainer">"#,
            r#"<div class="fontSmall">Statically generated from git history.</div>"#,
            "</div></footer>",
        )
        .into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "src/documents".into()
    }

    pub fn styles() -> PathBuf {
        "src/styles".into()
    }

    pub fn assets() -> PathBuf {
        "src/assets".into()
    }

    pub fn output() -> PathBuf {
        "build".into()
    }

    pub fn dev_output() -> PathBuf {
        ".local-dev-build".into()
    }

    pub mod cache {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            ".gitmark-cache.redb".into()
        }
    }
}

// ============================================================================
// [images] Section Defaults
// ============================================================================

pub mod images {
    pub fn local() -> String {
        "assets/images".into()
    }

    pub fn remote() -> Option<String> {
        None
    }
}

// ============================================================================
// [watch] Section Defaults
// ============================================================================

pub mod watch {
    pub fn debounce_ms() -> u64 {
        300
    }
}
