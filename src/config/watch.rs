//! `[watch]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[watch]` section in gitmark.toml - development rebuild settings.
///
/// # Example
/// ```toml
/// [watch]
/// debounce_ms = 300   # quiet period before a burst of changes triggers a rebuild
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    #[serde(default = "defaults::watch::debounce_ms")]
    #[educe(Default = defaults::watch::debounce_ms())]
    pub debounce_ms: u64,
}

impl WatchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::time::Duration;

    #[test]
    fn test_watch_config() {
        let config: SiteConfig = toml::from_str(
            r#"
            [watch]
            debounce_ms = 120
        "#,
        )
        .unwrap();

        assert_eq!(config.watch.debounce(), Duration::from_millis(120));
    }

    #[test]
    fn test_watch_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();
        assert_eq!(config.watch.debounce_ms, 300);
    }
}
