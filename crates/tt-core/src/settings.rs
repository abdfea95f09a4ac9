//! # Thumbnail Settings
//!
//! A per-event snapshot of the site settings that gate thumbnail assignment.
//! Loaded once per event so the decision itself never touches the host.

use serde::{Deserialize, Serialize};
use crate::traits::SiteSettings;

pub const ENABLED: &str = "topic_thumbnail_recent_post_enabled";
pub const REQUIRE_CATEGORY_OPT_IN: &str = "topic_thumbnail_recent_post_require_category_opt_in";
pub const EXCLUDE_GIFS: &str = "topic_thumbnail_recent_post_exclude_gifs";
pub const REQUIRE_JOURNAL_ENTRY: &str = "topic_thumbnail_recent_post_require_journal_entry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailSettings {
    /// Master switch
    pub enabled: bool,
    pub require_category_opt_in: bool,
    pub exclude_gifs: bool,
    pub require_journal_entry: bool,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            require_category_opt_in: true,
            exclude_gifs: true,
            require_journal_entry: false,
        }
    }
}

impl ThumbnailSettings {
    /// Every gate on, as the current host configuration ships it once enabled.
    pub fn enabled() -> Self {
        Self { enabled: true, ..Self::default() }
    }

    /// Reads each setting by name, falling back to the default when unset.
    pub async fn load(source: &dyn SiteSettings) -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            enabled: source.get_bool(ENABLED).await?.unwrap_or(defaults.enabled),
            require_category_opt_in: source
                .get_bool(REQUIRE_CATEGORY_OPT_IN)
                .await?
                .unwrap_or(defaults.require_category_opt_in),
            exclude_gifs: source.get_bool(EXCLUDE_GIFS).await?.unwrap_or(defaults.exclude_gifs),
            require_journal_entry: source
                .get_bool(REQUIRE_JOURNAL_ENTRY)
                .await?
                .unwrap_or(defaults.require_journal_entry),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockSiteSettings;

    #[tokio::test]
    async fn unset_settings_fall_back_to_defaults() {
        let mut source = MockSiteSettings::new();
        source.expect_get_bool().returning(|_| Ok(None));

        let loaded = ThumbnailSettings::load(&source).await.unwrap();
        assert_eq!(loaded, ThumbnailSettings::default());
        assert!(!loaded.enabled);
    }

    #[tokio::test]
    async fn stored_values_override_defaults() {
        let mut source = MockSiteSettings::new();
        source.expect_get_bool().returning(|name| {
            Ok(match name {
                ENABLED => Some(true),
                EXCLUDE_GIFS => Some(false),
                _ => None,
            })
        });

        let loaded = ThumbnailSettings::load(&source).await.unwrap();
        assert!(loaded.enabled);
        assert!(!loaded.exclude_gifs);
        assert!(loaded.require_category_opt_in);
    }

    #[tokio::test]
    async fn read_failure_propagates() {
        let mut source = MockSiteSettings::new();
        source.expect_get_bool().returning(|_| Err(anyhow::anyhow!("settings table locked")));

        assert!(ThumbnailSettings::load(&source).await.is_err());
    }
}
