//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Where and how the press releases are published
    #[serde(default)]
    pub site: SiteConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.site.origin)
            .map_err(|e| AppError::validation(format!("site.origin is not a URL: {e}")))?;
        if !self.site.index_path.contains("{month}") {
            return Err(AppError::validation(
                "site.index_path must contain a {month} placeholder",
            ));
        }
        if self.site.title_prefix.trim().is_empty() {
            return Err(AppError::validation("site.title_prefix is empty"));
        }
        if !(-12..=14).contains(&self.site.utc_offset_hours) {
            return Err(AppError::validation(
                "site.utc_offset_hours must be within -12..=14",
            ));
        }
        for selector in [&self.site.link_selector, &self.site.table_selector] {
            scraper::Selector::parse(selector)
                .map_err(|e| AppError::selector(selector.as_str(), format!("{e:?}")))?;
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Publication site layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host every page is fetched from
    #[serde(default = "defaults::origin")]
    pub origin: String,

    /// Path of the monthly press-release index, `{month}` is `YYYYMM`
    #[serde(default = "defaults::index_path")]
    pub index_path: String,

    /// Title prefix of the case-count press releases
    #[serde(default = "defaults::title_prefix")]
    pub title_prefix: String,

    /// CSS selector for anchors on the index page
    #[serde(default = "defaults::link_selector")]
    pub link_selector: String,

    /// CSS selector for the tables on a detail page
    #[serde(default = "defaults::table_selector")]
    pub table_selector: String,

    /// Offset from UTC used for "this month" and "today"
    #[serde(default = "defaults::utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl SiteConfig {
    /// Index page URL for the given month (`YYYYMM`).
    pub fn index_url(&self, month: &str) -> String {
        format!(
            "{}{}",
            self.origin.trim_end_matches('/'),
            self.index_path.replace("{month}", month)
        )
    }

    /// Current time in the site's timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix());
        Utc::now().with_timezone(&offset)
    }

    /// Today's date in the site's timezone.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Current month as `YYYYMM` in the site's timezone.
    pub fn current_month(&self) -> String {
        self.now().format("%Y%m").to_string()
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: defaults::origin(),
            index_path: defaults::index_path(),
            title_prefix: defaults::title_prefix(),
            link_selector: defaults::link_selector(),
            table_selector: defaults::table_selector(),
            utc_offset_hours: defaults::utc_offset_hours(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; mhlw-cases/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Site defaults
    pub fn origin() -> String {
        "https://www.mhlw.go.jp".into()
    }
    pub fn index_path() -> String {
        "/stf/houdou/houdou_list_{month}.html".into()
    }
    pub fn title_prefix() -> String {
        "新型コロナウイルス感染症の現在の状況と厚生労働省の対応について".into()
    }
    pub fn link_selector() -> String {
        "body > div#top > main div.l-contentMain ul > li > a".into()
    }
    pub fn table_selector() -> String {
        "body > div#top > main table".into()
    }
    pub fn utc_offset_hours() -> i32 {
        9
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_index_path_without_month() {
        let mut config = Config::default();
        config.site.index_path = "/stf/houdou/index.html".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.site.table_selector = "[[invalid".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            timeout_secs = 5

            [site]
            origin = "http://localhost:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.crawler.timeout_secs, 5);
        assert_eq!(config.crawler.user_agent, defaults::user_agent());
        assert_eq!(config.site.origin, "http://localhost:8080");
        assert_eq!(config.site.utc_offset_hours, 9);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn index_url_uses_month() {
        let site = SiteConfig::default();
        assert_eq!(
            site.index_url("202003"),
            "https://www.mhlw.go.jp/stf/houdou/houdou_list_202003.html"
        );
    }

    #[test]
    fn current_month_is_six_digits() {
        let month = SiteConfig::default().current_month();
        assert_eq!(month.len(), 6);
        assert!(month.chars().all(|c| c.is_ascii_digit()));
    }
}
