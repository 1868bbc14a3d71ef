// src/services/links.rs

//! Press-release link discovery.
//!
//! Reads the monthly press-release index and keeps the case-count releases,
//! recognised by their title prefix and a `令和N年M月D日版` edition label.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Link, SiteConfig, date_number};
use crate::utils::http::PageSource;
use crate::utils::to_ascii_digits;

/// Offset between the Reiwa era year and the calendar year.
///
/// Fixed to Reiwa: editions published under a later era are not recognised.
pub const REIWA_OFFSET: i32 = 2018;

const EDITION_PATTERN: &str = r"令和([0-9０-９]+)年([0-9０-９]+)月([0-9０-９]+)日版";

/// Lists candidate press releases from the monthly index page.
pub struct LinkLister<'a> {
    source: &'a dyn PageSource,
    site: &'a SiteConfig,
    anchor_sel: Selector,
    div_sel: Selector,
    span_sel: Selector,
    edition: Regex,
}

impl<'a> LinkLister<'a> {
    /// Create a lister for the given site layout.
    pub fn new(source: &'a dyn PageSource, site: &'a SiteConfig) -> Result<Self> {
        Ok(Self {
            source,
            site,
            anchor_sel: parse_selector(&site.link_selector)?,
            div_sel: parse_selector("div")?,
            span_sel: parse_selector("span")?,
            edition: Regex::new(EDITION_PATTERN)
                .map_err(|e| AppError::config(format!("edition pattern: {e}")))?,
        })
    }

    /// List the case-count releases on this month's index page.
    pub async fn list_candidates(&self) -> Result<Vec<Link>> {
        self.list_month(&self.site.current_month()).await
    }

    /// List the case-count releases on the index page of `month` (`YYYYMM`).
    ///
    /// A missing index page yields no candidates.
    pub async fn list_month(&self, month: &str) -> Result<Vec<Link>> {
        let url = self.site.index_url(month);
        log::info!("Fetching press-release index {}", url);

        let html = match self.source.fetch(&url).await {
            Ok(html) => html,
            Err(e) if e.is_not_found() => {
                log::warn!("Index page {} not published yet", url);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let links = self.parse_index(&html);
        log::info!("Found {} case-count release(s) for {}", links.len(), month);
        Ok(links)
    }

    /// Extract candidate links from index page markup, in document order.
    pub fn parse_index(&self, html: &str) -> Vec<Link> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        for anchor in document.select(&self.anchor_sel) {
            let Some(label) = anchor
                .select(&self.div_sel)
                .next()
                .and_then(|div| div.select(&self.span_sel).next())
            else {
                continue;
            };
            let title: String = label.text().collect();

            if !title.starts_with(&self.site.title_prefix) {
                continue;
            }

            let Some(date) = self.edition_date(&title) else {
                log::warn!("Skipping release with unrecognised edition: {}", title);
                continue;
            };

            let href = anchor.value().attr("href").unwrap_or_default();
            links.push(Link::new(title, href, date));
        }

        links
    }

    /// Publication date encoded in an edition label, as `YYYYMMDD`.
    pub fn edition_date(&self, title: &str) -> Option<u32> {
        let caps = self.edition.captures(title)?;
        let number =
            |i: usize| -> Option<u32> { to_ascii_digits(caps.get(i)?.as_str()).parse().ok() };

        let year = REIWA_OFFSET.checked_add(i32::try_from(number(1)?).ok()?)?;
        let month = number(2)?;
        let day = number(3)?;

        NaiveDate::from_ymd_opt(year, month, day).map(date_number)
    }
}

/// Pick the most recent link.
///
/// Ties keep the first link encountered. `None` when `candidates` is empty.
pub fn pick_latest(candidates: &[Link]) -> Option<&Link> {
    candidates
        .iter()
        .reduce(|latest, link| if link.date > latest.date { link } else { latest })
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const PREFIX: &str = "新型コロナウイルス感染症の現在の状況と厚生労働省の対応について";

    struct NoPages;

    #[async_trait]
    impl PageSource for NoPages {
        async fn fetch(&self, url: &str) -> Result<String> {
            Err(AppError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn index_html(items: &[(&str, &str)]) -> String {
        let lis: String = items
            .iter()
            .map(|(href, label)| {
                format!(r#"<li><a href="{href}"><div><span>{label}</span></div></a></li>"#)
            })
            .collect();
        format!(
            r#"<html><body><div id="top"><main><div class="l-contentMain"><ul>{lis}</ul></div></main></div></body></html>"#
        )
    }

    #[test]
    fn test_parse_index_filters_by_prefix() {
        let site = SiteConfig::default();
        let lister = LinkLister::new(&NoPages, &site).unwrap();
        let first = format!("{PREFIX}（令和２年３月５日版）");
        let third = format!("{PREFIX}（令和2年3月6日版）");
        let html = index_html(&[
            ("/stf/newpage_1.html", first.as_str()),
            ("/stf/newpage_2.html", "マスクの供給について"),
            ("/stf/newpage_3.html", third.as_str()),
        ]);

        let links = lister.parse_index(&html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href, "/stf/newpage_1.html");
        assert_eq!(links[0].date, 20200305);
        assert!(links[0].id.is_none());
        assert_eq!(links[1].date, 20200306);
    }

    #[test]
    fn test_parse_index_skips_unrecognised_editions() {
        let site = SiteConfig::default();
        let lister = LinkLister::new(&NoPages, &site).unwrap();
        let labels = [
            format!("{PREFIX}（令和元年５月１日版）"),
            format!("{PREFIX}（令和２年２月３０日版）"),
            format!("{PREFIX}（令和２年１２月３１日版）"),
        ];
        let html = index_html(&[
            ("/a.html", labels[0].as_str()),
            ("/b.html", labels[1].as_str()),
            ("/c.html", labels[2].as_str()),
        ]);

        let links = lister.parse_index(&html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].date, 20201231);
    }

    #[test]
    fn test_parse_index_ignores_anchors_outside_scope() {
        let site = SiteConfig::default();
        let lister = LinkLister::new(&NoPages, &site).unwrap();
        let html = format!(
            r#"<html><body><div id="top"><main><ul><li><a href="/x.html"><div><span>{PREFIX}（令和２年３月５日版）</span></div></a></li></ul></main></div></body></html>"#
        );
        assert!(lister.parse_index(&html).is_empty());
    }

    #[test]
    fn test_edition_date_mixed_width() {
        let site = SiteConfig::default();
        let lister = LinkLister::new(&NoPages, &site).unwrap();
        assert_eq!(lister.edition_date("令和３年1２月３日版"), Some(20211203));
        assert_eq!(lister.edition_date("令和2年4月15日版"), Some(20200415));
        assert_eq!(lister.edition_date("平成31年4月1日版"), None);
    }

    #[test]
    fn test_edition_date_out_of_range_year() {
        let site = SiteConfig::default();
        let lister = LinkLister::new(&NoPages, &site).unwrap();
        assert_eq!(lister.edition_date("令和2147483647年3月5日版"), None);
        assert_eq!(lister.edition_date("令和4294967295年3月5日版"), None);
        assert_eq!(lister.edition_date("令和99999999999年3月5日版"), None);

        let html = index_html(&[(
            "/x.html",
            "新型コロナウイルス感染症の現在の状況と厚生労働省の対応について（令和２１４７４８３６４７年３月５日版）",
        )]);
        assert!(lister.parse_index(&html).is_empty());
    }

    #[tokio::test]
    async fn test_missing_index_page_is_empty() {
        let site = SiteConfig::default();
        let lister = LinkLister::new(&NoPages, &site).unwrap();
        let links = lister.list_month("202003").await.unwrap();
        assert!(links.is_empty());
    }

    struct FailingPages;

    #[async_trait]
    impl PageSource for FailingPages {
        async fn fetch(&self, url: &str) -> Result<String> {
            Err(AppError::Status {
                url: url.to_string(),
                status: 500,
            })
        }
    }

    #[tokio::test]
    async fn test_index_server_error_propagates() {
        let site = SiteConfig::default();
        let lister = LinkLister::new(&FailingPages, &site).unwrap();
        let err = lister.list_month("202003").await.unwrap_err();
        assert!(matches!(err, AppError::Status { status: 500, .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_pick_latest() {
        let links = vec![
            Link::new("a", "/a", 20200303),
            Link::new("b", "/b", 20200305),
            Link::new("c", "/c", 20200304),
        ];
        let latest = pick_latest(&links).unwrap();
        assert_eq!(latest.href, "/b");
        assert!(links.iter().all(|l| latest.date >= l.date));
    }

    #[test]
    fn test_pick_latest_keeps_first_on_tie() {
        let links = vec![
            Link::new("first", "/first", 20200305),
            Link::new("second", "/second", 20200305),
        ];
        assert_eq!(pick_latest(&links).unwrap().href, "/first");
    }

    #[test]
    fn test_pick_latest_empty() {
        assert!(pick_latest(&[]).is_none());
    }
}
