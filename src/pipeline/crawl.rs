// src/pipeline/crawl.rs

//! Case-count crawling pipeline.
//!
//! Index page → latest release → case table → category groups → storage.

use chrono::Utc;

use crate::error::Result;
use crate::models::{Link, SiteConfig};
use crate::services::{CategoryGroups, DetailParser, LinkLister, group_by_category, pick_latest};
use crate::storage::{CaseRepository, StoreOutcome};
use crate::utils::http::PageSource;

/// Latest release and its grouped case rows.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub link: Link,
    pub groups: CategoryGroups,
}

/// What a pipeline run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlSummary {
    /// No case-count release is listed this month
    NothingToDo,
    /// The latest release was processed
    Completed { link: Link, outcome: StoreOutcome },
}

/// Find the latest release and group its case rows, without storing.
pub async fn crawl(source: &dyn PageSource, site: &SiteConfig) -> Result<Option<CrawlResult>> {
    let lister = LinkLister::new(source, site)?;
    let candidates = lister.list_candidates().await?;

    let Some(link) = pick_latest(&candidates).cloned() else {
        log::info!("No case-count release listed, nothing to do");
        return Ok(None);
    };
    log::info!("Latest release: {} ({})", link.title, link.date);

    let parser = DetailParser::new(source, site)?;
    let rows = parser.parse_details(&link).await?;
    let groups = group_by_category(rows);

    Ok(Some(CrawlResult { link, groups }))
}

/// Run the full write path and persist the latest release.
pub async fn run_crawler(
    source: &dyn PageSource,
    site: &SiteConfig,
    repository: &CaseRepository,
) -> Result<CrawlSummary> {
    let start_time = Utc::now();

    let Some(result) = crawl(source, site).await? else {
        return Ok(CrawlSummary::NothingToDo);
    };

    let outcome = repository.store(&result.link, &result.groups).await?;

    log::info!(
        "Crawl finished in {} ms",
        (Utc::now() - start_time).num_milliseconds()
    );

    Ok(CrawlSummary::Completed {
        link: result.link,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::link_key;
    use crate::services::release_html;
    use crate::storage::{JsonDocumentStore, LocalStorage};
    use async_trait::async_trait;
    use tempfile::TempDir;

    const PREFIX: &str = "新型コロナウイルス感染症の現在の状況と厚生労働省の対応について";

    /// Serves one index page and one release page per href.
    struct StaticPages {
        index: Option<String>,
        releases: Vec<(&'static str, String)>,
    }

    #[async_trait]
    impl PageSource for StaticPages {
        async fn fetch(&self, url: &str) -> Result<String> {
            let not_found = || AppError::Status {
                url: url.to_string(),
                status: 404,
            };
            if url.contains("houdou_list_") {
                return self.index.clone().ok_or_else(not_found);
            }
            self.releases
                .iter()
                .find(|(href, _)| url.ends_with(href))
                .map(|(_, html)| html.clone())
                .ok_or_else(not_found)
        }
    }

    fn index_html(items: &[(&str, &str)]) -> String {
        let lis: String = items
            .iter()
            .map(|(href, edition)| {
                format!(
                    r#"<li><a href="{href}"><div><span>{PREFIX}（{edition}）</span><span>2020年3月</span></div></a></li>"#
                )
            })
            .collect();
        format!(
            r#"<html><body><div id="top"><main><div class="l-contentMain"><ul>{lis}</ul></div></main></div></body></html>"#
        )
    }

    fn cases(prefectures: &[(&'static str, usize)]) -> Vec<Vec<&'static str>> {
        prefectures
            .iter()
            .flat_map(|(prefecture, n)| {
                (0..*n).map(move |_| vec!["1", "", "3月5日", "30代", "女性", *prefecture, "", "入院中"])
            })
            .collect()
    }

    fn repository(dir: &TempDir) -> CaseRepository {
        CaseRepository::new(JsonDocumentStore::new(LocalStorage::new(dir.path())))
    }

    #[tokio::test]
    async fn test_end_to_end_counts() {
        let tmp = TempDir::new().unwrap();
        let repo = repository(&tmp);
        let site = SiteConfig::default();
        let pages = StaticPages {
            index: Some(index_html(&[
                ("/stf/newpage_old.html", "令和２年３月４日版"),
                ("/stf/newpage_new.html", "令和２年３月５日版"),
            ])),
            releases: vec![
                ("/stf/newpage_old.html", release_html(&cases(&[("Tokyo", 1)]))),
                (
                    "/stf/newpage_new.html",
                    release_html(&cases(&[("Tokyo", 3), ("Osaka", 7)])),
                ),
            ],
        };

        let summary = run_crawler(&pages, &site, &repo).await.unwrap();
        match &summary {
            CrawlSummary::Completed { link, outcome } => {
                assert_eq!(link.href, "/stf/newpage_new.html");
                assert_eq!(
                    outcome,
                    &StoreOutcome::Stored {
                        key: link_key(20200305),
                        categories: 2,
                        total: 10,
                    }
                );
            }
            other => panic!("unexpected summary {other:?}"),
        }

        let latest = repo.fetch_latest_link().await.unwrap().unwrap();
        assert_eq!(latest.date, 20200305);
        assert_eq!(repo.fetch_total(&latest).await.unwrap(), Some(10));
        assert_eq!(repo.fetch_category_count(&latest, "Tokyo").await.unwrap(), Some(3));
        assert_eq!(repo.fetch_category_count(&latest, "Osaka").await.unwrap(), Some(7));
        assert_eq!(repo.fetch_category_count(&latest, "Kyoto").await.unwrap(), None);

        let again = run_crawler(&pages, &site, &repo).await.unwrap();
        assert!(matches!(
            again,
            CrawlSummary::Completed {
                outcome: StoreOutcome::AlreadyStored { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_no_releases_is_nothing_to_do() {
        let tmp = TempDir::new().unwrap();
        let repo = repository(&tmp);
        let site = SiteConfig::default();

        let empty_index = StaticPages {
            index: Some(index_html(&[])),
            releases: Vec::new(),
        };
        assert_eq!(
            run_crawler(&empty_index, &site, &repo).await.unwrap(),
            CrawlSummary::NothingToDo
        );

        let missing_index = StaticPages {
            index: None,
            releases: Vec::new(),
        };
        assert_eq!(
            run_crawler(&missing_index, &site, &repo).await.unwrap(),
            CrawlSummary::NothingToDo
        );
        assert!(repo.fetch_latest_link().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_release_stores_nothing() {
        let tmp = TempDir::new().unwrap();
        let repo = repository(&tmp);
        let site = SiteConfig::default();
        let mut rows = cases(&[("Tokyo", 2)]);
        rows.push(vec!["3", "", "3月5日"]);
        let pages = StaticPages {
            index: Some(index_html(&[("/stf/newpage_1.html", "令和２年３月５日版")])),
            releases: vec![("/stf/newpage_1.html", release_html(&rows))],
        };

        let err = run_crawler(&pages, &site, &repo).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedRow { .. }));
        assert!(repo.fetch_latest_link().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_release_page_fails() {
        let tmp = TempDir::new().unwrap();
        let repo = repository(&tmp);
        let site = SiteConfig::default();
        let pages = StaticPages {
            index: Some(index_html(&[("/stf/newpage_1.html", "令和２年３月５日版")])),
            releases: Vec::new(),
        };

        let err = run_crawler(&pages, &site, &repo).await.unwrap_err();
        assert!(err.is_not_found());
    }

    struct UnavailableIndex;

    #[async_trait]
    impl PageSource for UnavailableIndex {
        async fn fetch(&self, url: &str) -> Result<String> {
            Err(AppError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    #[tokio::test]
    async fn test_index_server_error_fails_run() {
        let tmp = TempDir::new().unwrap();
        let repo = repository(&tmp);
        let site = SiteConfig::default();

        let err = run_crawler(&UnavailableIndex, &site, &repo).await.unwrap_err();
        assert!(matches!(err, AppError::Status { status: 503, .. }));
        assert!(repo.fetch_latest_link().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_crawl_without_storing() {
        let site = SiteConfig::default();
        let pages = StaticPages {
            index: Some(index_html(&[("/stf/newpage_1.html", "令和２年３月５日版")])),
            releases: vec![(
                "/stf/newpage_1.html",
                release_html(&cases(&[("Tokyo", 2), ("Osaka", 1)])),
            )],
        };

        let result = crawl(&pages, &site).await.unwrap().unwrap();
        assert_eq!(result.link.date, 20200305);
        assert_eq!(result.groups.counts(), vec![("Tokyo", 2), ("Osaka", 1)]);
    }
}
