// src/services/details.rs

//! Case table extraction from a press-release page.
//!
//! The page layout is a positional contract: the case list is the third table
//! in the main content, its first body row is a header, and every other row
//! carries [`DETAIL_COLUMNS`] cells in a fixed order. Anything else aborts the
//! run with [`AppError::MissingTable`] or [`AppError::MalformedRow`].

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{DETAIL_COLUMNS, Detail, Link, SiteConfig};
use crate::services::links::parse_selector;
use crate::utils::http::PageSource;
use crate::utils::resolve;

/// Zero-based position of the case table among the page's tables.
pub const CASE_TABLE_INDEX: usize = 2;

/// Fetches press-release pages and extracts their case rows.
pub struct DetailParser<'a> {
    source: &'a dyn PageSource,
    site: &'a SiteConfig,
    table_sel: Selector,
    row_sel: Selector,
    cell_sel: Selector,
}

impl<'a> DetailParser<'a> {
    /// Create a parser for the given site layout.
    pub fn new(source: &'a dyn PageSource, site: &'a SiteConfig) -> Result<Self> {
        Ok(Self {
            source,
            site,
            table_sel: parse_selector(&site.table_selector)?,
            row_sel: parse_selector("tbody > tr")?,
            cell_sel: parse_selector("td")?,
        })
    }

    /// Fetch the release page of `link` and extract its case rows.
    pub async fn parse_details(&self, link: &Link) -> Result<Vec<Detail>> {
        let url = resolve(&self.site.origin, &link.href)?;
        log::info!("Fetching press release {}", url);

        let html = self.source.fetch(&url).await?;
        let rows = self.parse_table(&html, &url)?;

        if rows.is_empty() {
            log::warn!("Case table on {} has no data rows", url);
        }
        log::info!("Extracted {} case row(s) from {}", rows.len(), url);
        Ok(rows)
    }

    /// Extract the case rows from page markup.
    ///
    /// `url` only labels errors.
    pub fn parse_table(&self, html: &str, url: &str) -> Result<Vec<Detail>> {
        let document = Html::parse_document(html);
        let tables: Vec<_> = document.select(&self.table_sel).collect();

        let table = tables
            .get(CASE_TABLE_INDEX)
            .ok_or_else(|| AppError::MissingTable {
                url: url.to_string(),
                index: CASE_TABLE_INDEX,
                found: tables.len(),
            })?;

        let mut details = Vec::new();
        for (row, tr) in table.select(&self.row_sel).enumerate().skip(1) {
            let cells: Vec<String> = tr
                .select(&self.cell_sel)
                .map(|td| td.text().collect::<String>().trim().to_string())
                .collect();

            let found = cells.len();
            let cells: [String; DETAIL_COLUMNS] = cells
                .into_iter()
                .take(DETAIL_COLUMNS)
                .collect::<Vec<_>>()
                .try_into()
                .map_err(|_| AppError::MalformedRow {
                    url: url.to_string(),
                    row,
                    expected: DETAIL_COLUMNS,
                    found,
                })?;

            details.push(Detail::from_cells(cells));
        }

        Ok(details)
    }
}
