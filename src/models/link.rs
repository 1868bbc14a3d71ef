//! Press-release link data structure.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A dated case-count press release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// Storage key, present once the link has been read back from storage
    #[serde(default, skip_serializing)]
    pub id: Option<String>,

    /// Page title as listed on the index page
    pub title: String,

    /// Path of the press release relative to the site origin
    pub href: String,

    /// Publication date as `YYYYMMDD`
    pub date: u32,
}

impl Link {
    /// Create an unpersisted link.
    pub fn new(title: impl Into<String>, href: impl Into<String>, date: u32) -> Self {
        Self {
            id: None,
            title: title.into(),
            href: href.into(),
            date,
        }
    }

    /// Key this link is stored under.
    ///
    /// Falls back to the date hash when the link has not been stored yet.
    pub fn storage_key(&self) -> String {
        self.id.clone().unwrap_or_else(|| link_key(self.date))
    }

    /// Publication date as a calendar date.
    pub fn published_on(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            (self.date / 10_000) as i32,
            (self.date / 100) % 100,
            self.date % 100,
        )
    }

    /// Absolute URL of the press release.
    pub fn url(&self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.href)
    }
}

/// Deterministic storage key for a publication date.
///
/// SHA-256 over the canonical JSON `{"date":YYYYMMDD}`, hex encoded.
pub fn link_key(date: u32) -> String {
    let canonical = serde_json::json!({ "date": date }).to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Encode a calendar date as `YYYYMMDD`.
pub fn date_number(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}
