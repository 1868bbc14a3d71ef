//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::Result;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a href against the site origin.
pub fn resolve(origin: &str, href: &str) -> Result<String> {
    let base = Url::parse(origin)?;
    Ok(resolve_url(&base, href))
}

/// Replace full-width digits (U+FF10..U+FF19) with ASCII digits.
///
/// Every other character passes through untouched.
pub fn to_ascii_digits(source: &str) -> String {
    source
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            _ => c,
        })
        .collect()
}
