//! Date phrasing relative to today.

use chrono::{Datelike, NaiveDate};

use super::messages::Locale;

/// Phrase `date` for speech, relative to `today`.
///
/// - different year: long form with the year (`2019年12月31日`)
/// - same day: "today" followed by the short form (`本日3月5日`)
/// - otherwise: short form (`3月5日`)
pub fn date_phrase(date: NaiveDate, today: NaiveDate, locale: Locale) -> String {
    let catalog = locale.catalog();
    if date.year() != today.year() {
        date.format(catalog.date_long).to_string()
    } else if date == today {
        format!("{}{}", catalog.today, date.format(catalog.date_short))
    } else {
        date.format(catalog.date_short).to_string()
    }
}
