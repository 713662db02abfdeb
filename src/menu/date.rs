use chrono::NaiveDate;

use crate::error::Error;

/// Formats a date the way the origin's day dropdown expects it: `M/D/YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[must_use]
pub fn today() -> String {
    format_date(chrono::Local::now().date_naive())
}

/// Accepts `M/D/YYYY` with or without zero padding.
pub fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y").map_err(|_| Error::InvalidDate(s.to_owned()))
}

pub fn date_iter(start: NaiveDate, count: i64) -> impl Iterator<Item = NaiveDate> {
    (0..count).map(move |x| start + chrono::Duration::days(x))
}
