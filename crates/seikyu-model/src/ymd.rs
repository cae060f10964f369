use chrono::NaiveDate;
use thiserror::Error;

/// Error for strings that do not name a `YYYY-MM-DD` calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YmdParseError {
    #[error("expected YYYY-MM-DD, got `{0}`")]
    Malformed(String),
    #[error("no such calendar date: {year:04}-{month:02}-{day:02}")]
    OutOfRange { year: i32, month: u32, day: u32 },
}

/// Parse a `YYYY-MM-DD` date string.
///
/// Segments may be unpadded (`2026-3-5`); anything after the third segment is
/// ignored. Out-of-range components (month 13, Feb 30, years beyond four
/// digits) are errors rather than being rolled into the next month.
pub fn parse_ymd(input: &str) -> Result<NaiveDate, YmdParseError> {
    let malformed = || YmdParseError::Malformed(input.to_string());
    let mut parts = input.trim().split('-');
    let year: i32 = parts
        .next()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(malformed)?;
    let month: u32 = parts
        .next()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(malformed)?;
    let day: u32 = parts
        .next()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(malformed)?;
    if !(1..=9999).contains(&year) {
        return Err(YmdParseError::OutOfRange { year, month, day });
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(YmdParseError::OutOfRange { year, month, day })
}

/// Format a date back into the canonical `YYYY-MM-DD` wire form.
pub fn format_ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
