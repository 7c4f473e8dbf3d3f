//! Document dates inferred from archive filenames.
//!
//! Archived filenames follow several historical naming conventions and carry
//! no embedded metadata, so the date is recovered heuristically from the
//! name. Both [`parse_document_year`] and [`parse_document_date`] evaluate the
//! same ordered rule list in [`rules`]; when nothing matches they fall back to
//! the directory-asserted year and month.

pub mod rules;

use chrono::Month;

/// A date recovered from a filename, at whatever precision the rule offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocDate {
    Day { year: String, month: u32, day: u32 },
    MonthYear { month: String, year: String },
    Year(String),
}

impl DocDate {
    pub fn year(&self) -> &str {
        match self {
            Self::Day { year, .. } | Self::MonthYear { year, .. } | Self::Year(year) => year.as_str(),
        }
    }

    /// Display label, e.g. `March 10, 2024`, `March 2023` or `2021`.
    pub fn label(&self) -> String {
        match self {
            Self::Day { year, month, day } => format!("{} {}, {}", month_name(*month), day, year),
            Self::MonthYear { month, year } => format!("{} {}", month, year),
            Self::Year(year) => year.clone(),
        }
    }
}

/// English month name for a 1-based month number; empty when out of range.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or("", |m| m.name())
}

/// Integer prefix of a string, ignoring leading whitespace and zeros.
/// `"04"` and `"4th"` both give 4; no leading digit gives `None`.
pub(crate) fn parse_leading_int(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

/// Drop a trailing `.ext` (one or more non-dot characters after the last dot).
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(pos) if pos + 1 < filename.len() => &filename[..pos],
        _ => filename,
    }
}

/// Match the filename (extension stripped) against the rule list.
pub fn parse_filename(filename: &str) -> Option<DocDate> {
    rules::match_rules(strip_extension(filename)).map(|(_, date)| date)
}

/// Year the document refers to, or `fallback_year` when no rule matches.
pub fn parse_document_year(filename: &str, fallback_year: &str) -> String {
    match parse_filename(filename) {
        Some(date) => date.year().to_string(),
        None => fallback_year.to_string(),
    }
}

/// Display date of the document, or `"<Month> <year>"` from the directory
/// when no rule matches. An unusable month leaves just the year.
pub fn parse_document_date(filename: &str, fallback_month: &str, fallback_year: &str) -> String {
    match parse_filename(filename) {
        Some(date) => date.label(),
        None => {
            let month = parse_leading_int(fallback_month).map_or("", month_name);
            format!("{} {}", month, fallback_year).trim().to_string()
        }
    }
}
