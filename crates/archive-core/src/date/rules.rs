use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{parse_leading_int, DocDate};

/// A filename convention: the pattern that recognises it and the extractor
/// that turns its captures into a date. An extractor returning `None`
/// rejects the match and evaluation moves on to the next rule.
pub struct DateRule {
    pub name: &'static str,
    regex: &'static LazyLock<Regex>,
    extract: fn(&Captures) -> Option<DocDate>,
}

impl DateRule {
    pub fn apply(&self, stem: &str) -> Option<DocDate> {
        let caps = self.regex.captures(stem)?;
        (self.extract)(&caps)
    }
}

static RE_MDY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([0-9]{1,2})-([0-9]{1,2})-([0-9]{2})$").unwrap());
static RE_MONTH_NAME_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[-_](January|February|March|April|May|June|July|August|September|October|November|December)[-_]([0-9]{4})",
    )
    .unwrap()
});
static RE_BARE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[-_])(20[0-9]{2})(?:[-_]|$)").unwrap());
static RE_YMD_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})_").unwrap());

/// Rules in evaluation order. The first rule that matches decides.
pub static RULES: &[DateRule] = &[
    DateRule { name: "mdy-suffix", regex: &RE_MDY_SUFFIX, extract: extract_mdy_suffix },
    DateRule { name: "month-name-year", regex: &RE_MONTH_NAME_YEAR, extract: extract_month_name_year },
    DateRule { name: "bare-year", regex: &RE_BARE_YEAR, extract: extract_bare_year },
    DateRule { name: "ymd-prefix", regex: &RE_YMD_PREFIX, extract: extract_ymd_prefix },
];

fn valid_day(month: u32, day: u32) -> bool {
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

// `Minutes-03-10-24`: two-digit year, always 20xx
fn extract_mdy_suffix(caps: &Captures) -> Option<DocDate> {
    let month = parse_leading_int(&caps[1])?;
    let day = parse_leading_int(&caps[2])?;
    let yy = parse_leading_int(&caps[3])?;
    if !valid_day(month, day) {
        return None;
    }
    Some(DocDate::Day {
        year: (2000 + yy).to_string(),
        month,
        day,
    })
}

// `Budget_March_2023`: the month is kept exactly as written
fn extract_month_name_year(caps: &Captures) -> Option<DocDate> {
    Some(DocDate::MonthYear {
        month: caps[1].to_string(),
        year: caps[2].to_string(),
    })
}

fn extract_bare_year(caps: &Captures) -> Option<DocDate> {
    Some(DocDate::Year(caps[1].to_string()))
}

// `20190305_board_photo`
fn extract_ymd_prefix(caps: &Captures) -> Option<DocDate> {
    let month = parse_leading_int(&caps[2])?;
    let day = parse_leading_int(&caps[3])?;
    if !valid_day(month, day) {
        return None;
    }
    Some(DocDate::Day {
        year: caps[1].to_string(),
        month,
        day,
    })
}

/// Run the rule list against an extension-stripped filename.
pub fn match_rules(stem: &str) -> Option<(&'static str, DocDate)> {
    RULES
        .iter()
        .find_map(|rule| rule.apply(stem).map(|date| (rule.name, date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_name(stem: &str) -> Option<&'static str> {
        match_rules(stem).map(|(name, _)| name)
    }

    #[test]
    fn test_each_rule_in_isolation() {
        assert_eq!(rule_name("Minutes-03-10-24"), Some("mdy-suffix"));
        assert_eq!(rule_name("Budget_March_2023"), Some("month-name-year"));
        assert_eq!(rule_name("CCR-2021"), Some("bare-year"));
        assert_eq!(rule_name("20190305_board"), Some("ymd-prefix"));
        assert_eq!(rule_name("welcome"), None);
    }

    #[test]
    fn test_first_match_wins() {
        // Satisfies both the month-name rule and the mdy suffix rule
        let (name, date) = match_rules("Notice_June_2022-07-04-22").unwrap();
        assert_eq!(name, "mdy-suffix");
        assert_eq!(date.label(), "July 4, 2022");

        // Satisfies both the month-name rule and the bare-year rule
        let (name, _) = match_rules("Report-2020_May_2019").unwrap();
        assert_eq!(name, "month-name-year");
    }

    #[test]
    fn test_rejected_suffix_falls_through() {
        // Month 13 fails validation, the bare year still matches
        let (name, date) = match_rules("Audit_2019-13-01-19").unwrap();
        assert_eq!(name, "bare-year");
        assert_eq!(date.year(), "2019");

        assert_eq!(rule_name("Minutes-00-10-24"), None);
        assert_eq!(rule_name("Minutes-04-32-24"), None);
    }

    #[test]
    fn test_month_name_is_case_insensitive() {
        let (_, date) = match_rules("budget-march-2023").unwrap();
        assert_eq!(date.label(), "march 2023");
    }

    #[test]
    fn test_bare_year_needs_boundaries() {
        assert_eq!(rule_name("Report2021"), None);
        assert_eq!(rule_name("2021Report"), None);
        assert_eq!(rule_name("1998"), None);
        assert_eq!(rule_name("2021"), Some("bare-year"));
    }

    #[test]
    fn test_non_ascii_digits_never_match() {
        assert_eq!(rule_name("CCR_20\u{662}\u{661}"), None);
        assert_eq!(rule_name("Budget_March_\u{662}\u{660}\u{662}\u{663}"), None);
        assert_eq!(rule_name("Minutes-\u{663}-10-24"), None);
        assert_eq!(rule_name("\u{662}\u{660}\u{661}\u{669}0305_board"), None);
    }

    #[test]
    fn test_ymd_prefix_requires_underscore_and_valid_month() {
        assert_eq!(rule_name("20190305-board"), None);
        assert_eq!(rule_name("20191305_board"), None);
        let (_, date) = match_rules("19990305_board").unwrap();
        assert_eq!(date.label(), "March 5, 1999");
    }
}
