use regex::Regex;
use std::sync::LazyLock;

use crate::date::strip_extension;

// Copy suffix such as the ` 2` in `Minutes 04 12 23 2`
static TRAILING_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+[0-9]$").unwrap());

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Human-readable title for a filename: extension dropped, `-`/`_` turned
/// into spaces, each word capitalised.
pub fn format_title(filename: &str) -> String {
    let spaced = strip_extension(filename).replace(['-', '_'], " ");

    let mut title = String::with_capacity(spaced.len());
    let mut prev_word = false;
    for c in spaced.chars() {
        let word = is_word_char(c);
        if word && !prev_word {
            title.push(c.to_ascii_uppercase());
        } else {
            title.push(c);
        }
        prev_word = word;
    }

    TRAILING_DIGIT_RE.replace(&title, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_title() {
        assert_eq!(format_title("Minutes-04-12-23.pdf"), "Minutes 04 12 23");
        assert_eq!(format_title("annual_water-report.pdf"), "Annual Water Report");
        assert_eq!(format_title("board meeting.docx"), "Board Meeting");
    }

    #[test]
    fn test_copy_suffix_dropped() {
        assert_eq!(format_title("site-plan-2.pdf"), "Site Plan");
        assert_eq!(format_title("site-plan-12.pdf"), "Site Plan 12");
        assert_eq!(format_title("site-plan-\u{662}.pdf"), "Site Plan \u{662}");
    }

    #[test]
    fn test_only_ascii_word_starts_are_capitalised() {
        assert_eq!(format_title("caféteria-notes.pdf"), "CaféTeria Notes");
        assert_eq!(format_title("o'brien.pdf"), "O'Brien");
    }
}
