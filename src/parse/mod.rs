//! Shared parsing primitives for currency amounts and timestamps.
//!
//! Both extractors funnel every numeric or date-like token through these
//! functions so the locale disambiguation rules live in exactly one place.
//! The functions are stateless; the format lists are ordered rule tables,
//! so supporting a new layout means adding an entry, not a code path.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

pub mod proof;
pub mod receipt;

static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9][0-9.,]*").unwrap());
static THOUSANDS_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[0-9]{3}$").unwrap());

/// Parse a monetary amount out of `text`, resolving the `.`/`,` separator
/// ambiguity between Indonesian and US-style notation.
///
/// The first digit run (with embedded separators) is taken as the amount, so
/// currency prefixes like `Rp.` or `IDR` are skipped over. Disambiguation is
/// deterministic and ordered:
///
/// 1. a bare `0` is zero;
/// 2. both separators present: `,` groups thousands, `.` is the decimal point;
/// 3. only `.`, ending in a three-digit group or in `000`: `.` groups
///    thousands (`25.000` is twenty-five thousand, not 25.0);
/// 4. otherwise `,` is treated as a decimal point.
pub fn parse_price(text: &str) -> Option<f64> {
    let token = NUMERIC_TOKEN.find(text)?.as_str();
    let token = token.trim_end_matches(['.', ',']);

    if token == "0" {
        return Some(0.0);
    }

    let has_comma = token.contains(',');
    let has_dot = token.contains('.');

    if has_comma && has_dot {
        return token.replace(',', "").parse().ok();
    }

    if has_dot && (THOUSANDS_SUFFIX.is_match(token) || token.ends_with("000")) {
        return token.replace('.', "").parse().ok();
    }

    token.replace(',', ".").parse().ok()
}

// Templates with a time component, locale-specific layouts first. Two-digit
// year variants come before four-digit ones: %y refuses a four-digit year
// while %Y silently accepts a two-digit one as year 00xx.
const DATETIME_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// Date-only templates; a successful parse is completed to midnight.
const DATE_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%Y-%m-%d",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%y",
    "%d-%m-%Y",
    "%m/%d/%Y",
];

/// Try every known template, in order, against the trimmed candidate.
/// Returns `None` when nothing matches; an unreadable date is an absent
/// field, not an error.
pub fn parse_date(candidate: &str) -> Option<NaiveDateTime> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

// Date shapes searched for inside longer lines. Unambiguous layouts come
// first: the ISO pattern must precede the generic dash pattern, which would
// otherwise clip "2025-03-17" down to "25-03-17".
static DATE_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4}\s+\d{1,2}:\d{1,2}(?::\d{1,2})?",
        r"\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4}",
        r"\d{4}-\d{1,2}-\d{1,2}(?:\s+\d{1,2}:\d{1,2}(?::\d{1,2})?)?",
        r"\d{1,2}/\d{1,2}/\d{2,4}(?:\s+\d{1,2}:\d{1,2}(?::\d{1,2})?)?",
        r"\d{1,2}-\d{1,2}-\d{2,4}(?:\s+\d{1,2}:\d{1,2}(?::\d{1,2})?)?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Scan `text` for the first substring shaped like a date and parse it.
/// Patterns are tried in order of decreasing specificity; the first shape
/// that both matches and parses wins.
pub fn find_date(text: &str) -> Option<NaiveDateTime> {
    for shape in DATE_SHAPES.iter() {
        if let Some(found) = shape.find(text) {
            if let Some(dt) = parse_date(found.as_str()) {
                return Some(dt);
            }
        }
    }
    None
}

/// Day-level comparison used by stricter verification policies. Not part of
/// the default matching rule, which considers price alone.
pub fn same_calendar_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}
