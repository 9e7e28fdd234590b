use chrono::{Datelike, Local};
use std::fmt;

/// A calendar week key of the form `YYYY-WW`.
///
/// Only the shape is checked: both parts must be digits. Week numbers are
/// not validated against the calendar, so keys like `2024-53` or `2024-60`
/// pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    /// Parse a `YYYY-WW` string. Returns `None` when either side of the
    /// dash is empty or non-numeric.
    pub fn parse(s: &str) -> Option<Self> {
        let (year, week) = s.split_once('-')?;
        if year.is_empty() || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if week.is_empty() || !week.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            year: year.parse().ok()?,
            week: week.parse().ok()?,
        })
    }

    /// The current ISO week, used to pre-fill the meeting note form.
    pub fn current() -> Self {
        let iso = Local::now().date_naive().iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_keys() {
        assert_eq!(WeekKey::parse("2024-05"), Some(WeekKey::new(2024, 5)));
        assert_eq!(WeekKey::parse("2024-52"), Some(WeekKey::new(2024, 52)));
        // No calendar validation: overflowing week numbers pass
        assert_eq!(WeekKey::parse("2024-53"), Some(WeekKey::new(2024, 53)));
        assert_eq!(WeekKey::parse("2024-60"), Some(WeekKey::new(2024, 60)));
    }

    #[test]
    fn test_parse_unpadded_week() {
        assert_eq!(WeekKey::parse("2024-5"), Some(WeekKey::new(2024, 5)));
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        assert_eq!(WeekKey::parse(""), None);
        assert_eq!(WeekKey::parse("2024"), None);
        assert_eq!(WeekKey::parse("2024-"), None);
        assert_eq!(WeekKey::parse("-05"), None);
        assert_eq!(WeekKey::parse("2024-W5"), None);
        assert_eq!(WeekKey::parse("week five"), None);
    }

    #[test]
    fn test_ordering_by_year_then_week() {
        assert!(WeekKey::new(2024, 5) > WeekKey::new(2024, 4));
        assert!(WeekKey::new(2025, 1) > WeekKey::new(2024, 53));
        // Numeric ordering, not string ordering
        assert!(WeekKey::new(2024, 10) > WeekKey::new(2024, 9));
    }

    #[test]
    fn test_display_zero_pads() {
        assert_eq!(WeekKey::new(2024, 5).to_string(), "2024-05");
        assert_eq!(WeekKey::new(2024, 12).to_string(), "2024-12");
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let key = WeekKey::new(2025, 7);
        assert_eq!(WeekKey::parse(&key.to_string()), Some(key));
    }

    #[test]
    fn test_current_is_parseable() {
        let now = WeekKey::current();
        assert_eq!(WeekKey::parse(&now.to_string()), Some(now));
        assert!(now.week >= 1 && now.week <= 53);
    }
}
