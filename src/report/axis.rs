//! Month/year axis labels for the twelve-point time-series charts.

use chrono::{Datelike, NaiveDate};

use crate::locale::MONTH_ABBREVIATIONS;

/// Label emitted for a date string the backend should never have sent.
/// Rendered verbatim, matching the web dashboard's behavior.
pub const INVALID_DATE_LABEL: &str = "Invalid Date";

/// Converts ISO `YYYY-MM` (or `YYYY-MM-DD`) strings into `(month, year)`
/// label pairs used as two-line axis ticks, e.g. `("Jan", "2023")`.
pub fn build_date_axis(dates: &[String]) -> Vec<(String, String)> {
    dates.iter().map(|raw| month_year_pair(raw)).collect()
}

fn month_year_pair(raw: &str) -> (String, String) {
    match parse_year_month(raw) {
        Some((year, month)) => (
            MONTH_ABBREVIATIONS[month as usize - 1].to_string(),
            format!("{year:04}"),
        ),
        None => (INVALID_DATE_LABEL.to_string(), INVALID_DATE_LABEL.to_string()),
    }
}

fn parse_year_month(raw: &str) -> Option<(i32, u32)> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some((date.year(), date.month()));
    }
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
        .ok()
        .map(|date| (date.year(), date.month()))
}

#[cfg(test)]
mod tests {
    use super::{build_date_axis, INVALID_DATE_LABEL};

    #[test]
    fn builds_twelve_labeled_ticks() {
        let dates: Vec<String> = (1..=12).map(|m| format!("2023-{m:02}")).collect();
        let axis = build_date_axis(&dates);
        assert_eq!(axis.len(), 12);
        for (month, year) in &axis {
            assert!(!month.is_empty());
            assert_eq!(year.len(), 4);
        }
        assert_eq!(axis[0], ("Jan".to_string(), "2023".to_string()));
        assert_eq!(axis[1], ("Fev".to_string(), "2023".to_string()));
        assert_eq!(axis[11], ("Dez".to_string(), "2023".to_string()));
    }

    #[test]
    fn accepts_full_dates() {
        let axis = build_date_axis(&["2022-12-15".to_string()]);
        assert_eq!(axis[0], ("Dez".to_string(), "2022".to_string()));
    }

    #[test]
    fn malformed_dates_label_as_invalid() {
        let axis = build_date_axis(&["not-a-date".to_string(), "2023-13".to_string()]);
        assert_eq!(axis[0].0, INVALID_DATE_LABEL);
        assert_eq!(axis[0].1, INVALID_DATE_LABEL);
        assert_eq!(axis[1].0, INVALID_DATE_LABEL);
    }
}
