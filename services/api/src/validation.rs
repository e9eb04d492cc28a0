//! Input validation utilities

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

const MAX_CATEGORY_NAME: usize = 50;
const MAX_ICON: usize = 50;

/// Validate a category name after trimming
pub fn validate_category_name(name: &str) -> Result<(), String> {
    let name = name.trim();

    if name.is_empty() {
        return Err("Category name is required".to_string());
    }

    if name.chars().count() > MAX_CATEGORY_NAME {
        return Err("Category name must be between 1 and 50 characters".to_string());
    }

    Ok(())
}

/// Validate a `#RRGGBB` color
pub fn validate_color(color: &str) -> Result<(), String> {
    static COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COLOR_REGEX
        .get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Failed to compile color regex"));

    if !regex.is_match(color) {
        return Err("Color must be a valid hex color code (e.g., #FF5733)".to_string());
    }

    Ok(())
}

/// Validate an icon label or glyph
pub fn validate_icon(icon: &str) -> Result<(), String> {
    if icon.trim().chars().count() > MAX_ICON {
        return Err("Icon must be less than 50 characters".to_string());
    }

    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    Ok(())
}

pub fn validate_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount < 0.0 {
        return Err("Amount must be a positive number".to_string());
    }

    Ok(())
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC)
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("Invalid date: {}", value))
}

/// Run every check and collect the failures
pub fn collect_errors(checks: impl IntoIterator<Item = Result<(), String>>) -> Vec<String> {
    checks.into_iter().filter_map(Result::err).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_category_name() {
        assert!(validate_category_name("Groceries").is_ok());
        assert!(validate_category_name("   ").is_err());
        assert!(validate_category_name(&"x".repeat(50)).is_ok());
        assert!(validate_category_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_color() {
        assert!(validate_color("#FF5733").is_ok());
        assert!(validate_color("#ff5733").is_ok());
        assert!(validate_color("FF5733").is_err());
        assert!(validate_color("#FF573").is_err());
        assert!(validate_color("#GG5733").is_err());
    }

    #[test]
    fn test_icon_counts_characters_not_bytes() {
        assert!(validate_icon(&"🛒".repeat(50)).is_ok());
        assert!(validate_icon(&"🛒".repeat(51)).is_err());
    }

    #[test]
    fn test_amount() {
        assert!(validate_amount(0.0).is_ok());
        assert!(validate_amount(12.5).is_ok());
        assert!(validate_amount(-1.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_parse_date() {
        let plain = parse_date("2024-03-05").unwrap();
        assert_eq!((plain.year(), plain.month(), plain.day()), (2024, 3, 5));
        assert_eq!(plain.hour(), 0);

        let full = parse_date("2024-03-05T10:30:00+02:00").unwrap();
        assert_eq!(full.hour(), 8);

        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_collect_errors() {
        let errors = collect_errors([
            validate_title(""),
            validate_amount(5.0),
            validate_color("red"),
        ]);
        assert_eq!(errors.len(), 2);
    }
}
