use chrono::{Days, Months, NaiveDate};
use regex::Regex;

/// Parses a strict `YYYY-MM-DD` calendar date. The parsed date must
/// round-trip back to the input string, which rejects non-padded fields
/// ("2024-2-3") on top of impossible dates ("2024-02-30").
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    match parsed.format("%Y-%m-%d").to_string() == text {
        true => Some(parsed),
        false => None,
    }
}

/// Parses Capterra-style relative dates like "3 months ago" against a
/// reference date. Returns None for anything that does not match the
/// `<N> <unit> ago` pattern; callers drop those records.
pub fn parse_relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let regex = Regex::new(r"(?i)(\d+)\s+(year|years|month|months|week|weeks|day|days)\s+ago")
        .expect("Invalid relative date regex");

    let captures = regex.captures(text)?;
    let value: u32 = captures[1].parse().ok()?;

    match captures[2].to_lowercase().as_str() {
        "year" | "years" => today.checked_sub_months(Months::new(value * 12)),
        "month" | "months" => today.checked_sub_months(Months::new(value)),
        "week" | "weeks" => today.checked_sub_days(Days::new(u64::from(value) * 7)),
        "day" | "days" => today.checked_sub_days(Days::new(u64::from(value))),
        _ => None,
    }
}

/// Parses G2-style absolute display text. No relative-date conversion is
/// attempted for G2; the two sites format dates differently.
pub fn parse_display_date(text: &str) -> Option<NaiveDate> {
    // %b only matches abbreviated month names, so full names need %B.
    ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())
}

/// Inclusive on both bounds.
pub fn within_window(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= date && date <= end
}
