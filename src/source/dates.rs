use chrono::NaiveDate;

/// Outcome of parsing a single date cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateCell {
    /// The cell was blank.
    Blank,
    /// The cell held a valid date.
    Date(NaiveDate),
    /// The cell held text that is not a recognizable date.
    Invalid,
}

impl DateCell {
    /// Collapse to an optional date; blank and invalid cells both become `None`.
    pub fn into_option(self) -> Option<NaiveDate> {
        match self {
            DateCell::Date(date) => Some(date),
            DateCell::Blank | DateCell::Invalid => None,
        }
    }
}

/// Parse a day-first date cell such as `14/02/2026`, `14-02-26`, or `14.02.2026 08:30`.
///
/// ISO `YYYY-MM-DD` is accepted when the first component has four digits.
/// A trailing time component is ignored. Never fails: unparseable text yields
/// [`DateCell::Invalid`].
pub fn parse_day_first(raw: &str) -> DateCell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DateCell::Blank;
    }
    let date_part = strip_time_component(trimmed);
    match parse_date_parts(date_part) {
        Some(date) => DateCell::Date(date),
        None => DateCell::Invalid,
    }
}

/// Drop a trailing `HH:MM[:SS]` component separated by whitespace or an ISO `T`.
fn strip_time_component(value: &str) -> &str {
    let head = value.split_whitespace().next().unwrap_or(value);
    match head.split_once('T') {
        Some((date, _)) if date.len() == 10 => date,
        _ => head,
    }
}

fn parse_date_parts(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split(['/', '-', '.']).collect();
    if parts.len() != 3 || parts.iter().any(|part| !is_digits(part)) {
        return None;
    }
    if parts[0].len() == 4 {
        let year = parts[0].parse::<i32>().ok()?;
        let month = parts[1].parse::<u32>().ok()?;
        let day = parts[2].parse::<u32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }
    let day = parts[0].parse::<u32>().ok()?;
    let month = parts[1].parse::<u32>().ok()?;
    let year = expand_year(parts[2])?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Expand two-digit years with the POSIX `%y` pivot (69-99 -> 1900s, 00-68 -> 2000s).
fn expand_year(value: &str) -> Option<i32> {
    let year = value.parse::<i32>().ok()?;
    match value.len() {
        4 => Some(year),
        2 if year >= 69 => Some(1900 + year),
        2 => Some(2000 + year),
        _ => None,
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> DateCell {
        DateCell::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn parses_day_first_formats() {
        assert_eq!(parse_day_first("14/02/2026"), date(2026, 2, 14));
        assert_eq!(parse_day_first("14-02-2026"), date(2026, 2, 14));
        assert_eq!(parse_day_first("14.02.2026"), date(2026, 2, 14));
        assert_eq!(parse_day_first("4/2/2026"), date(2026, 2, 4));
        assert_eq!(parse_day_first(" 01/12/2025 "), date(2025, 12, 1));
    }

    #[test]
    fn day_first_is_not_month_first() {
        assert_eq!(parse_day_first("03/04/2026"), date(2026, 4, 3));
        assert_eq!(parse_day_first("02/25/2026"), DateCell::Invalid);
    }

    #[test]
    fn parses_two_digit_years_and_iso() {
        assert_eq!(parse_day_first("14/02/26"), date(2026, 2, 14));
        assert_eq!(parse_day_first("14/02/99"), date(1999, 2, 14));
        assert_eq!(parse_day_first("2026-02-14"), date(2026, 2, 14));
        assert_eq!(parse_day_first("2026-02-14T09:15:00"), date(2026, 2, 14));
    }

    #[test]
    fn ignores_time_component() {
        assert_eq!(parse_day_first("14/02/2026 00:00:00"), date(2026, 2, 14));
        assert_eq!(parse_day_first("14/02/2026 17:45"), date(2026, 2, 14));
    }

    #[test]
    fn blank_and_garbage_degrade_without_error() {
        assert_eq!(parse_day_first(""), DateCell::Blank);
        assert_eq!(parse_day_first("   "), DateCell::Blank);
        assert_eq!(parse_day_first("pending"), DateCell::Invalid);
        assert_eq!(parse_day_first("31/02/2026"), DateCell::Invalid);
        assert_eq!(parse_day_first("14/13/2026"), DateCell::Invalid);
        assert_eq!(parse_day_first("14/02/2026/01"), DateCell::Invalid);
        assert_eq!(parse_day_first("14/02/202"), DateCell::Invalid);
        assert_eq!(parse_day_first("pending").into_option(), None);
    }
}
