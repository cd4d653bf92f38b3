use chrono::NaiveDate;
use thiserror::Error;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected 3 date tokens, found {found} in {input:?}")]
    TokenCount { input: String, found: usize },

    #[error("invalid day token {0:?}")]
    Day(String),

    #[error("invalid month token {0:?}")]
    Month(String),

    #[error("invalid year token {0:?}")]
    Year(String),

    #[error("no such calendar date: {day} {month} {year}")]
    OutOfRange { day: u32, month: u32, year: i32 },
}

/// Formats a date the way the backend compares filter values: `DD/MM/YYYY`.
pub fn encode(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parses the backend's row date text, `<day> <month> <year>`.
///
/// The month may be numeric or a (possibly abbreviated) English month name.
pub fn decode(text: &str) -> Result<NaiveDate, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [day, month, year] = tokens.as_slice() else {
        return Err(ParseError::TokenCount {
            input: text.to_string(),
            found: tokens.len(),
        });
    };

    let day: u32 = day.parse().map_err(|_| ParseError::Day(day.to_string()))?;
    let month = parse_month(month).ok_or_else(|| ParseError::Month(month.to_string()))?;
    let year: i32 = year
        .parse()
        .map_err(|_| ParseError::Year(year.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseError::OutOfRange { day, month, year })
}

fn parse_month(token: &str) -> Option<u32> {
    if let Ok(number) = token.parse::<u32>() {
        return (1..=12).contains(&number).then_some(number);
    }

    let lower = token.trim_end_matches('.').to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&lower))
        .map(|idx| idx as u32 + 1)
}

/// Parses a date picked in a column filter (`YYYY-MM-DD`, optionally followed by a time).
pub fn parse_filter_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    #[test]
    fn encode_pads_day_and_month() {
        assert_eq!(encode(date(2024, 3, 5)), "05/03/2024");
        assert_eq!(encode(date(1999, 12, 31)), "31/12/1999");
    }

    #[test]
    fn decode_accepts_textual_and_numeric_months() {
        assert_eq!(decode("5 Mar 2024"), Ok(date(2024, 3, 5)));
        assert_eq!(decode("05 march 2024"), Ok(date(2024, 3, 5)));
        assert_eq!(decode("5 Sept 2024"), Ok(date(2024, 9, 5)));
        assert_eq!(decode(" 17  10 2026 "), Ok(date(2026, 10, 17)));
    }

    #[test]
    fn decode_rejects_wrong_token_count() {
        let err = decode("5 Mar").expect_err("two tokens should fail");
        assert!(matches!(err, ParseError::TokenCount { found: 2, .. }));

        let err = decode("Tue 5 Mar 2024").expect_err("four tokens should fail");
        assert!(matches!(err, ParseError::TokenCount { found: 4, .. }));
    }

    #[test]
    fn decode_rejects_impossible_dates() {
        assert_eq!(
            decode("31 Feb 2024"),
            Err(ParseError::OutOfRange {
                day: 31,
                month: 2,
                year: 2024
            })
        );
        assert!(matches!(decode("1 Smarch 2024"), Err(ParseError::Month(_))));
        assert!(matches!(decode("1 13 2024"), Err(ParseError::Month(_))));
        assert!(matches!(decode("x Mar 2024"), Err(ParseError::Day(_))));
    }

    #[test]
    fn encoded_text_echoed_by_backend_decodes_to_same_day() {
        let original = date(2023, 7, 9);
        let encoded = encode(original);
        let echoed = encoded.replace('/', " ");

        assert_eq!(decode(&echoed), Ok(original));
    }

    #[test]
    fn filter_date_ignores_time_suffix() {
        assert_eq!(parse_filter_date("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(
            parse_filter_date("2024-03-05 00:00:00"),
            Some(date(2024, 3, 5))
        );
        assert_eq!(parse_filter_date("05/03/2024"), None);
    }
}
