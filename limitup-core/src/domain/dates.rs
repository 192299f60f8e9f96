//! Trade-date parsing and formatting.
//!
//! The external representation is the 8-digit `YYYYMMDD` form. Dashed and
//! slashed ISO variants are accepted on input because upstream feeds mix them.

use chrono::NaiveDate;
use thiserror::Error;

const COMPACT_FORMAT: &str = "%Y%m%d";
const FALLBACK_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable date: {0:?}")]
pub struct DateParseError(pub String);

/// Parse a trade date from `YYYYMMDD`, `YYYY-MM-DD` or `YYYY/MM/DD`.
pub fn parse_trade_date(text: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = text.trim();
    if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(trimmed, COMPACT_FORMAT)
            .map_err(|_| DateParseError(text.to_string()));
    }
    FALLBACK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| DateParseError(text.to_string()))
}

/// Format a date as `YYYYMMDD`.
pub fn format_trade_date(date: NaiveDate) -> String {
    date.format(COMPACT_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compact_and_dashed_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_trade_date("20240102").unwrap(), expected);
        assert_eq!(parse_trade_date(" 2024-01-02 ").unwrap(), expected);
        assert_eq!(parse_trade_date("2024/01/02").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert!(parse_trade_date("not-a-date").is_err());
        assert!(parse_trade_date("20241301").is_err());
        assert!(parse_trade_date("").is_err());
    }

    #[test]
    fn formats_compact() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(format_trade_date(date), "20240309");
    }
}
