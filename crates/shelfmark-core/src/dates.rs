use chrono::NaiveDate;

use crate::error::{Result, ShelfmarkError};

/// Normalize a possibly-partial publication date string.
///
/// The same rules apply to human-typed form input and to the API's
/// `publishedDate` field, so both paths yield directly comparable dates:
///
/// - empty input → no date recorded
/// - a bare year ("1990") → January 1 of that year
/// - year and month ("1990-10") → the 1st of that month
/// - anything 8 chars or longer is taken as a full `YYYY-MM-DD` date
///
/// Malformed numeric components are a validation error, not a silent `None`.
pub fn normalize_pub_date(raw: &str) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let full = match raw.len() {
        4 => format!("{raw}-01-01"),
        5..=7 => format!("{raw}-01"),
        _ => raw.to_string(),
    };

    NaiveDate::parse_from_str(&full, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ShelfmarkError::Validation {
            field: "pub_date",
            message: format!("\"{raw}\" is not a valid date (expected YYYY, YYYY-MM or YYYY-MM-DD)"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_input_means_no_date() {
        assert_eq!(normalize_pub_date("").unwrap(), None);
        assert_eq!(normalize_pub_date("   ").unwrap(), None);
    }

    #[test]
    fn bare_year_becomes_january_first() {
        assert_eq!(normalize_pub_date("1990").unwrap(), Some(date(1990, 1, 1)));
    }

    #[test]
    fn year_and_month_become_first_of_month() {
        assert_eq!(
            normalize_pub_date("1990-10").unwrap(),
            Some(date(1990, 10, 1))
        );
    }

    #[test]
    fn full_date_parses_as_is() {
        assert_eq!(
            normalize_pub_date("1990-10-20").unwrap(),
            Some(date(1990, 10, 20))
        );
    }

    #[test]
    fn malformed_input_is_a_validation_error() {
        for bad in ["abcd", "19x0-10", "1990-13-45", "199"] {
            let err = normalize_pub_date(bad).unwrap_err();
            assert!(
                matches!(err, ShelfmarkError::Validation { field: "pub_date", .. }),
                "{bad}: {err}"
            );
        }
    }
}
