use chrono::{Datelike, NaiveDate};

use super::models::{Audience, ContentType};

/// Calendar month names, January first.
pub const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Date layouts seen in `date_added`, tried in order.
const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d", "%d-%b-%y"];

/// Map a rating code to its audience bucket.
/// Codes outside the table (including unrated/malformed ones) have no bucket.
pub fn audience_for_rating(rating: &str) -> Option<Audience> {
    match rating {
        "TV-MA" | "R" | "NC-17" | "UR" | "NR" => Some(Audience::Adults),
        "TV-14" | "PG-13" => Some(Audience::Teens),
        "TV-PG" | "TV-Y7" | "TV-Y7-FV" | "PG" => Some(Audience::OlderKids),
        "TV-Y" | "TV-G" | "G" => Some(Audience::Kids),
        _ => None,
    }
}

/// Parse a human-readable add-date. Unparseable input yields `None`.
pub fn parse_date_added(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Year and month name of a parsed add-date.
pub fn year_and_month(date: Option<NaiveDate>) -> (Option<i32>, Option<&'static str>) {
    match date {
        Some(d) => (Some(d.year()), Some(MONTHS[d.month0() as usize])),
        None => (None, None),
    }
}

/// Leading whitespace-delimited token of a duration, as a number.
/// `"90 min"` → 90.0, `"2 Seasons"` → 2.0, `"abc min"` → None.
pub fn parse_duration_value(raw: &str) -> Option<f64> {
    raw.split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Split a raw duration into (movie minutes, series seasons).
/// At most one side is set, and only the side that matches the type.
pub fn split_duration(content_type: ContentType, raw: Option<&str>) -> (Option<f64>, Option<f64>) {
    let value = raw.and_then(parse_duration_value);
    match content_type {
        ContentType::Movie => (value, None),
        ContentType::TvShow => (None, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_table() {
        for code in ["TV-MA", "R", "NC-17", "UR", "NR"] {
            assert_eq!(audience_for_rating(code), Some(Audience::Adults), "{code}");
        }
        for code in ["TV-14", "PG-13"] {
            assert_eq!(audience_for_rating(code), Some(Audience::Teens), "{code}");
        }
        for code in ["TV-PG", "TV-Y7", "TV-Y7-FV", "PG"] {
            assert_eq!(audience_for_rating(code), Some(Audience::OlderKids), "{code}");
        }
        for code in ["TV-Y", "TV-G", "G"] {
            assert_eq!(audience_for_rating(code), Some(Audience::Kids), "{code}");
        }
    }

    #[test]
    fn test_rating_outside_table_has_no_bucket() {
        assert_eq!(audience_for_rating("74 min"), None);
        assert_eq!(audience_for_rating("tv-ma"), None);
        assert_eq!(audience_for_rating(""), None);
    }

    #[test]
    fn test_parse_date_added() {
        assert_eq!(
            parse_date_added("September 25, 2021"),
            NaiveDate::from_ymd_opt(2021, 9, 25)
        );
        // Leading whitespace shows up in real exports
        assert_eq!(
            parse_date_added(" August 4, 2017"),
            NaiveDate::from_ymd_opt(2017, 8, 4)
        );
        assert_eq!(parse_date_added("Sep 1, 2020"), NaiveDate::from_ymd_opt(2020, 9, 1));
        assert_eq!(parse_date_added("2019-01-31"), NaiveDate::from_ymd_opt(2019, 1, 31));
        assert_eq!(parse_date_added("not a date"), None);
        assert_eq!(parse_date_added("February 30, 2020"), None);
        assert_eq!(parse_date_added(""), None);
    }

    #[test]
    fn test_year_and_month() {
        let d = NaiveDate::from_ymd_opt(2021, 12, 3);
        assert_eq!(year_and_month(d), (Some(2021), Some("December")));
        assert_eq!(year_and_month(None), (None, None));
    }

    #[test]
    fn test_parse_duration_value() {
        assert_eq!(parse_duration_value("90 min"), Some(90.0));
        assert_eq!(parse_duration_value("1 Season"), Some(1.0));
        assert_eq!(parse_duration_value("  3 Seasons"), Some(3.0));
        assert_eq!(parse_duration_value("min 90"), None);
        assert_eq!(parse_duration_value(""), None);
        // "nan" parses as a float but is not a duration
        assert_eq!(parse_duration_value("nan"), None);
    }

    #[test]
    fn test_split_duration_matches_type() {
        assert_eq!(split_duration(ContentType::TvShow, Some("3 Seasons")), (None, Some(3.0)));
        assert_eq!(split_duration(ContentType::Movie, Some("90 min")), (Some(90.0), None));
        assert_eq!(split_duration(ContentType::Movie, Some("unknown")), (None, None));
        assert_eq!(split_duration(ContentType::TvShow, None), (None, None));
    }
}
