use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("date unparseable: {input:?}")]
    Unparseable { input: String },
}

/// RFC 1123 layout after the weekday and without the zone
const RFC1123_BASE: &str = "%d %b %Y %H:%M:%S";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Publication date layouts, tried in order. First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeFormat {
    /// `Mon, 02 Jan 2006 15:04:05 -0700`
    Rfc1123NumericZone,
    /// `Mon, 02 Jan 2006 15:04:05 MST`
    Rfc1123NamedZone,
    /// `2006-01-02T15:04:05Z07:00`
    Rfc3339,
}

const FORMATS: [TimeFormat; 3] = [
    TimeFormat::Rfc1123NumericZone,
    TimeFormat::Rfc1123NamedZone,
    TimeFormat::Rfc3339,
];

impl TimeFormat {
    fn parse(self, input: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            TimeFormat::Rfc1123NumericZone => {
                let rest = strip_weekday(input)?;
                DateTime::parse_from_str(rest, &format!("{RFC1123_BASE} %z")).ok()
            }
            TimeFormat::Rfc1123NamedZone => {
                let (local, zone) = strip_weekday(input)?.rsplit_once(' ')?;
                let offset = named_zone_offset(zone)?;
                let naive = NaiveDateTime::parse_from_str(local, RFC1123_BASE).ok()?;
                offset.from_local_datetime(&naive).single()
            }
            TimeFormat::Rfc3339 => DateTime::parse_from_rfc3339(input).ok(),
        }
    }
}

/// Drop a leading `"<Day>, "`. The day must be a valid abbreviation but need
/// not agree with the date; feeds get it wrong often enough.
fn strip_weekday(input: &str) -> Option<&str> {
    let (day, rest) = input.split_once(", ")?;
    WEEKDAYS.contains(&day).then_some(rest)
}

/// Zone names defined by RFC 822 section 5.1 get their offset. Any other
/// abbreviation of three to five capital letters (`CEST`, `JST`) is accepted
/// at a zero offset.
fn named_zone_offset(zone: &str) -> Option<FixedOffset> {
    let hours = match zone {
        "UT" | "UTC" | "GMT" | "Z" => 0,
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ if is_zone_abbreviation(zone) => 0,
        _ => return None,
    };
    FixedOffset::east_opt(hours * 3600)
}

fn is_zone_abbreviation(zone: &str) -> bool {
    (3..=5).contains(&zone.len()) && zone.bytes().all(|b| b.is_ascii_uppercase())
}

/// Parse an item's publication date.
///
/// Tries an RFC 1123 date with a numeric offset, then one with a named zone,
/// then RFC 3339, and returns the first that parses. Surrounding whitespace is
/// ignored.
///
/// # Errors
///
/// [`TimeParseError::Unparseable`] naming the input when no layout matches.
pub fn parse_time(input: &str) -> Result<DateTime<FixedOffset>, TimeParseError> {
    let trimmed = input.trim();
    FORMATS
        .iter()
        .find_map(|format| format.parse(trimmed))
        .ok_or_else(|| TimeParseError::Unparseable {
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn utc(input: &str) -> DateTime<Utc> {
        parse_time(input).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_numeric_offset() {
        let parsed = parse_time("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(parsed.to_rfc3339(), "2006-01-02T15:04:05-07:00");
    }

    #[test]
    fn test_named_zone() {
        assert_eq!(
            utc("Mon, 02 Jan 2006 15:04:05 MST"),
            utc("2006-01-02T22:04:05Z")
        );
        assert_eq!(
            utc("Mon, 02 Jan 2006 15:04:05 GMT"),
            utc("2006-01-02T15:04:05Z")
        );
    }

    #[test]
    fn test_rfc3339() {
        let parsed = parse_time("2006-01-02T15:04:05+07:00").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 7 * 3600);
        assert!(parse_time("2024-03-10T08:00:00.123Z").is_ok());
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert!(parse_time("  Mon, 02 Jan 2006 15:04:05 +0000\n").is_ok());
    }

    #[test]
    fn test_numeric_offset_wins_over_later_layouts() {
        let parsed = parse_time("Tue, 10 Jun 2003 04:00:00 +0000").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert_eq!(FORMATS[0], TimeFormat::Rfc1123NumericZone);
        assert!(TimeFormat::Rfc1123NumericZone
            .parse("Tue, 10 Jun 2003 04:00:00 +0000")
            .is_some());
        assert!(TimeFormat::Rfc1123NamedZone
            .parse("Tue, 10 Jun 2003 04:00:00 +0000")
            .is_none());
    }

    #[test]
    fn test_malformed_fails_and_names_input() {
        let err = parse_time("not-a-date").unwrap_err();
        assert_eq!(
            err,
            TimeParseError::Unparseable {
                input: "not-a-date".to_string()
            }
        );
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn test_unknown_zone_abbreviation_is_utc() {
        for zone in ["CEST", "JST", "BST", "AEDT"] {
            let parsed = parse_time(&format!("Mon, 02 Jan 2006 15:04:05 {zone}")).unwrap();
            assert_eq!(parsed.offset().local_minus_utc(), 0, "{zone}");
            assert_eq!(parsed.with_timezone(&Utc), utc("2006-01-02T15:04:05Z"));
        }
    }

    #[test]
    fn test_malformed_zone_fails() {
        assert!(parse_time("Mon, 02 Jan 2006 15:04:05 cest").is_err());
        assert!(parse_time("Mon, 02 Jan 2006 15:04:05 EUROPE").is_err());
        assert!(parse_time("Mon, 02 Jan 2006 15:04:05 C3T").is_err());
    }

    #[test]
    fn test_wrong_weekday_tolerated() {
        // 2006-01-02 was a Monday
        assert_eq!(
            utc("Tue, 02 Jan 2006 15:04:05 -0700"),
            utc("Mon, 02 Jan 2006 15:04:05 -0700")
        );
        assert_eq!(
            utc("Sun, 02 Jan 2006 15:04:05 GMT"),
            utc("2006-01-02T15:04:05Z")
        );
    }

    #[test]
    fn test_invalid_weekday_fails() {
        assert!(parse_time("Mnd, 02 Jan 2006 15:04:05 -0700").is_err());
        assert!(parse_time("Monday, 02 Jan 2006 15:04:05 GMT").is_err());
        assert!(parse_time("02 Jan 2006 15:04:05 GMT").is_err());
    }

    #[test]
    fn test_empty_fails() {
        assert!(parse_time("").is_err());
    }

    proptest! {
        #[test]
        fn parse_time_never_panics(input in "\\PC*") {
            let _ = parse_time(&input);
        }

        #[test]
        fn errors_always_carry_input(input in "[a-z -]{0,30}") {
            if let Err(TimeParseError::Unparseable { input: reported }) = parse_time(&input) {
                prop_assert_eq!(reported, input);
            }
        }
    }
}
