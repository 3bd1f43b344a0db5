//! @ai:module:intent Decode the compact RINEX 2 and RINEX 3 epoch timestamps into UTC
//! @ai:module:layer domain
//! @ai:module:public_api EpochTime, decode, decode_v2, decode_v3
//! @ai:module:depends_on grammar
//! @ai:module:stateless true

use crate::grammar::{slice, FormatVersion};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Range;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// @ai:intent Decoded epoch timestamp, or the sentinel for text that did not decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpochTime {
    Valid(NaiveDateTime),
    Invalid { raw: String },
}

/// Column positions inside the timestamp text, relative to its first column.
struct DateFields {
    year: Range<usize>,
    month: Range<usize>,
    day: Range<usize>,
    hour: Range<usize>,
    minute: Range<usize>,
    second: Range<usize>,
    century: i32,
}

const V2_FIELDS: DateFields = DateFields {
    year: 0..2,
    month: 3..5,
    day: 6..8,
    hour: 9..11,
    minute: 12..14,
    second: 14..25,
    century: 2000,
};

const V3_FIELDS: DateFields = DateFields {
    year: 0..4,
    month: 5..7,
    day: 8..10,
    hour: 11..13,
    minute: 14..16,
    second: 16..27,
    century: 0,
};

impl EpochTime {
    /// @ai:intent Check whether the timestamp decoded
    pub fn is_valid(&self) -> bool {
        matches!(self, EpochTime::Valid(_))
    }
}

impl fmt::Display for EpochTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpochTime::Valid(dt) => write!(f, "{}", dt.format(DISPLAY_FORMAT)),
            EpochTime::Invalid { .. } => f.write_str("Invalid Date"),
        }
    }
}

impl Serialize for EpochTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// @ai:intent Decode the timestamp text of an epoch line for the given layout
/// @ai:pre text is the epoch-time column slice of the epoch line
/// @ai:effects pure
pub fn decode(version: FormatVersion, text: &str) -> EpochTime {
    match version {
        FormatVersion::V2 => decode_v2(text),
        FormatVersion::V3 => decode_v3(text),
    }
}

/// @ai:intent Decode `yy mm dd hh mm ss.sssssss`, always in the 2000s
/// @ai:example ("06  6 21  0  0  0.0000000") -> 2006-06-21 00:00:00.000
/// @ai:effects pure
pub fn decode_v2(text: &str) -> EpochTime {
    decode_with(text, &V2_FIELDS)
}

/// @ai:intent Decode `yyyy mm dd hh mm ss.sssssss`
/// @ai:example ("2020 06 22 00 00  0.0000000") -> 2020-06-22 00:00:00.000
/// @ai:effects pure
pub fn decode_v3(text: &str) -> EpochTime {
    decode_with(text, &V3_FIELDS)
}

fn decode_with(text: &str, fields: &DateFields) -> EpochTime {
    match to_datetime(text, fields) {
        Some(dt) => EpochTime::Valid(dt),
        None => EpochTime::Invalid {
            raw: text.to_string(),
        },
    }
}

fn to_datetime(text: &str, fields: &DateFields) -> Option<NaiveDateTime> {
    let year = fields.century + number::<i32>(text, &fields.year)?;
    let month = number::<u32>(text, &fields.month)?;
    let day = number::<u32>(text, &fields.day)?;
    let hour = number::<u32>(text, &fields.hour)?;
    let minute = number::<u32>(text, &fields.minute)?;
    let seconds = number::<f64>(text, &fields.second)?;

    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    let start_of_minute = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    let offset = Duration::nanoseconds((seconds * 1e9).round() as i64);

    start_of_minute.checked_add_signed(offset)
}

fn number<T: std::str::FromStr>(text: &str, columns: &Range<usize>) -> Option<T> {
    slice(text, columns)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_v2_epoch() {
        let epoch = decode_v2("06  6 21  0  0  0.0000000");
        assert!(epoch.is_valid());
        assert_eq!(epoch.to_string(), "2006-06-21 00:00:00.000");
    }

    #[test]
    fn test_decode_v2_two_digit_year_has_no_pivot() {
        let epoch = decode_v2("99 12 31 23 59 59.0000000");
        assert_eq!(epoch.to_string(), "2099-12-31 23:59:59.000");
    }

    #[test]
    fn test_decode_v3_epoch() {
        let epoch = decode_v3("2020 06 22 00 00  0.0000000");
        assert_eq!(epoch.to_string(), "2020-06-22 00:00:00.000");
    }

    #[test]
    fn test_decode_keeps_fractional_seconds() {
        let epoch = decode_v3("2021 01 02 03 04 30.5000000");
        assert_eq!(epoch.to_string(), "2021-01-02 03:04:30.500");
    }

    #[test]
    fn test_decode_invalid_fields_yield_sentinel() {
        let epoch = decode_v3("2020 13 22 00 00  0.0000000");
        assert_eq!(
            epoch,
            EpochTime::Invalid {
                raw: "2020 13 22 00 00  0.0000000".to_string()
            }
        );
        assert_eq!(epoch.to_string(), "Invalid Date");

        assert!(!decode_v2("").is_valid());
        assert!(!decode_v2("xx  6 21  0  0  0.0000000").is_valid());
    }

    #[test]
    fn test_decode_dispatches_by_version() {
        assert_eq!(
            decode(FormatVersion::V2, "20  6 21  0  0  0.0000000").to_string(),
            "2020-06-21 00:00:00.000"
        );
        assert_eq!(
            decode(FormatVersion::V3, "2020 06 21 00 00  0.0000000").to_string(),
            "2020-06-21 00:00:00.000"
        );
    }

    #[test]
    fn test_serializes_as_display_string() {
        let epoch = decode_v3("2020 06 22 00 00  0.0000000");
        assert_eq!(
            serde_json::to_string(&epoch).unwrap(),
            "\"2020-06-22 00:00:00.000\""
        );
    }
}
