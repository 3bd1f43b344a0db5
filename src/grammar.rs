//! @ai:module:intent Fixed-column layout tables for RINEX 2 and RINEX 3 observation files
//! @ai:module:layer domain
//! @ai:module:public_api FormatVersion, RecordKind, FieldLayout, FieldPosition, HeaderLabel, header_label, slice, present_columns
//! @ai:module:stateless true

use serde::Serialize;
use std::ops::Range;

/// Column where the header record label starts
pub const LABEL_COLUMN: usize = 60;
pub const VERSION_COLUMNS: Range<usize> = 0..9;
pub const FILE_TYPE_COLUMNS: Range<usize> = 20..21;
pub const V2_OBS_COUNT_COLUMNS: Range<usize> = 0..6;
pub const V3_OBS_SYSTEM_COLUMNS: Range<usize> = 0..1;
pub const V3_OBS_COUNT_COLUMNS: Range<usize> = 1..6;
pub const V3_SATELLITE_ID_COLUMNS: Range<usize> = 0..3;
pub const V3_EPOCH_MARKER: char = '>';

/// @ai:intent Column layout family selected by the header version number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVersion {
    V2,
    V3,
}

/// @ai:intent Repeated-field records whose entries wrap onto continuation lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    ObsTypeList,
    SatelliteList,
    ObservationValue,
}

/// @ai:intent Geometry of a repeated fixed-width field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    /// Entries per physical line, `None` when the record never wraps
    pub per_line: Option<usize>,
    pub width: usize,
    pub first: usize,
    pub step: usize,
}

/// @ai:intent Location of one entry: lines below the record start, plus its columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPosition {
    pub line_offset: usize,
    pub columns: Range<usize>,
}

/// @ai:intent Header record labels the parser reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLabel {
    VersionType,
    TypesOfObserv,
    SysObsTypes,
    EndOfHeader,
    Other,
}

impl FormatVersion {
    /// @ai:intent Map the decimal header version onto a layout family
    /// @ai:example (2.11) -> V2
    /// @ai:example (3.04) -> V3
    /// @ai:effects pure
    pub fn from_number(version: f64) -> Self {
        if version >= 3.0 {
            FormatVersion::V3
        } else {
            FormatVersion::V2
        }
    }

    /// @ai:intent Look up the repeated-field layout of a record kind
    /// @ai:post None for records that do not exist in this version (v3 has no satellite list)
    /// @ai:effects pure
    pub fn layout(self, kind: RecordKind) -> Option<FieldLayout> {
        match (self, kind) {
            (FormatVersion::V2, RecordKind::ObsTypeList) => Some(FieldLayout {
                per_line: Some(9),
                width: 2,
                first: 10,
                step: 6,
            }),
            (FormatVersion::V2, RecordKind::SatelliteList) => Some(FieldLayout {
                per_line: Some(12),
                width: 3,
                first: 32,
                step: 3,
            }),
            (FormatVersion::V2, RecordKind::ObservationValue) => Some(FieldLayout {
                per_line: Some(5),
                width: 14,
                first: 0,
                step: 16,
            }),
            (FormatVersion::V3, RecordKind::ObsTypeList) => Some(FieldLayout {
                per_line: Some(13),
                width: 3,
                first: 7,
                step: 4,
            }),
            (FormatVersion::V3, RecordKind::SatelliteList) => None,
            (FormatVersion::V3, RecordKind::ObservationValue) => Some(FieldLayout {
                per_line: None,
                width: 14,
                first: 3,
                step: 16,
            }),
        }
    }

    /// @ai:intent Columns holding the compact epoch timestamp
    pub fn epoch_time_columns(self) -> Range<usize> {
        match self {
            FormatVersion::V2 => 1..26,
            FormatVersion::V3 => 2..29,
        }
    }

    /// @ai:intent Column holding the epoch flag
    pub fn epoch_flag_columns(self) -> Range<usize> {
        match self {
            FormatVersion::V2 => 28..29,
            FormatVersion::V3 => 31..32,
        }
    }

    /// @ai:intent Columns holding the satellite (or special record) count of an epoch line
    pub fn satellite_count_columns(self) -> Range<usize> {
        match self {
            FormatVersion::V2 => 29..32,
            FormatVersion::V3 => 32..35,
        }
    }
}

impl FieldLayout {
    /// @ai:intent Locate the entry at `index`, wrapping every `per_line` entries
    /// @ai:example (v2 obs types, 9) -> line_offset 1, columns 10..12
    /// @ai:effects pure
    pub fn position(&self, index: usize) -> FieldPosition {
        let (line_offset, slot) = match self.per_line {
            Some(capacity) => (index / capacity, index % capacity),
            None => (0, index),
        };
        let start = self.first + self.step * slot;

        FieldPosition {
            line_offset,
            columns: start..start + self.width,
        }
    }

    /// @ai:intent Number of physical lines occupied by `count` entries
    /// @ai:post exact multiples of the capacity never add an extra line
    /// @ai:effects pure
    pub fn lines_for(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }

        match self.per_line {
            Some(capacity) => count.div_ceil(capacity),
            None => 1,
        }
    }
}

/// @ai:intent Classify a line as a labeled header record
/// @ai:post None for lines of 60 characters or fewer
/// @ai:effects pure
pub fn header_label(line: &str) -> Option<HeaderLabel> {
    if line.len() <= LABEL_COLUMN {
        return None;
    }

    let label = line.get(LABEL_COLUMN..)?;

    let kind = if label.contains("RINEX VERSION / TYPE") {
        HeaderLabel::VersionType
    } else if label.contains("# / TYPES OF OBSERV") {
        HeaderLabel::TypesOfObserv
    } else if label.contains("SYS / # / OBS TYPES") {
        HeaderLabel::SysObsTypes
    } else if label.contains("END OF HEADER") {
        HeaderLabel::EndOfHeader
    } else {
        HeaderLabel::Other
    };

    Some(kind)
}

/// @ai:intent Clip a column range to what the line actually contains
/// @ai:post None when the line ends at or before the range start
/// @ai:effects pure
pub fn present_columns(line: &str, columns: &Range<usize>) -> Option<Range<usize>> {
    if line.len() <= columns.start {
        return None;
    }

    let end = columns.end.min(line.len());
    line.get(columns.start..end)?;
    Some(columns.start..end)
}

/// @ai:intent Slice a fixed-column field, tolerating short lines
/// @ai:effects pure
pub fn slice<'a>(line: &'a str, columns: &Range<usize>) -> Option<&'a str> {
    let present = present_columns(line, columns)?;
    line.get(present)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_threshold() {
        assert_eq!(FormatVersion::from_number(2.11), FormatVersion::V2);
        assert_eq!(FormatVersion::from_number(3.0), FormatVersion::V3);
        assert_eq!(FormatVersion::from_number(3.05), FormatVersion::V3);
        assert_eq!(FormatVersion::from_number(f64::NAN), FormatVersion::V2);
    }

    #[test]
    fn test_v2_obs_type_offsets() {
        let layout = FormatVersion::V2.layout(RecordKind::ObsTypeList).unwrap();
        assert_eq!(layout.position(0).columns, 10..12);
        assert_eq!(layout.position(1).columns, 16..18);
        assert_eq!(layout.position(8).columns, 58..60);

        let wrapped = layout.position(9);
        assert_eq!(wrapped.line_offset, 1);
        assert_eq!(wrapped.columns, 10..12);
    }

    #[test]
    fn test_v2_satellite_and_observation_offsets() {
        let satellites = FormatVersion::V2.layout(RecordKind::SatelliteList).unwrap();
        assert_eq!(satellites.position(0).columns, 32..35);
        assert_eq!(satellites.position(11).columns, 65..68);
        assert_eq!(satellites.position(12).line_offset, 1);

        let values = FormatVersion::V2.layout(RecordKind::ObservationValue).unwrap();
        assert_eq!(values.position(0).columns, 0..14);
        assert_eq!(values.position(4).columns, 64..78);
        assert_eq!(values.position(5).line_offset, 1);
        assert_eq!(values.position(5).columns, 0..14);
    }

    #[test]
    fn test_v3_offsets() {
        let types = FormatVersion::V3.layout(RecordKind::ObsTypeList).unwrap();
        assert_eq!(types.position(0).columns, 7..10);
        assert_eq!(types.position(12).columns, 55..58);
        assert_eq!(types.position(13).line_offset, 1);

        let values = FormatVersion::V3.layout(RecordKind::ObservationValue).unwrap();
        assert_eq!(values.position(0).columns, 3..17);
        assert_eq!(values.position(20).columns, 323..337);
        assert_eq!(values.position(20).line_offset, 0);

        assert!(FormatVersion::V3.layout(RecordKind::SatelliteList).is_none());
    }

    #[test]
    fn test_lines_for_exact_multiples() {
        let v2 = FormatVersion::V2.layout(RecordKind::ObsTypeList).unwrap();
        assert_eq!(v2.lines_for(9), 1);
        assert_eq!(v2.lines_for(10), 2);
        assert_eq!(v2.lines_for(18), 2);

        let v3 = FormatVersion::V3.layout(RecordKind::ObsTypeList).unwrap();
        assert_eq!(v3.lines_for(13), 1);
        assert_eq!(v3.lines_for(26), 2);
        assert_eq!(v3.lines_for(0), 0);
    }

    #[test]
    fn test_header_label_requires_label_column() {
        let version = format!("{:<60}{}", "     2.11           OBSERVATION DATA    M (MIXED)", "RINEX VERSION / TYPE");
        assert_eq!(header_label(&version), Some(HeaderLabel::VersionType));

        let end = format!("{:<60}{}", "", "END OF HEADER");
        assert_eq!(header_label(&end), Some(HeaderLabel::EndOfHeader));

        assert_eq!(header_label("END OF HEADER"), None);
        assert_eq!(header_label(&"x".repeat(60)), None);
    }

    #[test]
    fn test_slice_short_lines() {
        assert_eq!(slice("abcdef", &(2..4)), Some("cd"));
        assert_eq!(slice("abc", &(2..10)), Some("c"));
        assert_eq!(slice("abc", &(3..5)), None);
        assert_eq!(present_columns("abcdef", &(4..10)), Some(4..6));
    }
}
