//! @ai:module:intent Read RINEX header records and build the observation-type table
//! @ai:module:layer application
//! @ai:module:public_api Header, ObservationTypeTable, read_header
//! @ai:module:depends_on grammar, event
//! @ai:module:stateless true

use crate::event::Event;
use crate::grammar::{
    header_label, present_columns, slice, FormatVersion, HeaderLabel, RecordKind, FILE_TYPE_COLUMNS,
    LABEL_COLUMN, V2_OBS_COUNT_COLUMNS, V3_OBS_COUNT_COLUMNS, V3_OBS_SYSTEM_COLUMNS,
    VERSION_COLUMNS,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// RINEX 2 observation types are declared once and apply to every system.
const V2_SYSTEM: char = 'G';

/// @ai:intent Ordered observation-type codes per GNSS system letter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservationTypeTable {
    systems: BTreeMap<char, Vec<String>>,
}

/// @ai:intent Facts read from the header section
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Header {
    pub version: Option<f64>,
    pub file_type: Option<char>,
    pub observation_types: ObservationTypeTable,
    /// First line after END OF HEADER
    pub body_start: Option<usize>,
}

impl ObservationTypeTable {
    /// @ai:intent Codes declared for a system, in column order
    pub fn codes(&self, system: char) -> Option<&[String]> {
        self.systems.get(&system).map(Vec::as_slice)
    }

    /// @ai:intent Codes governing a satellite's observations under the given layout
    /// @ai:post RINEX 2 always answers with the GPS list
    pub fn codes_for(&self, version: FormatVersion, system: char) -> Option<&[String]> {
        match version {
            FormatVersion::V2 => self.codes(V2_SYSTEM),
            FormatVersion::V3 => self.codes(system),
        }
    }

    pub fn insert(&mut self, system: char, codes: Vec<String>) {
        self.systems.insert(system, codes);
    }
}

impl Header {
    /// @ai:intent Layout used for the body; version 2 when the version record is missing
    pub fn format_version(&self) -> FormatVersion {
        self.version
            .map(FormatVersion::from_number)
            .unwrap_or(FormatVersion::V2)
    }

    /// @ai:intent Check the file-type marker for observation data
    pub fn is_observation_file(&self) -> bool {
        self.file_type == Some('O')
    }

    /// @ai:intent Decide whether the body should be walked at all
    /// @ai:post false without END OF HEADER or for non-observation file types
    pub fn has_observation_body(&self) -> bool {
        self.body_start.is_some() && matches!(self.file_type, None | Some('O'))
    }
}

/// @ai:intent Scan header records up to END OF HEADER
/// @ai:post events contain one HeaderRecord per labeled line and one ObservationType per declared code
/// @ai:effects pure
pub fn read_header<'a>(lines: &[&'a str]) -> (Header, Vec<Event<'a>>) {
    let mut header = Header::default();
    let mut events = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];

        let Some(label) = header_label(line) else {
            index += 1;
            continue;
        };

        events.push(label_event(index, line));

        match label {
            HeaderLabel::VersionType => {
                header.version = slice(line, &VERSION_COLUMNS).and_then(|v| v.trim().parse().ok());
                header.file_type = slice(line, &FILE_TYPE_COLUMNS)
                    .and_then(|t| t.chars().next())
                    .filter(|c| !c.is_whitespace());
                tracing::debug!(
                    "RINEX version {:?}, file type {:?}",
                    header.version,
                    header.file_type
                );
                index += 1;
            }
            HeaderLabel::TypesOfObserv => {
                let count = read_count(line, &V2_OBS_COUNT_COLUMNS);
                let (codes, consumed) =
                    read_codes(lines, index, count, FormatVersion::V2, V2_SYSTEM, &mut events);
                header.observation_types.insert(V2_SYSTEM, codes);
                index += consumed;
            }
            HeaderLabel::SysObsTypes => {
                let system = slice(line, &V3_OBS_SYSTEM_COLUMNS)
                    .and_then(|s| s.chars().next())
                    .filter(|c| !c.is_whitespace());
                let count = read_count(line, &V3_OBS_COUNT_COLUMNS);
                let (codes, consumed) = read_codes(
                    lines,
                    index,
                    count,
                    FormatVersion::V3,
                    system.unwrap_or(' '),
                    &mut events,
                );
                if let Some(system) = system {
                    header.observation_types.insert(system, codes);
                }
                index += consumed;
            }
            HeaderLabel::EndOfHeader => {
                header.body_start = Some(index + 1);
                break;
            }
            HeaderLabel::Other => index += 1,
        }
    }

    tracing::debug!(
        "Header read: {} observation-type systems, body starts at {:?}",
        header.observation_types.systems.len(),
        header.body_start
    );

    (header, events)
}

fn label_event<'a>(line_index: usize, line: &str) -> Event<'a> {
    Event::HeaderRecord {
        line: line_index,
        columns: LABEL_COLUMN..line.len(),
    }
}

fn read_count(line: &str, columns: &std::ops::Range<usize>) -> usize {
    slice(line, columns)
        .and_then(|c| c.trim().parse().ok())
        .unwrap_or(0)
}

/// @ai:intent Read `count` codes starting on line `start`, following continuation lines
/// @ai:post returns the codes and the number of lines consumed (at least 1)
/// @ai:post missing slots keep their position as empty codes
/// @ai:effects pure
fn read_codes<'a>(
    lines: &[&'a str],
    start: usize,
    count: usize,
    version: FormatVersion,
    system: char,
    events: &mut Vec<Event<'a>>,
) -> (Vec<String>, usize) {
    let Some(layout) = version.layout(RecordKind::ObsTypeList) else {
        return (Vec::new(), 1);
    };

    let consumed = layout.lines_for(count).max(1).min(lines.len() - start);
    let mut codes = Vec::with_capacity(count);
    let mut last_offset = 0;

    for index in 0..count {
        let position = layout.position(index);
        let line_index = start + position.line_offset;
        let Some(&line) = lines.get(line_index) else {
            break;
        };

        if position.line_offset != last_offset {
            last_offset = position.line_offset;
            if header_label(line).is_some() {
                events.push(label_event(line_index, line));
            }
        }

        let code = present_columns(line, &position.columns)
            .map(|columns| (line[columns.clone()].trim(), columns));

        match code {
            Some((text, columns)) if !text.is_empty() => {
                let offset = line[columns.clone()].find(text).unwrap_or(0);
                let start_column = columns.start + offset;
                events.push(Event::ObservationType {
                    line: line_index,
                    columns: start_column..start_column + text.len(),
                    system,
                    code: text,
                });
                codes.push(text.to_string());
            }
            _ => codes.push(String::new()),
        }
    }

    (codes, consumed)
}
