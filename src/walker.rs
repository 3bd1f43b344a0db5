//! @ai:module:intent Walk the observation body of a RINEX file as an explicit state machine
//! @ai:module:layer application
//! @ai:module:public_api Walker, WalkState
//! @ai:module:depends_on grammar, epoch, header, event
//! @ai:module:stateless false

use crate::epoch::{decode, EpochTime};
use crate::event::{Epoch, EpochFlag, Event, ObservationToken, SatelliteId, SatelliteRecord};
use crate::grammar::{
    present_columns, slice, FieldLayout, FormatVersion, RecordKind, V3_EPOCH_MARKER,
    V3_SATELLITE_ID_COLUMNS,
};
use crate::header::{Header, ObservationTypeTable};
use std::collections::VecDeque;

/// @ai:intent Cursor state of the body walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    AwaitingEpoch,
    /// RINEX 2: epoch line under the cursor, `expected` satellites to read
    ReadingSatellites { expected: usize },
    /// RINEX 2: observation lines of satellite `satellite` under the cursor
    ReadingObservations { satellite: usize },
    /// RINEX 3: one satellite row per line until the next `>`
    ReadingBody,
    /// Special records announced by an event flag
    SkippingSpecial { remaining: usize },
    Done,
}

/// @ai:intent Iterator over body events, in document order
pub struct Walker<'a> {
    lines: &'a [&'a str],
    version: FormatVersion,
    table: &'a ObservationTypeTable,
    cursor: usize,
    state: WalkState,
    ordinal: usize,
    current: Option<Epoch<'a>>,
    /// RINEX 2 satellite list of the current epoch; `None` for unreadable entries
    slots: Vec<Option<usize>>,
    pending: VecDeque<Event<'a>>,
}

impl<'a> Walker<'a> {
    /// @ai:intent Start a walk at the first body line of a parsed header
    /// @ai:post a header without END OF HEADER or of a non-observation type yields no events
    pub fn new(lines: &'a [&'a str], header: &'a Header) -> Self {
        let (cursor, state) = match header.body_start {
            Some(start) if header.has_observation_body() => (start, WalkState::AwaitingEpoch),
            _ => (lines.len(), WalkState::Done),
        };

        Self::starting_at(
            lines,
            header.format_version(),
            &header.observation_types,
            cursor,
            state,
        )
    }

    /// @ai:intent Start a walk at an arbitrary line and state
    pub fn starting_at(
        lines: &'a [&'a str],
        version: FormatVersion,
        table: &'a ObservationTypeTable,
        cursor: usize,
        state: WalkState,
    ) -> Self {
        Self {
            lines,
            version,
            table,
            cursor,
            state,
            ordinal: 0,
            current: None,
            slots: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// @ai:intent Advance the state machine by one transition
    /// @ai:post returns false once the walk is done and every epoch has been closed
    pub fn step(&mut self) -> bool {
        match self.state {
            WalkState::AwaitingEpoch => self.await_epoch(),
            WalkState::ReadingSatellites { expected } => self.read_satellites(expected),
            WalkState::ReadingObservations { satellite } => self.read_observations(satellite),
            WalkState::ReadingBody => self.read_body_line(),
            WalkState::SkippingSpecial { remaining } => self.skip_special(remaining),
            WalkState::Done => return false,
        }
        true
    }

    fn await_epoch(&mut self) {
        self.close_epoch();

        let Some(&line) = self.lines.get(self.cursor) else {
            self.state = WalkState::Done;
            return;
        };

        match self.version {
            FormatVersion::V2 => {
                if line.is_empty() {
                    tracing::trace!("Empty line {} ends the RINEX 2 body", self.cursor);
                    self.state = WalkState::Done;
                    return;
                }
                self.start_epoch(line);
            }
            FormatVersion::V3 => {
                if line.starts_with(V3_EPOCH_MARKER) {
                    self.start_epoch(line);
                } else {
                    self.cursor += 1;
                }
            }
        }
    }

    /// Epoch line under the cursor: either a regular epoch or an event announcement.
    fn start_epoch(&mut self, line: &'a str) {
        let line_index = self.cursor;
        let flag = EpochFlag::parse(slice(line, &self.version.epoch_flag_columns()));
        let count = slice(line, &self.version.satellite_count_columns())
            .and_then(|c| c.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if flag.is_event() {
            self.pending.push_back(Event::EpochEvent {
                line: line_index,
                columns: 0..line.len(),
                flag,
            });
            self.cursor += 1;
            self.state = WalkState::SkippingSpecial { remaining: count };
            return;
        }

        let time = slice(line, &self.version.epoch_time_columns())
            .map(|text| decode(self.version, text))
            .unwrap_or_else(|| EpochTime::Invalid { raw: String::new() });

        self.ordinal += 1;
        tracing::trace!("Epoch {} at line {}: {}", self.ordinal, line_index, time);

        self.pending.push_back(Event::EpochStart {
            line: line_index,
            columns: 0..line.len(),
            ordinal: self.ordinal,
            time: time.clone(),
            flag,
        });
        self.current = Some(Epoch {
            ordinal: self.ordinal,
            line: line_index,
            time,
            flag,
            satellites: Vec::new(),
        });

        match self.version {
            FormatVersion::V2 => self.state = WalkState::ReadingSatellites { expected: count },
            FormatVersion::V3 => {
                self.cursor += 1;
                self.state = WalkState::ReadingBody;
            }
        }
    }

    fn read_satellites(&mut self, expected: usize) {
        let Some(layout) = self.version.layout(RecordKind::SatelliteList) else {
            self.state = WalkState::ReadingBody;
            return;
        };

        let first_line = self.cursor;
        let span = layout.lines_for(expected).max(1);
        let mut last_offset = 0;
        self.slots.clear();

        for index in 0..expected {
            let position = layout.position(index);
            let line_index = first_line + position.line_offset;
            let Some(&line) = self.lines.get(line_index) else {
                break;
            };

            if position.line_offset != last_offset {
                last_offset = position.line_offset;
                self.pending.push_back(Event::SatelliteList {
                    line: line_index,
                    columns: 0..line.len(),
                });
            }

            let id = slice(line, &position.columns).and_then(SatelliteId::parse);
            let slot = id.map(|id| {
                self.pending.push_back(Event::Satellite {
                    line: line_index,
                    columns: position.columns.clone(),
                    id,
                });
                self.record_satellite(id)
            });
            self.slots.push(slot);
        }

        self.cursor = (first_line + span).min(self.lines.len());
        self.state = WalkState::ReadingObservations { satellite: 0 };
    }

    fn read_observations(&mut self, satellite: usize) {
        if satellite >= self.slots.len() {
            self.state = WalkState::AwaitingEpoch;
            return;
        }

        let Some(layout) = self.version.layout(RecordKind::ObservationValue) else {
            self.state = WalkState::AwaitingEpoch;
            return;
        };

        let table = self.table;
        let codes = table.codes_for(self.version, 'G').unwrap_or(&[]);
        let first_line = self.cursor;

        if let Some(record) = self.slots[satellite] {
            for (index, code) in codes.iter().enumerate() {
                let position = layout.position(index);
                let line_index = first_line + position.line_offset;
                if let Some(&line) = self.lines.get(line_index) {
                    self.emit_observation(line, line_index, &layout, index, code, record);
                }
            }
        }

        self.cursor = (first_line + layout.lines_for(codes.len())).min(self.lines.len());
        self.state = WalkState::ReadingObservations {
            satellite: satellite + 1,
        };
    }

    fn read_body_line(&mut self) {
        let Some(&line) = self.lines.get(self.cursor) else {
            self.state = WalkState::AwaitingEpoch;
            return;
        };

        if line.starts_with(V3_EPOCH_MARKER) {
            self.state = WalkState::AwaitingEpoch;
            return;
        }

        let line_index = self.cursor;
        self.cursor += 1;

        let Some(id) = slice(line, &V3_SATELLITE_ID_COLUMNS).and_then(SatelliteId::parse) else {
            return;
        };

        self.pending.push_back(Event::Satellite {
            line: line_index,
            columns: V3_SATELLITE_ID_COLUMNS.start..V3_SATELLITE_ID_COLUMNS.end.min(line.len()),
            id,
        });
        let record = self.record_satellite(id);

        let table = self.table;
        let (Some(layout), Some(codes)) = (
            self.version.layout(RecordKind::ObservationValue),
            table.codes_for(self.version, id.system),
        ) else {
            return;
        };

        for (index, code) in codes.iter().enumerate() {
            self.emit_observation(line, line_index, &layout, index, code, record);
        }
    }

    fn skip_special(&mut self, remaining: usize) {
        let Some(&line) = self.lines.get(self.cursor) else {
            self.state = WalkState::AwaitingEpoch;
            return;
        };

        if remaining == 0 {
            self.state = WalkState::AwaitingEpoch;
            return;
        }

        self.pending.push_back(Event::SpecialRecord {
            line: self.cursor,
            columns: 0..line.len(),
        });
        self.cursor += 1;
        self.state = WalkState::SkippingSpecial {
            remaining: remaining - 1,
        };
    }

    /// Adds a satellite to the current epoch and returns its record index.
    fn record_satellite(&mut self, id: SatelliteId) -> usize {
        match self.current.as_mut() {
            Some(epoch) => {
                epoch.satellites.push(SatelliteRecord {
                    id,
                    observations: Vec::new(),
                });
                epoch.satellites.len() - 1
            }
            None => 0,
        }
    }

    fn emit_observation(
        &mut self,
        line: &'a str,
        line_index: usize,
        layout: &FieldLayout,
        index: usize,
        code: &'a str,
        record: usize,
    ) {
        let position = layout.position(index);
        let Some(columns) = present_columns(line, &position.columns) else {
            return;
        };
        let Some(epoch) = self.current.as_mut() else {
            return;
        };
        let Some(satellite) = epoch.satellites.get_mut(record) else {
            return;
        };

        let token = ObservationToken {
            code,
            line: line_index,
            columns: columns.clone(),
            raw: &line[columns],
        };
        satellite.observations.push(token.clone());

        self.pending.push_back(Event::Observation {
            satellite: satellite.id,
            time: epoch.time.clone(),
            token,
        });
    }

    fn close_epoch(&mut self) {
        if let Some(epoch) = self.current.take() {
            self.slots.clear();
            self.pending.push_back(Event::EpochEnd(epoch));
        }
    }
}

impl<'a> Iterator for Walker<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if !self.step() {
                return None;
            }
        }
    }
}
