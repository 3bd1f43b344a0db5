//! @ai:module:intent Aggregate epoch range and satellite inventory into the document summary
//! @ai:module:layer application
//! @ai:module:public_api DocumentSummary, SummaryAggregator
//! @ai:module:depends_on event, header, epoch
//! @ai:module:stateless false

use crate::epoch::EpochTime;
use crate::event::{Event, SatelliteId};
use crate::header::Header;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// @ai:intent Document-level facts of an observation file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub version: Option<f64>,
    pub file_type: char,
    pub start_epoch: Option<EpochTime>,
    pub end_epoch: Option<EpochTime>,
    pub total_epochs: usize,
    pub total_satellites: usize,
    /// Distinct satellites per system letter, sorted by identifier
    pub satellites: BTreeMap<char, BTreeSet<SatelliteId>>,
}

/// @ai:intent Running totals over the event stream
#[derive(Debug, Default)]
pub struct SummaryAggregator {
    epochs: usize,
    first: Option<EpochTime>,
    last: Option<EpochTime>,
    satellites: BTreeMap<char, BTreeSet<SatelliteId>>,
}

impl DocumentSummary {
    /// @ai:intent Flatten the inventory into one sorted list
    pub fn all_satellites(&self) -> Vec<SatelliteId> {
        let mut all: Vec<SatelliteId> = self.satellites.values().flatten().copied().collect();
        all.sort();
        all
    }
}

impl SummaryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Update totals from one event
    /// @ai:post first/last follow document order, invalid timestamps included
    pub fn consume(&mut self, event: &Event<'_>) {
        match event {
            Event::EpochStart { time, .. } => {
                self.epochs += 1;
                if self.first.is_none() {
                    self.first = Some(time.clone());
                }
                self.last = Some(time.clone());
            }
            Event::Satellite { id, .. } => {
                self.satellites.entry(id.system).or_default().insert(*id);
            }
            _ => {}
        }
    }

    pub fn epoch_count(&self) -> usize {
        self.epochs
    }

    /// @ai:intent Produce the summary for observation files only
    /// @ai:post None unless the header's file type is `O`
    pub fn finish(self, header: &Header) -> Option<DocumentSummary> {
        let file_type = header.file_type.filter(|_| header.is_observation_file())?;
        let total_satellites = self.satellites.values().map(BTreeSet::len).sum();

        Some(DocumentSummary {
            version: header.version,
            file_type,
            start_epoch: self.first,
            end_epoch: self.last,
            total_epochs: self.epochs,
            total_satellites,
            satellites: self.satellites,
        })
    }
}
