//! @ai:module:intent Turn walker events into categorized annotation spans with hover metadata
//! @ai:module:layer application
//! @ai:module:public_api AnnotationSpan, Hover, Annotations, AnnotationEmitter
//! @ai:module:depends_on event, style, epoch
//! @ai:module:stateless false

use crate::epoch::EpochTime;
use crate::event::{Event, SatelliteId};
use crate::style::{CategorySet, HEADER_LINE};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Range;

/// @ai:intent Tooltip data of an observation value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hover {
    pub satellite: SatelliteId,
    pub epoch: EpochTime,
    pub observation_type: String,
}

/// @ai:intent A categorized column range on one document line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationSpan {
    pub line: usize,
    pub start: usize,
    pub end: usize,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<Hover>,
}

/// @ai:intent Spans grouped by category, each group in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Annotations {
    categories: BTreeMap<String, Vec<AnnotationSpan>>,
}

/// @ai:intent Consumes events and keeps the spans of known categories
pub struct AnnotationEmitter {
    known: CategorySet,
    annotations: Annotations,
}

impl AnnotationSpan {
    pub fn columns(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl Annotations {
    /// @ai:intent Spans of one category, empty for unknown categories
    pub fn spans(&self, category: &str) -> &[AnnotationSpan] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// @ai:intent Check whether a category was registered for this parse
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[AnnotationSpan])> {
        self.categories
            .iter()
            .map(|(name, spans)| (name.as_str(), spans.as_slice()))
    }

    /// @ai:intent Total number of spans over all categories
    pub fn total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// @ai:intent All spans ordered by position, for renderers working line by line
    /// @ai:effects pure
    pub fn by_position(&self) -> Vec<&AnnotationSpan> {
        let mut spans: Vec<&AnnotationSpan> = self.categories.values().flatten().collect();
        spans.sort_by_key(|span| (span.line, span.start, span.end));
        spans
    }
}

impl AnnotationEmitter {
    /// @ai:intent Create an emitter; every known category starts with an empty span list
    pub fn new(known: CategorySet) -> Self {
        let categories = known
            .names()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();

        Self {
            known,
            annotations: Annotations { categories },
        }
    }

    /// @ai:intent Record the span an event produces, if any
    /// @ai:post tokens of unknown categories are skipped silently
    pub fn consume(&mut self, event: &Event<'_>) {
        match event {
            Event::HeaderRecord { line, columns }
            | Event::EpochStart { line, columns, .. }
            | Event::EpochEvent { line, columns, .. }
            | Event::SpecialRecord { line, columns }
            | Event::SatelliteList { line, columns } => {
                self.push(*line, columns, HEADER_LINE, None);
            }
            Event::ObservationType {
                line,
                columns,
                code,
                ..
            } => {
                self.push(*line, columns, code, None);
            }
            Event::Observation {
                satellite,
                time,
                token,
            } => {
                let hover = Hover {
                    satellite: *satellite,
                    epoch: time.clone(),
                    observation_type: token.code.to_string(),
                };
                self.push(token.line, &token.columns, token.code, Some(hover));
            }
            Event::Satellite { .. } | Event::EpochEnd(_) => {}
        }
    }

    pub fn finish(self) -> Annotations {
        self.annotations
    }

    fn push(&mut self, line: usize, columns: &Range<usize>, category: &str, hover: Option<Hover>) {
        if !self.known.contains(category) {
            return;
        }

        if let Some(spans) = self.annotations.categories.get_mut(category) {
            spans.push(AnnotationSpan {
                line,
                start: columns.start,
                end: columns.end,
                category: category.to_string(),
                hover,
            });
        }
    }
}
