//! @ai:module:intent Events and records produced by the header reader and the body walker
//! @ai:module:layer domain
//! @ai:module:public_api Event, Epoch, EpochFlag, SatelliteId, SatelliteRecord, ObservationToken
//! @ai:module:depends_on epoch
//! @ai:module:stateless true

use crate::epoch::EpochTime;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Range;

/// @ai:intent One structural fact found during the forward pass, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    /// Labeled header record; columns cover the label
    HeaderRecord { line: usize, columns: Range<usize> },
    /// Observation-type code declared in the header
    ObservationType {
        line: usize,
        columns: Range<usize>,
        system: char,
        code: &'a str,
    },
    EpochStart {
        line: usize,
        columns: Range<usize>,
        ordinal: usize,
        time: EpochTime,
        flag: EpochFlag,
    },
    /// Epoch line carrying an event flag (2-5) instead of observations
    EpochEvent {
        line: usize,
        columns: Range<usize>,
        flag: EpochFlag,
    },
    /// Header-style record following an event flag
    SpecialRecord { line: usize, columns: Range<usize> },
    /// Continuation line of a RINEX 2 satellite list
    SatelliteList { line: usize, columns: Range<usize> },
    Satellite {
        line: usize,
        columns: Range<usize>,
        id: SatelliteId,
    },
    Observation {
        satellite: SatelliteId,
        time: EpochTime,
        token: ObservationToken<'a>,
    },
    /// Emitted once the last record of an epoch has been read
    EpochEnd(Epoch<'a>),
}

/// @ai:intent Epoch flag from the epoch line (0 = ok, 1 = power failure, 2-5 = events, 6 = cycle slips)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct EpochFlag(pub u8);

/// @ai:intent Satellite system letter plus PRN, displayed as `G01`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SatelliteId {
    pub system: char,
    pub prn: u8,
}

/// @ai:intent One satellite's observations within an epoch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteRecord<'a> {
    pub id: SatelliteId,
    pub observations: Vec<ObservationToken<'a>>,
}

/// @ai:intent Raw observation value token and where it sits in the document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationToken<'a> {
    pub code: &'a str,
    pub line: usize,
    pub columns: Range<usize>,
    pub raw: &'a str,
}

/// @ai:intent A completed epoch: timestamp, order of appearance and observed satellites
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Epoch<'a> {
    pub ordinal: usize,
    pub line: usize,
    pub time: EpochTime,
    pub flag: EpochFlag,
    pub satellites: Vec<SatelliteRecord<'a>>,
}

impl EpochFlag {
    /// @ai:intent Read the flag digit, treating blank or garbage as 0
    /// @ai:effects pure
    pub fn parse(field: Option<&str>) -> Self {
        let value = field
            .and_then(|f| f.trim().parse::<u8>().ok())
            .unwrap_or(0);
        Self(value)
    }

    /// @ai:intent Check whether the epoch line announces special records instead of observations
    pub fn is_event(self) -> bool {
        (2..=5).contains(&self.0)
    }
}

impl SatelliteId {
    /// @ai:intent Parse a 3-column satellite field such as `G01`, `R 5` or ` 12`
    /// @ai:post blank system letter means GPS
    /// @ai:example ("G01") -> Some(G01)
    /// @ai:example (" 7") -> Some(G07)
    /// @ai:example ("   ") -> None
    /// @ai:effects pure
    pub fn parse(field: &str) -> Option<Self> {
        if field.trim().is_empty() {
            return None;
        }

        let mut chars = field.chars();
        let system = match chars.next()? {
            ' ' => 'G',
            c if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => return None,
        };
        let prn = chars.as_str().trim().parse::<u8>().ok()?;

        if prn > 99 {
            return None;
        }

        Some(Self { system, prn })
    }
}

impl fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.system, self.prn)
    }
}

impl Serialize for SatelliteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_satellite_ids() {
        assert_eq!(SatelliteId::parse("G01").unwrap().to_string(), "G01");
        assert_eq!(SatelliteId::parse("R 5").unwrap().to_string(), "R05");
        assert_eq!(SatelliteId::parse(" 12").unwrap().to_string(), "G12");
        assert_eq!(SatelliteId::parse("E1").unwrap().to_string(), "E01");
        assert_eq!(SatelliteId::parse("   "), None);
        assert_eq!(SatelliteId::parse("G"), None);
        assert_eq!(SatelliteId::parse("1.5"), None);
    }

    #[test]
    fn test_satellite_order_matches_string_order() {
        let mut ids = vec![
            SatelliteId::parse("G12").unwrap(),
            SatelliteId::parse("E03").unwrap(),
            SatelliteId::parse("G02").unwrap(),
        ];
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(rendered, vec!["E03", "G02", "G12"]);
    }

    #[test]
    fn test_epoch_flag() {
        assert_eq!(EpochFlag::parse(Some("0")), EpochFlag(0));
        assert_eq!(EpochFlag::parse(Some(" ")), EpochFlag(0));
        assert_eq!(EpochFlag::parse(None), EpochFlag(0));
        assert!(EpochFlag::parse(Some("4")).is_event());
        assert!(!EpochFlag::parse(Some("6")).is_event());
        assert!(!EpochFlag(1).is_event());
    }
}
