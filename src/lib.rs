//! @ai:module:intent RINEX observation file parser producing annotation spans and a document summary
//! @ai:module:layer application
//! @ai:module:public_api parse, parse_with_style, ParsedDocument, Position, document_lines
//! @ai:module:depends_on header, walker, annotation, summary, style
//! @ai:module:stateless true
//!
//! # rinex-lens
//!
//! Reads RINEX 2.x and 3.x observation files from a text snapshot and reports
//! which column ranges hold which observable, plus the epoch range and the
//! satellites observed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rinex_lens::{output, scan, StyleTable};
//! use std::path::Path;
//!
//! let scanned = scan::scan_file(Path::new("abmf0010.21o"), &StyleTable::default()).unwrap();
//! if let Some(summary) = &scanned.document.summary {
//!     println!("{}", output::summary_markdown(summary));
//! }
//! ```

pub mod annotation;
pub mod config;
pub mod detect;
pub mod epoch;
pub mod error;
pub mod event;
pub mod grammar;
pub mod header;
pub mod output;
pub mod scan;
pub mod style;
pub mod summary;
pub mod walker;

pub use annotation::{AnnotationEmitter, AnnotationSpan, Annotations, Hover};
pub use config::{Config, ScanConfig};
pub use detect::FileDetector;
pub use epoch::EpochTime;
pub use error::{Error, Result};
pub use event::{Event, SatelliteId};
pub use grammar::FormatVersion;
pub use header::{read_header, Header};
pub use output::OutputFormat;
pub use scan::{scan_directory, scan_file, ScannedFile};
pub use style::{CategorySet, StyleTable, HEADER_LINE};
pub use summary::{DocumentSummary, SummaryAggregator};
pub use walker::Walker;

use serde::Serialize;

/// @ai:intent A line/column position in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// @ai:intent Everything one parse produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    pub header: Header,
    pub annotations: Annotations,
    pub summary: Option<DocumentSummary>,
    /// End of the last line, where the summary is shown
    pub summary_anchor: Position,
}

/// @ai:intent Split text into lines the way an editor numbers them
/// @ai:post a trailing newline yields a final empty line; `\r` is stripped
/// @ai:effects pure
pub fn document_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// @ai:intent Parse a document with the built-in style table
/// @ai:effects pure
pub fn parse(text: &str) -> ParsedDocument {
    parse_with_style(text, &StyleTable::default())
}

/// @ai:intent Parse a document snapshot into spans and summary
/// @ai:post never fails; malformed content yields fewer spans
/// @ai:effects pure
pub fn parse_with_style(text: &str, style: &StyleTable) -> ParsedDocument {
    let lines = document_lines(text);
    let (header, header_events) = read_header(&lines);

    let version = header.format_version();
    let mut emitter = AnnotationEmitter::new(style.categories(version));
    let mut aggregator = SummaryAggregator::new();

    for event in header_events.into_iter().chain(Walker::new(&lines, &header)) {
        emitter.consume(&event);
        aggregator.consume(&event);
    }

    let epochs = aggregator.epoch_count();
    let annotations = emitter.finish();
    let summary = aggregator.finish(&header);
    tracing::debug!(
        "Parsed {} lines: {} epochs, {} spans",
        lines.len(),
        epochs,
        annotations.total()
    );

    let summary_anchor = Position {
        line: lines.len().saturating_sub(1),
        column: lines.last().map_or(0, |line| line.len()),
    };

    ParsedDocument {
        header,
        annotations,
        summary,
        summary_anchor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn record(content: &str, label: &str) -> String {
        format!("{:<60}{}", content, label)
    }

    fn v2_file() -> String {
        [
            record("     2.11           OBSERVATION DATA    G (GPS)", "RINEX VERSION / TYPE"),
            record("     3    C1    L1    P1", "# / TYPES OF OBSERV"),
            record("", "END OF HEADER"),
            " 06  6 21  0  0  0.0000000  0  1G01".to_string(),
            "  20000000.123 8 105000000.123 8  20000001.456 8".to_string(),
            String::new(),
        ]
        .join("\n")
    }

    fn v3_file() -> String {
        [
            record("     3.04           OBSERVATION DATA    M", "RINEX VERSION / TYPE"),
            record("G    2 C1C L1C", "SYS / # / OBS TYPES"),
            record("", "END OF HEADER"),
            "> 2020 06 22 00 00  0.0000000  0  1".to_string(),
            "G01  20000000.123 8 105000000.123 8".to_string(),
        ]
        .join("\n")
    }

    #[test]
    fn test_v2_document_scenario() {
        let document = parse(&v2_file());
        let summary = document.summary.as_ref().unwrap();

        assert_eq!(summary.version, Some(2.11));
        assert_eq!(summary.file_type, 'O');
        assert_eq!(summary.total_epochs, 1);
        assert_eq!(
            summary.start_epoch.as_ref().unwrap().to_string(),
            "2006-06-21 00:00:00.000"
        );
        assert_eq!(summary.start_epoch, summary.end_epoch);

        let body_span = |code: &str| {
            let spans: Vec<&AnnotationSpan> = document
                .annotations
                .spans(code)
                .iter()
                .filter(|span| span.hover.is_some())
                .collect();
            assert_eq!(spans.len(), 1, "{}", code);
            (spans[0].line, spans[0].start, spans[0].end)
        };

        assert_eq!(body_span("C1"), (4, 0, 14));
        assert_eq!(body_span("L1"), (4, 16, 30));
        assert_eq!(body_span("P1"), (4, 32, 46));
        assert!(document.annotations.spans("D1").is_empty());
        assert!(document.annotations.spans("S1").is_empty());
    }

    #[test]
    fn test_v3_document_scenario() {
        let document = parse(&v3_file());
        let summary = document.summary.unwrap();

        let gps: Vec<String> = summary.satellites[&'G'].iter().map(|s| s.to_string()).collect();
        assert_eq!(gps, vec!["G01"]);
        assert_eq!(summary.total_satellites, 1);

        let l1c = &document.annotations.spans("L1C")[1];
        assert_eq!(l1c.line, 4);
        assert_eq!((l1c.line, l1c.start, l1c.end), (4, 19, 33));
        assert_eq!(l1c.hover.as_ref().unwrap().satellite.to_string(), "G01");
    }

    #[test]
    fn test_header_types_are_annotated() {
        let document = parse(&v2_file());

        let header_c1 = document
            .annotations
            .spans("C1")
            .iter()
            .find(|span| span.line == 1)
            .unwrap();
        assert!(header_c1.hover.is_none());
        assert_eq!(document.annotations.spans(HEADER_LINE).len(), 4);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = v2_file();
        assert_eq!(parse(&text), parse(&text));
    }

    #[test]
    fn test_crlf_matches_lf() {
        let text = v3_file();
        let crlf = text.replace('\n', "\r\n");

        assert_eq!(parse(&text).annotations, parse(&crlf).annotations);
    }

    #[test]
    fn test_inventory_matches_observed_satellites() {
        let text = [
            record("     2.11           OBSERVATION DATA    G (GPS)", "RINEX VERSION / TYPE"),
            record("     1    C1", "# / TYPES OF OBSERV"),
            record("", "END OF HEADER"),
            " 06  6 21  0  0  0.0000000  0  2G01G05".to_string(),
            "  20000000.123".to_string(),
            "  20000000.456".to_string(),
            " 06  6 21  0  0 30.0000000  0  2G05R11".to_string(),
            "  20000000.789".to_string(),
            "  20000001.012".to_string(),
        ]
        .join("\n");
        let document = parse(&text);
        let summary = document.summary.unwrap();

        let hovered: BTreeSet<SatelliteId> = document
            .annotations
            .spans("C1")
            .iter()
            .filter_map(|span| span.hover.as_ref().map(|h| h.satellite))
            .collect();
        let inventory: BTreeSet<SatelliteId> = summary.all_satellites().into_iter().collect();

        assert_eq!(inventory, hovered);
        assert_eq!(summary.total_satellites, 3);
        assert_eq!(summary.total_epochs, 2);
    }

    #[test]
    fn test_navigation_file_has_header_spans_only() {
        let text = [
            record("     2.11           N: GPS NAV DATA", "RINEX VERSION / TYPE"),
            record("", "END OF HEADER"),
            " 1 06  6 21  0  0  0.0 1.0E-04".to_string(),
        ]
        .join("\n");
        let document = parse(&text);

        assert!(document.summary.is_none());
        assert_eq!(document.annotations.total(), 2);
    }

    #[test]
    fn test_summary_anchor_is_end_of_last_line() {
        let document = parse(&v3_file());
        assert_eq!(
            document.summary_anchor,
            Position {
                line: 4,
                column: "G01  20000000.123 8 105000000.123 8".len()
            }
        );

        let empty = parse("");
        assert_eq!(empty.summary_anchor, Position { line: 0, column: 0 });
        assert!(empty.summary.is_none());
        assert!(empty.annotations.has_category(HEADER_LINE));
    }
}
