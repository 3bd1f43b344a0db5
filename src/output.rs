//! @ai:module:intent Format summaries, annotation listings and highlighted documents
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_summaries, format_annotations, summary_markdown, hover_markdown, render_highlighted, to_json
//! @ai:module:depends_on scan, summary, annotation, style
//! @ai:module:stateless true

use crate::annotation::{AnnotationSpan, Hover};
use crate::error::Result;
use crate::scan::ScannedFile;
use crate::style::{CategorySet, Decoration, LineStyle};
use crate::summary::DocumentSummary;
use crate::{document_lines, ParsedDocument};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
    Markdown,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    path: &'a Path,
    summary: Option<&'a DocumentSummary>,
}

#[derive(Serialize)]
struct AnnotationReport<'a> {
    path: &'a Path,
    spans: BTreeMap<&'a str, &'a [AnnotationSpan]>,
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// @ai:intent Format the summaries of scanned files
/// @ai:effects pure
pub fn format_summaries(files: &[ScannedFile], format: OutputFormat) -> Result<String> {
    let reports: Vec<SummaryReport> = files
        .iter()
        .map(|file| SummaryReport {
            path: &file.path,
            summary: file.document.summary.as_ref(),
        })
        .collect();

    match format {
        OutputFormat::Json => to_json(&reports, false),
        OutputFormat::JsonPretty => to_json(&reports, true),
        OutputFormat::Markdown => Ok(reports
            .iter()
            .map(|report| match report.summary {
                Some(summary) => format!(
                    "### {}\n\n{}",
                    report.path.display(),
                    summary_markdown(summary)
                ),
                None => format!("### {}\n\nNo observation summary.\n", report.path.display()),
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Text => Ok(format_summaries_text(files)),
    }
}

fn format_summaries_text(files: &[ScannedFile]) -> String {
    let mut output = String::new();

    for file in files {
        output.push_str(&format!("{}\n", file.path.display().to_string().bold()));

        let Some(summary) = &file.document.summary else {
            let file_type = file
                .document
                .header
                .file_type
                .map(String::from)
                .unwrap_or_else(|| "?".to_string());
            output.push_str(&format!(
                "  {} (file type {})\n\n",
                "no observation summary".dimmed(),
                file_type
            ));
            continue;
        };

        output.push_str(&format!(
            "  RINEX {} ({})\n",
            display_version(summary.version),
            summary.file_type
        ));
        output.push_str(&format!(
            "  Epochs: {}  {} .. {}\n",
            summary.total_epochs.to_string().cyan(),
            display_epoch(summary.start_epoch.as_ref()),
            display_epoch(summary.end_epoch.as_ref())
        ));
        output.push_str(&format!(
            "  Satellites: {}\n",
            summary.total_satellites.to_string().cyan()
        ));

        for (system, satellites) in &summary.satellites {
            let ids: Vec<String> = satellites.iter().map(|id| id.to_string()).collect();
            output.push_str(&format!(
                "    {} ({}): {}\n",
                system.to_string().yellow(),
                satellites.len(),
                ids.join(", ")
            ));
        }

        output.push('\n');
    }

    output.push_str(&format!("Summarized {} files\n", files.len()));
    output
}

/// @ai:intent Render the summary as the markdown table shown at the end of a document
/// @ai:effects pure
pub fn summary_markdown(summary: &DocumentSummary) -> String {
    let mut markdown = String::from("| Column | | Description |\n| --- | --- | --- |\n");
    markdown.push_str(&format!(
        "| RINEX | Version | `{}` |\n",
        display_version(summary.version)
    ));
    markdown.push_str(&format!("| | File Type | `{}` |\n", summary.file_type));
    markdown.push_str(&format!(
        "| Start Epoch | | `{}` |\n",
        display_epoch(summary.start_epoch.as_ref())
    ));
    markdown.push_str(&format!(
        "| End Epoch | | `{}` |\n",
        display_epoch(summary.end_epoch.as_ref())
    ));
    markdown.push_str(&format!(
        "| Number of Total Epochs | | `{}` |\n",
        summary.total_epochs
    ));
    markdown.push_str(&format!(
        "| Number of Satellites | | `{}` |\n",
        summary.total_satellites
    ));

    for (index, (system, satellites)) in summary.satellites.iter().enumerate() {
        let prefix = if index == 0 { "| List of Satellites |" } else { "| |" };
        let ids: Vec<String> = satellites.iter().map(|id| format!("`{}`", id)).collect();
        markdown.push_str(&format!("{} {} | {}|\n", prefix, system, ids.join(", ")));
    }

    markdown
}

/// @ai:intent Render an observation hover as a one-row markdown table
/// @ai:effects pure
pub fn hover_markdown(hover: &Hover) -> String {
    format!(
        "\n| Epoch | SVID | Obs. Type |\n| --- | --- | --- |\n| `{}` | `{}` | `{}` |\n",
        hover.epoch, hover.satellite, hover.observation_type
    )
}

/// @ai:intent Format the annotation spans of one file, optionally for a single category
/// @ai:effects pure
pub fn format_annotations(
    file: &ScannedFile,
    category: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let spans: BTreeMap<&str, &[AnnotationSpan]> = file
        .document
        .annotations
        .categories()
        .filter(|(name, _)| category.map_or(true, |wanted| wanted == *name))
        .collect();

    match format {
        OutputFormat::Json | OutputFormat::JsonPretty => to_json(
            &AnnotationReport {
                path: &file.path,
                spans,
            },
            format == OutputFormat::JsonPretty,
        ),
        OutputFormat::Markdown => Ok(format_annotations_markdown(&spans)),
        OutputFormat::Text => Ok(format_annotations_text(&file.path, &spans)),
    }
}

fn format_annotations_text(path: &Path, spans: &BTreeMap<&str, &[AnnotationSpan]>) -> String {
    let mut output = format!("{}\n", path.display().to_string().bold());

    for (category, spans) in spans.iter().filter(|(_, spans)| !spans.is_empty()) {
        output.push_str(&format!(
            "  {} ({} spans)\n",
            category.cyan(),
            spans.len()
        ));

        for span in spans.iter() {
            let location = format!("{}:{}-{}", span.line + 1, span.start, span.end);
            match &span.hover {
                Some(hover) => output.push_str(&format!(
                    "    {} {} {}\n",
                    location.dimmed(),
                    hover.satellite,
                    hover.epoch
                )),
                None => output.push_str(&format!("    {}\n", location.dimmed())),
            }
        }
    }

    let total: usize = spans.values().map(|spans| spans.len()).sum();
    output.push_str(&format!("\n{} spans\n", total));
    output
}

fn format_annotations_markdown(spans: &BTreeMap<&str, &[AnnotationSpan]>) -> String {
    let mut markdown = String::new();

    for (category, spans) in spans.iter().filter(|(_, spans)| !spans.is_empty()) {
        markdown.push_str(&format!("## `{}`\n\n", category));

        for span in spans.iter() {
            markdown.push_str(&format!(
                "- line {}, columns {}-{}\n",
                span.line + 1,
                span.start,
                span.end
            ));
            if let Some(hover) = &span.hover {
                markdown.push_str(&hover_markdown(hover));
                markdown.push('\n');
            }
        }
        markdown.push('\n');
    }

    markdown
}

/// @ai:intent Print the document with every annotated token decorated in its category color
/// @ai:pre document was parsed from text
/// @ai:effects pure
pub fn render_highlighted(text: &str, document: &ParsedDocument, categories: &CategorySet) -> String {
    let mut by_line: BTreeMap<usize, Vec<&AnnotationSpan>> = BTreeMap::new();
    for span in document.annotations.by_position() {
        by_line.entry(span.line).or_default().push(span);
    }

    let mut output = Vec::new();
    for (index, line) in document_lines(text).into_iter().enumerate() {
        let spans = by_line.get(&index).map(Vec::as_slice).unwrap_or(&[]);
        output.push(render_line(line, spans, categories));
    }

    output.join("\n")
}

fn render_line(line: &str, spans: &[&AnnotationSpan], categories: &CategorySet) -> String {
    let mut rendered = String::new();
    let mut cursor = 0;

    for span in spans {
        // Overlapping spans keep the earlier one.
        if span.start < cursor {
            continue;
        }
        let (Some(before), Some(token)) = (line.get(cursor..span.start), line.get(span.columns()))
        else {
            continue;
        };

        rendered.push_str(before);
        rendered.push_str(&decorate(token, categories.decoration(&span.category)));
        cursor = span.end;
    }

    rendered.push_str(line.get(cursor..).unwrap_or_default());
    rendered
}

fn decorate(token: &str, decoration: Option<&Decoration>) -> String {
    let Some(decoration) = decoration else {
        return token.to_string();
    };

    let mut styled = token.normal();
    if let Some((r, g, b)) = decoration.color.as_deref().and_then(parse_hex_color) {
        styled = styled.truecolor(r, g, b);
    }

    let styled = match decoration.style {
        LineStyle::Solid => styled.underline(),
        LineStyle::Double => styled.underline().bold(),
        LineStyle::Dotted => styled.underline().italic(),
        LineStyle::Dashed => styled.underline().dimmed(),
        LineStyle::Bold => styled.bold(),
    };
    styled.to_string()
}

/// @ai:intent Parse a `#rrggbb` color
/// @ai:example ("#ff5f30") -> Some((255, 95, 48))
/// @ai:effects pure
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn display_version(version: Option<f64>) -> String {
    version.map(|v| v.to_string()).unwrap_or_default()
}

fn display_epoch(epoch: Option<&crate::epoch::EpochTime>) -> String {
    epoch.map(|e| e.to_string()).unwrap_or_default()
}
