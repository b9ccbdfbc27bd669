use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::analysis::ImageAnalysis;
use crate::comet::Comet;
use crate::error::Result;
use crate::stats::{summarize_groupings, FieldStats, MeasurementField, PopulationSummary};

const SEP: &str = ",";

/// Leading columns of every record, followed by the measurement headers.
const KEY_COLUMNS: [&str; 3] = ["Image", "ID", "Status"];

/// Quote a CSV cell when it contains a separator, quote or newline.
pub fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header line of the report.
pub fn header_line() -> String {
    KEY_COLUMNS
        .iter()
        .copied()
        .chain(MeasurementField::ALL.iter().map(|f| f.header()))
        .map(escape_csv)
        .collect::<Vec<_>>()
        .join(SEP)
}

/// Record line of one measured comet, or `None` when it has no measurements.
pub fn comet_line(image: &str, comet: &Comet) -> Option<String> {
    let m = comet.measurements.as_ref()?;
    let mut cells = vec![
        escape_csv(image),
        comet.id.map(|id| id.to_string()).unwrap_or_default(),
        comet.status.label().to_string(),
    ];
    cells.extend(MeasurementField::ALL.iter().map(|f| f.value(m).to_string()));
    Some(cells.join(SEP))
}

/// The five summary lines of one grouping: mean, median, standard deviation,
/// minimum and maximum. Fields of an empty population are left blank.
pub fn summary_lines(label: &str, summary: &PopulationSummary) -> Vec<String> {
    let rows: [(&str, fn(&FieldStats) -> f64); 5] = [
        ("Mean", |s| s.mean),
        ("Median", |s| s.median),
        ("Stddev", |s| s.stddev),
        ("Min", |s| s.min),
        ("Max", |s| s.max),
    ];

    rows.iter()
        .map(|(name, pick)| {
            let mut cells = vec![name.to_string(), String::new(), escape_csv(label)];
            cells.extend(summary.fields.iter().map(|(_, stats)| {
                stats.as_ref().map(|s| pick(s).to_string()).unwrap_or_default()
            }));
            cells.join(SEP)
        })
        .collect()
}

/// Write the full report: one record per measurable comet of every image,
/// then the summary rows of each grouping over all images.
pub fn write_report<W: Write>(out: &mut W, images: &[(&str, &ImageAnalysis)]) -> Result<()> {
    writeln!(out, "{}", header_line())?;

    let mut population = Vec::new();
    for (name, analysis) in images {
        for comet in analysis.measurable() {
            if let Some(line) = comet_line(name, comet) {
                writeln!(out, "{line}")?;
            }
            population.push(comet);
        }
    }

    for (grouping, summary) in summarize_groupings(&population) {
        for line in summary_lines(grouping.label(), &summary) {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Write the report to a CSV file.
pub fn save_report(path: &Path, images: &[(&str, &ImageAnalysis)]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_report(&mut out, images)?;
    info!(path = %path.display(), images = images.len(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_header_order() {
        let header = header_line();
        assert!(header.starts_with("Image,ID,Status,Length,HeadLength,TailLength,HeadArea"));
        assert!(header.ends_with("HeadDNA%,TailDNA%,TailMoment,TailOliveMoment"));
        assert_eq!(header.split(',').count(), 19);
    }
}
