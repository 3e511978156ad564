use crate::error::{AudioError, AudioResult};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;

/// One row of a segment CSV
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    /// YouTube video ID
    pub id: String,
    /// Start time exactly as written (used to name the clip file)
    pub start_field: String,
    /// Segment start in seconds
    pub start: f64,
    /// Segment end in seconds
    pub end: f64,
    /// Positive label IDs, in file order
    pub labels: Vec<String>,
}

/// Parse a segment CSV from disk
pub fn read_manifest<P: AsRef<Path>>(path: P) -> AudioResult<Vec<SegmentRecord>> {
    let file = std::fs::File::open(path)?;
    parse_manifest(file)
}

/// Parse a segment CSV
///
/// Lines starting with `#` are comments. The label field may be quoted with
/// a space before the opening quote, which the CSV reader sees as several
/// unquoted fields; those are rejoined. Any other row must have exactly
/// four fields.
pub fn parse_manifest<R: Read>(input: R) -> AudioResult<Vec<SegmentRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        if row.iter().all(|field| field.is_empty()) {
            continue;
        }
        records.push(parse_row(&row)?);
    }
    Ok(records)
}

fn parse_row(row: &StringRecord) -> AudioResult<SegmentRecord> {
    let line = row.position().map(|p| p.line()).unwrap_or(0);
    let bad = |message: String| AudioError::Manifest { line, message };

    // Only a label field that opens with a quote may span several CSV fields
    let quoted_labels = row.len() > 4 && row[3].starts_with('"');
    if row.len() < 4 || (row.len() > 4 && !quoted_labels) {
        return Err(bad(format!("expected 4 fields, got {}", row.len())));
    }

    let id = row[0].to_string();
    if id.is_empty() {
        return Err(bad("empty segment ID".to_string()));
    }

    let start_field = row[1].to_string();
    let start: f64 = start_field
        .parse()
        .map_err(|_| bad(format!("invalid start time {:?}", start_field)))?;
    let end: f64 = row[2]
        .parse()
        .map_err(|_| bad(format!("invalid end time {:?}", &row[2])))?;
    if end < start {
        return Err(bad(format!("end time {end} before start time {start}")));
    }

    let joined = row.iter().skip(3).collect::<Vec<_>>().join(",");
    let labels = joined
        .trim()
        .trim_matches('"')
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect();

    Ok(SegmentRecord {
        id,
        start_field,
        start,
        end,
        labels,
    })
}
