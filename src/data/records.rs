//! Reader for the headerless two-column `filename,timestamp` file.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::common::VehicleRecord;
use crate::error::RecordsError;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];
const UTF8_BOM: char = '\u{feff}';

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

/// Tab separated when the first non-blank line has a tab, comma otherwise.
fn delimiter(content: &str) -> u8 {
    match content.lines().find(|line| !line.trim().is_empty()) {
        Some(line) if line.contains('\t') => b'\t',
        _ => b',',
    }
}

fn line_of(record: &StringRecord, fallback: usize) -> usize {
    record
        .position()
        .map(|pos| pos.line() as usize)
        .unwrap_or(fallback)
}

/// Parses records in file order. Blank lines are skipped; anything else that
/// does not parse is an error naming its 1-based line.
pub fn parse_records(content: &str) -> Result<Vec<VehicleRecord>, RecordsError> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter(content))
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(|source| RecordsError::Csv {
            line: source
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or(idx + 1),
            source,
        })?;
        let line = line_of(&row, idx + 1);
        if row.iter().all(str::is_empty) {
            continue;
        }

        let (filename, value) = match (row.len(), row.get(0), row.get(1)) {
            (2, Some(filename), Some(value)) if !filename.is_empty() && !value.is_empty() => {
                (filename, value)
            }
            _ => {
                return Err(RecordsError::MalformedLine {
                    line,
                    content: row.iter().collect::<Vec<_>>().join(","),
                })
            }
        };
        let timestamp = parse_timestamp(value).ok_or_else(|| RecordsError::BadTimestamp {
            line,
            value: value.to_string(),
        })?;
        records.push(VehicleRecord::new(filename, timestamp));
    }
    Ok(records)
}

pub fn read_records(path: &Path) -> Result<Vec<VehicleRecord>, RecordsError> {
    let content = std::fs::read_to_string(path).map_err(|source| RecordsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&content)?;
    log::info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}
