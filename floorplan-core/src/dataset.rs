use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::PlanError;
use crate::geometry::Point;

/// One dataset row: a sprinkler head and its precomputed pipe-connection
/// point. The pairing itself is supplied by the planner that produced the
/// CSV; this crate only draws it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SprinklerRecord {
    pub sprinkler: Point,
    pub connection: Point,
}

// Bound by header name, not column position, so a reordered CSV still loads.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "SprinklerX")]
    sprinkler_x: f64,
    #[serde(rename = "SprinklerY")]
    sprinkler_y: f64,
    #[serde(rename = "PipeX")]
    pipe_x: f64,
    #[serde(rename = "PipeY")]
    pipe_y: f64,
}

/// Parses sprinkler records from any reader. Fail-fast: the first row that
/// cannot bind all four columns to finite numbers aborts the load, so a
/// diagram never silently drops data. An empty table (headers only) is a
/// valid, empty dataset.
pub fn read_records<R: Read>(input: R) -> Result<Vec<SprinklerRecord>, PlanError> {
    let mut reader = csv::Reader::from_reader(input);
    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<RawRecord>().enumerate() {
        // Header occupies line 1.
        let line = i + 2;
        let raw = row.map_err(|e| PlanError::MalformedRecord {
            line,
            reason: e.to_string(),
        })?;
        let record = SprinklerRecord {
            sprinkler: Point::new(raw.sprinkler_x, raw.sprinkler_y),
            connection: Point::new(raw.pipe_x, raw.pipe_y),
        };
        if !record.sprinkler.is_finite() || !record.connection.is_finite() {
            return Err(PlanError::MalformedRecord {
                line,
                reason: "non-finite coordinate".to_string(),
            });
        }
        records.push(record);
    }
    Ok(records)
}

pub fn load_csv(path: &Path) -> Result<Vec<SprinklerRecord>, PlanError> {
    let file = File::open(path).map_err(|e| PlanError::SourceNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    let records = read_records(file)?;
    log::info!(
        "loaded {} sprinkler records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_columns() {
        let csv = "SprinklerX,SprinklerY,PipeX,PipeY\n1000,2000,1100,2100\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sprinkler, Point::new(1000.0, 2000.0));
        assert_eq!(records[0].connection, Point::new(1100.0, 2100.0));
    }

    #[test]
    fn binds_by_header_name_not_position() {
        let csv = "PipeY,SprinklerX,PipeX,SprinklerY\n2100,1000,1100,2000\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].sprinkler, Point::new(1000.0, 2000.0));
        assert_eq!(records[0].connection, Point::new(1100.0, 2100.0));
    }

    #[test]
    fn headers_only_is_an_empty_dataset() {
        let csv = "SprinklerX,SprinklerY,PipeX,PipeY\n";
        assert!(read_records(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn non_numeric_value_fails_with_line_number() {
        let csv = "SprinklerX,SprinklerY,PipeX,PipeY\n1,2,3,4\n1,oops,3,4\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        match err {
            PlanError::MalformedRecord { line, .. } => assert_eq!(line, 3),
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn nan_value_is_rejected() {
        let csv = "SprinklerX,SprinklerY,PipeX,PipeY\nNaN,2,3,4\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PlanError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn missing_column_is_malformed() {
        let csv = "SprinklerX,SprinklerY,PipeX\n1,2,3\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PlanError::MalformedRecord { .. }));
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let err = load_csv(Path::new("/nonexistent/output.csv")).unwrap_err();
        assert!(matches!(err, PlanError::SourceNotFound { .. }));
    }
}
