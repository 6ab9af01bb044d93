//! Recorded measurement loading for deterministic replay.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use ombak_core::observation::FrameMeasurement;

use crate::SourceError;

/// Loads a recorded NDJSON measurement file in capture order.
///
/// Uses the same line format as the live stream, so a captured session can
/// be replayed against different thresholds or escalation settings.
pub fn load_measurements(path: impl AsRef<Path>) -> Result<Vec<FrameMeasurement>, SourceError> {
    let reader = BufReader::new(File::open(path)?);
    let mut measurements = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<FrameMeasurement>(&line) {
            Ok(measurement) => measurements.push(measurement),
            Err(e) => warn!("Skipping malformed recorded measurement: {e}"),
        }
    }

    Ok(measurements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_recorded_measurements_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"sequence_id":10,"height_px":240,"line_count":2,"captured_at":"2024-06-01T08:30:00Z"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"sequence_id":11,"height_px":200,"line_count":3,"captured_at":"2024-06-01T08:30:01Z"}}"#
        )
        .unwrap();

        let measurements = load_measurements(file.path()).unwrap();
        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[0].sequence_id, 10);
        assert_eq!(measurements[1].height_px, 200);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_measurements("/nonexistent/path.ndjson").is_err());
    }
}
