//! Line-delimited JSON measurement reader.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use ombak_core::observation::FrameMeasurement;

/// Reads NDJSON measurements until EOF or `terminate` is set, invoking the
/// callback once per parsed frame.
///
/// Malformed lines are skipped with a warning; a detector restarting
/// mid-write must not take the monitoring loop down with it.
pub fn run_ndjson_loop<R, F>(reader: R, terminate: &AtomicBool, mut callback: F)
where
    R: BufRead,
    F: FnMut(FrameMeasurement),
{
    for line in reader.lines() {
        if terminate.load(Ordering::Relaxed) {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Measurement stream read failed: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<FrameMeasurement>(&line) {
            Ok(measurement) => callback(measurement),
            Err(e) => warn!("Skipping malformed measurement line: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LINES: &str = concat!(
        r#"{"sequence_id":1,"height_px":300,"line_count":0,"captured_at":"2024-06-01T08:30:00Z"}"#,
        "\n",
        "not json at all\n",
        r#"{"sequence_id":2,"height_px":175,"line_count":4,"captured_at":"2024-06-01T08:30:01Z"}"#,
        "\n",
    );

    #[test]
    fn parses_frames_and_skips_garbage() {
        let terminate = AtomicBool::new(false);
        let mut seen = Vec::new();
        run_ndjson_loop(Cursor::new(LINES), &terminate, |m| seen.push(m));

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].sequence_id, 1);
        assert_eq!(seen[1].height_px, 175);
    }

    #[test]
    fn terminate_flag_stops_the_loop() {
        let terminate = AtomicBool::new(true);
        let mut seen = Vec::new();
        run_ndjson_loop(Cursor::new(LINES), &terminate, |m| seen.push(m));
        assert!(seen.is_empty());
    }
}
