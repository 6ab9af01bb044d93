//! # ombak-log
//!
//! Append-only observation log. One CSV row per sampled observation, with
//! the escalation state and dispatch outcomes of that sample. The file is
//! created with a header exactly once; existing rows are never touched, so
//! a concurrent reader sees either the prior record set or the prior set
//! plus whole new rows, never a torn record.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ombak_core::observation::{DispatchOutcome, LogRecord};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("observation log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("observation log serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dispatch outcome encoding error: {0}")]
    Outcomes(#[from] serde_json::Error),
}

/// One persisted row. `dispatch_outcomes` holds the ordered per-channel
/// outcome list as compact JSON; the csv layer quotes it, so embedded
/// commas and quotes never corrupt column boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRow {
    pub timestamp: String,
    pub date: String,
    pub time: String,
    pub frame: u64,
    pub peak_height_px: i64,
    pub severity: String,
    pub line_count: u32,
    pub extreme_count: u32,
    pub escalation_fired: bool,
    pub dispatch_outcomes: String,
}

impl LogRow {
    fn from_record(record: &LogRecord) -> Result<Self, LogError> {
        let observation = &record.observation;
        Ok(Self {
            timestamp: observation.captured_at.to_rfc3339(),
            date: observation.captured_at.format("%Y-%m-%d").to_string(),
            time: observation.captured_at.format("%H:%M:%S").to_string(),
            frame: observation.sequence_id,
            peak_height_px: observation.height_px,
            severity: observation.severity.label().to_string(),
            line_count: observation.line_count,
            extreme_count: record.extreme_count,
            escalation_fired: record.escalation_fired,
            dispatch_outcomes: serde_json::to_string(&record.outcomes)?,
        })
    }

    /// Decodes the per-channel outcomes for audit tooling.
    pub fn outcomes(&self) -> Result<Vec<DispatchOutcome>, LogError> {
        Ok(serde_json::from_str(&self.dispatch_outcomes)?)
    }
}

/// Durable append-only sink for sampled observations.
pub struct ObservationLog {
    path: PathBuf,
}

impl ObservationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record, creating the file with a header first if it does
    /// not exist yet or is empty.
    pub fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        self.ensure_header()?;

        let row = LogRow::from_record(record)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(&row)?;
        let encoded = writer
            .into_inner()
            .map_err(|e| LogError::Io(e.into_error()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // One write_all per record keeps whole rows indivisible for readers.
        file.write_all(&encoded)?;
        file.flush()?;
        Ok(())
    }

    /// Reads all persisted rows, oldest first.
    pub fn read_rows(&self) -> Result<Vec<LogRow>, LogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    fn ensure_header(&self) -> Result<(), LogError> {
        let needs_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(LogError::Io(e)),
        };
        if !needs_header {
            return Ok(());
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record([
            "timestamp",
            "date",
            "time",
            "frame",
            "peak_height_px",
            "severity",
            "line_count",
            "extreme_count",
            "escalation_fired",
            "dispatch_outcomes",
        ])?;
        let header = writer
            .into_inner()
            .map_err(|e| LogError::Io(e.into_error()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&header)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ombak_core::observation::{
        ChannelId, DispatchErrorKind, DispatchOutcome, Observation, Severity,
    };

    fn record(frame: u64, severity: Severity, extreme_count: u32, fired: bool) -> LogRecord {
        LogRecord {
            observation: Observation {
                sequence_id: frame,
                height_px: 170,
                line_count: 3,
                captured_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
                severity,
            },
            extreme_count,
            escalation_fired: fired,
            outcomes: vec![
                DispatchOutcome::success(ChannelId::RoutineWhatsApp, "SM123".into()),
                DispatchOutcome::failure(ChannelId::RoutineSms, DispatchErrorKind::Provider),
                DispatchOutcome::skipped(ChannelId::TsunamiWhatsApp),
            ],
        }
    }

    #[test]
    fn header_is_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observations.csv");

        let log = ObservationLog::new(&path);
        log.append(&record(1, Severity::Extreme, 1, false)).unwrap();
        // A fresh handle on the same file must not add a second header.
        let reopened = ObservationLog::new(&path);
        reopened
            .append(&record(2, Severity::Extreme, 2, false))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header_lines = contents
            .lines()
            .filter(|l| l.starts_with("timestamp,"))
            .count();
        assert_eq!(header_lines, 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn appends_preserve_call_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = ObservationLog::new(dir.path().join("observations.csv"));

        for frame in 1..=5 {
            log.append(&record(frame, Severity::High, 0, false)).unwrap();
        }

        let rows = log.read_rows().unwrap();
        assert_eq!(rows.len(), 5);
        let frames: Vec<u64> = rows.iter().map(|r| r.frame).collect();
        assert_eq!(frames, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn punctuated_fields_stay_in_one_column() {
        let dir = tempfile::tempdir().unwrap();
        let log = ObservationLog::new(dir.path().join("observations.csv"));
        log.append(&record(7, Severity::Extreme, 12, true)).unwrap();

        let rows = log.read_rows().unwrap();
        assert_eq!(rows[0].severity, "> 4 m (extreme)");
        // The outcome column embeds commas and quotes; it must decode back
        // into the same ordered list.
        let outcomes = rows[0].outcomes().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].channel, ChannelId::RoutineWhatsApp);
        assert_eq!(outcomes[1].error, Some(DispatchErrorKind::Provider));
        assert!(!outcomes[2].attempted);
    }

    #[test]
    fn append_never_truncates_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observations.csv");
        let log = ObservationLog::new(&path);

        log.append(&record(1, Severity::Calm, 0, false)).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        log.append(&record(2, Severity::Low, 0, false)).unwrap();
        let after = std::fs::read_to_string(&path).unwrap();
        assert!(after.starts_with(&before));
    }
}
