//! Observation log configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where sampled observations are persisted.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct LogConfig {
    /// Append-only CSV file; created with a header on first use.
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("ombak_observations.csv")
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
        }
    }
}
