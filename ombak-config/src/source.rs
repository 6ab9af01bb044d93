//! Frame-source and sampling configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Where measurements come from and how often they are sampled.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct SourceConfig {
    /// Measurement input: a path to an NDJSON file, or `-` for stdin.
    #[serde(default = "default_input")]
    pub input: String,

    /// Capacity of the observation bus (must be a power of two).
    #[serde(default = "default_bus_capacity")]
    #[validate(range(min = 16, max = 65536))]
    #[validate(custom(function = validation::validate_power_of_two))]
    pub bus_capacity: usize,

    /// Wall-clock sampling interval in seconds. The classifier sees every
    /// frame; state mutation and the log write happen once per interval.
    #[serde(default = "default_sample_interval")]
    #[validate(range(min = 1, max = 3600))]
    pub sample_interval_secs: u64,
}

fn default_input() -> String {
    "-".into()
}

fn default_bus_capacity() -> usize {
    1024
}

fn default_sample_interval() -> u64 {
    2
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            bus_capacity: default_bus_capacity(),
            sample_interval_secs: default_sample_interval(),
        }
    }
}
