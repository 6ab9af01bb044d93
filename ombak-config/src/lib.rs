//! # Ombak Configuration System
//!
//! Hierarchical configuration for the wave-monitoring pipeline.
//!
//! ## Features
//! - **Unified Configuration**: single source of truth across all components
//! - **Validation**: runtime validation of critical parameters
//! - **Environment Awareness**: `OMBAK_*` variables override any file value;
//!   Twilio credentials additionally hydrate from the conventional
//!   `TWILIO_*` variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod alerts;
mod error;
mod log;
mod monitor;
mod source;
mod validation;

pub use alerts::ChannelsConfig;
pub use alerts::EscalationChannelConfig;
pub use alerts::RoutineChannelConfig;
pub use alerts::TwilioConfig;
pub use error::ConfigError;
pub use log::LogConfig;
pub use monitor::EscalationConfig;
pub use monitor::ThresholdConfig;
pub use source::SourceConfig;

/// Top-level configuration container for all Ombak components.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct OmbakConfig {
    /// Frame-source and sampling cadence.
    #[validate(nested)]
    pub source: SourceConfig,

    /// Severity classification boundaries.
    #[validate(nested)]
    pub thresholds: ThresholdConfig,

    /// Consecutive-extreme escalation parameters.
    #[validate(nested)]
    pub escalation: EscalationConfig,

    /// Notification channels and provider credentials.
    #[validate(nested)]
    pub channels: ChannelsConfig,

    /// Observation log sink.
    #[validate(nested)]
    pub log: LogConfig,

    /// Free-text camera location label, included in tsunami warnings.
    #[serde(default)]
    pub location: Option<String>,
}

impl OmbakConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/ombak.yaml` - base settings. If missing, defaults are used.
    /// 3. `OMBAK_*` environment variables.
    /// 4. `TWILIO_*` variables for any credential field still empty.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(OmbakConfig::default()));

        if Path::new("config/ombak.yaml").exists() {
            figment = figment.merge(Yaml::file("config/ombak.yaml"));
        }

        Self::extract(figment)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(
                path.to_string_lossy().to_string(),
            )));
        }

        let figment =
            Figment::from(Serialized::defaults(OmbakConfig::default())).merge(Yaml::file(path));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed("OMBAK_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|mut config: Self| {
                config.channels.twilio.hydrate_from_env();
                config.validate()?;
                Ok(config)
            })
    }

    /// Non-fatal operator mistakes worth one warning each at startup.
    pub fn startup_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(w) = self.thresholds.ordering_warning() {
            warnings.push(w);
        }
        warnings
    }
}
