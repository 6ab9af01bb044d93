use thiserror::Error;
use tokio::task::JoinError;

use ombak_config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The operator enabled no notification channel at all. Reported once,
    /// at startup.
    #[error("no notification channels are enabled")]
    NoChannelsConfigured,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("event processing error: {0}")]
    Processing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<JoinError> for EngineError {
    fn from(err: JoinError) -> Self {
        EngineError::Processing(err.to_string())
    }
}
