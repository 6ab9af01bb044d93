//! Error types for the messaging boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("provider credentials are not configured")]
    MissingCredentials,

    #[error("no sender configured for destination '{0}'")]
    MissingSender(String),

    #[error("provider transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider rejected message ({status}): {detail}")]
    Rejected { status: u16, detail: String },
}
