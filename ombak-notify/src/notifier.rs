//! The capability interface the dispatcher depends on.

use async_trait::async_trait;

use crate::error::NotifyError;

/// One-shot message delivery to a single destination.
///
/// Implementations return the provider's message reference on acceptance.
/// No retries: the caller records the outcome and moves on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        destination: &str,
        body: &str,
        media_url: Option<&str>,
    ) -> Result<String, NotifyError>;
}
