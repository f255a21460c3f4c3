use async_trait::async_trait;
use tracing::info;

use super::{PublishOutcome, Publisher};

/// Accepts every message and writes it to the log.
///
/// Used when no sink URL is configured, so a session can be followed locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&self, body: &str) -> PublishOutcome {
        info!(target: "pitsync::messages", "{body}");
        PublishOutcome::Accepted
    }
}
