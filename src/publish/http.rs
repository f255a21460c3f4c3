//! HTTP sink client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Proxy, StatusCode, Url};
use tracing::debug;

use super::{PublishOutcome, Publisher, Rejection};
use crate::{Result, SyncError};

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "x-teamtactics-token";

/// Publishes envelopes with `POST` to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    inner: Client,
    url: Url,
    token: Option<String>,
}

impl HttpPublisher {
    /// Build a client for `url`, optionally through an HTTP proxy.
    pub fn new(url: &str, token: Option<String>, proxy: Option<&str>, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| SyncError::config(format!("Invalid post_url '{url}': {e}")))?;

        let mut builder = Client::builder().timeout(timeout);
        if let Some(proxy) = proxy {
            let proxy = Proxy::all(proxy)
                .map_err(|e| SyncError::config(format!("Invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }
        let inner = builder
            .build()
            .map_err(|e| SyncError::transport_with_source("Unable to build HTTP client", Box::new(e)))?;

        Ok(Self { inner, url, token })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    async fn publish(&self, body: &str) -> PublishOutcome {
        let mut request =
            self.inner.post(self.url.clone()).header(CONTENT_TYPE, "application/json").body(body.to_string());
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return PublishOutcome::Failed(e.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            return PublishOutcome::Accepted;
        }

        let text = response.text().await.unwrap_or_default();
        let reason = if text.trim().is_empty() { status.to_string() } else { text.trim().to_string() };
        debug!(%status, %reason, "Sink answered with error status");
        classify(status, reason)
    }
}

/// Map a non-success status to an outcome.
fn classify(status: StatusCode, reason: String) -> PublishOutcome {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PublishOutcome::Rejected(Rejection::Unauthorized(reason))
        }
        StatusCode::CONFLICT | StatusCode::UPGRADE_REQUIRED => {
            PublishOutcome::Rejected(Rejection::VersionMismatch(reason))
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            PublishOutcome::Rejected(Rejection::Invalid(reason))
        }
        _ => PublishOutcome::Failed(format!("HTTP {status}: {reason}")),
    }
}
