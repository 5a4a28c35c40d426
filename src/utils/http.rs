// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{Result, SourceError};
use crate::models::{CrawlerConfig, SourceKind};

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a URL and return the body, mapping failures to a `SourceError`.
pub async fn fetch_text(
    client: &reqwest::Client,
    source_kind: SourceKind,
    url: &str,
) -> std::result::Result<String, SourceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SourceError::http(source_kind, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            source_kind,
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| SourceError::http(source_kind, e))
}

/// Spaces out sequential requests to one board.
///
/// Each call to [`Throttle::wait`] returns no earlier than `delay` after the
/// previous call returned. Callers queue on the internal lock, so concurrent
/// tasks for the same board are serialized at request start.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: Mutex::new(None),
        }
    }

    /// Wait until the next request to this board may start.
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }

        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
