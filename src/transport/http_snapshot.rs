//! Snapshot loader over HTTP.

use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::SnapshotSource;
use crate::domain::ApiEvent;
use crate::error::FetchError;

/// Path of the bulk listing relative to the feed's base URL.
pub const SNAPSHOT_PATH: &str = "/api/events";

/// Fetches `GET {base}/api/events` and decodes a JSON array of
/// [`ApiEvent`]s. Any non-2xx status is a failure.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    /// Creates a loader for the feed at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: format!("{}{SNAPSHOT_PATH}", base_url.trim_end_matches('/')),
        })
    }

    /// Full URL that is fetched.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<ApiEvent>, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<ApiEvent>>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch_events(&self) -> BoxFuture<'_, Result<Vec<ApiEvent>, FetchError>> {
        self.fetch().boxed()
    }
}
