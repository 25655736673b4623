//! Range fetcher: one ranged GET per attempt, streamed into a chunk.

use futures_util::StreamExt;
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use super::chunk::Chunk;
use super::retry::{RetryDecision, RetryPolicy};
use super::sink::PositionalSink;
use super::DownloadError;

/// Downloads chunks of a single URL with retry.
///
/// Cheap to share: the client is reference-counted internally and the
/// cancellation token is a handle.
#[derive(Debug, Clone)]
pub struct RangeFetcher {
    client: Client,
    url: Url,
    retry_policy: RetryPolicy,
    cancel: CancellationToken,
}

impl RangeFetcher {
    /// Creates a fetcher whose requests all observe `cancel`.
    #[must_use]
    pub fn new(client: Client, url: Url, retry_policy: RetryPolicy, cancel: CancellationToken) -> Self {
        Self {
            client,
            url,
            retry_policy,
            cancel,
        }
    }

    /// Fetches `chunk` into `sink`, retrying failed attempts.
    ///
    /// Every attempt re-requests the full range and rewrites it from
    /// `chunk.start()`, so bytes from a failed attempt are overwritten.
    /// Returns the number of bytes the chunk consumed.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's error once the retry budget is spent, or
    /// [`DownloadError::Cancelled`] as soon as the token fires.
    #[instrument(skip(self, chunk, sink), fields(range = %chunk.bytes_range()))]
    pub async fn fetch(&self, chunk: &mut Chunk, sink: &dyn PositionalSink) -> Result<u64, DownloadError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            chunk.rewind();

            let error = match self.try_fetch(chunk, sink).await {
                Ok(written) => return Ok(written),
                Err(e) => e,
            };

            match self.retry_policy.should_retry(&error, attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    warn!(
                        attempt = next_attempt,
                        max_attempts = self.retry_policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying chunk"
                    );
                    if !delay.is_zero()
                        && self
                            .cancel
                            .run_until_cancelled(tokio::time::sleep(delay))
                            .await
                            .is_none()
                    {
                        return Err(DownloadError::cancelled(self.url.as_str()));
                    }
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(%reason, error = %error, "not retrying chunk");
                    return Err(error);
                }
            }
        }
    }

    async fn try_fetch(&self, chunk: &mut Chunk, sink: &dyn PositionalSink) -> Result<u64, DownloadError> {
        let url = self.url.as_str();
        if self.cancel.is_cancelled() {
            return Err(DownloadError::cancelled(url));
        }

        let range = chunk.bytes_range();
        let request = self
            .client
            .get(self.url.clone())
            .header(RANGE, range.as_str())
            .build()
            .map_err(|e| DownloadError::request_build(url, range.as_str(), e))?;

        let response = self
            .cancel
            .run_until_cancelled(self.client.execute(request))
            .await
            .ok_or_else(|| DownloadError::cancelled(url))?
            .map_err(|e| DownloadError::network(url, range.as_str(), e))?;

        let status = response.status();
        if status != StatusCode::PARTIAL_CONTENT {
            return Err(DownloadError::http_status(url, range, status.as_u16()));
        }

        let mut stream = response.bytes_stream();
        while let Some(item) = self
            .cancel
            .run_until_cancelled(stream.next())
            .await
            .ok_or_else(|| DownloadError::cancelled(url))?
        {
            let bytes = item.map_err(|e| DownloadError::network(url, range.as_str(), e))?;
            let offset = chunk.start() + chunk.cursor();
            chunk
                .write(sink, bytes)
                .await
                .map_err(|e| DownloadError::write(offset, e))?;
        }

        if !chunk.is_complete() {
            return Err(DownloadError::incomplete(range, chunk.size(), chunk.cursor()));
        }
        Ok(chunk.cursor())
    }
}
