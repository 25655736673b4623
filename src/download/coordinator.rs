//! Download coordinator: probe, plan, schedule, then run batch workers.
//!
//! # Concurrency Model
//!
//! - Each batch runs in its own Tokio task and drains its chunks in order
//! - `written` and `first_error` live behind one mutex that is never held
//!   across an await point
//! - The first failure is kept; later failures are logged and dropped
//! - The first failure also cancels a child token so sibling workers stop
//!   early; the caller's token is never cancelled by the engine
//! - Every worker is awaited before returning, so nothing is still writing
//!   to the sink once control is back with the caller

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::chunk::Chunk;
use super::config::DownloadConfig;
use super::fetcher::RangeFetcher;
use super::planner::plan_chunks;
use super::probe::probe;
use super::progress::ProgressObserver;
use super::retry::RetryPolicy;
use super::scheduler::{Batch, batch_chunks};
use super::sink::PositionalSink;
use super::DownloadError;

/// Mutable state shared by the workers of one download.
#[derive(Debug)]
struct DownloadState {
    total_bytes: u64,
    written: u64,
    first_error: Option<DownloadError>,
}

/// Lock wrapper around [`DownloadState`].
#[derive(Debug)]
struct SharedState {
    inner: Mutex<DownloadState>,
}

impl SharedState {
    fn new(total_bytes: u64) -> Self {
        Self {
            inner: Mutex::new(DownloadState {
                total_bytes,
                written: 0,
                first_error: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DownloadState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add_written(&self, bytes: u64) {
        self.lock().written += bytes;
    }

    /// Stores `error` unless one is already recorded. Returns true if stored.
    fn record_error(&self, error: DownloadError) -> bool {
        let mut state = self.lock();
        if state.first_error.is_some() {
            return false;
        }
        state.first_error = Some(error);
        true
    }

    fn finish(&self) -> Result<u64, DownloadError> {
        let mut state = self.lock();
        if let Some(error) = state.first_error.take() {
            return Err(error);
        }
        if state.written != state.total_bytes {
            return Err(DownloadError::incomplete(
                format!("bytes=0-{}", state.total_bytes.saturating_sub(1)),
                state.total_bytes,
                state.written,
            ));
        }
        Ok(state.written)
    }
}

/// Everything one download call needs; consumed by [`DownloadManager::run`].
pub(crate) struct DownloadManager {
    pub(crate) client: Client,
    pub(crate) url: Url,
    pub(crate) config: Arc<DownloadConfig>,
    pub(crate) sink: Arc<dyn PositionalSink>,
    pub(crate) observer: Arc<dyn ProgressObserver>,
    pub(crate) cancel: CancellationToken,
}

impl DownloadManager {
    /// Runs the download to completion or first error.
    #[instrument(skip(self), fields(url = %self.url))]
    pub(crate) async fn run(self) -> Result<u64, DownloadError> {
        let info = probe(&self.client, &self.url, &self.cancel).await?;
        let chunks = plan_chunks(info.total_size, &self.config);
        self.observer.on_plan(info.total_size, chunks.len());

        if chunks.is_empty() {
            info!("resource is empty, nothing to fetch");
            return Ok(0);
        }
        if !info.range_supported {
            warn!("server declares Accept-Ranges: none");
            return Err(DownloadError::range_unsupported(
                self.url.as_str(),
                StatusCode::OK.as_u16(),
            ));
        }

        let batches = batch_chunks(chunks, self.config.max_concurrent);
        let workers = self.cancel.child_token();
        // Stops stray workers if this future is dropped mid-download.
        let _abort_on_drop = workers.clone().drop_guard();

        let fetcher = Arc::new(RangeFetcher::new(
            self.client.clone(),
            self.url.clone(),
            RetryPolicy::new(self.config.max_retries, self.config.retry_delay),
            workers.clone(),
        ));
        let state = Arc::new(SharedState::new(info.total_size));

        debug!(
            total_bytes = info.total_size,
            workers = batches.len(),
            "starting batch workers"
        );

        let handles: Vec<_> = batches
            .into_iter()
            .enumerate()
            .map(|(index, batch)| {
                tokio::spawn(download_batch(
                    index,
                    batch,
                    Arc::clone(&fetcher),
                    Arc::clone(&self.sink),
                    Arc::clone(&state),
                    Arc::clone(&self.observer),
                    workers.clone(),
                ))
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "batch worker panicked");
                if state.record_error(DownloadError::worker(e.to_string())) {
                    workers.cancel();
                }
            }
        }

        let result = state.finish();
        match &result {
            Ok(written) => info!(bytes = written, "download complete"),
            Err(e) => warn!(error = %e, "download failed"),
        }
        result
    }
}

/// Drains one batch sequentially; stops at the first failed chunk.
#[instrument(skip_all, fields(batch = index, chunks = batch.len()))]
async fn download_batch(
    index: usize,
    batch: Batch,
    fetcher: Arc<RangeFetcher>,
    sink: Arc<dyn PositionalSink>,
    state: Arc<SharedState>,
    observer: Arc<dyn ProgressObserver>,
    workers: CancellationToken,
) {
    for mut chunk in batch {
        match fetcher.fetch(&mut chunk, sink.as_ref()).await {
            Ok(bytes) => {
                state.add_written(bytes);
                observer.on_chunk_complete(&chunk, bytes);
                debug!(%chunk, "chunk complete");
            }
            Err(e) => {
                report_failure(&chunk, e, &state, &workers);
                return;
            }
        }
    }
}

fn report_failure(
    chunk: &Chunk,
    error: DownloadError,
    state: &SharedState,
    workers: &CancellationToken,
) {
    let message = error.to_string();
    if state.record_error(error) {
        warn!(%chunk, error = %message, "chunk failed, stopping remaining workers");
        workers.cancel();
    } else {
        debug!(%chunk, error = %message, "chunk failed after an earlier error");
    }
}
