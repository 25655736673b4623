//! Public entry point: [`Downloader`].

use std::path::Path;
use std::sync::Arc;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use super::client::build_default_client;
use super::config::{ConfigError, DownloadConfig, DownloadOption};
use super::coordinator::DownloadManager;
use super::progress::{NoopObserver, ProgressObserver};
use super::sink::{FileSink, PositionalSink};
use super::DownloadError;

/// Downloads one URL at a time using parallel range requests.
///
/// A `Downloader` is cheap to clone and can be reused; each call to
/// [`download`](Self::download) is independent.
///
/// # Example
///
/// ```no_run
/// use rangedl_core::download::{DownloadOption, Downloader, MaxConcurrent};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = Downloader::with_options([
///     DownloadOption::MaxConcurrent(MaxConcurrent::Limited(4)),
///     DownloadOption::MaxRetries(3),
/// ])?;
/// let bytes = downloader
///     .download("https://example.com/big.iso", "big.iso")
///     .await?;
/// println!("Downloaded {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    config: Arc<DownloadConfig>,
    observer: Arc<dyn ProgressObserver>,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Downloader {
    /// Creates a downloader with the default configuration.
    ///
    /// Defaults: 5 attempts per chunk, unlimited concurrency, built-in part
    /// determiner, no retry delay.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static default
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client =
            build_default_client().expect("failed to build HTTP client with static configuration");
        Self::from_parts(client, DownloadConfig::default())
    }

    /// Creates a downloader with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn with_config(config: DownloadConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(build_default_client()?, config))
    }

    /// Creates a downloader by applying `options` in order over the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`with_config`](Self::with_config).
    pub fn with_options(options: impl IntoIterator<Item = DownloadOption>) -> Result<Self, ConfigError> {
        Self::with_config(DownloadConfig::from_options(options))
    }

    /// Creates a downloader around a caller-configured HTTP client
    /// (proxies, TLS, auth headers).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_client(client: Client, config: DownloadConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(client, config))
    }

    fn from_parts(client: Client, config: DownloadConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attaches a progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Downloads `url` into the file at `path`.
    ///
    /// Returns the number of bytes written, which equals the resource size.
    ///
    /// # Errors
    ///
    /// Returns the first [`DownloadError`] raised by probing or by any
    /// chunk; no partial byte count is reported on failure.
    pub async fn download(&self, url: &str, path: impl AsRef<Path>) -> Result<u64, DownloadError> {
        self.download_with_cancellation(CancellationToken::new(), url, path)
            .await
    }

    /// Downloads `url` into `path`, aborting when `cancel` fires.
    ///
    /// The file is created (or truncated) before probing. Cancelling the
    /// token aborts in-flight requests and yields
    /// [`DownloadError::Cancelled`] once every worker has exited.
    ///
    /// # Errors
    ///
    /// Same as [`download`](Self::download), plus [`DownloadError::Io`] if
    /// the destination can't be opened.
    #[instrument(skip(self, cancel, path), fields(path = %path.as_ref().display()))]
    pub async fn download_with_cancellation(
        &self,
        cancel: CancellationToken,
        url: &str,
        path: impl AsRef<Path>,
    ) -> Result<u64, DownloadError> {
        let path = path.as_ref();
        let url = parse_url(url)?;
        let sink = FileSink::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        self.run(cancel, url, Arc::new(sink)).await
    }

    /// Downloads `url` into an arbitrary positional sink.
    ///
    /// # Errors
    ///
    /// Same as [`download`](Self::download).
    #[instrument(skip(self, cancel, sink))]
    pub async fn download_to_sink(
        &self,
        cancel: CancellationToken,
        url: &str,
        sink: Arc<dyn PositionalSink>,
    ) -> Result<u64, DownloadError> {
        let url = parse_url(url)?;
        self.run(cancel, url, sink).await
    }

    async fn run(
        &self,
        cancel: CancellationToken,
        url: Url,
        sink: Arc<dyn PositionalSink>,
    ) -> Result<u64, DownloadError> {
        debug!(config = ?self.config, "starting download");
        DownloadManager {
            client: self.client.clone(),
            url,
            config: Arc::clone(&self.config),
            sink,
            observer: Arc::clone(&self.observer),
            cancel,
        }
        .run()
        .await
    }
}

fn parse_url(url: &str) -> Result<Url, DownloadError> {
    let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DownloadError::invalid_url(url));
    }
    Ok(parsed)
}
