//! Downloader configuration and option mutators.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use super::constants::DEFAULT_MAX_RETRIES;

/// Maps a total resource size to a chunk count or a chunk size.
///
/// Determiners must be defined for every input. The planner clamps zero
/// results to one and never builds more than `MAX_CHUNKS` (65 536) chunks,
/// raising the chunk size when a determiner asks for more.
pub type SizeDeterminer = Arc<dyn Fn(u64) -> u64 + Send + Sync>;

/// Ceiling on simultaneously active chunk fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxConcurrent {
    /// Every chunk gets its own worker.
    #[default]
    Unlimited,
    /// At most this many workers (must be positive).
    Limited(usize),
}

impl MaxConcurrent {
    /// Interprets `0` as unlimited.
    #[must_use]
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            Self::Unlimited
        } else {
            Self::Limited(count)
        }
    }
}

/// Errors produced while validating configuration or building the client.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `max_concurrent` was `Limited(0)`.
    #[error("invalid max_concurrent value {value}: must be positive or unlimited")]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// `chunk_size` was `Some(0)`.
    #[error("invalid chunk_size 0: must be positive")]
    InvalidChunkSize,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Tuning knobs for a [`Downloader`](super::Downloader).
///
/// Chunking is resolved in this order, first match wins: `chunk_size`,
/// `part_determiner`, `chunk_size_determiner`, then the built-in part
/// determiner (1/4/16/32 parts below 1 MiB/10 MiB/100 MiB/above).
#[derive(Clone)]
pub struct DownloadConfig {
    /// Attempts per chunk before giving up (0 behaves like 1).
    pub max_retries: u32,
    /// Ceiling on simultaneously active chunk fetches.
    pub max_concurrent: MaxConcurrent,
    /// Forces a fixed chunk size in bytes.
    pub chunk_size: Option<u64>,
    /// Chooses a chunk count from the total size.
    pub part_determiner: Option<SizeDeterminer>,
    /// Chooses a chunk size from the total size.
    pub chunk_size_determiner: Option<SizeDeterminer>,
    /// Base delay between attempts; zero retries immediately.
    pub retry_delay: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_concurrent: MaxConcurrent::Unlimited,
            chunk_size: None,
            part_determiner: None,
            chunk_size_determiner: None,
            retry_delay: Duration::ZERO,
        }
    }
}

impl fmt::Debug for DownloadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadConfig")
            .field("max_retries", &self.max_retries)
            .field("max_concurrent", &self.max_concurrent)
            .field("chunk_size", &self.chunk_size)
            .field("part_determiner", &self.part_determiner.is_some())
            .field("chunk_size_determiner", &self.chunk_size_determiner.is_some())
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl DownloadConfig {
    /// Applies `options` in order on top of the defaults.
    #[must_use]
    pub fn from_options(options: impl IntoIterator<Item = DownloadOption>) -> Self {
        let mut config = Self::default();
        for option in options {
            option.apply(&mut config);
        }
        config
    }

    /// Checks field ranges.
    ///
    /// Setting both determiners is allowed; `part_determiner` wins and a
    /// warning is logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConcurrency`] for `Limited(0)` and
    /// [`ConfigError::InvalidChunkSize`] for `Some(0)`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let MaxConcurrent::Limited(0) = self.max_concurrent {
            return Err(ConfigError::InvalidConcurrency { value: 0 });
        }
        if self.chunk_size == Some(0) {
            return Err(ConfigError::InvalidChunkSize);
        }
        if self.chunk_size.is_none()
            && self.part_determiner.is_some()
            && self.chunk_size_determiner.is_some()
        {
            warn!("both part_determiner and chunk_size_determiner set; part_determiner wins");
        }
        Ok(())
    }
}

/// A single-field mutation of [`DownloadConfig`].
#[derive(Clone)]
pub enum DownloadOption {
    /// Sets `max_retries`.
    MaxRetries(u32),
    /// Sets `max_concurrent`.
    MaxConcurrent(MaxConcurrent),
    /// Sets `chunk_size`.
    ChunkSize(u64),
    /// Sets `part_determiner`.
    PartDeterminer(SizeDeterminer),
    /// Sets `chunk_size_determiner`.
    ChunkSizeDeterminer(SizeDeterminer),
    /// Sets `retry_delay`.
    RetryDelay(Duration),
}

impl DownloadOption {
    /// Builds a [`DownloadOption::PartDeterminer`] from a closure.
    pub fn part_determiner(f: impl Fn(u64) -> u64 + Send + Sync + 'static) -> Self {
        Self::PartDeterminer(Arc::new(f))
    }

    /// Builds a [`DownloadOption::ChunkSizeDeterminer`] from a closure.
    pub fn chunk_size_determiner(f: impl Fn(u64) -> u64 + Send + Sync + 'static) -> Self {
        Self::ChunkSizeDeterminer(Arc::new(f))
    }

    /// Writes this option's field into `config`.
    pub fn apply(self, config: &mut DownloadConfig) {
        match self {
            Self::MaxRetries(n) => config.max_retries = n,
            Self::MaxConcurrent(n) => config.max_concurrent = n,
            Self::ChunkSize(size) => config.chunk_size = Some(size),
            Self::PartDeterminer(f) => config.part_determiner = Some(f),
            Self::ChunkSizeDeterminer(f) => config.chunk_size_determiner = Some(f),
            Self::RetryDelay(delay) => config.retry_delay = delay,
        }
    }
}

impl fmt::Debug for DownloadOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxRetries(n) => f.debug_tuple("MaxRetries").field(n).finish(),
            Self::MaxConcurrent(n) => f.debug_tuple("MaxConcurrent").field(n).finish(),
            Self::ChunkSize(size) => f.debug_tuple("ChunkSize").field(size).finish(),
            Self::PartDeterminer(_) => f.write_str("PartDeterminer(..)"),
            Self::ChunkSizeDeterminer(_) => f.write_str("ChunkSizeDeterminer(..)"),
            Self::RetryDelay(delay) => f.debug_tuple("RetryDelay").field(delay).finish(),
        }
    }
}
