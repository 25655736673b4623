//! Error types for the download module.
//!
//! This module defines structured errors for probing, chunk fetching and
//! sink writes, providing context-rich error messages for debugging and
//! user feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`DownloadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither probe strategy produced a length, or the probe transport failed.
    ProbeFailed,
    /// The server does not honor range requests.
    RangeUnsupported,
    /// The resource does not exist (404).
    ResourceMissing,
    /// Building a ranged request failed.
    ChunkRequestBuild,
    /// Network failure (or short body) during a fetch attempt.
    ChunkTransport,
    /// The server answered a ranged GET with something other than 206.
    ChunkStatus,
    /// The sink rejected body bytes.
    ChunkWrite,
    /// The caller's cancellation token fired.
    Cancelled,
    /// The URL could not be parsed.
    InvalidUrl,
    /// The destination could not be opened.
    Io,
    /// A worker task terminated abnormally.
    Worker,
}

/// Errors that can occur while downloading a resource.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The provided URL is malformed or not HTTP(S).
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Neither HEAD nor the `bytes=0-0` GET yielded a usable length.
    #[error("failed to determine size of {url}: {reason}")]
    ProbeFailed {
        /// The probed URL.
        url: String,
        /// Why the probe was rejected.
        reason: String,
    },

    /// Transport failure while probing.
    #[error("network error probing {url}: {source}")]
    ProbeTransport {
        /// The probed URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The server does not support byte-range requests.
    #[error("server does not support range requests for {url} (HTTP {status})")]
    RangeUnsupported {
        /// The probed URL.
        url: String,
        /// The status returned to the range probe.
        status: u16,
    },

    /// The resource does not exist.
    #[error("resource not found: {url}")]
    ResourceMissing {
        /// The missing URL.
        url: String,
    },

    /// Building the ranged request failed.
    #[error("failed to build request for {url} ({range}): {source}")]
    RequestBuild {
        /// The target URL.
        url: String,
        /// The Range header value.
        range: String,
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Network-level error during a chunk fetch.
    #[error("network error fetching {range} of {url}: {source}")]
    Network {
        /// The target URL.
        url: String,
        /// The Range header value.
        range: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Ranged GET answered with a status other than 206.
    #[error("HTTP {status} fetching {range} of {url} (expected 206)")]
    HttpStatus {
        /// The target URL.
        url: String,
        /// The Range header value.
        range: String,
        /// The returned status code.
        status: u16,
    },

    /// The response body ended before the chunk was filled.
    #[error("short body for {range}: expected {expected} bytes, got {actual}")]
    Incomplete {
        /// The Range header value.
        range: String,
        /// Chunk size in bytes.
        expected: u64,
        /// Bytes consumed before the body ended.
        actual: u64,
    },

    /// The sink failed to accept body bytes.
    #[error("failed to write at offset {offset}: {source}")]
    Write {
        /// Absolute offset of the failed write.
        offset: u64,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The download was cancelled.
    #[error("download of {url} cancelled")]
    Cancelled {
        /// The URL being downloaded.
        url: String,
    },

    /// The destination file could not be opened.
    #[error("IO error opening {path}: {source}")]
    Io {
        /// The destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A worker task panicked or was aborted.
    #[error("download worker failed: {message}")]
    Worker {
        /// Description of the join failure.
        message: String,
    },
}

impl DownloadError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a probe rejection error.
    pub fn probe_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a probe transport error.
    pub fn probe_transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::ProbeTransport {
            url: url.into(),
            source,
        }
    }

    /// Creates a range-unsupported error.
    pub fn range_unsupported(url: impl Into<String>, status: u16) -> Self {
        Self::RangeUnsupported {
            url: url.into(),
            status,
        }
    }

    /// Creates a resource-missing error.
    pub fn resource_missing(url: impl Into<String>) -> Self {
        Self::ResourceMissing { url: url.into() }
    }

    /// Creates a request-build error.
    pub fn request_build(
        url: impl Into<String>,
        range: impl Into<String>,
        source: reqwest::Error,
    ) -> Self {
        Self::RequestBuild {
            url: url.into(),
            range: range.into(),
            source,
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, range: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            range: range.into(),
            source,
        }
    }

    /// Creates an unexpected-status error.
    pub fn http_status(url: impl Into<String>, range: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            range: range.into(),
            status,
        }
    }

    /// Creates a short-body error.
    pub fn incomplete(range: impl Into<String>, expected: u64, actual: u64) -> Self {
        Self::Incomplete {
            range: range.into(),
            expected,
            actual,
        }
    }

    /// Creates a sink write error.
    pub fn write(offset: u64, source: std::io::Error) -> Self {
        Self::Write { offset, source }
    }

    /// Creates a cancellation error.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Creates an IO error for the destination path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a worker failure error.
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::ProbeFailed { .. } | Self::ProbeTransport { .. } => ErrorKind::ProbeFailed,
            Self::RangeUnsupported { .. } => ErrorKind::RangeUnsupported,
            Self::ResourceMissing { .. } => ErrorKind::ResourceMissing,
            Self::RequestBuild { .. } => ErrorKind::ChunkRequestBuild,
            Self::Network { .. } | Self::Incomplete { .. } => ErrorKind::ChunkTransport,
            Self::HttpStatus { .. } => ErrorKind::ChunkStatus,
            Self::Write { .. } => ErrorKind::ChunkWrite,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Io { .. } => ErrorKind::Io,
            Self::Worker { .. } => ErrorKind::Worker,
        }
    }

    /// Returns true if this error was caused by cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url, range or offset the source errors don't carry.
