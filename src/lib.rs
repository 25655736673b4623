//! Range Downloader Core Library
//!
//! This library downloads a single file over HTTP(S), fetching several byte
//! ranges of the resource in parallel and writing each one at its absolute
//! offset in the destination.
//!
//! # Architecture
//!
//! - [`download`] - probing, partition planning, batch scheduling, range
//!   fetching with retry, and the coordinator tying them together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use download::{
    Chunk, ConfigError, DEFAULT_MAX_RETRIES, DownloadConfig, DownloadError, DownloadOption,
    Downloader, ErrorKind, FileSink, MaxConcurrent, MemorySink, PositionalSink, ProgressObserver,
};
pub use tokio_util::sync::CancellationToken;
