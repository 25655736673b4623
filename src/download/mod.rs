//! Parallel HTTP range-download engine.
//!
//! This module downloads a single resource by splitting it into byte ranges
//! and fetching them concurrently, writing each range at its absolute offset
//! in the destination.
//!
//! # Pipeline
//!
//! 1. [`probe`] learns the total size (`HEAD`, falling back to `bytes=0-0`)
//! 2. [`plan_chunks`] tiles `[0, total)` into [`Chunk`]s
//! 3. [`batch_chunks`] groups chunks into per-worker batches
//! 4. [`RangeFetcher`] streams each chunk into a [`PositionalSink`] with retry
//! 5. The coordinator sums written bytes and keeps the first error
//!
//! # Example
//!
//! ```no_run
//! use rangedl_core::download::Downloader;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new();
//! let bytes = downloader
//!     .download("https://example.com/paper.pdf", "paper.pdf")
//!     .await?;
//! println!("Downloaded {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod chunk;
mod client;
mod config;
mod constants;
mod coordinator;
mod downloader;
mod error;
mod fetcher;
mod planner;
mod probe;
mod progress;
mod retry;
mod scheduler;
mod sink;

pub use chunk::Chunk;
pub use client::default_user_agent;
pub use config::{ConfigError, DownloadConfig, DownloadOption, MaxConcurrent, SizeDeterminer};
pub use constants::{DEFAULT_MAX_RETRIES, GIB, KIB, MAX_CHUNKS, MIB};
pub use downloader::Downloader;
pub use error::{DownloadError, ErrorKind};
pub use fetcher::RangeFetcher;
pub use planner::{PartitionPlan, default_part_determiner, plan_chunks, resolve_plan};
pub use probe::{ResourceInfo, parse_content_range_total, probe};
pub use progress::{NoopObserver, ProgressObserver};
pub use retry::{RetryDecision, RetryPolicy};
pub use scheduler::{Batch, batch_chunks};
pub use sink::{FileSink, MemorySink, PositionalSink};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
