//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use rangedl_core::{DEFAULT_MAX_RETRIES, DownloadOption, MaxConcurrent};

/// Fallback output name when the URL has no usable last segment.
const FALLBACK_FILENAME: &str = "download.bin";

/// Download a file over HTTP(S) using parallel range requests.
#[derive(Parser, Debug)]
#[command(name = "rangedl")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the file to download
    pub url: String,

    /// Destination path (defaults to the last URL path segment)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum concurrent chunk fetches (0 = unlimited)
    #[arg(short = 'c', long, default_value_t = 0)]
    pub concurrency: usize,

    /// Attempts per chunk for transient failures
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Fixed chunk size in bytes
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), conflicts_with = "parts")]
    pub chunk_size: Option<u64>,

    /// Fixed number of chunks
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub parts: Option<u64>,

    /// Base delay between chunk attempts in milliseconds (0 retries immediately)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub retry_delay_ms: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Translates flags into downloader options.
    pub fn download_options(&self) -> Vec<DownloadOption> {
        let mut options = vec![
            DownloadOption::MaxRetries(self.max_retries),
            DownloadOption::MaxConcurrent(MaxConcurrent::from_count(self.concurrency)),
            DownloadOption::RetryDelay(Duration::from_millis(self.retry_delay_ms)),
        ];
        if let Some(chunk_size) = self.chunk_size {
            options.push(DownloadOption::ChunkSize(chunk_size));
        }
        if let Some(parts) = self.parts {
            options.push(DownloadOption::part_determiner(move |_| parts));
        }
        options
    }

    /// Returns `--output` or a name derived from the URL.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_output_name(&self.url)))
    }
}

/// Last non-empty path segment of `url`, or `download.bin`.
pub fn default_output_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()?
                .next_back()
                .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}
