//! CLI entry point for the range downloader.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rangedl_core::{CancellationToken, Downloader};
use tracing::{debug, info, warn};

mod cli;
mod progress_bar;

use cli::Args;
use progress_bar::TerminalProgress;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let output = args.output_path();
    let mut downloader =
        Downloader::with_options(args.download_options()).context("invalid download options")?;

    let progress = (!args.quiet).then(|| Arc::new(TerminalProgress::new()));
    if let Some(progress) = &progress {
        downloader = downloader.with_observer(Arc::clone(progress) as _);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling download");
            on_interrupt.cancel();
        }
    });

    info!(url = %args.url, output = %output.display(), "starting download");
    let result = downloader
        .download_with_cancellation(cancel, &args.url, &output)
        .await;

    match result {
        Ok(bytes) => {
            if let Some(progress) = &progress {
                progress.finish();
            }
            info!(bytes, path = %output.display(), "download finished");
            if !args.quiet {
                println!("Downloaded {bytes} bytes to {}", output.display());
            }
            Ok(())
        }
        Err(e) => {
            if let Some(progress) = &progress {
                progress.abandon();
            }
            Err(e).with_context(|| format!("failed to download {}", args.url))
        }
    }
}
