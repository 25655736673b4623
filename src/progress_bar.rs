//! Terminal progress bar fed by the download coordinator.

use indicatif::{ProgressBar, ProgressStyle};
use rangedl_core::{Chunk, ProgressObserver};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Chunk-granular byte progress.
#[derive(Debug)]
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressObserver for TerminalProgress {
    fn on_plan(&self, total_bytes: u64, _chunk_count: usize) {
        self.bar.set_length(total_bytes);
    }

    fn on_chunk_complete(&self, _chunk: &Chunk, bytes: u64) {
        self.bar.inc(bytes);
    }
}
