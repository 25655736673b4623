//! Batch scheduling: groups chunks into per-worker buckets.
//!
//! Each batch is drained sequentially by one worker; batches run
//! concurrently. Chunks inside a batch stay contiguous by offset.

use tracing::debug;

use super::chunk::Chunk;
use super::config::MaxConcurrent;

/// Chunks processed sequentially by a single worker.
pub type Batch = Vec<Chunk>;

/// Groups `chunks` into batches honoring `max_concurrent`.
///
/// With `Unlimited`, or with no more chunks than the limit, every chunk gets
/// its own batch. Otherwise exactly `k` batches are built and chunk `i` goes
/// to batch `min(i / (n / k), k - 1)`, so the tail batch takes the remainder.
#[must_use]
pub fn batch_chunks(chunks: Vec<Chunk>, max_concurrent: MaxConcurrent) -> Vec<Batch> {
    let count = chunks.len();
    let limit = match max_concurrent {
        MaxConcurrent::Limited(k) if k > 0 && count > k => k,
        _ => {
            debug!(batches = count, "one chunk per batch");
            return chunks.into_iter().map(|chunk| vec![chunk]).collect();
        }
    };

    let per_batch = count / limit;
    let mut batches: Vec<Batch> = (0..limit).map(|_| Vec::with_capacity(per_batch)).collect();
    for (index, chunk) in chunks.into_iter().enumerate() {
        let batch_index = (index / per_batch).min(limit - 1);
        batches[batch_index].push(chunk);
    }

    debug!(batches = limit, per_batch, chunks = count, "grouped chunks into batches");
    batches
}
