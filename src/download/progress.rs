//! Progress observation hooks.

use super::chunk::Chunk;

/// Receives coordinator events. Both methods default to no-ops.
///
/// Calls come from worker tasks, never while the shared state lock is held.
pub trait ProgressObserver: Send + Sync {
    /// Called once after probing and planning.
    fn on_plan(&self, total_bytes: u64, chunk_count: usize) {
        let _ = (total_bytes, chunk_count);
    }

    /// Called after a chunk finished and its bytes were counted.
    fn on_chunk_complete(&self, chunk: &Chunk, bytes: u64) {
        let _ = (chunk, bytes);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
