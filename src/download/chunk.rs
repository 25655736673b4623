//! Chunk descriptors: a fixed byte range plus a write cursor.

use std::fmt;
use std::io;

use bytes::Bytes;

use super::sink::PositionalSink;

/// A contiguous `[start, start + size)` slice of the remote resource.
///
/// `start` and `size` never change after planning. `cursor` counts the bytes
/// written for the current attempt and is only advanced by the worker that
/// owns the chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    start: u64,
    size: u64,
    cursor: u64,
}

impl Chunk {
    /// Creates a chunk covering `size` bytes from `start`.
    #[must_use]
    pub fn new(start: u64, size: u64) -> Self {
        Self {
            start,
            size,
            cursor: 0,
        }
    }

    /// Absolute offset of the first byte.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of bytes covered.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Absolute offset of the last byte (inclusive).
    #[must_use]
    pub fn end(&self) -> u64 {
        self.start + self.size.saturating_sub(1)
    }

    /// Bytes written so far in the current attempt.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Returns true once every byte of the chunk has been written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.size
    }

    /// Returns the `Range` header value, e.g. `bytes=0-1023`.
    #[must_use]
    pub fn bytes_range(&self) -> String {
        format!("bytes={}-{}", self.start, self.end())
    }

    /// Resets the cursor so a fresh attempt overwrites from `start`.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Writes `data` at `start + cursor` and advances the cursor.
    ///
    /// Bytes beyond the chunk's remaining room are dropped, so a chunk never
    /// writes past `start + size`. A full chunk returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns the sink's IO error; the cursor is not advanced in that case.
    pub async fn write(&mut self, sink: &dyn PositionalSink, mut data: Bytes) -> io::Result<usize> {
        let remaining = self.size - self.cursor.min(self.size);
        if remaining == 0 || data.is_empty() {
            return Ok(0);
        }
        if data.len() as u64 > remaining {
            // remaining < data.len(), so it fits in usize
            data.truncate(remaining as usize);
        }

        let n = sink.write_at(data, self.start + self.cursor).await?;
        self.cursor += n as u64;
        Ok(n)
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk{{start={}, size={}, cursor={}}}",
            self.start, self.size, self.cursor
        )
    }
}
