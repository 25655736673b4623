//! Positional byte sinks.
//!
//! The engine never seeks or appends: every write names its absolute offset.
//! Concurrent writers are safe as long as their offsets don't overlap, which
//! the partition planner guarantees.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

/// Destination that accepts `(bytes, offset)` writes.
#[async_trait]
pub trait PositionalSink: Send + Sync {
    /// Writes all of `data` starting at `offset`.
    ///
    /// Returns the number of bytes written, which equals `data.len()` on
    /// success. A sink that cannot write everything must return an error.
    async fn write_at(&self, data: Bytes, offset: u64) -> io::Result<usize>;
}

/// File-backed sink using positional writes.
#[derive(Debug, Clone)]
pub struct FileSink {
    file: Arc<File>,
}

impl FileSink {
    /// Opens `path` for writing, creating it if needed and truncating any
    /// previous contents. New files get mode `0644` on Unix.
    ///
    /// # Errors
    ///
    /// Returns the IO error from opening the file.
    pub async fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let mut options = tokio::fs::OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o644);

        let file = options.open(path).await?.into_std().await;
        debug!(path = %path.display(), "opened destination file");
        Ok(Self::from_std(file))
    }

    /// Wraps an already-open file.
    #[must_use]
    pub fn from_std(file: File) -> Self {
        Self {
            file: Arc::new(file),
        }
    }
}

#[async_trait]
impl PositionalSink for FileSink {
    async fn write_at(&self, data: Bytes, offset: u64) -> io::Result<usize> {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || {
            write_all_at(&file, &data, offset)?;
            Ok(data.len())
        })
        .await
        .map_err(io::Error::other)?
    }
}

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;

    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// In-memory sink; the buffer grows (zero-filled) to fit any offset.
#[derive(Debug, Default)]
pub struct MemorySink {
    buf: Mutex<Vec<u8>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the bytes written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Consumes the sink and returns its buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PositionalSink for MemorySink {
    async fn write_at(&self, data: Bytes, offset: u64) -> io::Result<usize> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset exceeds memory"))?;
        let end = start
            .checked_add(data.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "write overflows"))?;

        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        if buf.len() < end {
            buf.resize(end, 0);
        }
        buf[start..end].copy_from_slice(&data);
        Ok(data.len())
    }
}
