//! Partition planning: turns a total size into chunk descriptors.
//!
//! The produced chunks are disjoint, ordered by offset and tile
//! `[0, total_size)` exactly; the last chunk absorbs any remainder.

use tracing::debug;

use super::chunk::Chunk;
use super::config::DownloadConfig;
use super::constants::{MAX_CHUNKS, MIB};

/// How a total size is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    /// Number of chunks.
    pub num_parts: u64,
    /// Nominal chunk size; the last chunk may be larger or smaller.
    pub chunk_size: u64,
}

/// Built-in part count: 1 below 1 MiB, 4 below 10 MiB, 16 below 100 MiB,
/// otherwise 32.
#[must_use]
pub fn default_part_determiner(total_size: u64) -> u64 {
    match total_size {
        s if s < MIB => 1,
        s if s < 10 * MIB => 4,
        s if s < 100 * MIB => 16,
        _ => 32,
    }
}

/// Resolves chunking for `total_size` using the precedence documented on
/// [`DownloadConfig`]. Returns `None` for an empty resource.
#[must_use]
pub fn resolve_plan(total_size: u64, config: &DownloadConfig) -> Option<PartitionPlan> {
    if total_size == 0 {
        return None;
    }

    let plan = if let Some(chunk_size) = config.chunk_size {
        by_chunk_size(total_size, chunk_size)
    } else if let Some(determiner) = &config.part_determiner {
        by_part_count(total_size, determiner(total_size))
    } else if let Some(determiner) = &config.chunk_size_determiner {
        by_chunk_size(total_size, determiner(total_size))
    } else {
        by_part_count(total_size, default_part_determiner(total_size))
    };
    Some(plan)
}

fn by_chunk_size(total_size: u64, chunk_size: u64) -> PartitionPlan {
    // Smallest chunk that keeps the plan within MAX_CHUNKS.
    let floor = total_size.div_ceil(MAX_CHUNKS);
    if chunk_size < floor {
        debug!(requested = chunk_size, chunk_size = floor, "chunk size raised to cap chunk count");
    }
    let chunk_size = chunk_size.clamp(floor, total_size);
    PartitionPlan {
        num_parts: total_size.div_ceil(chunk_size),
        chunk_size,
    }
}

fn by_part_count(total_size: u64, num_parts: u64) -> PartitionPlan {
    // Every chunk must hold at least one byte.
    let ceiling = total_size.min(MAX_CHUNKS);
    if num_parts > ceiling {
        debug!(requested = num_parts, num_parts = ceiling, "part count capped");
    }
    let num_parts = num_parts.clamp(1, ceiling);
    PartitionPlan {
        num_parts,
        chunk_size: total_size / num_parts,
    }
}

/// Builds the chunk list for `total_size`.
#[must_use]
pub fn plan_chunks(total_size: u64, config: &DownloadConfig) -> Vec<Chunk> {
    let Some(plan) = resolve_plan(total_size, config) else {
        debug!("empty resource, nothing to plan");
        return Vec::new();
    };

    let chunks: Vec<Chunk> = (0..plan.num_parts)
        .map(|i| {
            let start = i * plan.chunk_size;
            let size = if i + 1 == plan.num_parts {
                total_size - start
            } else {
                plan.chunk_size
            };
            Chunk::new(start, size)
        })
        .collect();

    debug!(
        total_size,
        num_parts = plan.num_parts,
        chunk_size = plan.chunk_size,
        "planned chunks"
    );
    chunks
}
