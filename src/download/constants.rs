//! Constants for the download module (size units, defaults, timeouts).

use std::time::Duration;

/// One kibibyte.
pub const KIB: u64 = 1 << 10;

/// One mebibyte.
pub const MIB: u64 = 1 << 20;

/// One gibibyte.
pub const GIB: u64 = 1 << 30;

/// Upper bound on the number of chunks in one plan.
pub const MAX_CHUNKS: u64 = 1 << 16;

/// Default per-chunk attempt count.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes between body reads).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Upper bound for a single backoff delay between chunk attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(32);

/// Maximum jitter added to non-zero retry delays.
pub const MAX_JITTER: Duration = Duration::from_millis(250);
