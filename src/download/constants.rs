//! Constants for the download module (timeouts, retry defaults).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (60 seconds without receiving data).
pub const READ_TIMEOUT_SECS: u64 = 60;

/// Default timeout for the HEAD size probe (20 seconds).
pub const PROBE_TIMEOUT_SECS: u64 = 20;

/// Upper bound accepted for a server-supplied Retry-After delay.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);
