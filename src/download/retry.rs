//! Declarative retry policy with exponential backoff.
//!
//! A [`RetryPolicy`] describes *when* and *how long*: the attempt budget,
//! the backoff shape, and which HTTP statuses count as transient. It knows
//! nothing about the HTTP client; the engine feeds it classified failures.
//!
//! # Example
//!
//! ```
//! use datamirror_core::download::{DownloadError, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! let error = DownloadError::http_status("https://example.com/file.npy", 503);
//! let failure_type = policy.classify(&error);
//!
//! match policy.should_retry(failure_type, 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::time::{Duration, SystemTime};

use rand::Rng;
use tracing::{debug, instrument, warn};

use super::DownloadError;
use super::constants::MAX_RETRY_AFTER;

/// Default maximum attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default HTTP statuses retried with backoff.
pub const DEFAULT_RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Default base delay for exponential backoff (500 milliseconds).
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Default maximum delay cap (30 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Classification of download failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: connection refused, timeout, retryable 5xx, 429, short body.
    Transient,

    /// Failure that won't succeed regardless of retries.
    ///
    /// Examples: 404 Not Found, 403 Forbidden, invalid URL, local IO error.
    Permanent,
}

/// Decision on whether to retry a failed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the download after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the download.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry budget, backoff shape and retryable status set.
///
/// # Default Values
///
/// - `max_attempts`: 5
/// - `base_delay`: 500 ms
/// - `max_delay`: 30 seconds
/// - `backoff_multiplier`: 2.0
/// - `max_jitter`: none
/// - `retryable_statuses`: 429, 500, 502, 503, 504
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt - 1), max_delay) + jitter
/// ```
///
/// With defaults, delays are 0.5s, 1s, 2s, 4s before the budget runs out.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Base delay for the first retry.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied each attempt (typically 2.0 for doubling).
    backoff_multiplier: f32,

    /// Upper bound of random jitter added to each delay.
    max_jitter: Duration,

    /// HTTP statuses classified as transient.
    retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_jitter: Duration::ZERO,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum attempts including initial (coerced to >= 1)
    /// * `base_delay` - Base delay for first retry
    /// * `max_delay` - Maximum delay cap
    /// * `backoff_multiplier` - Multiplier for exponential increase
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
            ..Self::default()
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Adds up to `max_jitter` of random delay to every backoff.
    #[must_use]
    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Replaces the set of HTTP statuses treated as transient.
    #[must_use]
    pub fn with_retryable_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_statuses = statuses.into_iter().collect();
        self
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the largest delay the policy will ever wait.
    #[must_use]
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Returns the HTTP statuses treated as transient.
    #[must_use]
    pub fn retryable_statuses(&self) -> &[u16] {
        &self.retryable_statuses
    }

    /// Classifies a download error for retry decisions.
    ///
    /// | Error | Type |
    /// |-------|------|
    /// | HTTP status in the retryable set | Transient |
    /// | Any other HTTP status | Permanent |
    /// | Timeout | Transient |
    /// | Network (TLS/certificate) | Permanent |
    /// | Network (other) | Transient |
    /// | Integrity (short or long body) | Transient |
    /// | IO | Permanent |
    /// | InvalidUrl | Permanent |
    #[must_use]
    pub fn classify(&self, error: &DownloadError) -> FailureType {
        match error {
            DownloadError::HttpStatus { status, .. } => {
                if self.retryable_statuses.contains(status) {
                    FailureType::Transient
                } else {
                    FailureType::Permanent
                }
            }
            DownloadError::Timeout { .. } | DownloadError::Integrity { .. } => {
                FailureType::Transient
            }
            DownloadError::Network { source, .. } => {
                if is_tls_error(source) {
                    FailureType::Permanent
                } else {
                    FailureType::Transient
                }
            }
            DownloadError::Io { .. } | DownloadError::InvalidUrl { .. } => FailureType::Permanent,
        }
    }

    /// Determines whether to retry a failed download.
    ///
    /// # Arguments
    ///
    /// * `failure_type` - Classification of the failure
    /// * `attempt` - The attempt number that just failed (1-indexed)
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Calculates the delay for a retry attempt with exponential backoff and jitter.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);

        // attempt 1 = base * multiplier^0
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);

        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + self.calculate_jitter()
    }

    /// Generates random jitter between 0 and `max_jitter`.
    #[allow(clippy::cast_possible_truncation)]
    fn calculate_jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let mut rng = rand::thread_rng();
        let jitter_ms = rng.gen_range(0..=self.max_jitter.as_millis() as u64);
        Duration::from_millis(jitter_ms)
    }
}

/// Parses a Retry-After header value (delta-seconds or HTTP-date).
///
/// Returns `None` for negative, past or unparseable values. Values above
/// one hour are capped.
#[must_use]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        if seconds < 0 {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        }
        let duration = Duration::from_secs(seconds.unsigned_abs());
        return Some(cap_retry_after(duration));
    }

    let datetime = httpdate::parse_http_date(header_value).ok()?;
    let duration = datetime.duration_since(SystemTime::now()).ok()?;
    Some(cap_retry_after(duration))
}

fn cap_retry_after(duration: Duration) -> Duration {
    if duration > MAX_RETRY_AFTER {
        warn!(
            delay_secs = duration.as_secs(),
            max_secs = MAX_RETRY_AFTER.as_secs(),
            "Retry-After exceeds maximum, capping"
        );
        MAX_RETRY_AFTER
    } else {
        duration
    }
}

/// Checks if a reqwest error is a TLS/certificate error.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let error_string = error.to_string().to_lowercase();
    error_string.contains("certificate")
        || error_string.contains("tls")
        || error_string.contains("ssl")
        || error_string.contains("handshake")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== RetryPolicy Tests ====================

    #[test]
    fn test_retry_policy_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
        assert!((policy.backoff_multiplier - 2.0).abs() < f32::EPSILON);
        assert_eq!(policy.retryable_statuses(), &[429, 500, 502, 503, 504]);
    }

    #[test]
    fn test_retry_policy_max_attempts_minimum_is_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts(), 1);
        let policy = RetryPolicy::new(0, Duration::ZERO, Duration::ZERO, 2.0);
        assert_eq!(policy.max_attempts(), 1);
    }

    // ==================== Delay Calculation Tests ====================

    #[test]
    fn test_default_backoff_sequence() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = (1..=4).map(|a| policy.calculate_delay(a)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn test_delay_calculation_respects_max_delay() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        assert_eq!(policy.calculate_delay(6), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_within_bounds() {
        let policy = RetryPolicy::default().with_jitter(Duration::from_millis(100));
        for _ in 0..100 {
            let delay = policy.calculate_delay(1);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(600));
        }
    }

    // ==================== Error Classification Tests ====================

    #[test]
    fn test_classify_retryable_statuses_transient() {
        let policy = RetryPolicy::default();
        for status in [429, 500, 502, 503, 504] {
            let error = DownloadError::http_status("http://example.com", status);
            assert_eq!(policy.classify(&error), FailureType::Transient, "{status}");
        }
    }

    #[test]
    fn test_classify_other_statuses_permanent() {
        let policy = RetryPolicy::default();
        for status in [400, 401, 403, 404, 410, 501] {
            let error = DownloadError::http_status("http://example.com", status);
            assert_eq!(policy.classify(&error), FailureType::Permanent, "{status}");
        }
    }

    #[test]
    fn test_classify_custom_status_set() {
        let policy = RetryPolicy::default().with_retryable_statuses([404]);
        let error = DownloadError::http_status("http://example.com", 404);
        assert_eq!(policy.classify(&error), FailureType::Transient);
        let error = DownloadError::http_status("http://example.com", 503);
        assert_eq!(policy.classify(&error), FailureType::Permanent);
    }

    #[test]
    fn test_classify_timeout_and_integrity_transient() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.classify(&DownloadError::timeout("http://example.com")),
            FailureType::Transient
        );
        assert_eq!(
            policy.classify(&DownloadError::integrity("/d/x", 10, 3)),
            FailureType::Transient
        );
    }

    #[test]
    fn test_classify_io_and_invalid_url_permanent() {
        let policy = RetryPolicy::default();
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            policy.classify(&DownloadError::io("/path/to/file", io_err)),
            FailureType::Permanent
        );
        assert_eq!(
            policy.classify(&DownloadError::invalid_url("not-a-url")),
            FailureType::Permanent
        );
    }

    // ==================== Should Retry Decision Tests ====================

    #[test]
    fn test_should_retry_permanent_does_not_retry() {
        let policy = RetryPolicy::default();
        let decision = policy.should_retry(FailureType::Permanent, 1);
        assert!(matches!(decision, RetryDecision::DoNotRetry { ref reason } if reason.contains("permanent")));
    }

    #[test]
    fn test_should_retry_respects_five_attempt_budget() {
        let policy = RetryPolicy::default();
        for attempt in 1..5 {
            let decision = policy.should_retry(FailureType::Transient, attempt);
            assert!(
                matches!(decision, RetryDecision::Retry { attempt: next, .. } if next == attempt + 1)
            );
        }
        let decision = policy.should_retry(FailureType::Transient, 5);
        assert!(matches!(decision, RetryDecision::DoNotRetry { ref reason } if reason.contains("exhausted")));
    }

    // ==================== Retry-After Tests ====================

    #[test]
    fn test_parse_retry_after_seconds() {
        assert_eq!(parse_retry_after(" 7 "), Some(Duration::from_secs(7)));
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("soon"), None);
    }

    #[test]
    fn test_parse_retry_after_caps_large_values() {
        assert_eq!(parse_retry_after("999999"), Some(MAX_RETRY_AFTER));
    }

    #[test]
    fn test_parse_retry_after_http_date_in_past_is_none() {
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}
