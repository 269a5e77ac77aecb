//! Backoff policy for transient fetch failures.

use rand::Rng;
use tokio::time::Duration;

use crate::config::Config;

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 5000,
            jitter_factor: 0.3,
        }
    }
}

impl RetryConfig {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay_ms: cfg.retry_base_delay_ms,
            max_delay_ms: cfg.retry_max_delay_ms,
            ..Default::default()
        }
    }

    /// Exponential backoff with jitter, clamped to `max_delay_ms`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms as f64 * 2.0_f64.powi(attempt as i32);
        let clamped = base.min(self.max_delay_ms as f64);

        let jitter_range = clamped * self.jitter_factor;
        let jitter: f64 = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };
        let final_delay = (clamped + jitter).max(0.0);

        Duration::from_millis(final_delay as u64)
    }
}

/// Statuses worth retrying; client errors like 404 are final.
pub fn is_retryable_http_status(status: u16) -> bool {
    matches!(
        status,
        408 |   // Request Timeout
        429 |   // Too Many Requests
        500 |   // Internal Server Error
        502 |   // Bad Gateway
        503 |   // Service Unavailable
        504     // Gateway Timeout
    )
}

pub fn is_retryable_network_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_clamps() {
        let policy = RetryConfig {
            max_retries: 5,
            base_delay_ms: 50,
            max_delay_ms: 400,
            jitter_factor: 0.0,
        };
        let delays: Vec<u64> = (0..5)
            .map(|attempt| policy.delay_for_attempt(attempt).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![50, 100, 200, 400, 400]);
    }

    #[test]
    fn zero_jitter_is_deterministic() {
        // jitter_factor 0 must skip the rng entirely, so repeated calls
        // for the same attempt agree exactly
        let policy = RetryConfig {
            jitter_factor: 0.0,
            ..Default::default()
        };
        assert_eq!(policy.delay_for_attempt(2), policy.delay_for_attempt(2));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn jitter_stays_within_configured_band() {
        let policy = RetryConfig {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 5000,
            jitter_factor: 0.3,
        };
        for _ in 0..50 {
            let ms = policy.delay_for_attempt(1).as_millis() as f64;
            assert!((140.0..=260.0).contains(&ms), "delay {} outside band", ms);
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_http_status(429));
        assert!(is_retryable_http_status(503));
        assert!(!is_retryable_http_status(404));
        assert!(!is_retryable_http_status(200));
        assert!(!is_retryable_http_status(401));
    }
}
