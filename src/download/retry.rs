use std::thread;
use std::time::Duration;

use crate::error::Result;

/// Maximum attempts for transient errors
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (milliseconds)
pub const RETRY_BASE_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRY_ATTEMPTS,
            base_delay_ms: RETRY_BASE_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Run `operation`, retrying transient failures with exponential backoff
    pub fn run<T>(&self, label: &str, mut operation: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 0;

        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt + 1 < self.max_attempts => {
                    attempt += 1;
                    let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                    tracing::warn!(
                        operation = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay,
                        error = %e,
                        "request failed, retrying"
                    );
                    thread::sleep(Duration::from_millis(delay));
                }
                Err(e) => return Err(e),
            }
        }
    }
}
