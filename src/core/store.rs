use std::collections::HashMap;
use thiserror::Error;

/// Local failure taxonomy. Storage problems are recovered near the call
/// site (fall back to in-memory state); they never surface to the user as a
/// hard failure.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("malformed record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}

/// The persistence surface the engine talks to. Implementations must degrade
/// gracefully when the backing store is unavailable (private browsing,
/// storage disabled) rather than propagate errors upward.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError>;
    fn remove(&mut self, key: &str);
}

/// Plain in-memory store: the fallback backend and the test backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }
}

/// Exponential backoff schedule for retryable operations.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 250,
            max_delay_ms: 4000,
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after the given zero-based failed attempt.
    pub fn delay_for(&self, attempt: u32) -> u64 {
        let factor = 1u64 << attempt.min(20);
        self.base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms)
    }
}

/// Run `op` up to `policy.max_attempts` times. After each failed attempt
/// short of the cap, `on_retry(next_attempt, delay_ms)` is invoked so the
/// caller can schedule or log the wait (the engine itself never blocks).
/// Once attempts are exhausted the last error is returned, not swallowed.
pub fn retry_with_backoff<T, E>(
    policy: BackoffPolicy,
    mut op: impl FnMut(u32) -> Result<T, E>,
    mut on_retry: impl FnMut(u32, u64),
) -> Result<T, E> {
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.max_attempts.max(1) {
                    return Err(err);
                }
                on_retry(attempt, policy.delay_for(attempt - 1));
            }
        }
    }
}
