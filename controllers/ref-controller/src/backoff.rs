//! # Fibonacci Backoff
//!
//! Requeue delays for owners whose reconciliation keeps failing transiently.
//! Delays follow the Fibonacci sequence in minutes, capped at a maximum:
//! 1m, 1m, 2m, 3m, 5m, 8m, 10m (max) with the default bounds.
//!
//! This state lives in the error policy, never in the reconciler itself.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use typed_store::ObjectKey;

/// Fibonacci backoff calculator
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Minimum backoff value in minutes (for reset)
    min_minutes: u64,
    /// Previous backoff value in minutes
    prev_minutes: u64,
    /// Current backoff value in minutes
    current_minutes: u64,
    /// Maximum backoff value in minutes
    max_minutes: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff bounded by `min_minutes` and `max_minutes`
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes,
            max_minutes,
        }
    }

    /// Return the current delay and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let delay = Duration::from_secs(self.current_minutes.saturating_mul(60));

        let next_minutes = self.prev_minutes.saturating_add(self.current_minutes);
        self.prev_minutes = self.current_minutes;
        self.current_minutes = std::cmp::min(next_minutes, self.max_minutes);

        delay
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes;
    }
}

/// Per-owner backoff state, keyed by namespace/name
#[derive(Debug)]
pub struct BackoffTracker {
    min_minutes: u64,
    max_minutes: u64,
    states: Mutex<HashMap<ObjectKey, FibonacciBackoff>>,
}

impl BackoffTracker {
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            max_minutes,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Next requeue delay for `key`
    pub fn next(&self, key: &ObjectKey) -> Duration {
        let mut states = self.states.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        states
            .entry(key.clone())
            .or_insert_with(|| FibonacciBackoff::new(self.min_minutes, self.max_minutes))
            .next_backoff()
    }

    /// Forget the failure streak of `key` after a successful pass
    pub fn reset(&self, key: &ObjectKey) {
        let mut states = self.states.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        states.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(1, 10);

        for expected in [1, 1, 2, 3, 5, 8, 10, 10] {
            assert_eq!(backoff.next_backoff(), minutes(expected));
        }
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::new(1, 10);
        backoff.next_backoff();
        backoff.next_backoff();
        backoff.next_backoff();

        backoff.reset();

        assert_eq!(backoff.next_backoff(), minutes(1));
        assert_eq!(backoff.next_backoff(), minutes(1));
        assert_eq!(backoff.next_backoff(), minutes(2));
    }

    #[test]
    fn test_tracker_keeps_streaks_per_key() {
        let tracker = BackoffTracker::new(1, 10);
        let a = ObjectKey::new("ns", "a");
        let b = ObjectKey::new("ns", "b");

        assert_eq!(tracker.next(&a), minutes(1));
        assert_eq!(tracker.next(&a), minutes(1));
        assert_eq!(tracker.next(&a), minutes(2));
        assert_eq!(tracker.next(&b), minutes(1));

        tracker.reset(&a);
        assert_eq!(tracker.next(&a), minutes(1));
        assert_eq!(tracker.next(&b), minutes(1));
    }

    #[test]
    fn test_unbounded_cap_saturates() {
        let mut backoff = FibonacciBackoff::new(1, u64::MAX);
        let mut last = Duration::ZERO;

        for _ in 0..100 {
            last = backoff.next_backoff();
        }

        assert_eq!(last, Duration::from_secs(u64::MAX));
    }
}
