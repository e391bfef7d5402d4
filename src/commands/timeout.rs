use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Deadline policy guarding a single subprocess invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutStrategy {
    /// Time in milliseconds after which the child is killed
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Fraction of the deadline after which the invocation is reported as slow (default 0.8)
    #[serde(default = "default_warn_fraction")]
    pub warn_fraction: f64,
}

fn default_timeout_ms() -> u64 {
    5_000
}
fn default_warn_fraction() -> f64 {
    0.8
}

impl Default for TimeoutStrategy {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            warn_fraction: default_warn_fraction(),
        }
    }
}

impl TimeoutStrategy {
    /// Strategy with the given deadline and the default warning fraction
    pub fn from_millis(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }

    /// Strategy for status queries (5 seconds)
    pub fn status_default() -> Self {
        Self::from_millis(5_000)
    }

    /// Strategy for playback actions; the executable may take a moment to reach the player
    pub fn action_default() -> Self {
        Self::from_millis(10_000)
    }

    /// Get the point after which the invocation is considered slow
    pub fn warn_after(&self) -> Duration {
        let fraction = self.warn_fraction.clamp(0.0, 1.0);
        Duration::from_millis((self.timeout_ms as f64 * fraction) as u64)
    }

    /// Get the hard deadline
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Current phase of an invocation relative to its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutPhase {
    /// Within the expected time
    Normal,
    /// Past the warning point but before the deadline
    Warning,
    /// Deadline reached, the child must be killed
    Expired,
}

/// Tracks timeout state for a running child
#[derive(Debug)]
pub struct TimeoutTracker {
    strategy: TimeoutStrategy,
    start_time: Instant,
    current_phase: TimeoutPhase,
}

impl TimeoutTracker {
    pub fn new(strategy: TimeoutStrategy) -> Self {
        Self {
            strategy,
            start_time: Instant::now(),
            current_phase: TimeoutPhase::Normal,
        }
    }

    /// Get current phase based on elapsed time
    pub fn current_phase(&mut self) -> TimeoutPhase {
        let elapsed = self.start_time.elapsed();

        let phase = if elapsed >= self.strategy.deadline() {
            TimeoutPhase::Expired
        } else if elapsed >= self.strategy.warn_after() {
            TimeoutPhase::Warning
        } else {
            TimeoutPhase::Normal
        };

        self.current_phase = phase;
        phase
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get time remaining until the phase after the last observed one
    pub fn time_to_next_phase(&self) -> Option<Duration> {
        let boundary = match self.current_phase {
            TimeoutPhase::Normal => self.strategy.warn_after(),
            TimeoutPhase::Warning => self.strategy.deadline(),
            TimeoutPhase::Expired => return None,
        };
        boundary.checked_sub(self.start_time.elapsed())
    }

    pub fn strategy(&self) -> &TimeoutStrategy {
        &self.strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy() {
        let strategy = TimeoutStrategy::default();
        assert_eq!(strategy.timeout_ms, 5_000);
        assert_eq!(strategy.warn_after(), Duration::from_millis(4_000));
        assert_eq!(strategy.deadline(), Duration::from_secs(5));
    }

    #[test]
    fn test_action_strategy_is_longer() {
        let action = TimeoutStrategy::action_default();
        let status = TimeoutStrategy::status_default();
        assert!(action.deadline() > status.deadline());
    }

    #[test]
    fn test_warn_fraction_is_clamped() {
        let strategy = TimeoutStrategy {
            timeout_ms: 1_000,
            warn_fraction: 3.0,
        };
        assert_eq!(strategy.warn_after(), strategy.deadline());
    }

    #[test]
    fn test_partial_strategy_deserializes_with_defaults() {
        let strategy: TimeoutStrategy = serde_json::from_str(r#"{"timeout_ms": 250}"#).unwrap();
        assert_eq!(strategy.timeout_ms, 250);
        assert_eq!(strategy.warn_fraction, 0.8);
    }

    #[test]
    fn test_tracker_starts_normal() {
        let mut tracker = TimeoutTracker::new(TimeoutStrategy::from_millis(60_000));
        assert_eq!(tracker.current_phase(), TimeoutPhase::Normal);
    }

    #[test]
    fn test_tracker_expires() {
        let mut tracker = TimeoutTracker::new(TimeoutStrategy::from_millis(20));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(tracker.current_phase(), TimeoutPhase::Expired);
        assert!(tracker.time_to_next_phase().is_none());
    }

    #[test]
    fn test_time_to_next_phase() {
        let tracker = TimeoutTracker::new(TimeoutStrategy::from_millis(100_000));
        let to_warning = tracker.time_to_next_phase().unwrap();
        // Should be approximately 80 seconds (warning point)
        let secs = to_warning.as_secs();
        assert!((79..=80).contains(&secs));
    }
}
