use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::RestartConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartDecision {
    Permit { delay: Duration },
    Refuse { recent: usize },
}

/// Crash-loop breaker and backoff schedule for automatic restarts.
#[derive(Clone, Debug)]
pub struct RestartPolicy {
    pub max_restarts: usize,
    pub window: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RestartPolicy {
    pub fn from_config(config: &RestartConfig) -> Self {
        Self {
            max_restarts: config.max_rapid_restarts as usize,
            window: config.window(),
            base_delay: config.delay_base(),
            max_delay: config.delay_max(),
        }
    }

    /// `min(base * 2^recent, max)`.
    pub fn backoff_delay(&self, recent: usize) -> Duration {
        let factor = 2u32.checked_pow(recent.min(31) as u32).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Prunes the window, then either refuses (crash loop) or records `now`
    /// and returns the delay keyed off the restarts that preceded it.
    pub fn check(&self, window: &mut RestartWindow, now: Instant) -> RestartDecision {
        window.prune(now, self.window);
        let recent = window.len();

        if recent >= self.max_restarts {
            return RestartDecision::Refuse { recent };
        }

        window.record(now);
        RestartDecision::Permit {
            delay: self.backoff_delay(recent),
        }
    }
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self::from_config(&RestartConfig::default())
    }
}

#[derive(Clone, Debug, Default)]
pub struct RestartWindow {
    timestamps: VecDeque<Instant>,
}

impl RestartWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) < window {
                break;
            }
            self.timestamps.pop_front();
        }
    }

    pub fn record(&mut self, at: Instant) {
        self.timestamps.push_back(at);
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_backoff_values() {
        let policy = RestartPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(16));
        assert_eq!(policy.backoff_delay(5), Duration::from_secs(60));
        assert_eq!(policy.backoff_delay(6), Duration::from_secs(60));
        assert_eq!(policy.backoff_delay(200), Duration::from_secs(60));
    }

    #[test]
    fn test_first_restart_uses_base_delay() {
        let policy = RestartPolicy::default();
        let mut window = RestartWindow::new();
        let decision = policy.check(&mut window, Instant::now());
        assert_eq!(
            decision,
            RestartDecision::Permit {
                delay: Duration::from_secs(2)
            }
        );
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_crash_loop_breaker() {
        let policy = RestartPolicy::default();
        let mut window = RestartWindow::new();
        let start = Instant::now();

        for i in 0..5u64 {
            let decision = policy.check(&mut window, start + Duration::from_secs(i * 10));
            assert!(matches!(decision, RestartDecision::Permit { .. }), "crash {}", i);
        }

        let sixth = policy.check(&mut window, start + Duration::from_secs(60));
        assert_eq!(sixth, RestartDecision::Refuse { recent: 5 });
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn test_old_restarts_age_out() {
        let policy = RestartPolicy::default();
        let mut window = RestartWindow::new();
        let start = Instant::now();

        for i in 0..5u64 {
            policy.check(&mut window, start + Duration::from_secs(i));
        }

        let later = start + Duration::from_secs(400);
        let decision = policy.check(&mut window, later);
        assert_eq!(
            decision,
            RestartDecision::Permit {
                delay: Duration::from_secs(2)
            }
        );
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_clear_resets_window() {
        let mut window = RestartWindow::new();
        window.record(Instant::now());
        window.record(Instant::now());
        window.clear();
        assert!(window.is_empty());
    }

    proptest! {
        #[test]
        fn prop_backoff_bounded_and_monotonic(n in 0usize..64) {
            let policy = RestartPolicy::default();
            let delay = policy.backoff_delay(n);
            prop_assert!(delay <= Duration::from_secs(60));
            prop_assert!(delay >= Duration::from_secs(2));
            prop_assert!(policy.backoff_delay(n + 1) >= delay);
            if n < 5 {
                prop_assert_eq!(delay, Duration::from_secs(2u64 << n));
            }
        }
    }
}
