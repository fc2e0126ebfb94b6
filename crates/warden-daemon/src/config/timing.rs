use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle timings, in milliseconds so tests can shrink them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub start_grace_ms: u64,
    pub stop_timeout_ms: u64,
    pub stop_poll_ms: u64,
    pub kill_timeout_ms: u64,
    pub restart_pause_ms: u64,
    pub monitor_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            start_grace_ms: 2_000,
            stop_timeout_ms: 30_000,
            stop_poll_ms: 1_000,
            kill_timeout_ms: 5_000,
            restart_pause_ms: 2_000,
            monitor_interval_ms: 1_000,
        }
    }
}

impl TimingConfig {
    pub fn start_grace(&self) -> Duration {
        Duration::from_millis(self.start_grace_ms)
    }

    pub fn stop_poll(&self) -> Duration {
        Duration::from_millis(self.stop_poll_ms.max(1))
    }

    pub fn kill_timeout(&self) -> Duration {
        Duration::from_millis(self.kill_timeout_ms)
    }

    pub fn restart_pause(&self) -> Duration {
        Duration::from_millis(self.restart_pause_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms.max(1))
    }

    /// Number of graceful-stop polls before escalating to SIGKILL.
    pub fn stop_ticks(&self) -> u64 {
        (self.stop_timeout_ms / self.stop_poll_ms.max(1)).max(1)
    }
}
