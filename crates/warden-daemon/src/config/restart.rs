use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    pub max_rapid_restarts: u32,
    pub window_secs: u64,
    pub delay_base_secs: u64,
    pub delay_max_secs: u64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            max_rapid_restarts: 5,
            window_secs: 300,
            delay_base_secs: 2,
            delay_max_secs: 60,
        }
    }
}

impl RestartConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn delay_base(&self) -> Duration {
        Duration::from_secs(self.delay_base_secs)
    }

    pub fn delay_max(&self) -> Duration {
        Duration::from_secs(self.delay_max_secs)
    }
}
