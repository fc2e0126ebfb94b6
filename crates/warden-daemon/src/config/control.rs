use serde::{Deserialize, Serialize};
use std::time::Duration;
use warden_types::{MAX_REQUEST_BYTES, MAX_RESPONSE_BYTES};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub socket_mode: u32,
    pub client_timeout_secs: u64,
    pub stale_after_secs: u64,
    pub max_request_bytes: usize,
    pub max_response_bytes: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            socket_mode: 0o666,
            client_timeout_secs: 5,
            stale_after_secs: 60,
            max_request_bytes: MAX_REQUEST_BYTES,
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }
}

impl ControlConfig {
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn socket_world_writable(&self) -> bool {
        self.socket_mode & 0o002 != 0
    }
}
