use serde::{Deserialize, Serialize};
use super::constants::DEFAULT_SERVER_PORT;

/// Inputs for the default parameter string used when no override file exists.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub freezecheck: bool,
    pub logs: bool,
    pub admin_log: bool,
    pub net_log: bool,
    pub extra_params: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
            freezecheck: true,
            logs: false,
            admin_log: false,
            net_log: false,
            extra_params: Vec::new(),
        }
    }
}
