use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use warden_types::{
    DEFAULT_CONTROL_DIR, MAINTENANCE_MARKER_NAME, PID_FILE_NAME, SOCKET_FILE_NAME, STATE_FILE_NAME,
};

use super::constants::*;

/// Filesystem layout of the container: where the server lives and where the
/// control plane files are exchanged with collaborators.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub server_files: PathBuf,
    pub binary_name: String,
    pub control_dir: PathBuf,
    pub profiles_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            server_files: PathBuf::from(DEFAULT_SERVER_FILES),
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            control_dir: PathBuf::from(DEFAULT_CONTROL_DIR),
            profiles_dir: PathBuf::from(DEFAULT_PROFILES_DIR),
        }
    }
}

impl PathsConfig {
    /// Layout rooted in a single control directory, everything else default.
    pub fn with_control_dir(control_dir: impl Into<PathBuf>) -> Self {
        Self {
            control_dir: control_dir.into(),
            ..Default::default()
        }
    }

    pub fn binary(&self) -> PathBuf {
        self.server_files.join(&self.binary_name)
    }

    pub fn socket(&self) -> PathBuf {
        self.control_dir.join(SOCKET_FILE_NAME)
    }

    pub fn state_file(&self) -> PathBuf {
        self.control_dir.join(STATE_FILE_NAME)
    }

    pub fn pid_file(&self) -> PathBuf {
        self.control_dir.join(PID_FILE_NAME)
    }

    pub fn maintenance_marker(&self) -> PathBuf {
        self.control_dir.join(MAINTENANCE_MARKER_NAME)
    }

    pub fn mod_param_file(&self) -> PathBuf {
        self.control_dir.join(MOD_PARAM_FILE_NAME)
    }

    pub fn server_mod_param_file(&self) -> PathBuf {
        self.control_dir.join(SERVER_MOD_PARAM_FILE_NAME)
    }

    pub fn server_params_file(&self) -> PathBuf {
        self.control_dir.join(SERVER_PARAMS_FILE_NAME)
    }

    pub fn config_file(&self) -> PathBuf {
        self.control_dir.join(CONFIG_FILE_NAME)
    }

    pub fn server_cfg(&self) -> PathBuf {
        self.profiles_dir.join(SERVER_CFG_NAME)
    }

    pub fn battleye_dir(&self) -> PathBuf {
        self.profiles_dir.join(BATTLEYE_DIR_NAME)
    }
}
