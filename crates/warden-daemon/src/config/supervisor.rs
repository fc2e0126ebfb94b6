use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use warden_types::{WardenError, WardenResult};

use super::control::ControlConfig;
use super::logging::LoggingConfig;
use super::paths::PathsConfig;
use super::restart::RestartConfig;
use super::server::ServerConfig;
use super::timing::TimingConfig;
use super::types::{ConfigWarning, LogLevel, WarningSeverity};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    pub paths: PathsConfig,
    pub restart: RestartConfig,
    pub timing: TimingConfig,
    pub control: ControlConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl SupervisorConfig {
    pub fn load(path: impl AsRef<Path>) -> WardenResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| WardenError::Config(format!("Failed to read config: {}", e)))?;

            toml::from_str(&contents)
                .map_err(|e| WardenError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> WardenResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| WardenError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| WardenError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| WardenError::Config(format!("Failed to write config: {}", e)))?;

        info!("Configuration saved to {:?}", path.as_ref());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("WARDEN_CONTROL_DIR") {
            self.paths.control_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("WARDEN_SERVER_FILES") {
            self.paths.server_files = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("WARDEN_PROFILES_DIR") {
            self.paths.profiles_dir = PathBuf::from(dir);
        }

        if let Ok(port) = std::env::var("SERVER_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!("Ignoring invalid SERVER_PORT value: {}", port),
            }
        }

        if let Ok(level) = std::env::var("WARDEN_LOG_LEVEL") {
            self.logging.level = LogLevel::parse_lossy(&level);
        }

        if std::env::var("WARDEN_LOG_JSON").is_ok() {
            self.logging.json = true;
        }
    }

    pub fn validate(&self) -> WardenResult<()> {
        if self.restart.max_rapid_restarts == 0 {
            return Err(WardenError::Config(
                "max_rapid_restarts must be at least 1".into(),
            ));
        }

        if self.restart.window_secs == 0 {
            return Err(WardenError::Config(
                "Rapid restart window cannot be 0 seconds".into(),
            ));
        }

        if self.restart.delay_max_secs < self.restart.delay_base_secs {
            return Err(WardenError::Config(format!(
                "delay_max_secs ({}) is below delay_base_secs ({})",
                self.restart.delay_max_secs, self.restart.delay_base_secs
            )));
        }

        if self.server.port == 0 {
            return Err(WardenError::Config("Server port cannot be 0".into()));
        }

        if self.paths.binary_name.trim().is_empty() {
            return Err(WardenError::Config("binary_name cannot be empty".into()));
        }

        Ok(())
    }

    pub fn check_warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.control.socket_world_writable() {
            warnings.push(ConfigWarning {
                severity: WarningSeverity::Low,
                message: format!(
                    "Control socket is world-writable (mode {:o})",
                    self.control.socket_mode
                ),
                recommendation: "Only run alongside trusted collaborators inside an isolated container.".into(),
            });
        }

        if self.timing.stop_timeout_ms < 5_000 {
            warnings.push(ConfigWarning {
                severity: WarningSeverity::Medium,
                message: format!(
                    "Graceful stop timeout is only {}ms",
                    self.timing.stop_timeout_ms
                ),
                recommendation: "The server may be killed before it saves state; use at least 5000ms.".into(),
            });
        }

        if self.control.stale_after_secs * 1000 <= self.timing.monitor_interval_ms {
            warnings.push(ConfigWarning {
                severity: WarningSeverity::High,
                message: "State staleness threshold is shorter than the monitor interval".into(),
                recommendation: "Health checks will report stale state; raise control.stale_after_secs.".into(),
            });
        }

        warnings
    }

    pub fn log_warnings(&self) {
        for warning in self.check_warnings() {
            match warning.severity {
                WarningSeverity::High => {
                    warn!("CONFIG: {}", warning.message);
                    warn!("  -> {}", warning.recommendation);
                }
                WarningSeverity::Medium => {
                    warn!("{}", warning.message);
                    info!("  -> {}", warning.recommendation);
                }
                WarningSeverity::Low => {
                    info!("Note: {}", warning.message);
                }
            }
        }
    }

    /// Configuration for tests and tools operating on a scratch directory.
    pub fn for_control_dir(control_dir: impl Into<PathBuf>) -> Self {
        Self {
            paths: PathsConfig::with_control_dir(control_dir),
            ..Default::default()
        }
    }
}

impl std::fmt::Display for SupervisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Warden Supervisor Configuration")?;
        writeln!(f, "===============================")?;
        writeln!(f, "Server binary: {}", self.paths.binary().display())?;
        writeln!(f, "Control dir: {}", self.paths.control_dir.display())?;
        writeln!(f, "Socket: {} (mode {:o})", self.paths.socket().display(), self.control.socket_mode)?;
        writeln!(
            f,
            "Crash loop: {} restarts in {}s",
            self.restart.max_rapid_restarts, self.restart.window_secs
        )?;
        writeln!(
            f,
            "Backoff: {}s base, {}s max",
            self.restart.delay_base_secs, self.restart.delay_max_secs
        )?;
        writeln!(
            f,
            "Stop: {}ms graceful, {}ms after SIGKILL",
            self.timing.stop_timeout_ms, self.timing.kill_timeout_ms
        )?;
        writeln!(f, "Server port: {}", self.server.port)?;
        writeln!(f, "Log level: {}", self.logging.level)?;
        Ok(())
    }
}
