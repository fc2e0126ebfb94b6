mod constants;
mod control;
mod logging;
mod paths;
mod restart;
mod server;
mod supervisor;
mod timing;
mod types;

pub use constants::*;
pub use control::ControlConfig;
pub use logging::LoggingConfig;
pub use paths::PathsConfig;
pub use restart::RestartConfig;
pub use server::ServerConfig;
pub use supervisor::SupervisorConfig;
pub use timing::TimingConfig;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_default_config_validation() {
        let config = SupervisorConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_control_layout() {
        let paths = PathsConfig::default();
        assert_eq!(paths.binary(), PathBuf::from("/serverfiles/DayZServer"));
        assert_eq!(paths.socket(), PathBuf::from("/control/supervisor.sock"));
        assert_eq!(paths.state_file(), PathBuf::from("/control/state.json"));
        assert_eq!(paths.pid_file(), PathBuf::from("/control/supervisor.pid"));
        assert_eq!(paths.maintenance_marker(), PathBuf::from("/control/maintenance"));
        assert_eq!(paths.server_params_file(), PathBuf::from("/control/server_params"));
    }

    #[test]
    fn test_restart_defaults() {
        let restart = RestartConfig::default();
        assert_eq!(restart.max_rapid_restarts, 5);
        assert_eq!(restart.window(), Duration::from_secs(300));
        assert_eq!(restart.delay_base(), Duration::from_secs(2));
        assert_eq!(restart.delay_max(), Duration::from_secs(60));
    }

    #[test]
    fn test_stop_ticks() {
        let timing = TimingConfig::default();
        assert_eq!(timing.stop_ticks(), 30);

        let fast = TimingConfig {
            stop_timeout_ms: 500,
            stop_poll_ms: 100,
            ..Default::default()
        };
        assert_eq!(fast.stop_ticks(), 5);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = SupervisorConfig::default();
        config.restart.max_rapid_restarts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_backoff_rejected() {
        let mut config = SupervisorConfig::default();
        config.restart.delay_base_secs = 30;
        config.restart.delay_max_secs = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_world_writable_socket_warns() {
        let config = SupervisorConfig::default();
        let warnings = config.check_warnings();
        assert!(warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Low && w.message.contains("666")));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: SupervisorConfig = toml::from_str(
            r#"
            [restart]
            max_rapid_restarts = 3

            [paths]
            control_dir = "/tmp/ctl"
            "#,
        )
        .expect("Failed to parse");
        assert_eq!(parsed.restart.max_rapid_restarts, 3);
        assert_eq!(parsed.restart.window_secs, 300);
        assert_eq!(parsed.paths.socket(), PathBuf::from("/tmp/ctl/supervisor.sock"));
        assert_eq!(parsed.control.socket_mode, 0o666);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        let mut config = SupervisorConfig::for_control_dir(dir.path());
        config.server.port = 2402;
        config.save(&path).unwrap();

        let toml_str = std::fs::read_to_string(&path).unwrap();
        let parsed: SupervisorConfig = toml::from_str(&toml_str).expect("Failed to parse");
        assert_eq!(parsed.server.port, 2402);
        assert_eq!(parsed.paths.control_dir, dir.path());
    }

    #[test]
    fn test_display_mentions_socket() {
        let config = SupervisorConfig::default();
        assert!(format!("{}", config).contains("supervisor.sock"));
    }
}
