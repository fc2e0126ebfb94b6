use super::commands::ConfigAction;
use std::path::Path;
use warden_daemon::SupervisorConfig;
use warden_types::{WardenError, WardenResult};

pub fn handle_config(
    config_path: &Path,
    config: WardenResult<SupervisorConfig>,
    action: Option<ConfigAction>,
) -> WardenResult<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let config = config?;
            if !config_path.exists() {
                println!("\x1b[38;5;245mNo configuration file at {:?}, showing defaults\x1b[0m", config_path);
            }
            println!("{}", config);
            let toml = toml::to_string_pretty(&config)
                .map_err(|e| WardenError::Config(format!("Failed to serialize config: {}", e)))?;
            println!("{}", toml);
        }
        Some(ConfigAction::Validate) => match config {
            Ok(config) => {
                println!("\x1b[38;5;46m[+]\x1b[0m Configuration is valid");
                for warning in config.check_warnings() {
                    println!("\x1b[38;5;226m[!]\x1b[0m {}", warning.message);
                    println!("    -> {}", warning.recommendation);
                }
            }
            Err(e) => {
                println!("\x1b[38;5;196m[-]\x1b[0m {}", e);
                return Err(e);
            }
        },
        Some(ConfigAction::Init { force }) => {
            if config_path.exists() && !force {
                return Err(WardenError::Config(format!(
                    "{:?} already exists, use --force to overwrite",
                    config_path
                )));
            }
            let config = match config {
                Ok(config) => config,
                Err(_) if force => SupervisorConfig::default(),
                Err(e) => return Err(e),
            };
            config.save(config_path)?;
            println!("\x1b[38;5;46m[+]\x1b[0m Configuration written to {:?}", config_path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        let mut config = SupervisorConfig::for_control_dir(dir.path());
        config.server.port = 2402;

        handle_config(&path, Ok(config.clone()), Some(ConfigAction::Init { force: false })).unwrap();
        let written = SupervisorConfig::load(&path).unwrap();
        assert_eq!(written.server.port, 2402);

        config.server.port = 2500;
        assert!(handle_config(&path, Ok(config.clone()), Some(ConfigAction::Init { force: false })).is_err());
        assert_eq!(SupervisorConfig::load(&path).unwrap().server.port, 2402);

        handle_config(&path, Ok(config), Some(ConfigAction::Init { force: true })).unwrap();
        assert_eq!(SupervisorConfig::load(&path).unwrap().server.port, 2500);
    }
}
