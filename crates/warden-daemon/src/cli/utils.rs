use super::commands::Cli;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use warden_daemon::{LoggingConfig, SupervisorConfig, CONFIG_FILE_NAME};
use warden_types::{WardenError, WardenResult, DEFAULT_CONTROL_DIR};

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `--config`, else `warden.toml` inside the control directory.
pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(|| {
        cli.control_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTROL_DIR))
            .join(CONFIG_FILE_NAME)
    })
}

/// Loads the file (defaults when absent), then applies command-line
/// overrides, which win over both the file and the environment.
pub fn load_config(cli: &Cli) -> WardenResult<SupervisorConfig> {
    let mut config = SupervisorConfig::load(config_path(cli))?;

    if let Some(ref dir) = cli.control_dir {
        config.paths.control_dir = dir.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.logging.file = Some(file.clone());
    }

    Ok(config)
}

pub fn init_logging(cli: &Cli, logging: &LoggingConfig) -> WardenResult<()> {
    let level = if cli.quiet {
        "warn".to_string()
    } else {
        match cli.verbose {
            0 => logging.level.to_string(),
            1 => "info,warden_daemon=debug".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter);

    match logging.file {
        Some(ref log_file) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .map_err(|e| WardenError::Config(format!("Failed to open log file {:?}: {}", log_file, e)))?;
            let writer = std::sync::Mutex::new(file);

            if logging.json {
                subscriber.with(fmt::layer().json().with_writer(writer)).init();
            } else {
                subscriber.with(fmt::layer().with_writer(writer).with_ansi(false)).init();
            }
        }
        None if logging.json => {
            subscriber.with(fmt::layer().json()).init();
        }
        None => {
            let stdout_layer = fmt::layer()
                .with_target(cli.verbose >= 2);
            subscriber.with(stdout_layer).init();
        }
    }

    Ok(())
}

pub fn print_banner() {
    println!("\x1b[38;5;46mWarden\x1b[0m \x1b[38;5;245mgame server supervisor - v{}\x1b[0m", BUILD_VERSION);
    println!();
}
