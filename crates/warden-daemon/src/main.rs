mod cli;

use clap::Parser;
use cli::{
    Cli, Commands, config_path, handle_config, init_logging, load_config, run_checks,
    run_supervisor, send_command, show_params, show_version,
};
use warden_daemon::LoggingConfig;
use warden_types::WardenResult;

#[tokio::main]
async fn main() -> WardenResult<()> {
    let cli = Cli::parse();

    let config_file = config_path(&cli);
    let loaded = load_config(&cli);
    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());
    init_logging(&cli, &logging)?;

    if let Some(command) = cli.command.control_command() {
        let config = loaded?;
        if !send_command(&config, command, cli.format).await? {
            std::process::exit(1);
        }
        return Ok(());
    }

    match cli.command {
        Commands::Run { systemd } => {
            run_supervisor(loaded?, systemd).await?;
        }
        Commands::Health => {
            if !run_checks(&loaded?, cli.format)? {
                std::process::exit(1);
            }
        }
        Commands::Params => {
            show_params(&loaded?, cli.format)?;
        }
        Commands::Config { action } => {
            handle_config(&config_file, loaded, action)?;
        }
        Commands::Version => {
            show_version();
        }
        Commands::Status
        | Commands::Start
        | Commands::Stop
        | Commands::Restart
        | Commands::Enable
        | Commands::Disable
        | Commands::Maintenance
        | Commands::Resume => {}
    }

    Ok(())
}
