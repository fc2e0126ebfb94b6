use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use warden_types::Command;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "warden")]
#[command(version = BUILD_VERSION)]
#[command(about = "Warden - game server process supervisor")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(short, long, global = true, value_name = "FILE", env = "WARDEN_CONFIG", help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "DIR", env = "WARDEN_CONTROL_DIR", help = "Control directory (socket, state, markers)")]
    pub control_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[arg(long, global = true, value_name = "FILE", help = "Write logs to file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text", help = "Output format")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the supervisor in the foreground")]
    #[command(long_about = "Run the supervisor in the foreground.\n\nStarts the game server, restarts it on crashes, and serves control commands on the local socket until SIGTERM, SIGINT or SIGHUP.")]
    Run {
        #[arg(long, help = "Notify systemd when ready")]
        systemd: bool,
    },

    #[command(about = "Show supervisor and server status")]
    Status,

    #[command(about = "Start the server and enable auto-restart")]
    Start,

    #[command(about = "Stop the server and disable auto-restart")]
    Stop,

    #[command(about = "Restart the server")]
    Restart,

    #[command(about = "Enable auto-restart and clear the crash window")]
    Enable,

    #[command(about = "Disable auto-restart")]
    Disable,

    #[command(about = "Stop the server and enter maintenance mode")]
    Maintenance,

    #[command(about = "Leave maintenance mode")]
    Resume,

    #[command(about = "Run container health checks")]
    Health,

    #[command(about = "Show the server command line")]
    Params,

    #[command(about = "Manage configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    #[command(about = "Show version information")]
    Version,
}

impl Commands {
    /// Control command carried over the socket, if this subcommand is one.
    pub fn control_command(&self) -> Option<Command> {
        match self {
            Commands::Status => Some(Command::Status),
            Commands::Start => Some(Command::Start),
            Commands::Stop => Some(Command::Stop),
            Commands::Restart => Some(Command::Restart),
            Commands::Enable => Some(Command::Enable),
            Commands::Disable => Some(Command::Disable),
            Commands::Maintenance => Some(Command::Maintenance),
            Commands::Resume => Some(Command::Resume),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show effective configuration")]
    Show,
    #[command(about = "Validate configuration")]
    Validate,
    #[command(about = "Write the effective configuration to the config file")]
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_control_subcommands_map_to_commands() {
        let cli = Cli::try_parse_from(["warden", "--control-dir", "/tmp/ctl", "maintenance"]).unwrap();
        assert_eq!(cli.control_dir, Some(PathBuf::from("/tmp/ctl")));
        assert_eq!(cli.command.control_command(), Some(Command::Maintenance));

        let cli = Cli::try_parse_from(["warden", "health"]).unwrap();
        assert_eq!(cli.command.control_command(), None);
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from(["warden", "-vv", "run", "--systemd"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Run { systemd: true }));
    }

    #[test]
    fn test_config_init_flags() {
        let cli = Cli::try_parse_from(["warden", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config { action: Some(ConfigAction::Init { force: true }) }
        ));
    }
}
