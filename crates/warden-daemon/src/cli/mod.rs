mod checks;
mod commands;
mod config_cmd;
mod control;
mod info;
mod run;
mod utils;

pub use checks::run_checks;
pub use commands::{Cli, Commands};
pub use config_cmd::handle_config;
pub use control::send_command;
pub use info::{show_params, show_version};
pub use run::run_supervisor;
pub use utils::{config_path, init_logging, load_config};
