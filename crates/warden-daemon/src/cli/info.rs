use super::commands::OutputFormat;
use super::utils::print_banner;
use serde_json::json;
use warden_daemon::{ProcessController, SupervisorConfig};
use warden_types::{WardenError, WardenResult};

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prints the argv the supervisor would launch right now.
pub fn show_params(config: &SupervisorConfig, format: OutputFormat) -> WardenResult<()> {
    let controller = ProcessController::new(config.paths.clone(), config.server.clone());
    let argv = controller.build_command();
    let (_, source) = controller.resolve_params();

    match format {
        OutputFormat::Json => {
            let value = json!({
                "binary": controller.binary(),
                "binary_exists": controller.binary_exists(),
                "working_dir": controller.working_dir(),
                "params_source": source.to_string(),
                "argv": argv,
            });
            let out = serde_json::to_string_pretty(&value)
                .map_err(|e| WardenError::Serialization(format!("Failed to encode params: {}", e)))?;
            println!("{}", out);
        }
        OutputFormat::Text => {
            println!("Binary:      {}", controller.binary().display());
            if !controller.binary_exists() {
                println!("             \x1b[38;5;226m(not installed)\x1b[0m");
            }
            println!("Working dir: {}", controller.working_dir().display());
            println!("Parameters:  {}", source);
            println!();
            println!("{}", argv.join(" "));
        }
    }
    Ok(())
}

pub fn show_version() {
    print_banner();
    println!("  Version:   \x1b[38;5;51m{}\x1b[0m", BUILD_VERSION);
    println!("  Profile:   \x1b[38;5;245m{}\x1b[0m", if cfg!(debug_assertions) { "debug" } else { "release" });
}
