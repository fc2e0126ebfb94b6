use super::commands::OutputFormat;
use warden_daemon::{run_health_checks, CheckResult, SupervisorConfig};
use warden_types::{WardenError, WardenResult};

/// Runs the container health checks. Returns `false` when any check failed.
pub fn run_checks(config: &SupervisorConfig, format: OutputFormat) -> WardenResult<bool> {
    let report = run_health_checks(&config.paths, config.control.stale_after());

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| WardenError::Serialization(format!("Failed to encode report: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for (name, result) in report.checks() {
                let marker = match result {
                    CheckResult::Pass(_) => "\x1b[38;5;46m✓\x1b[0m",
                    CheckResult::Warn(_) => "\x1b[38;5;226m!\x1b[0m",
                    CheckResult::Fail(_) => "\x1b[38;5;196m✗\x1b[0m",
                };
                println!("{} {}: {}", marker, name, result.message());
            }
        }
    }

    Ok(!report.has_failures())
}
