use super::commands::OutputFormat;
use warden_daemon::{read_state, SupervisorClient, SupervisorConfig};
use warden_types::{Command, CommandResponse, ServerState, SupervisorState, WardenError, WardenResult};

/// Sends one control command and prints the reply. Returns whether the
/// supervisor reported success.
pub async fn send_command(
    config: &SupervisorConfig,
    command: Command,
    format: OutputFormat,
) -> WardenResult<bool> {
    let client = SupervisorClient::from_config(config);
    let mut response = client.send(command).await;

    if command == Command::Status && !response.success && response.state.is_none() {
        if let Ok(Some(state)) = read_state(&config.paths.state_file()) {
            response = CommandResponse::failure_with_state(
                format!("{} (showing last persisted state)", response.message),
                state,
            );
        }
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| WardenError::Serialization(format!("Failed to encode response: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => print_response(&response),
    }

    Ok(response.success)
}

fn print_response(response: &CommandResponse) {
    if response.success {
        println!("\x1b[38;5;46m[+]\x1b[0m {}", response.message);
    } else {
        println!("\x1b[38;5;196m[-]\x1b[0m {}", response.message);
    }

    if let Some(ref state) = response.state {
        println!("\x1b[38;5;245m{}\x1b[0m", "═".repeat(50));
        print_state(state);
        println!("\x1b[38;5;245m{}\x1b[0m", "═".repeat(50));
    }
}

fn print_state(state: &SupervisorState) {
    let color = match state.state {
        ServerState::Running => "46",
        ServerState::Starting | ServerState::Stopping => "226",
        ServerState::Crashed | ServerState::Disabled => "196",
        ServerState::Stopped | ServerState::Maintenance => "245",
    };
    let pid = state
        .pid
        .map(|p| format!(" (PID {})", p))
        .unwrap_or_default();
    println!("Server:        \x1b[38;5;{}m{}\x1b[0m{}", color, state.state, pid);

    let secs = state.uptime_seconds;
    if state.state == ServerState::Running {
        println!("Uptime:        {}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60);
    }
    println!("Auto-restart:  {}", if state.auto_restart { "enabled" } else { "disabled" });
    println!("Maintenance:   {}", if state.maintenance { "on" } else { "off" });
    println!("Restarts:      {}", state.restart_count);
    if let Some(code) = state.last_exit_code {
        println!("Last exit:     {}", code);
    }
    if let Some(crash) = state.last_crash_time {
        println!("Last crash:    {}", crash.to_rfc3339());
    }
    println!("Message:       {}", state.message);
    println!("Updated:       {}", state.updated_at.to_rfc3339());
}
