use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::time::sleep;
use tracing::{error, info};
use warden_types::{Command, CommandResponse, ServerState, WardenResult};

use super::core::Supervisor;

impl Supervisor {
    /// Executes one control command. Never panics and never returns an error:
    /// both are folded into a failure response.
    pub async fn handle_command(&self, command: Command) -> CommandResponse {
        info!("Received command: {}", command);

        match AssertUnwindSafe(self.dispatch(command)).catch_unwind().await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!("Command {} failed: {}", command, e);
                CommandResponse::failure(format!("Error: {}", e))
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "command handler panicked".into());
                error!("Command {} panicked: {}", command, reason);
                CommandResponse::failure(format!("Error: {}", reason))
            }
        }
    }

    async fn dispatch(&self, command: Command) -> WardenResult<CommandResponse> {
        let _gate = if command.is_lifecycle() {
            Some(self.lifecycle.lock().await)
        } else {
            None
        };

        let response = match command {
            Command::Status => CommandResponse::ok("Status retrieved", self.snapshot()),

            Command::Start => {
                if self.is_maintenance() {
                    return Ok(CommandResponse::failure_with_state(
                        "Cannot start: maintenance mode active",
                        self.snapshot(),
                    ));
                }

                let busy = self.with_shared(|shared| {
                    matches!(shared.state.state, ServerState::Running | ServerState::Starting)
                        && shared.child.is_some()
                });
                if busy {
                    return Ok(CommandResponse::ok("Server already running", self.snapshot()));
                }

                self.with_shared(|shared| {
                    shared.state.auto_restart = true;
                    shared.window.clear();
                });
                let started = self.start_server().await;
                let message = if started { "Server started" } else { "Failed to start server" };
                CommandResponse::with_outcome(started, message, self.snapshot())
            }

            Command::Stop => {
                self.update(|s| s.auto_restart = false);
                let stopped = self.stop_server(true).await;
                let message = if stopped { "Server stopped" } else { "Failed to stop server" };
                CommandResponse::with_outcome(stopped, message, self.snapshot())
            }

            Command::Restart => {
                if self.is_maintenance() {
                    return Ok(CommandResponse::failure_with_state(
                        "Cannot restart: maintenance mode active",
                        self.snapshot(),
                    ));
                }

                self.stop_server(true).await;
                sleep(self.config().timing.restart_pause()).await;
                self.update(|s| s.auto_restart = true);
                let started = self.start_server().await;
                self.update(|s| s.restart_count += 1);
                self.persist();

                let message = if started { "Server restarted" } else { "Restart failed" };
                CommandResponse::with_outcome(started, message, self.snapshot())
            }

            Command::Enable => {
                self.with_shared(|shared| {
                    shared.window.clear();
                    let state = &mut shared.state;
                    state.auto_restart = true;
                    if shared.child.is_none() && !state.maintenance {
                        state.state = ServerState::Stopped;
                        state.clear_process();
                    }
                    state.message = "Auto-restart enabled".into();
                });
                self.persist();
                CommandResponse::ok("Auto-restart enabled", self.snapshot())
            }

            Command::Disable => {
                self.update(|s| {
                    s.auto_restart = false;
                    s.message = "Auto-restart disabled".into();
                });
                self.persist();
                CommandResponse::ok("Auto-restart disabled", self.snapshot())
            }

            Command::Maintenance => {
                self.update(|s| s.auto_restart = false);
                self.stop_server(true).await;
                self.set_maintenance(true)?;
                CommandResponse::ok("Maintenance mode enabled", self.snapshot())
            }

            Command::Resume => {
                self.set_maintenance(false)?;
                self.update(|s| s.auto_restart = true);
                self.persist();
                CommandResponse::ok("Maintenance mode disabled", self.snapshot())
            }
        };

        Ok(response)
    }
}
