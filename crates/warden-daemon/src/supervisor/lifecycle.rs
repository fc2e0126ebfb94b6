use chrono::Utc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, warn};
use warden_types::{ServerState, WardenError, WardenResult};

use super::core::{ChildStatus, Supervisor};
use super::policy::RestartDecision;

const KILL_POLL: Duration = Duration::from_millis(100);

/// Outcome of the bookkeeping half of a stop, decided under the state lock.
enum StopPlan {
    Done,
    Signal(Option<u32>),
}

impl Supervisor {
    /// Launches the server unless maintenance is active or the binary is
    /// missing. Callers hold the lifecycle gate.
    pub(crate) async fn start_server(&self) -> bool {
        if self.is_maintenance() {
            self.update(|s| {
                s.state = ServerState::Maintenance;
                s.message = "Maintenance mode active, start blocked".into();
            });
            self.persist();
            info!("Start request ignored: maintenance mode enabled");
            return false;
        }

        if !self.process().binary_exists() {
            let message = format!("Server binary not found: {}", self.process().binary().display());
            warn!("{}", message);
            self.update(|s| {
                s.state = ServerState::Stopped;
                s.clear_process();
                s.message = message;
            });
            self.persist();
            return false;
        }

        let already_running = self.with_shared(|shared| {
            shared.exit_pending = None;
            match shared.poll_child() {
                ChildStatus::Alive => true,
                ChildStatus::Exited(code) => {
                    shared.state.last_exit_code = Some(code);
                    false
                }
                ChildStatus::Absent => false,
            }
        });
        if already_running {
            info!("Server already running");
            return true;
        }

        self.update(|s| {
            s.state = ServerState::Starting;
            s.message = "Starting server...".into();
        });
        self.persist();

        let child = match self.process().spawn() {
            Ok(child) => child,
            Err(e) => {
                let message = format!("Failed to start: {}", e);
                error!("{}", message);
                self.update(|s| {
                    s.state = ServerState::Crashed;
                    s.clear_process();
                    s.message = message;
                });
                self.persist();
                return false;
            }
        };

        let pid = child.id();
        info!("Spawned server process (PID {})", display_pid(pid));
        self.with_shared(|shared| {
            shared.state.pid = pid;
            shared.child = Some(child);
        });

        sleep(self.config().timing.start_grace()).await;

        let (started, message) = self.with_shared(|shared| match shared.poll_child() {
            ChildStatus::Alive => {
                let state = &mut shared.state;
                state.state = ServerState::Running;
                state.pid = pid;
                state.started_at = Some(Utc::now());
                state.uptime_seconds = 0;
                state.message = "Server running".into();
                (true, format!("Server started with PID {}", display_pid(pid)))
            }
            ChildStatus::Exited(code) => {
                shared.exit_pending = Some(code);
                let state = &mut shared.state;
                state.state = ServerState::Crashed;
                state.clear_process();
                state.last_exit_code = Some(code);
                state.message = format!("Server exited immediately with code {}", code);
                (false, state.message.clone())
            }
            ChildStatus::Absent => {
                let state = &mut shared.state;
                state.state = ServerState::Crashed;
                state.clear_process();
                state.message = "Server process lost during startup".into();
                (false, state.message.clone())
            }
        });

        if started {
            info!("{}", message);
        } else {
            warn!("{}", message);
        }
        self.persist();
        started
    }

    /// Stops the tracked process: SIGTERM and up to the graceful timeout when
    /// `graceful`, then SIGKILL bounded by the kill timeout. Callers hold the
    /// lifecycle gate.
    pub(crate) async fn stop_server(&self, graceful: bool) -> bool {
        let plan = self.with_shared(|shared| {
            shared.exit_pending = None;
            let pid = shared.child.as_ref().and_then(|c| c.id());
            match shared.poll_child() {
                ChildStatus::Absent => {
                    let state = &mut shared.state;
                    state.state = ServerState::Stopped;
                    state.clear_process();
                    state.message = "Server not running".into();
                    StopPlan::Done
                }
                ChildStatus::Exited(code) => {
                    let state = &mut shared.state;
                    state.state = ServerState::Stopped;
                    state.clear_process();
                    state.last_exit_code = Some(code);
                    state.message = format!("Server stopped (exit code: {})", code);
                    StopPlan::Done
                }
                ChildStatus::Alive => {
                    shared.state.state = ServerState::Stopping;
                    shared.state.message = "Stopping server...".into();
                    StopPlan::Signal(pid)
                }
            }
        });
        self.persist();

        let pid = match plan {
            StopPlan::Done => return true,
            StopPlan::Signal(pid) => pid,
        };
        info!("Stopping server (PID {})...", display_pid(pid));

        let mut exit = None;
        if graceful {
            if let Some(pid) = pid {
                if let Err(e) = self.process().terminate(pid) {
                    return self.stop_failed(e);
                }
            }

            let poll = self.config().timing.stop_poll();
            for _ in 0..self.config().timing.stop_ticks() {
                if let Some(code) = self.reap() {
                    exit = Some(code);
                    break;
                }
                sleep(poll).await;
            }
        }

        if exit.is_none() {
            exit = self.reap();
        }

        if exit.is_none() {
            if graceful {
                warn!("Graceful shutdown timed out, sending SIGKILL...");
            }
            let killed = self.with_shared(|shared| match shared.child.as_mut() {
                Some(child) => child.start_kill(),
                None => Ok(()),
            });
            if let Err(e) = killed {
                return self.stop_failed(WardenError::Process(format!("Failed to kill server: {}", e)));
            }

            exit = self.wait_for_exit(self.config().timing.kill_timeout()).await;
        }

        let Some(code) = exit else {
            return self.stop_failed(WardenError::Process(format!(
                "Server did not exit within {}ms of SIGKILL",
                self.config().timing.kill_timeout_ms
            )));
        };

        let message = self.update(|s| {
            s.state = ServerState::Stopped;
            s.clear_process();
            if code.is_some() {
                s.last_exit_code = code;
            }
            s.message = match s.last_exit_code {
                Some(c) => format!("Server stopped (exit code: {})", c),
                None => "Server stopped".into(),
            };
            s.message.clone()
        });
        info!("{}", message);
        self.persist();
        true
    }

    /// Consults the restart policy. On refusal auto-restart is switched off
    /// and the server parked in DISABLED until an explicit ENABLE.
    pub(crate) fn check_rapid_restarts(&self) -> Option<Duration> {
        let policy = self.policy().clone();
        self.with_shared(|shared| match policy.check(&mut shared.window, Instant::now()) {
            RestartDecision::Permit { delay } => Some(delay),
            RestartDecision::Refuse { recent } => {
                warn!(
                    "Too many restarts ({} in {}s), disabling auto-restart",
                    recent,
                    policy.window.as_secs()
                );
                let state = &mut shared.state;
                state.auto_restart = false;
                state.state = ServerState::Disabled;
                state.clear_process();
                state.message = format!(
                    "Auto-restart disabled: {} crashes in {}s",
                    recent,
                    policy.window.as_secs()
                );
                None
            }
        })
    }

    /// Toggles maintenance mode and its on-disk marker. Auto-restart is left
    /// to the caller.
    pub(crate) fn set_maintenance(&self, enabled: bool) -> WardenResult<()> {
        let marker = self.config().paths.maintenance_marker();
        if enabled {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&marker)
                .map_err(|e| WardenError::Io(format!("Failed to create {:?}: {}", marker, e)))?;
        } else {
            match std::fs::remove_file(&marker) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(WardenError::Io(format!("Failed to remove {:?}: {}", marker, e)))
                }
            }
        }

        self.update(|s| {
            s.maintenance = enabled;
            if enabled {
                s.state = ServerState::Maintenance;
                s.message = "Maintenance mode enabled".into();
            } else {
                if s.state == ServerState::Maintenance {
                    s.state = ServerState::Stopped;
                    s.started_at = None;
                }
                s.message = "Maintenance mode disabled".into();
            }
        });
        info!("Maintenance mode {}", if enabled { "enabled" } else { "disabled" });
        self.persist();
        Ok(())
    }

    /// `Some(code)` once the child is gone; the inner code is `None` when the
    /// handle disappeared without an observable status.
    fn reap(&self) -> Option<Option<i32>> {
        self.with_shared(|shared| match shared.poll_child() {
            ChildStatus::Alive => None,
            ChildStatus::Exited(code) => Some(Some(code)),
            ChildStatus::Absent => Some(None),
        })
    }

    async fn wait_for_exit(&self, timeout: Duration) -> Option<Option<i32>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(code) = self.reap() {
                return Some(code);
            }
            if Instant::now() >= deadline {
                return None;
            }
            sleep(KILL_POLL).await;
        }
    }

    fn stop_failed(&self, e: WardenError) -> bool {
        error!("Error stopping server: {}", e);
        self.update(|s| s.message = format!("Stop error: {}", e));
        self.persist();
        false
    }
}

fn display_pid(pid: Option<u32>) -> String {
    pid.map(|p| p.to_string()).unwrap_or_else(|| "?".into())
}
