use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::process::Child;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};
use warden_types::{ServerState, SupervisorState, WardenError, WardenResult};

use super::cancellation::CancellationToken;
use super::persist::StateStore;
use super::policy::{RestartPolicy, RestartWindow};
use super::process::{exit_code, ProcessController};
use crate::config::SupervisorConfig;
use crate::control::ControlListener;

pub(crate) enum ChildStatus {
    Absent,
    Alive,
    Exited(i32),
}

/// Everything guarded by the state lock: the published record, the restart
/// window and the process handle.
pub(crate) struct Shared {
    pub(crate) state: SupervisorState,
    pub(crate) window: RestartWindow,
    pub(crate) child: Option<Child>,
    /// Exit observed by a start attempt, left for the monitor to act on.
    pub(crate) exit_pending: Option<i32>,
}

impl Shared {
    /// Non-blocking liveness probe. An exited child is removed from the slot
    /// so its status is reported exactly once.
    pub(crate) fn poll_child(&mut self) -> ChildStatus {
        let Some(child) = self.child.as_mut() else {
            return ChildStatus::Absent;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                self.child = None;
                ChildStatus::Exited(exit_code(status))
            }
            Ok(None) => ChildStatus::Alive,
            Err(e) => {
                warn!("Failed to poll server process: {}", e);
                ChildStatus::Alive
            }
        }
    }
}

/// Owns the subordinate server's lifecycle.
///
/// The state lock is never held across I/O or an await point. Operations that
/// spawn, signal or wait on the process serialize on the lifecycle gate
/// instead, so status queries stay responsive during a slow stop.
pub struct Supervisor {
    config: SupervisorConfig,
    process: ProcessController,
    policy: RestartPolicy,
    shared: Mutex<Shared>,
    pub(crate) lifecycle: tokio::sync::Mutex<()>,
    store: StateStore,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> WardenResult<Self> {
        std::fs::create_dir_all(&config.paths.control_dir).map_err(|e| {
            WardenError::Config(format!(
                "Failed to create control directory {:?}: {}",
                config.paths.control_dir, e
            ))
        })?;

        let mut state = SupervisorState::default();
        if config.paths.maintenance_marker().exists() {
            state.maintenance = true;
            state.state = ServerState::Maintenance;
            state.auto_restart = false;
            state.message = "Maintenance mode enabled".into();
        }

        Ok(Self {
            process: ProcessController::new(config.paths.clone(), config.server.clone()),
            policy: RestartPolicy::from_config(&config.restart),
            store: StateStore::new(config.paths.state_file()),
            shared: Mutex::new(Shared {
                state,
                window: RestartWindow::new(),
                child: None,
                exit_pending: None,
            }),
            lifecycle: tokio::sync::Mutex::new(()),
            config,
        })
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn process(&self) -> &ProcessController {
        &self.process
    }

    pub fn policy(&self) -> &RestartPolicy {
        &self.policy
    }

    /// Current record with uptime recomputed.
    pub fn snapshot(&self) -> SupervisorState {
        self.shared.lock().state.snapshot()
    }

    pub fn is_maintenance(&self) -> bool {
        self.shared.lock().state.maintenance
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut SupervisorState) -> R) -> R {
        f(&mut self.shared.lock().state)
    }

    pub(crate) fn with_shared<R>(&self, f: impl FnOnce(&mut Shared) -> R) -> R {
        let mut shared = self.shared.lock();
        f(&mut *shared)
    }

    /// Refreshes derived fields under the lock, then writes the copy outside it.
    pub fn persist(&self) {
        let _writer = self.store.lock();
        let snapshot = {
            let mut shared = self.shared.lock();
            shared.state.refresh(Utc::now());
            shared.state.clone()
        };
        if let Err(e) = self.store.write_locked(&snapshot) {
            warn!("Failed to write state: {}", e);
        }
    }

    fn write_pid_file(&self) -> WardenResult<()> {
        let path = self.config.paths.pid_file();
        std::fs::write(&path, std::process::id().to_string())
            .map_err(|e| WardenError::Config(format!("Failed to write PID file {:?}: {}", path, e)))
    }

    fn remove_pid_file(&self) {
        if let Err(e) = std::fs::remove_file(self.config.paths.pid_file()) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove PID file: {}", e);
            }
        }
    }

    /// Main loop: serve the control socket, start the server when possible,
    /// then monitor it until `shutdown` fires.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) -> WardenResult<()> {
        info!("Supervisor starting...");
        self.write_pid_file()?;

        self.update(|s| s.message = "Supervisor ready".into());
        self.persist();

        let listener = match ControlListener::bind(&self.config) {
            Ok(listener) => listener,
            Err(e) => {
                self.remove_pid_file();
                return Err(e);
            }
        };
        let listener_task = tokio::spawn(listener.serve(Arc::clone(&self), shutdown.clone()));

        self.initial_start().await;

        let interval = self.config.timing.monitor_interval();
        let mut ticker = shutdown.clone();
        while !shutdown.is_cancelled() {
            self.monitor_tick(&shutdown).await;
            self.persist();

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = ticker.cancelled() => {}
            }
        }

        info!("Supervisor shutting down...");
        {
            let _gate = self.lifecycle.lock().await;
            if !self.stop_server(true).await {
                error!("Server did not stop cleanly during shutdown");
            }
        }

        if let Err(e) = listener_task.await {
            warn!("Control listener task failed: {}", e);
        }

        self.update(|s| s.message = "Supervisor stopped".into());
        self.persist();
        self.remove_pid_file();
        info!("Supervisor stopped");
        Ok(())
    }

    async fn initial_start(&self) {
        let _gate = self.lifecycle.lock().await;

        if !self.process.binary_exists() {
            info!("Server binary not found, waiting for install...");
            self.update(|s| s.message = "Waiting for server install".into());
            self.persist();
            return;
        }

        if self.is_maintenance() {
            info!("Maintenance mode enabled, skipping auto-start");
            self.update(|s| {
                s.state = ServerState::Maintenance;
                s.message = "Maintenance mode enabled".into();
            });
            self.persist();
            return;
        }

        info!("Starting server...");
        self.start_server().await;
    }

    /// One pass of the monitor: detect an exit, classify it and apply the
    /// restart policy. Skipped while a lifecycle operation owns the process.
    pub(crate) async fn monitor_tick(&self, shutdown: &CancellationToken) {
        let Ok(gate) = self.lifecycle.try_lock() else {
            debug!("Lifecycle operation in progress, skipping monitor pass");
            return;
        };

        let exit = self.with_shared(|shared| {
            if let Some(code) = shared.exit_pending.take() {
                return Some(code);
            }
            match shared.poll_child() {
                ChildStatus::Exited(code) => Some(code),
                ChildStatus::Alive | ChildStatus::Absent => None,
            }
        });
        let Some(code) = exit else {
            return;
        };

        self.update(|s| {
            s.last_exit_code = Some(code);
            s.clear_process();
            if code == 0 {
                s.state = ServerState::Stopped;
                s.message = "Server stopped normally".into();
            } else {
                s.state = ServerState::Crashed;
                s.last_crash_time = Some(Utc::now());
                s.message = format!("Server crashed (exit code: {})", code);
            }
        });
        if code == 0 {
            info!("Server exited normally");
        } else {
            warn!("Server crashed with exit code {}", code);
        }
        self.persist();

        let (auto_restart, maintenance) = self.with_shared(|shared| {
            (shared.state.auto_restart, shared.state.maintenance)
        });

        if maintenance {
            self.update(|s| {
                s.state = ServerState::Maintenance;
                s.message = "Maintenance mode enabled".into();
            });
            self.persist();
            return;
        }

        if !auto_restart || code == 0 {
            return;
        }

        let Some(delay) = self.check_rapid_restarts() else {
            self.persist();
            return;
        };

        info!("Auto-restarting in {}s...", delay.as_secs());
        self.update(|s| s.message = format!("Restarting in {}s...", delay.as_secs()));
        self.persist();
        drop(gate);

        let deadline = Instant::now() + delay;
        let interval = self.config.timing.monitor_interval();
        let mut cancelled = shutdown.clone();
        while Instant::now() < deadline {
            let wake = deadline.min(Instant::now() + interval);
            tokio::select! {
                _ = sleep_until(wake) => {}
                _ = cancelled.cancelled() => {
                    info!("Shutdown requested, abandoning pending restart");
                    return;
                }
            }
            self.persist();
        }

        let _gate = self.lifecycle.lock().await;
        let proceed = self.with_shared(|shared| {
            let idle = match shared.poll_child() {
                ChildStatus::Alive => false,
                ChildStatus::Absent => true,
                ChildStatus::Exited(code) => {
                    shared.exit_pending = Some(code);
                    false
                }
            };
            idle && shared.state.auto_restart && !shared.state.maintenance
        });
        if !proceed || shutdown.is_cancelled() {
            info!("Pending restart cancelled by a newer command");
            return;
        }

        self.start_server().await;
        self.update(|s| s.restart_count += 1);
        self.persist();
    }
}
