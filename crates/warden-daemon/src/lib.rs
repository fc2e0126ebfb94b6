#![allow(missing_docs)]
#![warn(clippy::all)]

#[cfg(not(unix))]
compile_error!("warden supervises processes over Unix signals and sockets and builds only on Unix");

pub mod config;
pub mod control;
pub mod health;
pub mod params;
pub mod supervisor;

pub use config::{
    ControlConfig, LoggingConfig, LogLevel, PathsConfig, RestartConfig, ServerConfig,
    SupervisorConfig, TimingConfig, CONFIG_FILE_NAME,
};
pub use control::{ControlListener, SupervisorClient};
pub use health::{process_alive, run_health_checks, CheckResult, DiagnosticReport};
pub use params::{ParamSource, ServerParams};
pub use supervisor::{
    read_state, state_age, CancellationToken, ProcessController, RestartDecision, RestartPolicy,
    RestartWindow, ShutdownTrigger, StateStore, Supervisor,
};
